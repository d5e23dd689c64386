use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub fn all() -> &'static [Day] {
        &[
            Day::Monday,
            Day::Tuesday,
            Day::Wednesday,
            Day::Thursday,
            Day::Friday,
            Day::Saturday,
            Day::Sunday,
        ]
    }

    pub fn of(date: NaiveDate) -> Day {
        date.weekday().into()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Day {
    type Err = crate::error::RotapostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Day::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| crate::error::RotapostError::InvalidDay(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Half of the bi-weekly rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    WeekA,
    WeekB,
}

impl Period {
    /// Even ISO week → A, odd → B.
    pub fn for_date(date: NaiveDate) -> Period {
        if date.iso_week().week() % 2 == 0 {
            Period::WeekA
        } else {
            Period::WeekB
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::WeekA => "week_a",
            Period::WeekB => "week_b",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Cadence
// ---------------------------------------------------------------------------

/// Maximum posting frequency for a destination.
///
/// Parsed leniently from free text (`"1 per week"`, `"1 per day"`); anything
/// unrecognised, or no value at all, falls back to the fortnightly default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Cadence {
    Daily,
    Weekly,
    #[default]
    Fortnightly,
}

pub const DEFAULT_COOLDOWN_DAYS: i64 = 14;

impl Cadence {
    pub fn min_gap_days(self) -> i64 {
        match self {
            Cadence::Daily => 1,
            Cadence::Weekly => 7,
            Cadence::Fortnightly => DEFAULT_COOLDOWN_DAYS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Fortnightly => "fortnightly",
        }
    }

    pub fn parse(text: &str) -> Cadence {
        let lower = text.to_ascii_lowercase();
        if lower.contains("per week") {
            Cadence::Weekly
        } else if lower.contains("per day") {
            Cadence::Daily
        } else {
            Cadence::Fortnightly
        }
    }
}

impl From<Option<String>> for Cadence {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Cadence::parse).unwrap_or_default()
    }
}

impl From<Cadence> for Option<String> {
    fn from(value: Cadence) -> Self {
        match value {
            Cadence::Daily => Some("1 per day".to_string()),
            Cadence::Weekly => Some("1 per week".to_string()),
            Cadence::Fortnightly => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AllowedDays
// ---------------------------------------------------------------------------

/// Weekdays a destination accepts posts on. An empty list, a missing value,
/// or a list containing `any` all mean every day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<Vec<String>>", into = "Vec<String>")]
pub enum AllowedDays {
    #[default]
    Any,
    Only(Vec<Day>),
}

impl AllowedDays {
    pub fn allows(&self, day: Day) -> bool {
        match self {
            AllowedDays::Any => true,
            AllowedDays::Only(days) => days.contains(&day),
        }
    }
}

impl TryFrom<Option<Vec<String>>> for AllowedDays {
    type Error = crate::error::RotapostError;

    fn try_from(value: Option<Vec<String>>) -> Result<Self, Self::Error> {
        let names = value.unwrap_or_default();
        if names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case("any")) {
            return Ok(AllowedDays::Any);
        }
        let days = names
            .iter()
            .map(|n| n.parse())
            .collect::<Result<Vec<Day>, _>>()?;
        Ok(AllowedDays::Only(days))
    }
}

impl From<AllowedDays> for Vec<String> {
    fn from(value: AllowedDays) -> Self {
        match value {
            AllowedDays::Any => vec!["any".to_string()],
            AllowedDays::Only(days) => days.iter().map(|d| d.as_str().to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    #[default]
    Group,
    /// Posted on a fixed weekday pattern, outside the rotation calendar.
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Page,
    #[default]
    #[serde(other)]
    Ordinary,
}

// ---------------------------------------------------------------------------
// Outcome / FailurePolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Whether a failed attempt uses up the item for that destination. Cadence
/// always runs from the latest attempt, failed or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A failed item is never offered to that destination again.
    Consume,
    /// A failed item stays eligible for the next due day.
    #[default]
    Retry,
}

impl FailurePolicy {
    pub fn counts(self, success: bool) -> bool {
        match self {
            FailurePolicy::Consume => true,
            FailurePolicy::Retry => success,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
