//! Composition root: turns the loaded project plus history into concrete
//! action requests, and records what came back.

use crate::content::{ContentItem, PAGE_AUDIENCE};
use crate::destination::Destination;
use crate::eligibility;
use crate::error::Result;
use crate::executor::ActionRequest;
use crate::history::HistoryStore;
use crate::paths;
use crate::pause::PauseMarker;
use crate::photo::PhotoCatalog;
use crate::picker;
use crate::project::Project;
use crate::schedule;
use crate::types::Outcome;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SelectionContext
// ---------------------------------------------------------------------------

/// Read-only view over everything one selection needs.
pub struct SelectionContext<'a> {
    pub project: &'a Project,
    pub history: &'a HistoryStore,
    pub root: &'a Path,
}

impl SelectionContext<'_> {
    /// Follow-up phrase for `destination`, rotating with its history length.
    pub fn follow_up_for(&self, destination: &Destination) -> Option<String> {
        if !destination.promo_allowed() {
            return None;
        }
        let phrases = &self.project.settings.selection.follow_up_comments;
        if phrases.is_empty() {
            return None;
        }
        let turn = self.history.entries(&destination.id).len() % phrases.len();
        Some(phrases[turn].trim().to_string()).filter(|s| !s.is_empty())
    }

    fn request_for(
        &self,
        destination: &Destination,
        item: &ContentItem,
        segment: &str,
    ) -> Result<ActionRequest> {
        let text = item.text_for(segment)?.to_string();
        let settings = &self.project.settings;
        let photo = self
            .project
            .photos
            .select(item, &settings.selection.photo_adjacency);

        Ok(ActionRequest {
            destination_id: destination.id.clone(),
            destination_name: destination.name.clone(),
            destination_url: destination.url.clone(),
            content_id: item.id.clone(),
            category: item.category.clone(),
            audience_segment: segment.to_string(),
            text,
            photo_path: photo.map(|p| PhotoCatalog::path_for(p, &settings.photo_base(self.root))),
            photo_filename: photo.map(|p| p.filename.clone()),
            follow_up_comment: None,
            capture_rules: false,
            is_page: destination.is_page(),
        })
    }

    /// Next post for an ordinary destination, skipping content already used
    /// elsewhere in this run. `Ok(None)` when nothing is eligible.
    pub fn build_action(
        &self,
        destination: &Destination,
        skip: &HashSet<String>,
    ) -> Result<Option<ActionRequest>> {
        let candidates: Vec<&ContentItem> = eligibility::eligible(
            destination,
            &self.project.catalog,
            self.history,
            &self.project.settings.selection.promo_categories,
        )
        .into_iter()
        .filter(|item| !skip.contains(&item.id))
        .collect();

        let Some(item) = picker::pick(&candidates) else {
            tracing::info!(destination = %destination.id, "no eligible content");
            return Ok(None);
        };

        let mut request = self.request_for(destination, item, &destination.audience_segment)?;
        request.capture_rules = self.project.rules.needs_capture(&destination.id);
        request.follow_up_comment = self.follow_up_for(destination);
        Ok(Some(request))
    }

    /// Next post for the page slot on `today`.
    pub fn build_page_action(
        &self,
        page: &Destination,
        today: NaiveDate,
    ) -> Result<Option<ActionRequest>> {
        let candidates = schedule::page_content(today, page, &self.project.catalog, self.history);
        let Some(item) = picker::pick(&candidates) else {
            tracing::info!(page = %page.id, "no page content for today");
            return Ok(None);
        };
        self.request_for(page, item, PAGE_AUDIENCE).map(Some)
    }
}

// ---------------------------------------------------------------------------
// SchedulingEngine
// ---------------------------------------------------------------------------

pub struct SchedulingEngine {
    root: PathBuf,
    project: Project,
    history: HistoryStore,
}

impl SchedulingEngine {
    /// Load the project and its history from `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let project = Project::load(root)?;
        let history = HistoryStore::load(paths::history_path(root));
        Ok(Self::new(root, project, history))
    }

    /// The history store adopts the project's failure policy.
    pub fn new(root: &Path, project: Project, history: HistoryStore) -> Self {
        let history = history.with_policy(project.settings.selection.failure_policy);
        Self {
            root: root.to_path_buf(),
            project,
            history,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn context(&self) -> SelectionContext<'_> {
        SelectionContext {
            project: &self.project,
            history: &self.history,
            root: &self.root,
        }
    }

    pub fn pause_marker(&self) -> PauseMarker {
        PauseMarker::new(self.project.settings.pause_path(&self.root))
    }

    pub fn due_today(&self, now: NaiveDateTime) -> Vec<&Destination> {
        schedule::due_destinations(
            now,
            &self.project.schedule,
            &self.project.directory,
            &self.history,
            self.project.settings.posting.max_posts_per_day,
        )
    }

    pub fn page_today(&self, today: NaiveDate) -> Option<&Destination> {
        schedule::page_for_today(today, &self.project.directory)
    }

    pub fn build_action(
        &self,
        destination: &Destination,
        skip: &HashSet<String>,
    ) -> Result<Option<ActionRequest>> {
        self.context().build_action(destination, skip)
    }

    pub fn build_page_action(
        &self,
        page: &Destination,
        today: NaiveDate,
    ) -> Result<Option<ActionRequest>> {
        self.context().build_page_action(page, today)
    }

    /// Append the attempt to history. A successful post also bumps the
    /// photo's usage counter and persists the photo manifest.
    pub fn record_outcome(
        &mut self,
        destination_id: &str,
        content_id: &str,
        photo: Option<&str>,
        outcome: Outcome,
        now: NaiveDateTime,
    ) -> Result<()> {
        self.history.append(destination_id, content_id, outcome, now)?;

        if let (Outcome::Success, Some(filename)) = (outcome, photo) {
            let used = self.project.photos.commit_usage(filename)?;
            self.project.photos.save(&self.root)?;
            tracing::debug!(photo = filename, used, "photo usage committed");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::destination::Directory;
    use crate::error::RotapostError;
    use crate::photo::Photo;
    use crate::types::{Cadence, ContentKind, Day, DestinationKind, FailurePolicy};
    use chrono::Duration;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        // Monday, ISO week 42.
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn g1() -> Destination {
        let mut d = Destination::new("g1", "Group One", "https://example.com/g1");
        d.tier = 1;
        d.content_tags = ["tips", "promo"].iter().map(|s| s.to_string()).collect();
        d
    }

    fn project() -> Project {
        let mut project = Project::default();
        let mut page = Destination::new("page", "The Page", "https://example.com/page");
        page.kind = DestinationKind::Page;
        project.directory = Directory::new(vec![g1(), page]);
        project.schedule =
            serde_yaml::from_str("week_a:\n  monday: [g1]\n").unwrap();

        let mut mon = ContentItem::new("page-mon", "repairs").with_text("page", "Monday hours");
        mon.content_type = ContentKind::Page;
        mon.schedule_day = Some(Day::Monday);
        let mut tips2 = ContentItem::new("tips-2", "tips").with_text("community", "Second tip");
        tips2.day = Some(2);
        let mut tips1 = ContentItem::new("tips-1", "tips")
            .with_text("community", "  First tip  ")
            .with_text("seniors", "Gentle first tip");
        tips1.day = Some(1);
        tips1.suggested_photos = vec!["router.jpg".into()];
        let promo = ContentItem::new("promo-1", "promo").with_text("community", "Call us");
        project.catalog = Catalog::new(vec![tips2, tips1, promo, mon]);

        project.photos = PhotoCatalog::new(vec![
            Photo::new("router.jpg", "tips"),
            Photo::new("brand.jpg", "brand"),
        ]);
        project
    }

    fn engine(dir: &TempDir, project: Project) -> SchedulingEngine {
        let history = HistoryStore::load(paths::history_path(dir.path()));
        SchedulingEngine::new(dir.path(), project, history)
    }

    #[test]
    fn builds_request_for_earliest_item() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, project());
        let g1 = engine.project().directory.get("g1").unwrap().clone();

        let req = engine.build_action(&g1, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.content_id, "tips-1");
        assert_eq!(req.text, "First tip");
        assert_eq!(req.audience_segment, "community");
        assert_eq!(req.photo_filename.as_deref(), Some("router.jpg"));
        assert_eq!(
            req.photo_path.unwrap(),
            dir.path().join("photos").join("router.jpg")
        );
        assert!(req.capture_rules);
        assert!(!req.is_page);
    }

    #[test]
    fn audience_variant_is_used_when_present() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        let mut g = g1();
        g.audience_segment = "seniors".into();
        p.directory = Directory::new(vec![g]);
        let engine = engine(&dir, p);
        let g = engine.project().directory.get("g1").unwrap().clone();
        let req = engine.build_action(&g, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.text, "Gentle first tip");
    }

    #[test]
    fn skip_set_excludes_content_used_this_run() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, project());
        let g1 = engine.project().directory.get("g1").unwrap().clone();
        let skip: HashSet<String> = ["tips-1".to_string()].into_iter().collect();
        let req = engine.build_action(&g1, &skip).unwrap().unwrap();
        assert_eq!(req.content_id, "tips-2");
    }

    #[test]
    fn nothing_eligible_is_none() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, project());
        let g1 = engine.project().directory.get("g1").unwrap().clone();
        let skip: HashSet<String> = ["tips-1", "tips-2", "promo-1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(engine.build_action(&g1, &skip).unwrap().is_none());
    }

    #[test]
    fn missing_variant_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        p.catalog = Catalog::new(vec![ContentItem::new("bare", "tips").with_text("seniors", "x")]);
        let engine = engine(&dir, p);
        let g1 = engine.project().directory.get("g1").unwrap().clone();
        assert!(matches!(
            engine.build_action(&g1, &HashSet::new()),
            Err(RotapostError::MissingTextVariant { .. })
        ));
    }

    #[test]
    fn follow_up_rotates_with_history_and_respects_promo() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        p.settings.selection.follow_up_comments = vec!["First".into(), "Second".into()];
        let mut engine = engine(&dir, p);
        let g1 = engine.project().directory.get("g1").unwrap().clone();

        let req = engine.build_action(&g1, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.follow_up_comment.as_deref(), Some("First"));

        engine
            .record_outcome("g1", "tips-1", None, Outcome::Success, now())
            .unwrap();
        let req = engine.build_action(&g1, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.follow_up_comment.as_deref(), Some("Second"));

        let mut quiet = g1.clone();
        quiet.posting_rules.promo_allowed = false;
        assert!(engine.context().follow_up_for(&quiet).is_none());
    }

    #[test]
    fn weekly_destination_posted_three_days_ago_is_not_due() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        let mut g = g1();
        g.posting_rules.max_frequency = Cadence::Weekly;
        p.directory = Directory::new(vec![g]);
        let mut engine = engine(&dir, p);
        engine
            .record_outcome("g1", "tips-1", None, Outcome::Success, now() - Duration::days(3))
            .unwrap();

        assert_eq!(engine.history().days_since_last_action("g1", now()), 3);
        assert!(engine.due_today(now()).is_empty());
    }

    #[test]
    fn success_commits_photo_usage_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir, project());
        engine
            .record_outcome("g1", "tips-1", Some("router.jpg"), Outcome::Success, now())
            .unwrap();
        engine
            .record_outcome("g1", "tips-2", Some("router.jpg"), Outcome::Failure, now())
            .unwrap();

        let saved = PhotoCatalog::load(dir.path()).unwrap();
        assert_eq!(saved.get("router.jpg").unwrap().used_count, 1);
        let history = HistoryStore::load(paths::history_path(dir.path()));
        assert_eq!(history.entries("g1").len(), 2);
    }

    #[test]
    fn failed_content_stays_eligible_under_retry() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir, project());
        engine
            .record_outcome("g1", "tips-1", None, Outcome::Failure, now())
            .unwrap();
        let g1 = engine.project().directory.get("g1").unwrap().clone();
        let req = engine.build_action(&g1, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.content_id, "tips-1");
        // The attempt still starts the cadence clock.
        assert!(engine.due_today(now()).is_empty());
    }

    #[test]
    fn failed_attempt_holds_weekly_destination_next_day() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        let mut g = g1();
        g.posting_rules.max_frequency = Cadence::Weekly;
        p.directory = Directory::new(vec![g]);
        p.schedule = serde_yaml::from_str("week_a:\n  monday: [g1]\n  tuesday: [g1]\n").unwrap();
        let mut engine = engine(&dir, p);
        let tuesday = now() + Duration::days(1);

        engine
            .record_outcome("g1", "tips-1", None, Outcome::Failure, now())
            .unwrap();

        assert_eq!(engine.history().entries("g1").len(), 1);
        assert_eq!(engine.history().days_since_last_action("g1", tuesday), 1);
        assert!(engine.due_today(tuesday).is_empty());
        // Two weeks on is week A again.
        assert_eq!(engine.due_today(now() + Duration::days(14)).len(), 1);
    }

    #[test]
    fn failed_content_is_consumed_under_consume() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        p.settings.selection.failure_policy = FailurePolicy::Consume;
        let mut engine = engine(&dir, p);
        engine
            .record_outcome("g1", "tips-1", None, Outcome::Failure, now())
            .unwrap();
        let g1 = engine.project().directory.get("g1").unwrap().clone();
        let req = engine.build_action(&g1, &HashSet::new()).unwrap().unwrap();
        assert_eq!(req.content_id, "tips-2");
        assert!(engine.due_today(now()).is_empty());
    }

    #[test]
    fn page_action_uses_page_audience_without_extras() {
        let dir = TempDir::new().unwrap();
        let mut p = project();
        p.settings.selection.follow_up_comments = vec!["Ask us".into()];
        let engine = engine(&dir, p);
        let today = now().date();
        let page = engine.page_today(today).unwrap().clone();

        let req = engine.build_page_action(&page, today).unwrap().unwrap();
        assert_eq!(req.content_id, "page-mon");
        assert_eq!(req.audience_segment, "page");
        assert_eq!(req.text, "Monday hours");
        assert!(req.is_page);
        assert!(!req.capture_rules);
        assert!(req.follow_up_comment.is_none());

        let tuesday = today + Duration::days(1);
        assert!(engine.page_today(tuesday).is_none());
    }
}
