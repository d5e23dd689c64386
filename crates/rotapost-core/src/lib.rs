pub mod breaker;
pub mod content;
pub mod cycle;
pub mod destination;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod executor;
pub mod history;
pub mod io;
pub mod paths;
pub mod pause;
pub mod photo;
pub mod picker;
pub mod project;
pub mod rules;
pub mod schedule;
pub mod settings;
pub mod stats;
pub mod types;

pub use error::{Result, RotapostError};
