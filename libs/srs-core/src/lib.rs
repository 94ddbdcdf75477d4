//! Core scheduling library shared by the StudyDeck backend.
//!
//! Provides:
//! - Spaced repetition scheduler (ease / interval / due-date updates)
//! - Mastery tier classification
//! - Per-rating interval previews
//! - Shared types (Rating, ScheduleOutcome, etc.)

pub mod mastery;
pub mod scheduler;
pub mod types;

pub use mastery::MasteryLevel;
pub use scheduler::Scheduler;
pub use types::{IntervalPreview, Rating, ScheduleOutcome};
