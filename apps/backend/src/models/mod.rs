//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from srs-core
pub use srs_core::{IntervalPreview, MasteryLevel, Rating, ScheduleOutcome};

// === Database Entity Types ===

/// Flashcard stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub answer: String,
    pub explanation: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Per-card scheduling state (one-to-one with a card)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCardState {
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub total_reviews: i32,
    pub successful_reviews: i32,
    pub failed_reviews: i32,
    pub current_interval_days: i32,
    pub ease_factor: f64,
    pub due_date: Option<NaiveDate>,
    pub average_rating: Option<f64>,
    pub average_time_seconds: Option<i32>,
    pub mastery_level: String,
    pub first_reviewed_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl DbCardState {
    /// State for a card that has never been scheduled.
    pub fn new_for(card_id: Uuid, user_id: Uuid) -> Self {
        Self {
            card_id,
            user_id,
            total_reviews: 0,
            successful_reviews: 0,
            failed_reviews: 0,
            current_interval_days: 0,
            ease_factor: 2.5,
            due_date: None,
            average_rating: None,
            average_time_seconds: None,
            mastery_level: MasteryLevel::New.as_str().to_string(),
            first_reviewed_at: None,
            last_reviewed_at: None,
        }
    }

    /// Mastery tier derived from the state's own fields.
    pub fn mastery(&self) -> MasteryLevel {
        MasteryLevel::classify(self.current_interval_days, self.total_reviews)
    }
}

/// Daily study session aggregate (unique per user and date)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub cards_studied: i32,
    pub cards_again: i32,
    pub cards_hard: i32,
    pub cards_good: i32,
    pub cards_easy: i32,
    pub time_spent_minutes: i32,
    pub pomodoro_sessions: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl DbStudySession {
    /// Fresh session for the given day, started now.
    pub fn new_for(user_id: Uuid, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            cards_studied: 0,
            cards_again: 0,
            cards_hard: 0,
            cards_good: 0,
            cards_easy: 0,
            time_spent_minutes: 0,
            pomodoro_sessions: 0,
            start_time: Some(now),
            end_time: None,
        }
    }

    /// Counter for one rating value.
    pub fn rating_counter_mut(&mut self, rating: Rating) -> &mut i32 {
        match rating {
            Rating::Again => &mut self.cards_again,
            Rating::Hard => &mut self.cards_hard,
            Rating::Good => &mut self.cards_good,
            Rating::Easy => &mut self.cards_easy,
        }
    }
}

/// Lifetime per-user aggregates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserStats {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_study_date: Option<NaiveDate>,
    pub total_cards_studied: i32,
    pub total_study_minutes: i32,
    pub cards_new: i32,
    pub cards_learning: i32,
    pub cards_young: i32,
    pub cards_mature: i32,
    pub cards_mastered: i32,
    pub average_accuracy: Option<f64>,
}

impl DbUserStats {
    /// Zeroed stats for a user with no history.
    pub fn new_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_study_date: None,
            total_cards_studied: 0,
            total_study_minutes: 0,
            cards_new: 0,
            cards_learning: 0,
            cards_young: 0,
            cards_mature: 0,
            cards_mastered: 0,
            average_accuracy: None,
        }
    }

    /// Counter for one mastery tier.
    pub fn tier_counter_mut(&mut self, tier: MasteryLevel) -> &mut i32 {
        match tier {
            MasteryLevel::New => &mut self.cards_new,
            MasteryLevel::Learning => &mut self.cards_learning,
            MasteryLevel::Young => &mut self.cards_young,
            MasteryLevel::Mature => &mut self.cards_mature,
            MasteryLevel::Mastered => &mut self.cards_mastered,
        }
    }
}

/// Immutable review record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCardReview {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub previous_interval_days: i32,
    pub new_interval_days: i32,
    pub previous_ease_factor: f64,
    pub new_ease_factor: f64,
    pub time_spent_seconds: Option<i32>,
    pub due_date: NaiveDate,
    pub session_id: Option<Uuid>,
    pub reviewed_at: DateTime<Utc>,
}

/// Card joined with its optional scheduling state, as read by the queue builder
#[derive(Debug, Clone)]
pub struct StudyCandidate {
    pub card: DbCard,
    pub state: Option<DbCardState>,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueQuery {
    pub limit: Option<i32>,
    pub include_new: Option<bool>,
    pub new_cards_limit: Option<i32>,
}

/// One entry of the study queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCard {
    pub card_id: Uuid,
    pub question: String,
    pub answer: String,
    pub explanation: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: i32,
    pub interval_days: i32,
    pub ease_factor: f64,
    pub review_count: i32,
    pub mastery_level: MasteryLevel,
    pub next_intervals: IntervalPreview,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueResponse {
    pub cards: Vec<QueueCard>,
    pub total_due: usize,
    pub new_cards: usize,
    pub review_cards: usize,
    pub overdue_cards: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub card_id: Uuid,
    pub rating: i32,
    pub time_spent_seconds: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub interval_days: i32,
    pub ease_factor: f64,
    pub due_date: NaiveDate,
    pub mastery_level: MasteryLevel,
    pub cards_remaining: i64,
}

/// Session snapshot returned by the session endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub date: NaiveDate,
    pub cards_studied: i32,
    pub cards_again: i32,
    pub cards_hard: i32,
    pub cards_good: i32,
    pub cards_easy: i32,
    pub time_spent_minutes: i32,
    pub pomodoro_sessions: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<DbStudySession> for SessionSnapshot {
    fn from(session: DbStudySession) -> Self {
        Self {
            date: session.date,
            cards_studied: session.cards_studied,
            cards_again: session.cards_again,
            cards_hard: session.cards_hard,
            cards_good: session.cards_good,
            cards_easy: session.cards_easy,
            time_spent_minutes: session.time_spent_minutes,
            pomodoro_sessions: session.pomodoro_sessions,
            start_time: session.start_time,
            end_time: session.end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodaySessionResponse {
    pub session: Option<SessionSnapshot>,
}
