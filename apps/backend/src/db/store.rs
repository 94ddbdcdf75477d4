//! Store capability set used by the review-commit and queue-builder services.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    DbCard, DbCardReview, DbCardState, DbStudySession, DbUserStats, StudyCandidate,
};

/// Transactional store operations the scheduling core depends on.
///
/// The one polymorphic boundary of the backend: implemented by the Postgres
/// transaction wrapper and by an in-memory map for service tests.
#[async_trait]
pub trait StudyStore {
    /// Card owned by the user and not soft-deleted.
    async fn find_card(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>>;

    /// Scheduling state for one card, locked for update where applicable.
    async fn card_state(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCardState>>;

    /// Insert or replace a card's scheduling state.
    async fn upsert_card_state(&mut self, state: &DbCardState) -> Result<()>;

    /// Append one immutable review record.
    async fn append_review(&mut self, review: &DbCardReview) -> Result<()>;

    /// Session aggregate for one day, locked for update where applicable.
    async fn session_on(&mut self, user_id: Uuid, date: NaiveDate)
        -> Result<Option<DbStudySession>>;

    /// Insert or replace a session aggregate.
    async fn upsert_session(&mut self, session: &DbStudySession) -> Result<()>;

    /// Lifetime aggregates, locked for update where applicable.
    async fn user_stats(&mut self, user_id: Uuid) -> Result<Option<DbUserStats>>;

    /// Insert or replace the lifetime aggregates.
    async fn upsert_user_stats(&mut self, stats: &DbUserStats) -> Result<()>;

    /// Active, non-deleted cards with their optional state, restricted to
    /// cards that are new or due on or before `today`. Iteration order is
    /// the store's insertion order and must be stable across calls.
    async fn study_candidates(
        &mut self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<StudyCandidate>>;

    /// Count of cards that are due on or before `today` or never reviewed.
    async fn count_due_or_new(&mut self, user_id: Uuid, today: NaiveDate) -> Result<i64>;
}
