//! In-memory store used by service unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    DbCard, DbCardReview, DbCardState, DbStudySession, DbUserStats, StudyCandidate,
};

use super::store::StudyStore;

/// Map-backed store. Candidate iteration follows card insertion order, so
/// queue results are reproducible.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub cards: Vec<DbCard>,
    pub states: HashMap<Uuid, DbCardState>,
    pub sessions: Vec<DbStudySession>,
    pub stats: HashMap<Uuid, DbUserStats>,
    pub reviews: Vec<DbCardReview>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_card(&mut self, card: DbCard) {
        self.cards.push(card);
    }

    pub fn insert_state(&mut self, state: DbCardState) {
        self.states.insert(state.card_id, state);
    }

    fn is_due_or_new(state: Option<&DbCardState>, today: NaiveDate) -> bool {
        match state {
            None => true,
            Some(s) if s.total_reviews == 0 => true,
            Some(s) => match s.due_date {
                None => true,
                Some(due) => due <= today,
            },
        }
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn find_card(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>> {
        Ok(self
            .cards
            .iter()
            .find(|c| c.id == card_id && c.user_id == user_id && c.deleted_at.is_none())
            .cloned())
    }

    async fn card_state(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCardState>> {
        Ok(self
            .states
            .get(&card_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn upsert_card_state(&mut self, state: &DbCardState) -> Result<()> {
        self.states.insert(state.card_id, state.clone());
        Ok(())
    }

    async fn append_review(&mut self, review: &DbCardReview) -> Result<()> {
        self.reviews.push(review.clone());
        Ok(())
    }

    async fn session_on(
        &mut self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DbStudySession>> {
        Ok(self
            .sessions
            .iter()
            .find(|s| s.user_id == user_id && s.date == date)
            .cloned())
    }

    async fn upsert_session(&mut self, session: &DbStudySession) -> Result<()> {
        match self
            .sessions
            .iter_mut()
            .find(|s| s.user_id == session.user_id && s.date == session.date)
        {
            Some(existing) => *existing = session.clone(),
            None => self.sessions.push(session.clone()),
        }
        Ok(())
    }

    async fn user_stats(&mut self, user_id: Uuid) -> Result<Option<DbUserStats>> {
        Ok(self.stats.get(&user_id).cloned())
    }

    async fn upsert_user_stats(&mut self, stats: &DbUserStats) -> Result<()> {
        self.stats.insert(stats.user_id, stats.clone());
        Ok(())
    }

    async fn study_candidates(
        &mut self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<StudyCandidate>> {
        Ok(self
            .cards
            .iter()
            .filter(|c| c.user_id == user_id && c.status == "active" && c.deleted_at.is_none())
            .filter(|c| Self::is_due_or_new(self.states.get(&c.id), today))
            .map(|c| StudyCandidate {
                card: c.clone(),
                state: self.states.get(&c.id).cloned(),
            })
            .collect())
    }

    async fn count_due_or_new(&mut self, user_id: Uuid, today: NaiveDate) -> Result<i64> {
        Ok(self
            .cards
            .iter()
            .filter(|c| c.user_id == user_id && c.status == "active" && c.deleted_at.is_none())
            .filter(|c| Self::is_due_or_new(self.states.get(&c.id), today))
            .count() as i64)
    }
}
