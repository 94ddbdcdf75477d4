//! PostgreSQL database operations

pub mod memory;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

pub use store::StudyStore;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction wrapped in the store interface.
    pub async fn begin(&self) -> Result<PgStore> {
        let tx = self.pool.begin().await?;
        Ok(PgStore { tx })
    }

    /// Today's session for a user, outside any transaction.
    pub async fn session_today(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DbStudySession>> {
        let session = sqlx::query_as::<_, DbStudySession>(
            r#"
            SELECT id, user_id, date, cards_studied, cards_again, cards_hard,
                   cards_good, cards_easy, time_spent_minutes, pomodoro_sessions,
                   start_time, end_time
            FROM study_sessions
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Close today's session by stamping its end time.
    pub async fn end_session(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<DbStudySession>> {
        let session = sqlx::query_as::<_, DbStudySession>(
            r#"
            UPDATE study_sessions
            SET end_time = $3, updated_at = NOW()
            WHERE user_id = $1 AND date = $2
            RETURNING id, user_id, date, cards_studied, cards_again, cards_hard,
                      cards_good, cards_easy, time_spent_minutes, pomodoro_sessions,
                      start_time, end_time
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }
}

/// Store interface over one Postgres transaction.
///
/// Reads of card_states, study_sessions, and user_stats take `FOR UPDATE`
/// row locks so concurrent commits for the same user serialize. Lock order
/// is card state, then session, then user stats.
pub struct PgStore {
    tx: Transaction<'static, Postgres>,
}

impl PgStore {
    /// Commit the transaction. Dropping the store without committing rolls
    /// everything back.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Flat row for the card/state join used by the queue builder.
#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: Uuid,
    user_id: Uuid,
    question: String,
    answer: String,
    explanation: Option<String>,
    tags: Vec<String>,
    difficulty: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    state_card_id: Option<Uuid>,
    total_reviews: Option<i32>,
    successful_reviews: Option<i32>,
    failed_reviews: Option<i32>,
    current_interval_days: Option<i32>,
    ease_factor: Option<f64>,
    due_date: Option<NaiveDate>,
    average_rating: Option<f64>,
    average_time_seconds: Option<i32>,
    mastery_level: Option<String>,
    first_reviewed_at: Option<DateTime<Utc>>,
    last_reviewed_at: Option<DateTime<Utc>>,
}

impl CandidateRow {
    fn into_candidate(self) -> StudyCandidate {
        let state = match (
            self.state_card_id,
            self.total_reviews,
            self.successful_reviews,
            self.failed_reviews,
            self.current_interval_days,
            self.ease_factor,
            self.mastery_level,
        ) {
            (
                Some(card_id),
                Some(total_reviews),
                Some(successful_reviews),
                Some(failed_reviews),
                Some(current_interval_days),
                Some(ease_factor),
                Some(mastery_level),
            ) => Some(DbCardState {
                card_id,
                user_id: self.user_id,
                total_reviews,
                successful_reviews,
                failed_reviews,
                current_interval_days,
                ease_factor,
                due_date: self.due_date,
                average_rating: self.average_rating,
                average_time_seconds: self.average_time_seconds,
                mastery_level,
                first_reviewed_at: self.first_reviewed_at,
                last_reviewed_at: self.last_reviewed_at,
            }),
            _ => None,
        };

        StudyCandidate {
            card: DbCard {
                id: self.id,
                user_id: self.user_id,
                question: self.question,
                answer: self.answer,
                explanation: self.explanation,
                tags: self.tags,
                difficulty: self.difficulty,
                status: self.status,
                created_at: self.created_at,
                updated_at: self.updated_at,
                deleted_at: self.deleted_at,
            },
            state,
        }
    }
}

#[async_trait]
impl StudyStore for PgStore {
    async fn find_card(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, user_id, question, answer, explanation, tags, difficulty,
                   status, created_at, updated_at, deleted_at
            FROM cards
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(card)
    }

    async fn card_state(&mut self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCardState>> {
        let state = sqlx::query_as::<_, DbCardState>(
            r#"
            SELECT card_id, user_id, total_reviews, successful_reviews, failed_reviews,
                   current_interval_days, ease_factor, due_date, average_rating,
                   average_time_seconds, mastery_level, first_reviewed_at, last_reviewed_at
            FROM card_states
            WHERE card_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(state)
    }

    async fn upsert_card_state(&mut self, state: &DbCardState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO card_states (card_id, user_id, total_reviews, successful_reviews,
                                     failed_reviews, current_interval_days, ease_factor,
                                     due_date, average_rating, average_time_seconds,
                                     mastery_level, first_reviewed_at, last_reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (card_id) DO UPDATE SET
                total_reviews = EXCLUDED.total_reviews,
                successful_reviews = EXCLUDED.successful_reviews,
                failed_reviews = EXCLUDED.failed_reviews,
                current_interval_days = EXCLUDED.current_interval_days,
                ease_factor = EXCLUDED.ease_factor,
                due_date = EXCLUDED.due_date,
                average_rating = EXCLUDED.average_rating,
                average_time_seconds = EXCLUDED.average_time_seconds,
                mastery_level = EXCLUDED.mastery_level,
                first_reviewed_at = EXCLUDED.first_reviewed_at,
                last_reviewed_at = EXCLUDED.last_reviewed_at,
                updated_at = NOW()
            "#,
        )
        .bind(state.card_id)
        .bind(state.user_id)
        .bind(state.total_reviews)
        .bind(state.successful_reviews)
        .bind(state.failed_reviews)
        .bind(state.current_interval_days)
        .bind(state.ease_factor)
        .bind(state.due_date)
        .bind(state.average_rating)
        .bind(state.average_time_seconds)
        .bind(&state.mastery_level)
        .bind(state.first_reviewed_at)
        .bind(state.last_reviewed_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn append_review(&mut self, review: &DbCardReview) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO card_reviews (id, card_id, user_id, rating, previous_interval_days,
                                      new_interval_days, previous_ease_factor, new_ease_factor,
                                      time_spent_seconds, due_date, session_id, reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(review.id)
        .bind(review.card_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(review.previous_interval_days)
        .bind(review.new_interval_days)
        .bind(review.previous_ease_factor)
        .bind(review.new_ease_factor)
        .bind(review.time_spent_seconds)
        .bind(review.due_date)
        .bind(review.session_id)
        .bind(review.reviewed_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn session_on(
        &mut self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DbStudySession>> {
        let session = sqlx::query_as::<_, DbStudySession>(
            r#"
            SELECT id, user_id, date, cards_studied, cards_again, cards_hard,
                   cards_good, cards_easy, time_spent_minutes, pomodoro_sessions,
                   start_time, end_time
            FROM study_sessions
            WHERE user_id = $1 AND date = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(session)
    }

    async fn upsert_session(&mut self, session: &DbStudySession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO study_sessions (id, user_id, date, cards_studied, cards_again,
                                        cards_hard, cards_good, cards_easy,
                                        time_spent_minutes, pomodoro_sessions,
                                        start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id, date) DO UPDATE SET
                cards_studied = EXCLUDED.cards_studied,
                cards_again = EXCLUDED.cards_again,
                cards_hard = EXCLUDED.cards_hard,
                cards_good = EXCLUDED.cards_good,
                cards_easy = EXCLUDED.cards_easy,
                time_spent_minutes = EXCLUDED.time_spent_minutes,
                pomodoro_sessions = EXCLUDED.pomodoro_sessions,
                end_time = EXCLUDED.end_time,
                updated_at = NOW()
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.date)
        .bind(session.cards_studied)
        .bind(session.cards_again)
        .bind(session.cards_hard)
        .bind(session.cards_good)
        .bind(session.cards_easy)
        .bind(session.time_spent_minutes)
        .bind(session.pomodoro_sessions)
        .bind(session.start_time)
        .bind(session.end_time)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn user_stats(&mut self, user_id: Uuid) -> Result<Option<DbUserStats>> {
        let stats = sqlx::query_as::<_, DbUserStats>(
            r#"
            SELECT user_id, current_streak, longest_streak, last_study_date,
                   total_cards_studied, total_study_minutes, cards_new, cards_learning,
                   cards_young, cards_mature, cards_mastered, average_accuracy
            FROM user_stats
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(stats)
    }

    async fn upsert_user_stats(&mut self, stats: &DbUserStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, current_streak, longest_streak, last_study_date,
                                    total_cards_studied, total_study_minutes, cards_new,
                                    cards_learning, cards_young, cards_mature, cards_mastered,
                                    average_accuracy)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_study_date = EXCLUDED.last_study_date,
                total_cards_studied = EXCLUDED.total_cards_studied,
                total_study_minutes = EXCLUDED.total_study_minutes,
                cards_new = EXCLUDED.cards_new,
                cards_learning = EXCLUDED.cards_learning,
                cards_young = EXCLUDED.cards_young,
                cards_mature = EXCLUDED.cards_mature,
                cards_mastered = EXCLUDED.cards_mastered,
                average_accuracy = EXCLUDED.average_accuracy,
                updated_at = NOW()
            "#,
        )
        .bind(stats.user_id)
        .bind(stats.current_streak)
        .bind(stats.longest_streak)
        .bind(stats.last_study_date)
        .bind(stats.total_cards_studied)
        .bind(stats.total_study_minutes)
        .bind(stats.cards_new)
        .bind(stats.cards_learning)
        .bind(stats.cards_young)
        .bind(stats.cards_mature)
        .bind(stats.cards_mastered)
        .bind(stats.average_accuracy)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn study_candidates(
        &mut self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<StudyCandidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT c.id, c.user_id, c.question, c.answer, c.explanation, c.tags,
                   c.difficulty, c.status, c.created_at, c.updated_at, c.deleted_at,
                   cs.card_id AS state_card_id, cs.total_reviews, cs.successful_reviews,
                   cs.failed_reviews, cs.current_interval_days, cs.ease_factor, cs.due_date,
                   cs.average_rating, cs.average_time_seconds, cs.mastery_level,
                   cs.first_reviewed_at, cs.last_reviewed_at
            FROM cards c
            LEFT JOIN card_states cs ON cs.card_id = c.id
            WHERE c.user_id = $1 AND c.status = 'active' AND c.deleted_at IS NULL
              AND (cs.card_id IS NULL OR cs.total_reviews = 0
                   OR cs.due_date IS NULL OR cs.due_date <= $2)
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(CandidateRow::into_candidate).collect())
    }

    async fn count_due_or_new(&mut self, user_id: Uuid, today: NaiveDate) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM cards c
            LEFT JOIN card_states cs ON cs.card_id = c.id
            WHERE c.user_id = $1 AND c.status = 'active' AND c.deleted_at IS NULL
              AND (cs.card_id IS NULL OR cs.total_reviews = 0
                   OR cs.due_date IS NULL OR cs.due_date <= $2)
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }
}
