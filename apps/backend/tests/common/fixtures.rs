//! Test fixtures and factory functions for creating test data.

use chrono::NaiveDate;
use uuid::Uuid;

use studydeck_backend::db::Database;
use studydeck_backend::models::SubmitReviewRequest;

/// Insert an active card and return its id.
pub async fn insert_card(db: &Database, user_id: Uuid, question: &str) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO cards (user_id, question, answer)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(question)
    .bind(format!("answer to {}", question))
    .fetch_one(db.pool())
    .await
    .expect("Failed to insert test card")
}

/// Insert a reviewed card state with the given scheduling fields.
pub async fn insert_card_state(
    db: &Database,
    card_id: Uuid,
    user_id: Uuid,
    due_date: NaiveDate,
    interval_days: i32,
    failed_reviews: i32,
) {
    let total = failed_reviews + 1;
    sqlx::query(
        r#"
        INSERT INTO card_states (card_id, user_id, total_reviews, successful_reviews,
                                 failed_reviews, current_interval_days, ease_factor,
                                 due_date, mastery_level)
        VALUES ($1, $2, $3, $4, $5, $6, 2.5, $7, 'young')
        "#,
    )
    .bind(card_id)
    .bind(user_id)
    .bind(total)
    .bind(total - failed_reviews)
    .bind(failed_reviews)
    .bind(interval_days)
    .bind(due_date)
    .execute(db.pool())
    .await
    .expect("Failed to insert test card state");
}

/// Create a review submission payload.
pub fn submit_review_request(card_id: Uuid, rating: i32) -> SubmitReviewRequest {
    SubmitReviewRequest {
        card_id,
        rating,
        time_spent_seconds: Some(12),
    }
}
