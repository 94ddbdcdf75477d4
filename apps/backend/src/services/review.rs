//! Review commit: apply one rating to a card and every coupled aggregate.
//!
//! All writes happen through a single [`StudyStore`], which the caller wraps
//! in one transaction. A failure anywhere rolls the whole submission back.
//! The operation is not idempotent on rating; deduplication is the caller's
//! concern.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use srs_core::{Rating, Scheduler};

use crate::db::StudyStore;
use crate::error::{ApiError, Result};
use crate::models::{
    DbCardReview, DbCardState, DbStudySession, DbUserStats, SubmitReviewRequest,
    SubmitReviewResponse,
};

/// Apply a rating: reschedule the card, append the review record, and roll
/// the daily session and lifetime aggregates forward.
pub async fn submit_review<S: StudyStore + Send>(
    store: &mut S,
    scheduler: &Scheduler,
    user_id: Uuid,
    request: &SubmitReviewRequest,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<SubmitReviewResponse> {
    let rating = Rating::from_value(request.rating).ok_or_else(|| {
        ApiError::Validation(format!(
            "rating must be between 1 and 4, got {}",
            request.rating
        ))
    })?;

    if let Some(time) = request.time_spent_seconds {
        if time < 0 {
            return Err(ApiError::Validation(
                "time_spent_seconds must be non-negative".to_string(),
            ));
        }
    }

    // Ownership is checked by scoping the lookup; a card owned by someone
    // else is indistinguishable from a missing one.
    let card = store
        .find_card(user_id, request.card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let mut state = store
        .card_state(user_id, card.id)
        .await?
        .unwrap_or_else(|| DbCardState::new_for(card.id, user_id));

    if !(scheduler.minimum_ease..=scheduler.maximum_ease).contains(&state.ease_factor) {
        return Err(ApiError::Internal(format!(
            "stored ease factor {} out of range for card {}",
            state.ease_factor, card.id
        )));
    }

    let prev_interval = state.current_interval_days;
    let prev_ease = state.ease_factor;
    let prev_tier = state.mastery();

    let outcome = scheduler.next_review(rating, prev_interval, prev_ease, state.total_reviews, today);

    state.current_interval_days = outcome.interval_days;
    state.ease_factor = outcome.ease_factor;
    state.due_date = Some(outcome.due_date);
    state.total_reviews += 1;
    if rating.is_successful() {
        state.successful_reviews += 1;
    } else {
        state.failed_reviews += 1;
    }
    if state.first_reviewed_at.is_none() {
        state.first_reviewed_at = Some(now);
    }
    state.last_reviewed_at = Some(now);

    let n = state.total_reviews as f64;
    state.average_rating = Some(match state.average_rating {
        None => rating.to_value() as f64,
        Some(avg) => (avg * (n - 1.0) + rating.to_value() as f64) / n,
    });
    if let Some(time) = request.time_spent_seconds {
        state.average_time_seconds = Some(match state.average_time_seconds {
            None => time,
            Some(avg) => ((avg as f64 * (n - 1.0) + time as f64) / n) as i32,
        });
    }

    let new_tier = state.mastery();
    state.mastery_level = new_tier.as_str().to_string();
    store.upsert_card_state(&state).await?;

    let mut session = store
        .session_on(user_id, today)
        .await?
        .unwrap_or_else(|| DbStudySession::new_for(user_id, today, now));
    let minutes = request.time_spent_seconds.unwrap_or(0) / 60;
    session.cards_studied += 1;
    *session.rating_counter_mut(rating) += 1;
    session.time_spent_minutes += minutes;
    store.upsert_session(&session).await?;

    let review = DbCardReview {
        id: Uuid::new_v4(),
        card_id: card.id,
        user_id,
        rating: rating.to_value(),
        previous_interval_days: prev_interval,
        new_interval_days: outcome.interval_days,
        previous_ease_factor: prev_ease,
        new_ease_factor: outcome.ease_factor,
        time_spent_seconds: request.time_spent_seconds,
        due_date: outcome.due_date,
        session_id: Some(session.id),
        reviewed_at: now,
    };
    store.append_review(&review).await?;

    let mut stats = store
        .user_stats(user_id)
        .await?
        .unwrap_or_else(|| DbUserStats::new_for(user_id));
    stats.total_cards_studied += 1;
    stats.total_study_minutes += minutes;

    let yesterday = today.pred_opt();
    match stats.last_study_date {
        Some(last) if last == today => {}
        Some(last) if Some(last) == yesterday => stats.current_streak += 1,
        _ => stats.current_streak = 1,
    }
    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
    stats.last_study_date = Some(today);

    let m = stats.total_cards_studied as f64;
    let accuracy = if rating.is_successful() { 100.0 } else { 0.0 };
    stats.average_accuracy = Some(match stats.average_accuracy {
        None => accuracy,
        Some(avg) => (avg * (m - 1.0) + accuracy) / m,
    });

    if new_tier != prev_tier {
        let previous = stats.tier_counter_mut(prev_tier);
        *previous = (*previous - 1).max(0);
        *stats.tier_counter_mut(new_tier) += 1;
    }
    store.upsert_user_stats(&stats).await?;

    let due_or_new = store.count_due_or_new(user_id, today).await?;
    let cards_remaining = (due_or_new - 1).max(0);

    Ok(SubmitReviewResponse {
        interval_days: outcome.interval_days,
        ease_factor: outcome.ease_factor,
        due_date: outcome.due_date,
        mastery_level: new_tier,
        cards_remaining,
    })
}
