//! Study queue construction.
//!
//! Reads the user's card states, partitions them into overdue / due-today /
//! new, and orders each partition with a fixed multi-key priority. The
//! builder is read-only; new cards get no state row until the first review
//! is submitted.

use std::cmp::Ordering;

use chrono::NaiveDate;
use uuid::Uuid;

use srs_core::{MasteryLevel, Scheduler};

use crate::db::StudyStore;
use crate::error::{ApiError, Result};
use crate::models::{
    DbCard, DbCardState, QueueCard, StudyCandidate, StudyQueueQuery, StudyQueueResponse,
};

pub const MAX_LIMIT: i32 = 200;
pub const MAX_NEW_CARDS_LIMIT: i32 = 50;
const DEFAULT_LIMIT: i32 = 20;
const DEFAULT_NEW_CARDS_LIMIT: i32 = 10;

/// Ranking value for due-today cards that have never been rated.
const UNRATED_AVERAGE_RATING: f64 = 2.0;

/// Validated queue request parameters.
#[derive(Debug, Clone, Copy)]
pub struct QueueParams {
    pub limit: usize,
    pub include_new: bool,
    pub new_cards_limit: usize,
}

impl QueueParams {
    pub fn from_query(query: &StudyQueueQuery) -> Result<Self> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }

        let new_cards_limit = query.new_cards_limit.unwrap_or(DEFAULT_NEW_CARDS_LIMIT);
        if !(0..=MAX_NEW_CARDS_LIMIT).contains(&new_cards_limit) {
            return Err(ApiError::Validation(format!(
                "new_cards_limit must be between 0 and {}, got {}",
                MAX_NEW_CARDS_LIMIT, new_cards_limit
            )));
        }

        Ok(Self {
            limit: limit as usize,
            include_new: query.include_new.unwrap_or(true),
            new_cards_limit: new_cards_limit as usize,
        })
    }
}

/// Build today's prioritized study queue for a user.
pub async fn build_queue<S: StudyStore + Send>(
    store: &mut S,
    scheduler: &Scheduler,
    user_id: Uuid,
    params: QueueParams,
    today: NaiveDate,
) -> Result<StudyQueueResponse> {
    let candidates = store.study_candidates(user_id, today).await?;

    let mut new_cards: Vec<(DbCard, Option<DbCardState>)> = Vec::new();
    let mut overdue: Vec<(DbCard, DbCardState)> = Vec::new();
    let mut due_today: Vec<(DbCard, DbCardState)> = Vec::new();

    for StudyCandidate { card, state } in candidates {
        match state {
            Some(state) if state.total_reviews >= 1 => match state.due_date {
                Some(due) if due < today => overdue.push((card, state)),
                Some(due) if due == today => due_today.push((card, state)),
                Some(_) => {}
                None => new_cards.push((card, Some(state))),
            },
            Some(state) => new_cards.push((card, Some(state))),
            None => new_cards.push((card, None)),
        }
    }

    // Oldest debts first: most-failed, then longest overdue, then hardest.
    overdue.sort_by(|(card_a, a), (card_b, b)| {
        b.failed_reviews
            .cmp(&a.failed_reviews)
            .then_with(|| a.due_date.cmp(&b.due_date))
            .then_with(|| float_ascending(a.ease_factor, b.ease_factor))
            .then_with(|| card_a.id.cmp(&card_b.id))
    });

    due_today.sort_by(|(card_a, a), (card_b, b)| {
        b.failed_reviews
            .cmp(&a.failed_reviews)
            .then_with(|| float_ascending(a.ease_factor, b.ease_factor))
            .then_with(|| {
                float_ascending(
                    a.average_rating.unwrap_or(UNRATED_AVERAGE_RATING),
                    b.average_rating.unwrap_or(UNRATED_AVERAGE_RATING),
                )
            })
            .then_with(|| card_a.id.cmp(&card_b.id))
    });

    let overdue_count = overdue.len();
    let review_count = due_today.len();
    let new_count = new_cards.len();
    let total_due = overdue_count + review_count + new_count;

    let mut cards = Vec::new();
    for (card, state) in overdue.into_iter().chain(due_today) {
        if cards.len() >= params.limit {
            break;
        }
        cards.push(emit_card(scheduler, card, Some(&state), today));
    }

    if params.include_new {
        let mut taken = 0;
        for (card, state) in new_cards {
            if cards.len() >= params.limit || taken >= params.new_cards_limit {
                break;
            }
            cards.push(emit_card(scheduler, card, state.as_ref(), today));
            taken += 1;
        }
    }

    Ok(StudyQueueResponse {
        cards,
        total_due,
        new_cards: new_count,
        review_cards: review_count,
        overdue_cards: overdue_count,
    })
}

fn float_ascending(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn emit_card(
    scheduler: &Scheduler,
    card: DbCard,
    state: Option<&DbCardState>,
    today: NaiveDate,
) -> QueueCard {
    let (interval, ease, reviews) = state
        .map(|s| (s.current_interval_days, s.ease_factor, s.total_reviews))
        .unwrap_or((0, 2.5, 0));

    QueueCard {
        card_id: card.id,
        question: card.question,
        answer: card.answer,
        explanation: card.explanation,
        tags: card.tags,
        difficulty: card.difficulty,
        interval_days: interval,
        ease_factor: ease,
        review_count: reviews,
        mastery_level: MasteryLevel::classify(interval, reviews),
        next_intervals: scheduler.next_intervals(interval, ease, reviews, today),
    }
}
