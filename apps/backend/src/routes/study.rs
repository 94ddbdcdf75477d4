//! Study endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::{StudyQueueQuery, StudyQueueResponse, SubmitReviewRequest, SubmitReviewResponse};
use crate::routes::identity::AuthenticatedUser;
use crate::services::queue::{self, QueueParams};
use crate::services::review;
use crate::AppState;

/// GET /api/study/queue
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<StudyQueueQuery>,
) -> Result<Json<StudyQueueResponse>> {
    let params = QueueParams::from_query(&query)?;
    let today = Utc::now().date_naive();

    let mut store = state.db.begin().await?;
    let response =
        queue::build_queue(&mut store, &state.scheduler, auth.user_id, params, today).await?;
    store.commit().await?;

    Ok(Json(response))
}

/// POST /api/study/review
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let now = Utc::now();
    let today = now.date_naive();

    let mut store = state.db.begin().await?;
    let response = review::submit_review(
        &mut store,
        &state.scheduler,
        auth.user_id,
        &payload,
        now,
        today,
    )
    .await?;
    store.commit().await?;

    Ok(Json(response))
}
