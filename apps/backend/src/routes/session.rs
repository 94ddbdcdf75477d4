//! Session endpoints

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::{SessionSnapshot, TodaySessionResponse};
use crate::routes::identity::AuthenticatedUser;
use crate::AppState;

/// GET /api/study/session/today
pub async fn today(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<TodaySessionResponse>> {
    let today = Utc::now().date_naive();
    let session = state.db.session_today(auth.user_id, today).await?;

    Ok(Json(TodaySessionResponse {
        session: session.map(SessionSnapshot::from),
    }))
}

/// POST /api/study/session/end
pub async fn end(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SessionSnapshot>> {
    let now = Utc::now();
    let session = state
        .db
        .end_session(auth.user_id, now.date_naive(), now)
        .await?
        .ok_or_else(|| ApiError::NotFound("No study session today".to_string()))?;

    Ok(Json(SessionSnapshot::from(session)))
}
