//! OKR JSON Routes
//!
//! JSON counterparts of the page for scripts and tests.
//!
//! - GET /api/v1/okr - Current view state
//! - POST /api/v1/objectives - Create an objective
//! - POST /api/v1/key-results - Create a key result

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{KeyResultForm, ObjectiveForm};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::NewObjective;
use crate::view::ViewState;

/// GET /api/v1/okr
///
/// Mounts the view like the page does, but never waits for a running
/// operation.
pub async fn get_state(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewState>> {
    let Ok(mut view) = state.view.try_lock() else {
        return Ok(Json(state.current_state()));
    };

    let result = view.mount().await;
    view.take_notice();
    result?;
    Ok(Json(view.state().clone()))
}

/// POST /api/v1/objectives
pub async fn create_objective(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ObjectiveForm>,
) -> ApiResult<(StatusCode, Json<ViewState>)> {
    if NewObjective::from_input(&req.title, &req.owner).is_none() {
        return Err(ApiError::Validation("title must not be blank".to_string()));
    }

    let mut view = state
        .view
        .try_lock()
        .map_err(|_| ApiError::Busy("another operation is in progress".to_string()))?;

    let result = view.create_objective(&req.title, &req.owner).await;
    // The caller gets the error directly; don't show it again on the page
    view.take_notice();
    result?;

    Ok((StatusCode::CREATED, Json(view.state().clone())))
}

/// POST /api/v1/key-results
pub async fn create_key_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<KeyResultForm>,
) -> ApiResult<(StatusCode, Json<ViewState>)> {
    if req.objective_id.is_empty() {
        return Err(ApiError::Validation("objective_id is required".to_string()));
    }
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be blank".to_string()));
    }

    let mut view = state
        .view
        .try_lock()
        .map_err(|_| ApiError::Busy("another operation is in progress".to_string()))?;

    let result = view
        .create_key_result(&req.objective_id, &req.title, &req.target)
        .await;
    view.take_notice();
    result?;

    Ok((StatusCode::CREATED, Json(view.state().clone())))
}
