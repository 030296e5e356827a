//! Page Routes
//!
//! The OKR page and its two HTML forms.
//!
//! - GET / - Render the page (first show runs the initial load)
//! - POST /objectives - Create an objective, then redirect to the page
//! - POST /key-results - Create a key result, then redirect to the page

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};
use std::sync::Arc;

use crate::api::dto::{KeyResultForm, ObjectiveForm, PageQuery};
use crate::api::render;
use crate::api::state::AppState;
use crate::view::{Notice, NoticeKind};

/// Shown when a submission arrives while another operation is running
pub const BUSY_MESSAGE: &str = "Đang xử lý, vui lòng thử lại";

const BUSY_REDIRECT: &str = "/?busy=1";

fn busy_notice() -> Notice {
    Notice {
        kind: NoticeKind::Validation,
        message: BUSY_MESSAGE.to_string(),
    }
}

/// GET /
///
/// While another request holds the view, the page is rendered from the last
/// published state, which shows the loading phase.
pub async fn show_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let busy = query.busy.is_some().then(busy_notice);

    let Ok(mut view) = state.view.try_lock() else {
        return Html(render::page(&state.current_state(), busy.as_ref()));
    };

    if let Err(e) = view.mount().await {
        tracing::debug!(error = %e, "Initial load did not complete");
    }
    let notice = view.take_notice().or(busy);
    Html(render::page(view.state(), notice.as_ref()))
}

/// POST /objectives
pub async fn submit_objective(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ObjectiveForm>,
) -> Redirect {
    let Ok(mut view) = state.view.try_lock() else {
        tracing::warn!(title = %form.title, "View busy, objective submission turned away");
        return Redirect::to(BUSY_REDIRECT);
    };

    if let Err(e) = view.create_objective(&form.title, &form.owner).await {
        tracing::debug!(error = %e, "Objective not created");
    }
    Redirect::to("/")
}

/// POST /key-results
pub async fn submit_key_result(
    State(state): State<Arc<AppState>>,
    Form(form): Form<KeyResultForm>,
) -> Redirect {
    let Ok(mut view) = state.view.try_lock() else {
        tracing::warn!(
            objective_id = %form.objective_id,
            title = %form.title,
            "View busy, key result submission turned away"
        );
        return Redirect::to(BUSY_REDIRECT);
    };

    if let Err(e) = view
        .create_key_result(&form.objective_id, &form.title, &form.target)
        .await
    {
        tracing::debug!(error = %e, "Key result not created");
    }
    Redirect::to("/")
}
