//! Axum route handlers for the Optimization API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::subscription::OptimizationCheck;
use crate::models::user::AuthUser;
use crate::state::AppState;
use crate::workflow::gaps::MissingSectionsInput;
use crate::workflow::session::{OptimizeRequest, ProjectChoice, WorkflowView};

/// A view whose run ended on a rejected session is sent with 401 so clients
/// route the user to sign-in; the body still carries the workflow id for retry.
fn view_response(view: WorkflowView) -> Response {
    let status = if view.ui.sign_in_required {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    };
    (status, Json(view)).into_response()
}

/// POST /api/v1/optimizations
///
/// Starts a workflow and runs it until it needs the client or finishes.
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<OptimizeRequest>,
) -> Result<Response, AppError> {
    let view = state.controller.submit(&user, request).await?;
    Ok(view_response(view))
}

/// GET /api/v1/optimizations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.controller.get(&user, id).await?;
    Ok(view_response(session.view()))
}

/// POST /api/v1/optimizations/:id/missing-sections
pub async fn handle_missing_sections(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<MissingSectionsInput>,
) -> Result<Response, AppError> {
    let view = state
        .controller
        .provide_missing_sections(&user, id, input)
        .await?;
    Ok(view_response(view))
}

/// POST /api/v1/optimizations/:id/projects
pub async fn handle_project_choice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(choice): Json<ProjectChoice>,
) -> Result<Response, AppError> {
    let view = state.controller.choose_projects(&user, id, choice).await?;
    Ok(view_response(view))
}

/// POST /api/v1/optimizations/:id/retry
pub async fn handle_retry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let view = state.controller.retry(&user, id).await?;
    Ok(view_response(view))
}

/// GET /api/v1/optimizations/:id/export
///
/// Plain-text resume, available once the workflow has completed.
pub async fn handle_export(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let text = state.controller.export(&user, id).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// GET /api/v1/subscription
pub async fn handle_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<OptimizationCheck>, AppError> {
    let check = state.entitlements.can_optimize(user.user_id).await?;
    Ok(Json(check))
}
