use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::approval_dto::{
        ApprovalDecisionResponse, ApproveHirePayload, BulkStatusPayload, BulkStatusResponse,
        PendingListResponse, RejectHirePayload,
    },
    error::{Error, Result},
    middleware::auth::{actor_from_claims, Claims},
    models::application::ApplicationStatus,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/hire-approvals/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Hire approval request ID")
    ),
    request_body = ApproveHirePayload,
    responses(
        (status = 200, description = "Request approved, application hired", body = Json<ApprovalDecisionResponse>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request was already approved or rejected")
    )
)]
#[axum::debug_handler]
pub async fn approve_hire(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveHirePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reviewer = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(reviewer.id, "hire_approvals", "review")
        .await?;

    let (request, application) = state
        .approval_service
        .approve(id, &reviewer, payload.notes)
        .await?;

    Ok(Json(ApprovalDecisionResponse {
        request: request.into(),
        application: application.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/hire-approvals/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Hire approval request ID")
    ),
    request_body = RejectHirePayload,
    responses(
        (status = 200, description = "Request rejected", body = Json<ApprovalDecisionResponse>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request was already approved or rejected")
    )
)]
#[axum::debug_handler]
pub async fn reject_hire(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectHirePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reviewer = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(reviewer.id, "hire_approvals", "review")
        .await?;

    let new_status = payload
        .new_status
        .as_deref()
        .map(|s| s.parse::<ApplicationStatus>())
        .transpose()
        .map_err(Error::BadRequest)?;

    let (request, application) = state
        .approval_service
        .reject(id, &reviewer, payload.notes, new_status)
        .await?;

    Ok(Json(ApprovalDecisionResponse {
        request: request.into(),
        application: application.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/hire-approvals/pending",
    responses(
        (status = 200, description = "Pending requests, most recent first", body = Json<PendingListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(actor.id, "hire_approvals", "read")
        .await?;

    let total = state.approval_service.get_pending_count().await?;
    let requests = state.approval_service.list_pending().await?;

    Ok(Json(PendingListResponse {
        total,
        requests: requests.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/hire-approvals/bulk-status",
    request_body = BulkStatusPayload,
    responses(
        (status = 200, description = "Pending status per requested application id", body = Json<BulkStatusResponse>)
    )
)]
#[axum::debug_handler]
pub async fn bulk_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(actor.id, "hire_approvals", "read")
        .await?;

    let statuses = state
        .approval_service
        .bulk_status(&payload.application_ids)
        .await?;

    Ok(Json(BulkStatusResponse { statuses }))
}
