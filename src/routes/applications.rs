use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::transition_dto::{TransitionResponse, UpdateStatusPayload},
    error::{Error, Result},
    middleware::auth::{actor_from_claims, Claims},
    models::application::ApplicationStatus,
    services::transition_service::TransitionOutcome,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<TransitionResponse>),
        (status = 202, description = "Hire approval request created; status unchanged"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "A hire approval request is already pending"),
        (status = 412, description = "Completed interviews are missing feedback")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(actor.id, "applications", "change_status")
        .await?;

    let new_status: ApplicationStatus = payload
        .status
        .parse()
        .map_err(|e: String| Error::BadRequest(e))?;

    // Parking a hire in the approval ledger is a second capability on top of
    // plain status changes. Flags are read per call, so consult them here.
    if new_status == ApplicationStatus::Hired {
        let flags = state.settings_service.flags().await?;
        if flags.require_approval_for_hire {
            state
                .permission_service
                .require(actor.id, "hire_approvals", "request")
                .await?;
        }
    }

    let outcome = state
        .transition_service
        .request_transition(id, new_status, &actor, payload.notes)
        .await?;

    match outcome {
        TransitionOutcome::Applied { application } => {
            let body = TransitionResponse {
                status: application.status.clone(),
                requires_approval: false,
                application: Some(application.into()),
                request: None,
            };
            Ok((StatusCode::OK, Json(body)))
        }
        TransitionOutcome::ApprovalRequested { request } => {
            let body = TransitionResponse {
                status: request.previous_status.clone(),
                requires_approval: true,
                application: None,
                request: Some(request.into()),
            };
            Ok((StatusCode::ACCEPTED, Json(body)))
        }
    }
}
