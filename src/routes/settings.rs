use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::Result,
    middleware::auth::{actor_from_claims, Claims},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingPayload {
    pub value: bool,
}

// workflow_settings:update is not in the seeded catalog, so only accounts at
// or above the super-admin threshold pass this check.
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    params(
        ("key" = String, Path, description = "Workflow setting key")
    ),
    responses(
        (status = 200, description = "Setting updated"),
        (status = 400, description = "Unknown setting key"),
        (status = 403, description = "Super-admin privilege required")
    )
)]
#[axum::debug_handler]
pub async fn update_setting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(key): Path<String>,
    Json(payload): Json<UpdateSettingPayload>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_claims(&claims)?;
    state
        .permission_service
        .require(actor.id, "workflow_settings", "update")
        .await?;

    state.settings_service.set_flag(&key, payload.value).await?;
    Ok((StatusCode::OK, Json(json!({ "key": key, "value": payload.value }))))
}
