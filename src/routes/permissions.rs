use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::permission_dto::{
        EffectivePermissionsResponse, PermissionCheckQuery, PermissionCheckResponse,
        PermissionView,
    },
    error::Result,
    middleware::auth::{actor_from_claims, Claims},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/permissions/check",
    params(
        ("user_id" = Uuid, Query, description = "User to check"),
        ("resource" = String, Query, description = "Resource name"),
        ("action" = String, Query, description = "Action name")
    ),
    responses(
        (status = 200, description = "Whether the user holds the permission", body = Json<PermissionCheckResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn check_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_claims(&claims)?;
    // Checking someone else's permissions needs users:read; self-checks don't.
    if actor.id != query.user_id {
        state
            .permission_service
            .require(actor.id, "users", "read")
            .await?;
    }

    let allowed = state
        .permission_service
        .has_permission(query.user_id, &query.resource, &query.action)
        .await?;
    Ok(Json(PermissionCheckResponse { allowed }))
}

#[utoipa::path(
    get,
    path = "/api/permissions/effective/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User to enumerate")
    ),
    responses(
        (status = 200, description = "The user's effective permission set", body = Json<EffectivePermissionsResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn effective_permissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_claims(&claims)?;
    if actor.id != user_id {
        state
            .permission_service
            .require(actor.id, "users", "read")
            .await?;
    }

    let set = state.permission_service.effective_permissions(user_id).await?;
    let mut permissions: Vec<PermissionView> = set
        .into_iter()
        .map(|(resource, action)| PermissionView { resource, action })
        .collect();
    permissions.sort();

    Ok(Json(EffectivePermissionsResponse {
        user_id,
        permissions,
    }))
}
