pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;

use crate::services::{
    approval_service::ApprovalService, feedback_service::FeedbackService,
    permission_service::PermissionService, settings_service::SettingsService,
    transition_service::TransitionService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings_service: SettingsService,
    pub permission_service: PermissionService,
    pub feedback_service: FeedbackService,
    pub approval_service: ApprovalService,
    pub transition_service: TransitionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let settings_service = SettingsService::new(pool.clone());
        let permission_service = PermissionService::new(pool.clone(), config.super_admin_level);
        let feedback_service = FeedbackService::new(pool.clone());
        let approval_service = ApprovalService::new(pool.clone());
        let transition_service = TransitionService::new(
            pool.clone(),
            settings_service.clone(),
            feedback_service.clone(),
            approval_service.clone(),
        );

        Self {
            pool,
            settings_service,
            permission_service,
            feedback_service,
            approval_service,
            transition_service,
        }
    }
}

/// Full application router; also used by the integration tests.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/applications/:id/status",
            post(routes::applications::update_application_status),
        )
        .route(
            "/api/hire-approvals/:id/approve",
            post(routes::approvals::approve_hire),
        )
        .route(
            "/api/hire-approvals/:id/reject",
            post(routes::approvals::reject_hire),
        )
        .route(
            "/api/hire-approvals/pending",
            get(routes::approvals::list_pending),
        )
        .route(
            "/api/hire-approvals/bulk-status",
            post(routes::approvals::bulk_status),
        )
        .route(
            "/api/permissions/check",
            get(routes::permissions::check_permission),
        )
        .route(
            "/api/permissions/effective/:user_id",
            get(routes::permissions::effective_permissions),
        )
        .route("/api/settings/:key", put(routes::settings::update_setting))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(api)
        .with_state(state)
}
