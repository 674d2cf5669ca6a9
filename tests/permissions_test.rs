mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn get_json(app: &axum::Router, uri: &str, bearer: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
#[ignore = "requires postgres"]
async fn super_admin_holds_every_permission() {
    let (app, pool) = setup_app().await;
    let admin = seed_user(&pool, 100).await;
    let bearer = bearer_for(admin, "Admin");

    for (resource, action) in [
        ("applications", "change_status"),
        ("hire_approvals", "review"),
        ("workflow_settings", "update"),
    ] {
        let (status, body) = get_json(
            &app,
            &format!(
                "/api/permissions/check?user_id={}&resource={}&action={}",
                admin, resource, action
            ),
            &bearer,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed"], true, "{}:{}", resource, action);
    }
}

#[tokio::test]
#[ignore = "requires postgres"]
async fn role_union_gives_exactly_the_granted_permissions() {
    let (app, pool) = setup_app().await;
    let user = seed_user(&pool, 0).await;
    assign_role(&pool, user, "recruiter").await;
    assign_role(&pool, user, "hiring_manager").await;
    let bearer = bearer_for(user, "Recruiter");

    let (status, body) = get_json(
        &app,
        &format!("/api/permissions/effective/{}", user),
        &bearer,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let permissions = body["permissions"].as_array().unwrap();
    let pairs: Vec<(String, String)> = permissions
        .iter()
        .map(|p| {
            (
                p["resource"].as_str().unwrap().to_string(),
                p["action"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    // Union of recruiter + hiring_manager, deduplicated on the shared grants.
    assert_eq!(pairs.len(), 5);
    assert!(pairs.contains(&("applications".into(), "change_status".into())));
    assert!(pairs.contains(&("hire_approvals".into(), "review".into())));
    assert!(pairs.contains(&("hire_approvals".into(), "request".into())));
    assert!(!pairs.contains(&("workflow_settings".into(), "update".into())));
}

#[tokio::test]
#[ignore = "requires postgres"]
async fn role_less_user_cannot_change_status() {
    let (app, pool) = setup_app().await;
    let user = seed_user(&pool, 0).await;
    let bearer = bearer_for(user, "Nobody");
    let application = seed_application(&pool, "applied").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/applications/{}/status", application))
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "reviewing" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(application_status(&pool, application).await, "applied");
}

/// Grants exactly one (resource, action) pair through a throwaway role.
async fn grant_single_permission(
    pool: &sqlx::PgPool,
    user_id: uuid::Uuid,
    resource: &str,
    action: &str,
) {
    let role_id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
        .bind(role_id)
        .bind(format!("only-{}-{}", action, role_id))
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, id FROM permissions WHERE resource = $2 AND action = $3
        "#,
    )
    .bind(role_id)
    .bind(resource)
    .bind(action)
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO user_role_assignments (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires postgres"]
async fn requesting_a_hire_needs_more_than_change_status() {
    let (app, pool) = setup_app().await;
    set_flag(&pool, "require_interview_feedback", false).await;
    set_flag(&pool, "require_approval_for_hire", true).await;

    let user = seed_user(&pool, 0).await;
    grant_single_permission(&pool, user, "applications", "change_status").await;
    let bearer = bearer_for(user, "Mover");

    let application = seed_application(&pool, "offer").await;

    // Ordinary transitions are within the grant.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/applications/{}/status", application))
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "reviewing" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Parking a hire in the approval ledger also needs hire_approvals:request.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/applications/{}/status", application))
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "hired" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(application_status(&pool, application).await, "reviewing");

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM hire_approval_requests WHERE application_id = $1",
    )
    .bind(application)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 0);
}

#[tokio::test]
#[ignore = "requires postgres"]
async fn requests_without_a_token_are_unauthorized() {
    let (app, _pool) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/hire-approvals/pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
