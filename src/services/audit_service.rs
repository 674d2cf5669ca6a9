use crate::error::Result;
use crate::models::audit_event::AuditEvent;
use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct NewAuditEvent<'a> {
    pub category: &'a str,
    pub action: &'a str,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<&'a str>,
    pub entity_type: &'a str,
    pub entity_id: Uuid,
    pub changes: Option<JsonValue>,
}

/// Appends one audit row on the caller's connection so the record commits or
/// aborts together with the mutation it describes.
pub async fn record(conn: &mut PgConnection, event: NewAuditEvent<'_>) -> Result<AuditEvent> {
    let row = sqlx::query_as::<_, AuditEvent>(
        r#"
        INSERT INTO audit_events (category, action, actor_id, actor_name, entity_type, entity_id, changes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, category, action, actor_id, actor_name, entity_type, entity_id, changes, created_at
        "#,
    )
    .bind(event.category)
    .bind(event.action)
    .bind(event.actor_id)
    .bind(event.actor_name)
    .bind(event.entity_type)
    .bind(event.entity_id)
    .bind(event.changes)
    .fetch_one(conn)
    .await?;
    Ok(row)
}
