use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of a state-changing operation. Rows are never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    pub category: String,
    pub action: String,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub changes: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

pub mod categories {
    pub const APPLICATION: &str = "APPLICATION";
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
}

pub mod actions {
    pub const STATUS_CHANGE: &str = "STATUS_CHANGE";
    pub const HIRE_APPROVAL_REQUEST: &str = "HIRE_APPROVAL_REQUEST";
    pub const HIRE_APPROVED: &str = "HIRE_APPROVED";
    pub const HIRE_REJECTED: &str = "HIRE_REJECTED";
}
