use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One grantable (resource, action) capability from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub resource: String,
    pub action: String,
}
