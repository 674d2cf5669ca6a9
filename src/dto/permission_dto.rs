use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionCheckQuery {
    pub user_id: Uuid,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PermissionView {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectivePermissionsResponse {
    pub user_id: Uuid,
    pub permissions: Vec<PermissionView>,
}
