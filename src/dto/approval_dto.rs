use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::transition_dto::ApplicationView;
use crate::models::hire_approval::HireApprovalRequest;
use crate::services::approval_service::BulkHireStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApproveHirePayload {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectHirePayload {
    pub notes: Option<String>,
    /// Optional status to move the application to, e.g. "rejected" or back
    /// to "offer".
    pub new_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusPayload {
    pub application_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HireApprovalRequestView {
    pub id: Uuid,
    pub application_id: Uuid,
    pub requested_by: Uuid,
    pub previous_status: String,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<HireApprovalRequest> for HireApprovalRequestView {
    fn from(r: HireApprovalRequest) -> Self {
        Self {
            id: r.id,
            application_id: r.application_id,
            requested_by: r.requested_by,
            previous_status: r.previous_status,
            status: r.status,
            reviewed_by: r.reviewed_by,
            requested_at: r.requested_at,
            reviewed_at: r.reviewed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalDecisionResponse {
    pub request: HireApprovalRequestView,
    pub application: ApplicationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingListResponse {
    pub total: i64,
    pub requests: Vec<HireApprovalRequestView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkStatusResponse {
    pub statuses: std::collections::HashMap<Uuid, BulkHireStatus>,
}
