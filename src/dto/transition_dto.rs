use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::approval_dto::HireApprovalRequestView;
use crate::models::application::Application;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationView {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            candidate_name: a.candidate_name,
            status: a.status,
            applied_at: a.applied_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResponse {
    /// The application's status after this call; unchanged when the change
    /// went to the approval ledger instead.
    pub status: String,
    pub requires_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HireApprovalRequestView>,
}
