use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationNote {
    pub id: Uuid,
    pub application_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub kind: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Tags distinguishing system-generated transition notes from human ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    StatusChange,
    HireApprovalRequest,
    HireApproved,
    HireRejected,
    Manual,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::StatusChange => "status_change",
            NoteKind::HireApprovalRequest => "hire_approval_request",
            NoteKind::HireApproved => "hire_approved",
            NoteKind::HireRejected => "hire_rejected",
            NoteKind::Manual => "manual",
        }
    }
}
