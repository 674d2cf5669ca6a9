use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Interview rows are owned by the scheduling collaborator; this core only
/// reads them to evaluate the feedback gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRecord {
    pub id: Uuid,
    pub application_id: Uuid,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer_id: Uuid,
}

pub const INTERVIEW_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackNote {
    pub id: Uuid,
    pub application_id: Uuid,
    pub interview_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}
