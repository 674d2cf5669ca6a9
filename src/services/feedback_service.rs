use std::collections::HashSet;

use crate::error::Result;
use crate::models::application::ApplicationStatus;
use crate::models::interview::{FeedbackNote, InterviewRecord, INTERVIEW_COMPLETED};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of the interview-feedback gate. `blocked` implies at least one
/// completed interview has no feedback note.
#[derive(Debug, Clone)]
pub struct FeedbackGateReport {
    pub blocked: bool,
    pub reason: Option<String>,
    pub offending_interviews: Vec<Uuid>,
}

impl FeedbackGateReport {
    pub fn clear() -> Self {
        Self {
            blocked: false,
            reason: None,
            offending_interviews: Vec::new(),
        }
    }
}

/// The gate only applies when leaving the interview stage and the flag is on.
pub fn gate_applies(current: ApplicationStatus, require_feedback: bool) -> bool {
    require_feedback && current == ApplicationStatus::Interview
}

/// Completed interviews with no feedback note, preserving input order.
pub fn outstanding(completed: &[InterviewRecord], reviewed: &HashSet<Uuid>) -> Vec<Uuid> {
    completed
        .iter()
        .filter(|i| !reviewed.contains(&i.id))
        .map(|i| i.id)
        .collect()
}

pub fn report_for(offending: Vec<Uuid>) -> FeedbackGateReport {
    if offending.is_empty() {
        return FeedbackGateReport::clear();
    }
    let reason = format!(
        "{} completed interview(s) are missing feedback",
        offending.len()
    );
    FeedbackGateReport {
        blocked: true,
        reason: Some(reason),
        offending_interviews: offending,
    }
}

#[derive(Clone)]
pub struct FeedbackService {
    pool: PgPool,
}

impl FeedbackService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Evaluates the gate for one proposed transition. Read-only; never
    /// mutates state.
    pub async fn check(
        &self,
        application_id: Uuid,
        current: ApplicationStatus,
        new_status: ApplicationStatus,
        require_feedback: bool,
    ) -> Result<FeedbackGateReport> {
        if !gate_applies(current, require_feedback) {
            return Ok(FeedbackGateReport::clear());
        }

        let completed = sqlx::query_as::<_, InterviewRecord>(
            r#"
            SELECT id, application_id, status, scheduled_at, interviewer_id
            FROM interviews
            WHERE application_id = $1 AND status = $2
            ORDER BY scheduled_at
            "#,
        )
        .bind(application_id)
        .bind(INTERVIEW_COMPLETED)
        .fetch_all(&self.pool)
        .await?;

        let notes = sqlx::query_as::<_, FeedbackNote>(
            r#"
            SELECT id, application_id, interview_id, author_id, content, rating, created_at
            FROM feedback_notes
            WHERE application_id = $1
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        let reviewed: HashSet<Uuid> = notes.into_iter().map(|n| n.interview_id).collect();

        let report = report_for(outstanding(&completed, &reviewed));
        if report.blocked {
            tracing::debug!(
                %application_id,
                from = %current,
                to = %new_status,
                outstanding = report.offending_interviews.len(),
                "transition blocked by feedback gate"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn interview(id: Uuid) -> InterviewRecord {
        InterviewRecord {
            id,
            application_id: Uuid::new_v4(),
            status: "completed".to_string(),
            scheduled_at: Utc::now(),
            interviewer_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn gate_only_applies_when_leaving_interview_with_flag_on() {
        assert!(gate_applies(ApplicationStatus::Interview, true));
        assert!(!gate_applies(ApplicationStatus::Interview, false));
        assert!(!gate_applies(ApplicationStatus::Offer, true));
        assert!(!gate_applies(ApplicationStatus::Applied, true));
    }

    #[test]
    fn interviews_without_feedback_are_offending() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let completed = vec![interview(a), interview(b)];
        let reviewed: HashSet<Uuid> = [b].into_iter().collect();

        assert_eq!(outstanding(&completed, &reviewed), vec![a]);
    }

    #[test]
    fn fully_reviewed_interviews_do_not_block() {
        let a = Uuid::new_v4();
        let completed = vec![interview(a)];
        let reviewed: HashSet<Uuid> = [a].into_iter().collect();

        let report = report_for(outstanding(&completed, &reviewed));
        assert!(!report.blocked);
        assert!(report.reason.is_none());
        assert!(report.offending_interviews.is_empty());
    }

    #[test]
    fn report_counts_offending_interviews() {
        let report = report_for(vec![Uuid::new_v4(), Uuid::new_v4()]);
        assert!(report.blocked);
        assert_eq!(
            report.reason.as_deref(),
            Some("2 completed interview(s) are missing feedback")
        );
        assert_eq!(report.offending_interviews.len(), 2);
    }
}
