use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::audit_event::{actions, categories};
use crate::models::hire_approval::HireApprovalRequest;
use crate::models::note::NoteKind;
use crate::models::user::Actor;
use crate::services::approval_service::ApprovalService;
use crate::services::feedback_service::FeedbackService;
use crate::services::settings_service::{SettingsService, WorkflowFlags};
use crate::services::{audit_service, note_service};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// How a requested transition is carried out once the gates have passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRoute {
    /// Single-transaction status update.
    Direct,
    /// Routed through the hire approval ledger; status unchanged for now.
    NeedsApproval,
}

pub fn route_for(new_status: ApplicationStatus, flags: &WorkflowFlags) -> TransitionRoute {
    if new_status == ApplicationStatus::Hired && flags.require_approval_for_hire {
        TransitionRoute::NeedsApproval
    } else {
        TransitionRoute::Direct
    }
}

#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The status change was applied and committed.
    Applied { application: Application },
    /// A hire approval request was created; the application status is
    /// untouched until a reviewer acts.
    ApprovalRequested { request: HireApprovalRequest },
}

/// Orchestrates every status mutation: feedback gate, approval routing, then
/// the direct transition with its note and audit record in one transaction.
/// Callers are expected to have authorized the actor already.
#[derive(Clone)]
pub struct TransitionService {
    pool: PgPool,
    settings: SettingsService,
    feedback: FeedbackService,
    approvals: ApprovalService,
}

impl TransitionService {
    pub fn new(
        pool: PgPool,
        settings: SettingsService,
        feedback: FeedbackService,
        approvals: ApprovalService,
    ) -> Self {
        Self {
            pool,
            settings,
            feedback,
            approvals,
        }
    }

    pub async fn request_transition(
        &self,
        application_id: Uuid,
        new_status: ApplicationStatus,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<TransitionOutcome> {
        let application = self.get_application(application_id).await?.ok_or_else(|| {
            Error::NotFound(format!("Application {} not found", application_id))
        })?;
        let current: ApplicationStatus = application.status.parse().map_err(|e: String| {
            Error::Internal(format!("Stored status is invalid: {}", e))
        })?;

        let flags = self.settings.flags().await?;

        // Gate 1: completed interviews need feedback before leaving the
        // interview stage.
        let report = self
            .feedback
            .check(
                application.id,
                current,
                new_status,
                flags.require_interview_feedback,
            )
            .await?;
        if report.blocked {
            return Err(Error::PreconditionFailed {
                reason: report
                    .reason
                    .unwrap_or_else(|| "Interview feedback is outstanding".to_string()),
                offending_interviews: report.offending_interviews,
            });
        }

        // Gate 2: hiring may require a reviewer decision first.
        match route_for(new_status, &flags) {
            TransitionRoute::NeedsApproval => {
                let request = self.approvals.create_request(&application, actor).await?;
                Ok(TransitionOutcome::ApprovalRequested { request })
            }
            TransitionRoute::Direct => {
                let application = self
                    .apply_direct(&application, current, new_status, actor, notes)
                    .await?;
                Ok(TransitionOutcome::Applied { application })
            }
        }
    }

    /// Status update, optional note and audit event as one atomic unit.
    async fn apply_direct(
        &self,
        application: &Application,
        current: ApplicationStatus,
        new_status: ApplicationStatus,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Application> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, job_id, candidate_name, status, applied_at, updated_at
            "#,
        )
        .bind(new_status.as_str())
        .bind(application.id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(notes) = notes.as_deref().filter(|n| !n.is_empty()) {
            note_service::record(
                &mut *tx,
                application.id,
                Some(actor.id),
                Some(&actor.name),
                NoteKind::StatusChange,
                &format!(
                    "Status changed from {} to {}. {}",
                    current, new_status, notes
                ),
            )
            .await?;
        }

        audit_service::record(
            &mut *tx,
            audit_service::NewAuditEvent {
                category: categories::APPLICATION,
                action: actions::STATUS_CHANGE,
                actor_id: Some(actor.id),
                actor_name: Some(&actor.name),
                entity_type: "application",
                entity_id: application.id,
                changes: Some(json!({
                    "old_status": current.as_str(),
                    "new_status": new_status.as_str(),
                })),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(
            application_id = %application.id,
            from = %current,
            to = %new_status,
            "application status changed"
        );
        Ok(updated)
    }

    pub async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT id, job_id, candidate_name, status, applied_at, updated_at FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }
}
