use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::audit_event::{actions, categories};
use crate::models::hire_approval::{ApprovalStatus, HireApprovalRequest};
use crate::models::note::NoteKind;
use crate::models::user::Actor;
use crate::services::{audit_service, note_service};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const REQUEST_COLUMNS: &str =
    "id, application_id, requested_by, previous_status, status, reviewed_by, requested_at, reviewed_at";

const APPLICATION_COLUMNS: &str = "id, job_id, candidate_name, status, applied_at, updated_at";

/// Per-application entry returned by the bulk lookup. Every requested id gets
/// one, pending request or not.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BulkHireStatus {
    pub has_pending: bool,
    pub requested_by: Option<Uuid>,
    pub requested_at: Option<DateTime<Utc>>,
}

/// Builds the bulk map from the pending rows found, filling absent ids with
/// the default "no pending request" entry.
pub fn fill_bulk_status(
    ids: &[Uuid],
    pending: Vec<(Uuid, Uuid, DateTime<Utc>)>,
) -> HashMap<Uuid, BulkHireStatus> {
    let mut map: HashMap<Uuid, BulkHireStatus> = ids
        .iter()
        .map(|id| (*id, BulkHireStatus::default()))
        .collect();
    for (application_id, requested_by, requested_at) in pending {
        map.insert(
            application_id,
            BulkHireStatus {
                has_pending: true,
                requested_by: Some(requested_by),
                requested_at: Some(requested_at),
            },
        );
    }
    map
}

/// Owns the lifecycle of hire approval requests. The only code path by which
/// an application reaches the hired status while approval is required.
#[derive(Clone)]
pub struct ApprovalService {
    pool: PgPool,
}

impl ApprovalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomic check-and-insert: the partial unique index on
    /// (application_id) WHERE status = 'pending' decides races, not an
    /// application-level read.
    pub async fn create_request(
        &self,
        application: &Application,
        requested_by: &Actor,
    ) -> Result<HireApprovalRequest> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            r#"
            INSERT INTO hire_approval_requests (application_id, requested_by, previous_status)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(application.id)
        .bind(requested_by.id)
        .bind(&application.status)
        .fetch_one(&mut *tx)
        .await;

        let request = match inserted {
            Ok(request) => request,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                drop(tx);
                return Err(self.conflict_for(application.id).await?);
            }
            Err(other) => return Err(other.into()),
        };

        note_service::record(
            &mut *tx,
            application.id,
            Some(requested_by.id),
            Some(&requested_by.name),
            NoteKind::HireApprovalRequest,
            &format!(
                "Hire approval requested by {} while application was in status {}",
                requested_by.name, application.status
            ),
        )
        .await?;

        audit_service::record(
            &mut *tx,
            audit_service::NewAuditEvent {
                category: categories::CREATE,
                action: actions::HIRE_APPROVAL_REQUEST,
                actor_id: Some(requested_by.id),
                actor_name: Some(&requested_by.name),
                entity_type: "hire_approval_request",
                entity_id: request.id,
                changes: Some(json!({
                    "application_id": application.id,
                    "previous_status": application.status,
                })),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(request_id = %request.id, application_id = %application.id, "hire approval requested");
        Ok(request)
    }

    /// The loser of a create race ends up here; report the surviving pending
    /// request so the caller can reference it.
    async fn conflict_for(&self, application_id: Uuid) -> Result<Error> {
        match self.get_pending_for_application(application_id).await? {
            Some(existing) => Ok(Error::Conflict {
                message: "A hire approval request is already pending for this application"
                    .to_string(),
                pending_request_id: existing.id,
                requested_at: existing.requested_at,
            }),
            None => Ok(Error::Internal(
                "Pending hire approval request vanished during creation".to_string(),
            )),
        }
    }

    /// Marks the request approved and promotes the application to hired, in
    /// one transaction. The request row is locked first so a concurrent
    /// reviewer observes a non-pending status and fails.
    pub async fn approve(
        &self,
        request_id: Uuid,
        reviewer: &Actor,
        notes: Option<String>,
    ) -> Result<(HireApprovalRequest, Application)> {
        let mut tx = self.pool.begin().await?;

        let request = self.lock_pending(&mut tx, request_id).await?;

        let request = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            r#"
            UPDATE hire_approval_requests
            SET status = 'approved', reviewed_by = $1, reviewed_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(reviewer.id)
        .bind(request.id)
        .fetch_one(&mut *tx)
        .await?;

        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(ApplicationStatus::Hired.as_str())
        .bind(request.application_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut content = format!("Hire approved by {}", reviewer.name);
        if let Some(notes) = notes.as_deref().filter(|n| !n.is_empty()) {
            content = format!("{}. {}", content, notes);
        }
        note_service::record(
            &mut *tx,
            application.id,
            Some(reviewer.id),
            Some(&reviewer.name),
            NoteKind::HireApproved,
            &content,
        )
        .await?;

        audit_service::record(
            &mut *tx,
            audit_service::NewAuditEvent {
                category: categories::UPDATE,
                action: actions::HIRE_APPROVED,
                actor_id: Some(reviewer.id),
                actor_name: Some(&reviewer.name),
                entity_type: "application",
                entity_id: application.id,
                changes: Some(json!({
                    "request_id": request.id,
                    "old_status": request.previous_status,
                    "new_status": ApplicationStatus::Hired.as_str(),
                })),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(request_id = %request.id, application_id = %application.id, "hire approved");
        Ok((request, application))
    }

    /// Marks the request rejected; optionally moves the application to the
    /// supplied status when it differs from the current one.
    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewer: &Actor,
        notes: Option<String>,
        change_application_status_to: Option<ApplicationStatus>,
    ) -> Result<(HireApprovalRequest, Application)> {
        let mut tx = self.pool.begin().await?;

        let request = self.lock_pending(&mut tx, request_id).await?;

        let request = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            r#"
            UPDATE hire_approval_requests
            SET status = 'rejected', reviewed_by = $1, reviewed_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(reviewer.id)
        .bind(request.id)
        .fetch_one(&mut *tx)
        .await?;

        let current = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = $1 FOR UPDATE",
            APPLICATION_COLUMNS
        ))
        .bind(request.application_id)
        .fetch_one(&mut *tx)
        .await?;

        let application = match change_application_status_to {
            Some(target) if target.as_str() != current.status => {
                sqlx::query_as::<_, Application>(&format!(
                    r#"
                    UPDATE applications
                    SET status = $1, updated_at = NOW()
                    WHERE id = $2
                    RETURNING {}
                    "#,
                    APPLICATION_COLUMNS
                ))
                .bind(target.as_str())
                .bind(current.id)
                .fetch_one(&mut *tx)
                .await?
            }
            _ => current,
        };

        let mut content = format!(
            "Hire rejected by {}. Application status: {}",
            reviewer.name, application.status
        );
        if let Some(notes) = notes.as_deref().filter(|n| !n.is_empty()) {
            content = format!("{}. {}", content, notes);
        }
        note_service::record(
            &mut *tx,
            application.id,
            Some(reviewer.id),
            Some(&reviewer.name),
            NoteKind::HireRejected,
            &content,
        )
        .await?;

        audit_service::record(
            &mut *tx,
            audit_service::NewAuditEvent {
                category: categories::UPDATE,
                action: actions::HIRE_REJECTED,
                actor_id: Some(reviewer.id),
                actor_name: Some(&reviewer.name),
                entity_type: "application",
                entity_id: application.id,
                changes: Some(json!({
                    "request_id": request.id,
                    "old_status": request.previous_status,
                    "new_status": application.status,
                })),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(request_id = %request.id, application_id = %application.id, "hire rejected");
        Ok((request, application))
    }

    /// Row-locks the request and verifies it is still pending. A request that
    /// already left pending fails with AlreadyProcessed, never a silent no-op.
    async fn lock_pending(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request_id: Uuid,
    ) -> Result<HireApprovalRequest> {
        let request = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            "SELECT {} FROM hire_approval_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Hire approval request {} not found", request_id)))?;

        if request.status != ApprovalStatus::Pending.as_str() {
            return Err(Error::AlreadyProcessed(format!(
                "Hire approval request {} was already {}",
                request_id, request.status
            )));
        }
        Ok(request)
    }

    pub async fn get_by_id(&self, request_id: Uuid) -> Result<Option<HireApprovalRequest>> {
        let request = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            "SELECT {} FROM hire_approval_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn get_pending_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<HireApprovalRequest>> {
        let request = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            "SELECT {} FROM hire_approval_requests WHERE application_id = $1 AND status = 'pending'",
            REQUEST_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn get_pending_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hire_approval_requests WHERE status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn list_pending(&self) -> Result<Vec<HireApprovalRequest>> {
        let requests = sqlx::query_as::<_, HireApprovalRequest>(&format!(
            "SELECT {} FROM hire_approval_requests WHERE status = 'pending' ORDER BY requested_at DESC",
            REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Batched pending lookup for list views. Returns an entry for every
    /// requested id, including those with no matching row.
    pub async fn bulk_status(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, BulkHireStatus>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pending = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>)>(
            r#"
            SELECT application_id, requested_by, requested_at
            FROM hire_approval_requests
            WHERE status = 'pending' AND application_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_bulk_status(ids, pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_status_covers_every_requested_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let when = Utc::now();

        let map = fill_bulk_status(&[a, b, c], vec![(b, requester, when)]);

        assert_eq!(map.len(), 3);
        assert!(!map[&a].has_pending);
        assert!(!map[&c].has_pending);
        assert!(map[&b].has_pending);
        assert_eq!(map[&b].requested_by, Some(requester));
        assert_eq!(map[&b].requested_at, Some(when));
    }

    #[test]
    fn bulk_status_of_empty_input_is_empty() {
        assert!(fill_bulk_status(&[], Vec::new()).is_empty());
    }
}
