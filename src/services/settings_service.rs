use crate::error::{Error, Result};
use sqlx::PgPool;

pub const REQUIRE_INTERVIEW_FEEDBACK: &str = "require_interview_feedback";
pub const REQUIRE_APPROVAL_FOR_HIRE: &str = "require_approval_for_hire";

/// Workflow flags read fresh per call; nothing here is cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowFlags {
    pub require_interview_feedback: bool,
    pub require_approval_for_hire: bool,
}

#[derive(Clone)]
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn flags(&self) -> Result<WorkflowFlags> {
        let rows = sqlx::query_as::<_, (String, bool)>(
            "SELECT key, value FROM workflow_settings",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut flags = WorkflowFlags::default();
        for (key, value) in rows {
            match key.as_str() {
                REQUIRE_INTERVIEW_FEEDBACK => flags.require_interview_feedback = value,
                REQUIRE_APPROVAL_FOR_HIRE => flags.require_approval_for_hire = value,
                _ => {}
            }
        }
        Ok(flags)
    }

    pub async fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        if key != REQUIRE_INTERVIEW_FEEDBACK && key != REQUIRE_APPROVAL_FOR_HIRE {
            return Err(Error::BadRequest(format!("Unknown workflow setting: {}", key)));
        }

        sqlx::query(
            r#"
            INSERT INTO workflow_settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
