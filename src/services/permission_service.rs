use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::permission::Permission;
use crate::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

/// True when the privilege level grants the unconditional super-admin bypass.
pub fn is_super_admin(privilege_level: i32, threshold: i32) -> bool {
    privilege_level >= threshold
}

/// Deduplicates (resource, action) pairs gathered across role assignments.
pub fn union_permissions<I>(rows: I) -> HashSet<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    rows.into_iter().collect()
}

/// Pure query layer over users, roles and permissions. Callers consult it
/// before invoking any mutating workflow operation; the mutating services do
/// not re-check.
#[derive(Clone)]
pub struct PermissionService {
    pool: PgPool,
    super_admin_level: i32,
}

impl PermissionService {
    pub fn new(pool: PgPool, super_admin_level: i32) -> Self {
        Self {
            pool,
            super_admin_level,
        }
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, privilege_level, is_active, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn has_permission(&self, user_id: Uuid, resource: &str, action: &str) -> Result<bool> {
        let user = self.load_user(user_id).await?;
        // Deactivated accounts hold no permissions, privilege level included.
        if !user.is_active {
            return Ok(false);
        }
        if is_super_admin(user.privilege_level, self.super_admin_level) {
            return Ok(true);
        }

        let allowed = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_role_assignments ura
                JOIN role_permissions rp ON rp.role_id = ura.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE ura.user_id = $1
                  AND ura.is_active
                  AND p.resource = $2
                  AND p.action = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(resource)
        .bind(action)
        .fetch_one(&self.pool)
        .await?;
        Ok(allowed)
    }

    /// Convenience wrapper turning a negative check into PermissionDenied.
    pub async fn require(&self, user_id: Uuid, resource: &str, action: &str) -> Result<()> {
        if self.has_permission(user_id, resource, action).await? {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "{}:{} required",
                resource, action
            )))
        }
    }

    /// Union of all active role assignments' permissions; the full catalog for
    /// super-admins (used by UI enumeration, not gating).
    pub async fn effective_permissions(&self, user_id: Uuid) -> Result<HashSet<(String, String)>> {
        let user = self.load_user(user_id).await?;
        if !user.is_active {
            return Ok(HashSet::new());
        }

        let rows = if is_super_admin(user.privilege_level, self.super_admin_level) {
            sqlx::query_as::<_, Permission>("SELECT id, resource, action FROM permissions")
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|p| (p.resource, p.action))
                .collect()
        } else {
            sqlx::query_as::<_, (String, String)>(
                r#"
                SELECT DISTINCT p.resource, p.action
                FROM user_role_assignments ura
                JOIN role_permissions rp ON rp.role_id = ura.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE ura.user_id = $1 AND ura.is_active
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(union_permissions(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_threshold_is_inclusive() {
        assert!(is_super_admin(100, 100));
        assert!(is_super_admin(250, 100));
        assert!(!is_super_admin(99, 100));
        assert!(!is_super_admin(0, 100));
    }

    #[test]
    fn union_deduplicates_across_roles() {
        let rows = vec![
            ("applications".to_string(), "read".to_string()),
            ("applications".to_string(), "read".to_string()),
            ("applications".to_string(), "change_status".to_string()),
            ("hire_approvals".to_string(), "review".to_string()),
        ];
        let set = union_permissions(rows);
        assert_eq!(set.len(), 3);
        assert!(set.contains(&("applications".to_string(), "read".to_string())));
    }

    #[test]
    fn union_of_no_roles_is_empty() {
        assert!(union_permissions(Vec::new()).is_empty());
    }
}
