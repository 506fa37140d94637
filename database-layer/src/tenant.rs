use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant context applied to database sessions
///
/// Every table carries a `temple_id` column; handlers filter on it directly.
/// The context can additionally be applied as `app.*` settings inside a
/// transaction for database-side policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub temple_id: Uuid,
    pub roles: Vec<String>,
}

impl TenantContext {
    pub fn new(user_id: Uuid, temple_id: Uuid) -> Self {
        Self {
            user_id,
            temple_id,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role() {
        let ctx = TenantContext::new(Uuid::new_v4(), Uuid::new_v4())
            .with_roles(vec!["admin".to_string(), "accountant".to_string()]);

        assert!(ctx.has_role("admin"));
        assert!(ctx.has_role("accountant"));
        assert!(!ctx.has_role("trustee"));
    }
}
