//! Auth service settings.

use shared_types::Role;

/// Settings that shape account behaviour.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    /// Accounts registered with one of these emails get the `admin` role.
    pub admin_emails: Vec<String>,
}

impl AuthSettings {
    #[must_use]
    pub fn with_admin(mut self, email: impl Into<String>) -> Self {
        self.admin_emails.push(email.into());
        self
    }

    /// Roles granted to an account with `email`.
    pub fn roles_for(&self, email: &str) -> Vec<Role> {
        let mut roles = vec![Role::User];
        if self.admin_emails.iter().any(|admin| admin.eq_ignore_ascii_case(email)) {
            roles.push(Role::Admin);
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_emails_match_case_insensitively() {
        let settings = AuthSettings::default().with_admin("Root@Example.com");
        assert_eq!(settings.roles_for("root@example.com"), vec![Role::User, Role::Admin]);
        assert_eq!(settings.roles_for("guest@example.com"), vec![Role::User]);
    }
}
