//! Internal authorization roles and the per-session authorization context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => f.write_str("USER"),
            UserRole::Admin => f.write_str("ADMIN"),
        }
    }
}

/// Set of internal roles. Derived from external group names, never stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet(BTreeSet<UserRole>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: UserRole) {
        self.0.insert(role);
    }

    pub fn contains(&self, role: UserRole) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserRole> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<UserRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = UserRole>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Session-scoped authorization context. Computed once at login; no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    user_id: i64,
    user_name: String,
    roles: RoleSet,
}

impl AuthorizationContext {
    pub fn new(user_id: i64, user_name: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            roles,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(UserRole::Admin)
    }

    /// True when this session belongs to the given local user.
    pub fn is_user(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Any protected operation requires at least the USER role.
    pub fn can_access(&self) -> bool {
        self.roles.contains(UserRole::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_role_checks() {
        let roles: RoleSet = [UserRole::User, UserRole::Admin].into_iter().collect();
        let ctx = AuthorizationContext::new(7, "Thrall", roles);
        assert!(ctx.is_admin());
        assert!(ctx.can_access());
        assert!(ctx.is_user(7));
        assert!(!ctx.is_user(8));
        assert_eq!(ctx.roles().to_string(), "[USER, ADMIN]");
    }

    #[test]
    fn empty_roles_deny_access() {
        let ctx = AuthorizationContext::new(1, "Guest", RoleSet::empty());
        assert!(!ctx.can_access());
        assert!(!ctx.is_admin());
    }
}
