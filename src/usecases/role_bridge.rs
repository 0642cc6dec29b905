//! Maps Discord guild role names to internal roles.

use crate::domain::{RoleSet, UserRole};
use std::collections::HashSet;

/// Two configured name lists. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct RoleBridge {
    user_names: HashSet<String>,
    admin_names: HashSet<String>,
}

impl RoleBridge {
    pub fn new(
        user_names: impl IntoIterator<Item = String>,
        admin_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            user_names: user_names.into_iter().collect(),
            admin_names: admin_names.into_iter().collect(),
        }
    }

    /// USER if any name is a user role; USER and ADMIN if any name is an admin role.
    pub fn roles_for(&self, names: &[String]) -> RoleSet {
        let mut roles = RoleSet::empty();
        for name in names {
            if self.admin_names.contains(name) {
                roles.insert(UserRole::User);
                roles.insert(UserRole::Admin);
            } else if self.user_names.contains(name) {
                roles.insert(UserRole::User);
            }
        }
        roles
    }
}
