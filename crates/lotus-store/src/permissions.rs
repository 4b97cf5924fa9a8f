//! # Users, Roles & Permissions
//!
//! A static catalog of permission ids grouped into named role bundles,
//! plus per-user overrides:
//!
//! ```text
//! effective = (role_group.permissions - override.removed) ∪ override.added
//! ```
//!
//! Login is a plaintext comparison. This system runs entirely inside one
//! browser tab with no server behind it; the accounts exist to gate UI
//! screens, not to resist an attacker with access to the machine.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use lotus_core::validation::validate_name;
use lotus_core::{PermissionOverride, RoleGroup, User, ValidationError};

use crate::error::{StoreError, StoreResult};
use crate::state::Store;

/// Every permission id the UI knows how to gate on.
pub const PERMISSION_CATALOG: &[&str] = &[
    "sales.create",
    "sales.view",
    "products.manage",
    "inventory.receipts",
    "customers.manage",
    "appointments.manage",
    "packages.manage",
    "shifts.manage",
    "reports.view",
    "users.manage",
    "settings.manage",
];

/// The stock role bundles a fresh store starts with.
pub fn default_role_groups() -> Vec<RoleGroup> {
    vec![
        RoleGroup {
            id: "role-admin".to_string(),
            name: "Administrator".to_string(),
            permissions: PERMISSION_CATALOG.iter().map(|p| p.to_string()).collect(),
        },
        RoleGroup {
            id: "role-cashier".to_string(),
            name: "Cashier".to_string(),
            permissions: vec![
                "sales.create".to_string(),
                "sales.view".to_string(),
                "customers.manage".to_string(),
                "shifts.manage".to_string(),
            ],
        },
        RoleGroup {
            id: "role-technician".to_string(),
            name: "Technician".to_string(),
            permissions: vec![
                "appointments.manage".to_string(),
                "packages.manage".to_string(),
            ],
        },
    ]
}

/// Input for creating a staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role_group_id: String,
    #[serde(default)]
    pub is_technician: bool,
}

impl Store {
    /// Creates a staff account. Usernames are unique.
    pub fn add_user(&mut self, input: UserInput) -> StoreResult<User> {
        validate_name(&input.name)?;
        if input.username.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "username".to_string(),
            }
            .into());
        }
        if self.users.iter().any(|u| u.username == input.username) {
            return Err(ValidationError::Duplicate {
                field: "username".to_string(),
                value: input.username,
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            name: input.name,
            username: input.username,
            password: input.password,
            role_group_id: input.role_group_id,
            is_technician: input.is_technician,
            created_at: Utc::now(),
        };

        info!(user_id = %user.id, username = %user.username, "User created");
        self.users.push(user.clone());
        Ok(user)
    }

    /// All staff accounts.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Staff who appear in the appointment scheduler.
    pub fn technicians(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.is_technician).collect()
    }

    /// All role groups.
    pub fn role_groups(&self) -> &[RoleGroup] {
        &self.role_groups
    }

    /// Plaintext credential check. Returns the account on a match.
    pub fn verify_login(&self, username: &str, password: &str) -> Option<&User> {
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password);
        if user.is_none() {
            warn!(username = %username, "Login rejected");
        }
        user
    }

    /// Replaces a user's permission override.
    pub fn set_permission_override(
        &mut self,
        user_id: &str,
        added: Vec<String>,
        removed: Vec<String>,
    ) -> StoreResult<()> {
        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::not_found("User", user_id));
        }

        self.permission_overrides.retain(|o| o.user_id != user_id);
        self.permission_overrides.push(PermissionOverride {
            user_id: user_id.to_string(),
            added,
            removed,
        });
        Ok(())
    }

    /// A user's effective permission set:
    /// `(role.permissions - removed) ∪ added`, role order preserved.
    pub fn effective_permissions(&self, user_id: &str) -> StoreResult<Vec<String>> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::not_found("User", user_id))?;

        let base: Vec<String> = self
            .role_groups
            .iter()
            .find(|g| g.id == user.role_group_id)
            .map(|g| g.permissions.clone())
            .unwrap_or_default();

        let override_ = self
            .permission_overrides
            .iter()
            .find(|o| o.user_id == user_id);

        let mut effective: Vec<String> = match override_ {
            Some(o) => {
                let mut kept: Vec<String> = base
                    .into_iter()
                    .filter(|p| !o.removed.contains(p))
                    .collect();
                for p in &o.added {
                    if !kept.contains(p) {
                        kept.push(p.clone());
                    }
                }
                kept
            }
            None => base,
        };

        effective.dedup();
        Ok(effective)
    }

    /// Whether the user's effective set contains the permission.
    pub fn has_permission(&self, user_id: &str, permission: &str) -> bool {
        self.effective_permissions(user_id)
            .map(|perms| perms.iter().any(|p| p == permission))
            .unwrap_or(false)
    }
}
