use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role resolved by the identity/session collaborator. The core trusts
/// this input and applies only its own authorization rules on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Provider,
    Admin,
}

/// Identity of the acting party, supplied with every call into the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn customer(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Customer)
    }

    pub fn provider(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Provider)
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
