//! Account roles and their landing routes.

use serde::{Deserialize, Serialize};

/// Role of an authenticated principal.
///
/// The account backend reports roles as `"admin"` and `"user"` in its JSON
/// payloads; `"customer"` is accepted as an alias when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(rename = "user", alias = "customer")]
    Customer,
}

impl Role {
    /// The dashboard route a principal with this role lands on after login.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => "/dashboard/admin",
            Self::Customer => "/dashboard/user",
        }
    }

    /// Whether this role carries admin privileges.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_paths() {
        assert_eq!(Role::Admin.landing_path(), "/dashboard/admin");
        assert_eq!(Role::Customer.landing_path(), "/dashboard/user");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"user\"");

        let admin: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin, Role::Admin);
        let user: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(user, Role::Customer);
        let customer: Role = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(customer, Role::Customer);
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }
}
