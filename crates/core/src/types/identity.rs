//! Signed-in principal and its role.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// Error returned when a backend role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0}")]
pub struct RoleError(pub String);

/// Role of an authenticated identity.
///
/// The backend reports roles as free-form text (`"User"`, `"Admin"`,
/// `"moderator"`, ...). They are mapped onto this closed set exactly once,
/// when an [`Identity`] is decoded; unknown strings are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// Regular shopper.
    Customer,
    /// Full store management access.
    Administrator,
    /// Store management access without account administration.
    Moderator,
}

impl Role {
    /// Whether this role may open the administrative dashboard.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        match self {
            Self::Customer => false,
            Self::Administrator | Self::Moderator => true,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Administrator => "administrator",
            Self::Moderator => "moderator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "customer" => Ok(Self::Customer),
            "admin" | "administrator" => Ok(Self::Administrator),
            "moderator" | "mod" => Ok(Self::Moderator),
            _ => Err(RoleError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The resolved authenticated principal.
///
/// Decoding accepts the backend's `username` spelling and whatever email it
/// has stored; only the role is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdentityRecord")]
pub struct Identity {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Role used for view gating.
    pub role: Role,
}

/// Wire shape of an identity.
#[derive(Deserialize)]
struct IdentityRecord {
    id: UserId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    email: String,
    role: Role,
}

impl From<IdentityRecord> for Identity {
    fn from(record: IdentityRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.or(record.username).unwrap_or_default(),
            email: Email::from_backend(record.email),
            role: record.role,
        }
    }
}

impl Identity {
    /// Whether this identity may open the administrative dashboard.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_backend_spellings() {
        assert_eq!("User".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert_eq!(" ADMINISTRATOR ".parse::<Role>().unwrap(), Role::Administrator);
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, RoleError("superuser".to_string()));
    }

    #[test]
    fn test_role_elevation() {
        assert!(!Role::Customer.is_elevated());
        assert!(Role::Administrator.is_elevated());
        assert!(Role::Moderator.is_elevated());
    }

    #[test]
    fn test_identity_decodes_backend_payload() {
        let json = r#"{"id": 7, "username": "amna", "email": "amna@example.com", "role": "Admin"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();

        assert_eq!(identity.id, UserId::new(7));
        assert_eq!(identity.name, "amna");
        assert_eq!(identity.role, Role::Administrator);
        assert!(identity.is_elevated());
    }

    #[test]
    fn test_identity_with_name_and_username() {
        let json = r#"{"id": 7, "name": "Amna K", "username": "amna", "email": "amna@example.com", "role": "User"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.name, "Amna K");
    }

    #[test]
    fn test_identity_keeps_nonconforming_stored_email() {
        let json = r#"{"id": 1, "username": "root", "email": "root@localhost ", "role": "Admin"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.email.as_str(), "root@localhost");

        let json = r#"{"id": 1, "username": "root", "email": "root", "role": "Admin"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.email.as_str(), "root");
        assert!(identity.is_elevated());
    }

    #[test]
    fn test_identity_with_unknown_role_is_rejected() {
        let json = r#"{"id": 7, "name": "x", "email": "x@example.com", "role": "root"}"#;
        assert!(serde_json::from_str::<Identity>(json).is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::Administrator).unwrap(),
            "\"administrator\""
        );
    }
}
