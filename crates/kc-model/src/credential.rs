//! Credential domain model.
//!
//! Credentials are authentication factors registered against a local
//! user. Federation only ever registers password credentials, once, at
//! materialization time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credential type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    /// Password credential.
    Password,
    /// TOTP (Time-based One-Time Password) credential.
    Totp,
    /// `WebAuthn` credential.
    Webauthn,
}

impl CredentialType {
    /// Returns the string representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Totp => "otp",
            Self::Webauthn => "webauthn",
        }
    }

    /// Parses a wire name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(Self::Password),
            "otp" => Some(Self::Totp),
            "webauthn" => Some(Self::Webauthn),
            _ => None,
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential registered against a user.
///
/// ## Security Note
///
/// `secret_data` is sensitive and must never be logged. The `Debug`
/// implementation redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier.
    pub id: Uuid,
    /// User this credential belongs to.
    pub user_id: Uuid,
    /// Realm this credential belongs to.
    pub realm_id: Uuid,
    /// Credential type.
    pub credential_type: CredentialType,
    /// When the credential was created.
    pub created_at: DateTime<Utc>,
    /// Secret value.
    pub secret_data: String,
}

impl Credential {
    /// Creates a new credential.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        realm_id: Uuid,
        credential_type: CredentialType,
        secret_data: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            realm_id,
            credential_type,
            created_at: Utc::now(),
            secret_data: secret_data.into(),
        }
    }

    /// Creates a password credential.
    #[must_use]
    pub fn new_password(user_id: Uuid, realm_id: Uuid, value: impl Into<String>) -> Self {
        Self::new(user_id, realm_id, CredentialType::Password, value)
    }

    /// Checks if this is a password credential.
    #[must_use]
    pub const fn is_password(&self) -> bool {
        matches!(self.credential_type, CredentialType::Password)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("realm_id", &self.realm_id)
            .field("credential_type", &self.credential_type)
            .field("created_at", &self.created_at)
            .field("secret_data", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_credential_creation() {
        let cred = Credential::new_password(Uuid::now_v7(), Uuid::now_v7(), "pw1");

        assert!(cred.is_password());
        assert_eq!(cred.credential_type, CredentialType::Password);
        assert_eq!(cred.secret_data, "pw1");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let cred = Credential::new_password(Uuid::now_v7(), Uuid::now_v7(), "hunter2");
        let debug = format!("{cred:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn credential_type_strings() {
        assert_eq!(CredentialType::Password.as_str(), "password");
        assert_eq!(CredentialType::Totp.as_str(), "otp");
        assert_eq!(CredentialType::parse("password"), Some(CredentialType::Password));
        assert_eq!(CredentialType::parse("otp"), Some(CredentialType::Totp));
        assert_eq!(CredentialType::parse("kerberos"), None);
    }

    #[test]
    fn credential_type_serializes_lowercase() {
        let json = serde_json::to_string(&CredentialType::Password).unwrap();
        assert_eq!(json, "\"password\"");
    }
}
