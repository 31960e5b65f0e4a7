//! Materialization of federated users as local accounts.
//!
//! Provisioning turns an external id into a local account in one unit of
//! work: create the account, grant the default role, enable it, apply the
//! attribute template, and register the credential. Every step runs in the
//! caller's [`StorageSession`]; the caller commits or rolls back.

use std::collections::BTreeMap;
use std::fmt;

use kc_model::{Credential, Role, User};
use kc_storage::{StorageError, StorageSession};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FederationError, FederationResult};

/// Role granted to materialized accounts unless configured otherwise.
pub const DEFAULT_ROLE: &str = "montage";

/// Attribute set on materialized accounts unless configured otherwise.
pub const DEFAULT_PHONE_ATTRIBUTE: (&str, &str) = ("phone", "79031112233");

// ============================================================================
// Policy
// ============================================================================

/// What every materialized account receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningPolicy {
    /// Name of the realm role to grant. `None` disables role grants.
    pub default_role: Option<String>,

    /// Attributes set on every account.
    pub attributes: BTreeMap<String, String>,

    /// Whether bulk sync also registers the registry secret as a password.
    pub sync_credentials: bool,
}

impl Default for ProvisioningPolicy {
    fn default() -> Self {
        let (name, value) = DEFAULT_PHONE_ATTRIBUTE;
        Self {
            default_role: Some(DEFAULT_ROLE.to_string()),
            attributes: BTreeMap::from([(name.to_string(), value.to_string())]),
            sync_credentials: false,
        }
    }
}

impl ProvisioningPolicy {
    /// Sets the default role name.
    #[must_use]
    pub fn with_default_role(mut self, role: Option<String>) -> Self {
        self.default_role = role;
        self
    }

    /// Replaces the attribute template.
    #[must_use]
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets whether bulk sync registers credentials.
    #[must_use]
    pub const fn with_sync_credentials(mut self, sync_credentials: bool) -> Self {
        self.sync_credentials = sync_credentials;
        self
    }
}

// ============================================================================
// Request / Outcome
// ============================================================================

/// Everything needed to materialize one external id.
#[derive(Clone)]
pub struct ProvisioningRequest {
    /// External id, used as the username.
    pub external_id: String,
    /// Provider id recorded as the account's federation link.
    pub federation_link: String,
    /// Role to grant, if resolved.
    pub role: Option<Role>,
    /// Attributes to set.
    pub attributes: BTreeMap<String, String>,
    /// Password to register, if any.
    pub password: Option<String>,
}

impl ProvisioningRequest {
    /// Creates a request with no role, attributes, or credential.
    #[must_use]
    pub fn new(external_id: impl Into<String>, federation_link: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            federation_link: federation_link.into(),
            role: None,
            attributes: BTreeMap::new(),
            password: None,
        }
    }

    /// Sets the role to grant.
    #[must_use]
    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    /// Sets the attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the password to register.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("external_id", &self.external_id)
            .field("federation_link", &self.federation_link)
            .field("role", &self.role.as_ref().map(|r| &r.name))
            .field("attributes", &self.attributes)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Outcome of a materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// A new account was created.
    Created(User),
    /// An account linked to the same provider already existed.
    Existing(User),
    /// A local account with the same username belongs to another provider,
    /// or to none. It was left untouched.
    Unlinked(User),
}

impl Provisioned {
    /// Returns the account.
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::Created(user) | Self::Existing(user) | Self::Unlinked(user) => user,
        }
    }

    /// Consumes the outcome, returning the account.
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            Self::Created(user) | Self::Existing(user) | Self::Unlinked(user) => user,
        }
    }

    /// Checks if a new account was created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Checks if the account is owned by the requesting provider.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        !matches!(self, Self::Unlinked(_))
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Looks up the default role by name.
///
/// A missing role is not an error; the account is provisioned without it.
///
/// ## Errors
///
/// Returns `FederationError::Storage` if the lookup itself fails.
pub async fn resolve_default_role(
    session: &dyn StorageSession,
    realm_id: Uuid,
    name: Option<&str>,
) -> FederationResult<Option<Role>> {
    let Some(name) = name else {
        return Ok(None);
    };

    let role = session.roles().get_realm_role_by_name(realm_id, name).await?;
    if role.is_none() {
        tracing::warn!(
            realm_id = %realm_id,
            role = name,
            "Default federation role not found, provisioning without it"
        );
    }
    Ok(role)
}

/// Materializes a local account for `request.external_id`.
///
/// An account that already exists under the same username is not
/// recreated. If it is linked to `request.federation_link` it is returned as
/// [`Provisioned::Existing`], and the requested password is registered when
/// the account has none yet. Any other account is returned as
/// [`Provisioned::Unlinked`] and nothing is written.
///
/// ## Errors
///
/// Returns `FederationError::Provisioning` on the first failing step. The
/// remaining steps are skipped and the caller must roll back the session.
pub async fn materialize(
    session: &dyn StorageSession,
    realm_id: Uuid,
    request: &ProvisioningRequest,
) -> FederationResult<Provisioned> {
    let fail = |source: StorageError| FederationError::provisioning(&request.external_id, source);
    let users = session.users();

    if let Some(existing) = users
        .get_by_username(realm_id, &request.external_id)
        .await
        .map_err(fail)?
    {
        if existing.federation_link.as_deref() != Some(request.federation_link.as_str()) {
            tracing::warn!(
                external_id = %request.external_id,
                user_id = %existing.id,
                federation_link = existing.federation_link.as_deref(),
                "Local account with this username is not linked to the provider"
            );
            return Ok(Provisioned::Unlinked(existing));
        }

        if let Some(password) = &request.password {
            let credentials = session.credentials();
            if credentials
                .get_password(realm_id, existing.id)
                .await
                .map_err(fail)?
                .is_none()
            {
                let credential = Credential::new_password(existing.id, realm_id, password);
                credentials.create(&credential).await.map_err(fail)?;
                tracing::debug!(
                    external_id = %request.external_id,
                    user_id = %existing.id,
                    "Registered password on existing account"
                );
            }
        }

        tracing::debug!(
            external_id = %request.external_id,
            user_id = %existing.id,
            "Account already materialized"
        );
        return Ok(Provisioned::Existing(existing));
    }

    let mut user =
        User::new(realm_id, &request.external_id).with_federation_link(&request.federation_link);
    users.create(&user).await.map_err(fail)?;

    if let Some(role) = &request.role {
        users
            .grant_role(realm_id, user.id, role.id)
            .await
            .map_err(fail)?;
    }

    user.enabled = true;
    for (name, value) in &request.attributes {
        user.set_single_attribute(name, value);
    }
    users.update(&user).await.map_err(fail)?;

    if let Some(password) = &request.password {
        let credential = Credential::new_password(user.id, realm_id, password);
        session
            .credentials()
            .create(&credential)
            .await
            .map_err(fail)?;
    }

    tracing::debug!(
        external_id = %request.external_id,
        user_id = %user.id,
        role = request.role.as_ref().map(|r| r.name.as_str()),
        "Account materialized"
    );
    Ok(Provisioned::Created(user))
}
