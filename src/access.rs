//! Access policy: maps a caller and a capability to allow or deny

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::user::{CurrentUser, UserClaims},
};

/// Named permission gating an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Renew and mark copies returned, create/update/delete authors and books
    #[serde(rename = "manage-loans")]
    ManageLoans,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageLoans => "manage-loans",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage-loans" => Ok(Capability::ManageLoans),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// Whether `user` may perform operations gated by `capability`
pub fn can(user: &CurrentUser, capability: Capability) -> bool {
    user.claims()
        .map(|claims| claims.has_capability(capability))
        .unwrap_or(false)
}

/// Require a logged-in caller
pub fn require_authenticated(user: &CurrentUser) -> AppResult<&UserClaims> {
    user.claims().ok_or_else(AppError::authentication_required)
}

/// Require a logged-in caller holding `capability`.
///
/// Anonymous callers get `AuthenticationRequired`, others lacking the
/// capability get `Forbidden`.
pub fn require(user: &CurrentUser, capability: Capability) -> AppResult<&UserClaims> {
    let claims = require_authenticated(user)?;
    if claims.has_capability(capability) {
        Ok(claims)
    } else {
        tracing::debug!(user_id = %claims.user_id, %capability, "capability check failed");
        Err(AppError::Forbidden(format!(
            "Missing capability {}",
            capability
        )))
    }
}
