//! User identity types
//!
//! Accounts themselves live with the identity provider; the catalog only
//! keeps a reference to the borrower and the claims of the current caller.

use serde::{Deserialize, Serialize};

use crate::access::Capability;

/// Identifier of a user account owned by the identity provider
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: UserId,
    /// Superusers hold every capability
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.is_superuser || self.capabilities.contains(&capability)
    }
}

/// The caller of an operation, as supplied by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentUser {
    #[default]
    Anonymous,
    Authenticated(UserClaims),
}

impl CurrentUser {
    pub fn claims(&self) -> Option<&UserClaims> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated(claims) => Some(claims),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.claims().map(|c| c.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims().is_some()
    }
}

impl From<UserClaims> for CurrentUser {
    fn from(claims: UserClaims) -> Self {
        CurrentUser::Authenticated(claims)
    }
}
