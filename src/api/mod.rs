//! Guarded entry points for the presentation layer
//!
//! Every handler starts with an explicit access check and only then calls
//! into the (unguarded) services. The embedding web application maps the
//! returned [`AppError`] to a response: a login redirect, 403 or 404.

pub mod authors;
pub mod books;
pub mod index;
pub mod loans;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    access::{self, Capability},
    error::{AppError, AppResult},
    models::user::{CurrentUser, UserClaims},
    AppState,
};

/// Resolves the caller from a `Bearer` token. No header means anonymous.
#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser::Anonymous);
        };

        let rejected = || AppError::authentication_required().with_next(parts.uri.path());

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(rejected)?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            rejected()
        })?;

        Ok(CurrentUser::Authenticated(claims))
    }
}

/// Login required; anonymous callers are sent to log in and come back to `path`
pub(crate) fn login_required<'a>(user: &'a CurrentUser, path: &str) -> AppResult<&'a UserClaims> {
    access::require_authenticated(user).map_err(|e| e.with_next(path))
}

/// Login and `capability` required
pub(crate) fn permission_required<'a>(
    user: &'a CurrentUser,
    capability: Capability,
    path: &str,
) -> AppResult<&'a UserClaims> {
    access::require(user, capability).map_err(|e| e.with_next(path))
}
