// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the identities stored by the auth middleware.
//!
//! ```rust,ignore
//! async fn get_user(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
//!     // user_id is the caller's internal Uuid
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::claims::{AuthenticatedUser, ResolvedIdentity};
use super::error::AuthError;
use super::middleware::USER_LOOKUP_FAILED_MESSAGE;
use crate::error::ApiError;

/// The authenticated caller. Requires [`require_auth`](super::require_auth).
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::EmptyToken)
    }
}

/// Internal id of the resolved user. Requires
/// [`resolve_identity`](super::resolve_identity) or
/// [`resolve_caller`](super::resolve_caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ResolvedIdentity>() {
            Some(identity) => Ok(CurrentUser(identity.user_id)),
            None => {
                tracing::error!("handler reached without identity resolution");
                Err(ApiError::internal(USER_LOOKUP_FAILED_MESSAGE))
            }
        }
    }
}
