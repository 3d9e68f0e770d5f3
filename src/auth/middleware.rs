// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and identity resolution middleware for Axum.
//!
//! ```rust,ignore
//! let users = post(create_user).layer(from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! - [`require_auth`] checks the bearer token and stores an
//!   [`AuthenticatedUser`] in the request extensions.
//! - [`resolve_identity`] and [`resolve_caller`] run after it and store the
//!   target's internal id as a [`ResolvedIdentity`]. A path id naming another
//!   user is only honoured for admin callers.

use axum::{
    extract::{RawPathParams, Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    RequestExt,
};

use super::claims::{AuthenticatedUser, ResolvedIdentity};
use super::error::{AuthError, VerifyError};
use super::verifier::TokenVerifier;
use crate::error::ApiError;
use crate::state::AppState;

pub const USER_NOT_FOUND_MESSAGE: &str = "User internal ID not found on the database.";
pub const USER_LOOKUP_FAILED_MESSAGE: &str = "Failed to get user ID.";

/// Path parameter holding an external identifier on lookup-by-id routes.
const ID_PARAM: &str = "id";

/// Parse the `Authorization` header and verify its bearer token.
pub fn authenticate(
    verifier: &TokenVerifier,
    header: Option<&HeaderValue>,
) -> Result<AuthenticatedUser, AuthError> {
    let raw = match header {
        None => return Err(AuthError::EmptyToken),
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidToken)?,
    };
    if raw.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    let parts: Vec<&str> = raw.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::InvalidToken);
    };
    if *scheme != "Bearer" {
        return Err(AuthError::InvalidAuthType);
    }

    let claims = verifier.verify(token).inspect_err(|reason| {
        tracing::warn!(%reason, "token verification failed");
    })?;
    if claims.sub.is_empty() {
        return Err(VerifyError::MissingSubject.into());
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

/// Reject requests without a valid bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(&state.verifier, request.headers().get(AUTHORIZATION)) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %user.user_id, "authenticated");
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Resolve the `{id}` path parameter, or the caller when there is none, to
/// an internal user id.
///
/// Non-admin callers may only name themselves. Any other id answers like an
/// unknown one, so the response does not reveal whether it exists.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path_id = request
        .extract_parts::<RawPathParams>()
        .await
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == ID_PARAM)
                .map(|(_, value)| value.to_string())
        })
        .filter(|id| !id.is_empty());

    let Some(caller) = request.extensions().get::<AuthenticatedUser>() else {
        return AuthError::EmptyToken.into_response();
    };
    let external_id = match path_id {
        Some(id) if id != caller.user_id && !caller.is_admin() => {
            tracing::warn!(caller = %caller.user_id, target = %id, "cross-user access denied");
            return ApiError::not_found(USER_NOT_FOUND_MESSAGE).into_response();
        }
        Some(id) => id,
        None => caller.user_id.clone(),
    };
    resolve(&state, external_id, request, next).await
}

/// Resolve the authenticated caller to an internal user id, ignoring the path.
pub async fn resolve_caller(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let external_id = match caller_id(&request) {
        Some(id) => id,
        None => return AuthError::EmptyToken.into_response(),
    };
    resolve(&state, external_id, request, next).await
}

fn caller_id(request: &Request) -> Option<String> {
    request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id.clone())
}

async fn resolve(state: &AppState, external_id: String, mut request: Request, next: Next) -> Response {
    match state.db.internal_id(&external_id).await {
        Ok(Some(user_id)) if !user_id.is_nil() => {
            request
                .extensions_mut()
                .insert(ResolvedIdentity { user_id });
            next.run(request).await
        }
        Ok(_) => {
            tracing::debug!(%external_id, "no user for external id");
            ApiError::not_found(USER_NOT_FOUND_MESSAGE).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, %external_id, "internal id lookup failed");
            ApiError::internal(USER_LOOKUP_FAILED_MESSAGE).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verifier::tests::{claims_for, sign, PUBLIC_KEY};

    fn verifier() -> TokenVerifier {
        TokenVerifier::from_pem(PUBLIC_KEY.as_bytes()).unwrap()
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn valid_bearer_token_authenticates() {
        let token = sign(&claims_for("user_123"));
        let user = authenticate(&verifier(), Some(&header(&format!("Bearer {token}")))).unwrap();
        assert_eq!(user.user_id, "user_123");
    }

    #[test]
    fn missing_or_empty_header_is_empty_token() {
        assert_eq!(authenticate(&verifier(), None), Err(AuthError::EmptyToken));
        assert_eq!(
            authenticate(&verifier(), Some(&header(""))),
            Err(AuthError::EmptyToken)
        );
    }

    #[test]
    fn header_must_have_exactly_two_parts() {
        let token = sign(&claims_for("user_123"));
        for value in ["Bearer".to_string(), format!("Bearer {token} extra"), format!("Bearer  {token}")] {
            assert_eq!(
                authenticate(&verifier(), Some(&header(&value))),
                Err(AuthError::InvalidToken),
                "{value}"
            );
        }
    }

    #[test]
    fn scheme_is_case_sensitive() {
        let token = sign(&claims_for("user_123"));
        for scheme in ["bearer", "Basic", "BEARER"] {
            assert_eq!(
                authenticate(&verifier(), Some(&header(&format!("{scheme} {token}")))),
                Err(AuthError::InvalidAuthType)
            );
        }
    }

    #[test]
    fn empty_subject_is_rejected() {
        let token = sign(&claims_for(""));
        assert_eq!(
            authenticate(&verifier(), Some(&header(&format!("Bearer {token}")))),
            Err(AuthError::Verification(VerifyError::MissingSubject))
        );
    }

    #[test]
    fn bad_token_is_a_verification_failure() {
        let err = authenticate(&verifier(), Some(&header("Bearer abc.def.ghi"))).unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
        assert_eq!(err.message(), crate::auth::error::INVALID_TOKEN_MESSAGE);
    }
}
