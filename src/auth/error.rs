// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every [`AuthError`] becomes a 401 with `WWW-Authenticate: Bearer
//! realm="Restricted"` and one of three fixed messages. The underlying
//! [`VerifyError`] is only logged.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::MessageResponse;

pub const EMPTY_TOKEN_MESSAGE: &str = "Empty token. Please provide a valid token.";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token. Please provide a valid token.";
pub const INVALID_AUTH_TYPE_MESSAGE: &str =
    "Invalid authentication type. Please provide a valid token.";

const WWW_AUTHENTICATE_VALUE: &str = r#"Bearer realm="Restricted""#;

/// Why a token failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The configured public key could not be parsed
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token signature is invalid")]
    BadSignature,

    /// Anything outside the RSA family (HMAC, `none`, ECDSA, ...)
    #[error("token algorithm is not allowed")]
    WrongAlgorithm,

    #[error("token issuer is invalid")]
    InvalidIssuer,

    #[error("token audience is invalid")]
    InvalidAudience,

    #[error("token has no subject")]
    MissingSubject,
}

/// Authentication failure returned to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one
    EmptyToken,
    /// Header is not two space-separated parts
    InvalidToken,
    /// Scheme is not exactly `Bearer`
    InvalidAuthType,
    /// Token did not verify or has no subject
    Verification(VerifyError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// The client-facing message. Verification failures share the generic
    /// invalid token message.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::EmptyToken => EMPTY_TOKEN_MESSAGE,
            AuthError::InvalidAuthType => INVALID_AUTH_TYPE_MESSAGE,
            AuthError::InvalidToken | AuthError::Verification(_) => INVALID_TOKEN_MESSAGE,
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        AuthError::Verification(err)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Verification(reason) => write!(f, "token verification failed: {reason}"),
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "request rejected by auth");
        let mut response =
            (self.status_code(), Json(MessageResponse::new(self.message()))).into_response();
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static(WWW_AUTHENTICATE_VALUE),
        );
        response
    }
}
