// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the request-scoped identities derived from them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from a Clerk JWT.
///
/// Only `exp` is mandatory at decode time. An absent `sub` decodes as an
/// empty string and is rejected by the middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DogyClaims {
    /// Subject: the external user identifier
    #[serde(default)]
    pub sub: String,

    /// Application role, if the identity provider sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Clerk session ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Role claim value that may act on other users' records.
pub const ADMIN_ROLE: &str = "admin";

/// Caller authenticated by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// External identifier (the `sub` claim)
    pub user_id: String,

    pub role: Option<String>,

    pub session_id: Option<String>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: DogyClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            session_id: claims.sid,
        }
    }

    /// Whether the role claim is [`ADMIN_ROLE`] (case-insensitive).
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE))
    }
}

/// Internal user id resolved from an external identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_carries_subject_and_role() {
        let claims: DogyClaims = serde_json::from_value(serde_json::json!({
            "sub": "user_123",
            "role": "sitter",
            "exp": 1700003600,
            "sid": "sess_abc"
        }))
        .unwrap();

        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role.as_deref(), Some("sitter"));
        assert_eq!(user.session_id.as_deref(), Some("sess_abc"));
    }

    #[test]
    fn only_the_admin_role_is_admin() {
        let mut user = AuthenticatedUser {
            user_id: "user_123".into(),
            role: None,
            session_id: None,
        };
        assert!(!user.is_admin());
        user.role = Some("sitter".into());
        assert!(!user.is_admin());
        user.role = Some("Admin".into());
        assert!(user.is_admin());
    }

    #[test]
    fn missing_subject_decodes_as_empty() {
        let claims: DogyClaims =
            serde_json::from_value(serde_json::json!({ "exp": 1700003600 })).unwrap();
        assert!(claims.sub.is_empty());
        assert!(claims.role.is_none());
    }
}
