// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Clerk JWT authentication for the Dogy API.
//!
//! ## Auth Flow
//!
//! 1. The mobile app authenticates the user with Clerk
//! 2. The app sends `Authorization: Bearer <Clerk JWT>`
//! 3. The server:
//!    - Verifies the RS256 signature against the configured public key
//!    - Checks `exp`/`nbf` (and issuer/audience when configured)
//!    - Takes `sub` as the external user id and `role` if present
//!    - Looks up the internal user id for routes that need one
//!
//! ## Security
//!
//! - Only RSA signature algorithms are accepted
//! - Clients only ever see one of three fixed messages
//! - Clock skew tolerance is 60 seconds
//! - A path id naming another user is honoured only for the `admin` role

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod verifier;

pub use claims::{AuthenticatedUser, DogyClaims, ResolvedIdentity, ADMIN_ROLE};
pub use error::{AuthError, VerifyError};
pub use extractor::{Auth, CurrentUser};
pub use middleware::{require_auth, resolve_caller, resolve_identity};
pub use verifier::TokenVerifier;
