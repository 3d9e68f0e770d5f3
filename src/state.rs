// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::storage::Database;

/// Shared handler state: the storage handle and the token verifier.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, verifier: TokenVerifier) -> Self {
        Self {
            db,
            verifier: Arc::new(verifier),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over `db` that trusts tokens signed with the test fixture key.
    pub(crate) fn for_tests(db: crate::storage::MemoryDatabase) -> Self {
        let verifier =
            TokenVerifier::from_pem(crate::auth::verifier::tests::PUBLIC_KEY.as_bytes())
                .expect("fixture public key parses");
        Self::new(Arc::new(db), verifier)
    }
}
