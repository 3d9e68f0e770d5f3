// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer on top of the [`Database`](super::Database) interface.
//!
//! Creates run inside one transaction: the root row first, then every
//! dependent row keyed by the root id. Updates run inside one transaction as
//! well and return the entity as re-read after commit. Any failure rolls the
//! whole unit back and the original error is returned.

pub mod pets;
pub mod users;

pub use pets::PetRepository;
pub use users::UserRepository;

use super::database::Transaction;
use super::{StorageError, StorageResult};

/// Turn an `UPDATE` that matched no row into [`StorageError::NotFound`].
fn matched(found: bool, what: &str) -> StorageResult<()> {
    if found {
        Ok(())
    } else {
        Err(StorageError::NotFound(what.to_string()))
    }
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the
/// original error. A failed rollback is logged; the transaction is gone
/// either way.
async fn finish<T>(tx: Box<dyn Transaction>, result: StorageResult<T>) -> StorageResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
