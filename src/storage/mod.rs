// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Relational storage for users and pets.
//!
//! ## Layout
//!
//! ```text
//! users ──┬── user_subscriptions      (1:1, cascade)
//!         ├── user_notifications      (1:1, cascade)
//!         └── users_pets_link ── pets (n:m, owner/sitter flags)
//!                                  └── pet_attrs (1:1, cascade)
//!                                        └── pet_attr_* (seven category tables)
//! ```
//!
//! ## Layers
//!
//! - [`Database`] / [`Transaction`]: the narrow driver interface
//! - [`PgDatabase`]: sqlx/PostgreSQL implementation
//! - [`MemoryDatabase`]: in-process implementation backing the tests
//! - [`repository`]: transactional orchestration used by the handlers

pub mod database;
pub mod error;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use database::{Database, PetAttribute, PetAttributeKind, PetRecord, Transaction, UserRecord};
pub use error::{StorageError, StorageResult};
pub use memory::{FailPoint, MemoryDatabase, TableCounts};
pub use pool::{create_pool, run_migrations};
pub use postgres::PgDatabase;
pub use repository::{PetRepository, UserRepository};
