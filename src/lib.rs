// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dogy API - Pet Owner Backend
//!
//! REST service behind the Dogy mobile app. Callers authenticate with
//! Clerk-issued RS256 JWTs; user profiles and pets live in PostgreSQL.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification and identity resolution
//! - `config` - Environment configuration
//! - `storage` - PostgreSQL storage and transactional repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
