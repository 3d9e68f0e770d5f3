// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! A user is three rows: `users`, `user_subscriptions` and
//! `user_notifications`. They are created together or not at all, and each
//! can be updated on its own.

use uuid::Uuid;

use super::{finish, matched};
use crate::models::{
    CreateUserRequest, Notifications, Subscription, UpdateNotificationsRequest,
    UpdateSubscriptionRequest, UpdateUserRequest, UserResponse,
};
use crate::storage::database::{Database, Transaction, UserRecord, UserRow};
use crate::storage::{StorageError, StorageResult};

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        compose(record.user, record.subscription, record.notifications)
    }
}

fn compose(
    user: UserRow,
    subscription: Subscription,
    notifications: Notifications,
) -> UserResponse {
    UserResponse {
        external_id: user.external_id,
        user: CreateUserRequest {
            name: user.name,
            gender: user.gender,
            has_onboarded: user.has_onboarded,
            timezone: user.timezone,
            notifications,
            subscription,
        },
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Create a user with its subscription and notifications.
    ///
    /// Returns [`StorageError::Conflict`] if `external_id` is already taken.
    /// The response is built from the inserted rows.
    pub async fn create(
        &self,
        external_id: &str,
        request: &CreateUserRequest,
    ) -> StorageResult<UserResponse> {
        let mut tx = self.db.begin().await?;
        let result = insert_user(tx.as_mut(), external_id, request).await;
        let response = finish(tx, result).await?;

        tracing::info!(external_id, "user created");
        Ok(response)
    }

    /// Get a user by internal id.
    pub async fn get(&self, user_id: Uuid) -> StorageResult<UserResponse> {
        self.db
            .user(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| StorageError::NotFound("User".to_string()))
    }

    /// Update the base fields of a user.
    pub async fn update(
        &self,
        user_id: Uuid,
        update: &UpdateUserRequest,
    ) -> StorageResult<UserResponse> {
        let mut tx = self.db.begin().await?;
        let result = tx.update_user(user_id, update).await;
        finish(tx, result.and_then(|found| matched(found, "User"))).await?;

        tracing::info!(%user_id, "user updated");
        self.get(user_id).await
    }

    pub async fn update_subscription(
        &self,
        user_id: Uuid,
        update: &UpdateSubscriptionRequest,
    ) -> StorageResult<UserResponse> {
        let mut tx = self.db.begin().await?;
        let result = tx.update_subscription(user_id, update).await;
        finish(tx, result.and_then(|found| matched(found, "User"))).await?;

        tracing::info!(%user_id, "user subscription updated");
        self.get(user_id).await
    }

    pub async fn update_notifications(
        &self,
        user_id: Uuid,
        update: &UpdateNotificationsRequest,
    ) -> StorageResult<UserResponse> {
        let mut tx = self.db.begin().await?;
        let result = tx.update_notifications(user_id, update).await;
        finish(tx, result.and_then(|found| matched(found, "User"))).await?;

        tracing::info!(%user_id, "user notifications updated");
        self.get(user_id).await
    }

    /// Delete a user. Subscription, notifications and pet links cascade.
    pub async fn delete(&self, user_id: Uuid) -> StorageResult<()> {
        if !self.db.delete_user(user_id).await? {
            return Err(StorageError::NotFound("User".to_string()));
        }
        tracing::info!(%user_id, "user deleted");
        Ok(())
    }
}

async fn insert_user(
    tx: &mut dyn Transaction,
    external_id: &str,
    request: &CreateUserRequest,
) -> StorageResult<UserResponse> {
    let user = tx.insert_user(external_id, request).await?;
    let subscription = tx.insert_subscription(user.id, &request.subscription).await?;
    let notifications = tx.insert_notifications(user.id, &request.notifications).await?;
    Ok(compose(user, subscription, notifications))
}
