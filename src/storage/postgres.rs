// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PostgreSQL implementation of the storage interface (sqlx).
//!
//! Every statement is parameterized. Transactions hold a pooled connection
//! for their whole lifetime; sqlx rolls them back when they are dropped
//! without a commit, so a cancelled request never leaves one open.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::database::{
    Database, PetAttribute, PetAttributeKind, PetRecord, PetRow, Transaction, UserRecord, UserRow,
};
use super::{StorageError, StorageResult};
use crate::models::{
    CreatePetRequest, CreateUserRequest, Notifications, PetAggressionLevel, PetAllergy,
    PetAttributes, PetBehavior, PetBreed, PetInteraction, PetPersonality, PetReactivity,
    Subscription, UpdateNotificationsRequest, UpdatePetRequest, UpdateSubscriptionRequest,
    UpdateUserRequest, UserPetLink,
};

const SELECT_USER: &str = r#"
    SELECT u.id, u.external_id, u.name, u.gender, u.timezone, u.has_onboarded,
           s.subscription_type, s.is_trial_mode, s.trial_start_date,
           n.enabled, n.is_registered, n.daily_enabled, n.playtime_enabled
    FROM users u
    JOIN user_subscriptions s ON s.user_id = u.id
    JOIN user_notifications n ON n.user_id = u.id
    WHERE u.id = $1
"#;

// `$2` narrows the result to a single pet when it is not NULL.
const SELECT_PETS: &str = r#"
    SELECT p.id, p.name, p.birthday, p.photo_url, p.gender, p.size, p.weight,
           COALESCE(a.is_sterilized, FALSE) AS is_sterilized,
           l.is_dog_owner, l.is_dog_sitter,
           ARRAY(SELECT v.aggression_level FROM pet_attr_aggression_levels v
                 WHERE v.pet_attr_id = a.id ORDER BY v.aggression_level) AS aggression_levels,
           ARRAY(SELECT v.allergy FROM pet_attr_allergies v
                 WHERE v.pet_attr_id = a.id ORDER BY v.allergy) AS allergies,
           ARRAY(SELECT v.behavior FROM pet_attr_behaviors v
                 WHERE v.pet_attr_id = a.id ORDER BY v.behavior) AS behaviors,
           ARRAY(SELECT v.breed FROM pet_attr_breeds v
                 WHERE v.pet_attr_id = a.id ORDER BY v.breed) AS breeds,
           ARRAY(SELECT v.interaction FROM pet_attr_interactions v
                 WHERE v.pet_attr_id = a.id ORDER BY v.interaction) AS interactions,
           ARRAY(SELECT v.personality FROM pet_attr_personalities v
                 WHERE v.pet_attr_id = a.id ORDER BY v.personality) AS personalities,
           ARRAY(SELECT v.reactivity FROM pet_attr_reactivities v
                 WHERE v.pet_attr_id = a.id ORDER BY v.reactivity) AS reactivities
    FROM pets p
    JOIN users_pets_link l ON l.pet_id = p.id
    LEFT JOIN pet_attrs a ON a.pet_id = p.id
    WHERE l.user_id = $1 AND ($2::uuid IS NULL OR p.id = $2)
    ORDER BY p.created_at, p.id
"#;

#[derive(sqlx::FromRow)]
struct UserJoinRow {
    #[sqlx(flatten)]
    user: UserRow,
    #[sqlx(flatten)]
    subscription: Subscription,
    #[sqlx(flatten)]
    notifications: Notifications,
}

#[derive(sqlx::FromRow)]
struct PetJoinRow {
    #[sqlx(flatten)]
    pet: PetRow,
    is_sterilized: bool,
    is_dog_owner: bool,
    is_dog_sitter: bool,
    aggression_levels: Vec<PetAggressionLevel>,
    allergies: Vec<PetAllergy>,
    behaviors: Vec<PetBehavior>,
    breeds: Vec<PetBreed>,
    interactions: Vec<PetInteraction>,
    personalities: Vec<PetPersonality>,
    reactivities: Vec<PetReactivity>,
}

impl From<PetJoinRow> for PetRecord {
    fn from(row: PetJoinRow) -> Self {
        PetRecord {
            pet: row.pet,
            attributes: PetAttributes {
                aggression_levels: row.aggression_levels,
                allergies: row.allergies,
                behaviors: row.behaviors,
                breeds: row.breeds,
                interactions: row.interactions,
                personalities: row.personalities,
                reactivities: row.reactivities,
                is_sterilized: row.is_sterilized,
            },
            link: UserPetLink {
                is_dog_owner: row.is_dog_owner,
                is_dog_sitter: row.is_dog_sitter,
            },
        }
    }
}

/// Association table and value column for an attribute category.
fn attribute_table(kind: PetAttributeKind) -> (&'static str, &'static str) {
    match kind {
        PetAttributeKind::AggressionLevel => ("pet_attr_aggression_levels", "aggression_level"),
        PetAttributeKind::Allergy => ("pet_attr_allergies", "allergy"),
        PetAttributeKind::Behavior => ("pet_attr_behaviors", "behavior"),
        PetAttributeKind::Breed => ("pet_attr_breeds", "breed"),
        PetAttributeKind::Interaction => ("pet_attr_interactions", "interaction"),
        PetAttributeKind::Personality => ("pet_attr_personalities", "personality"),
        PetAttributeKind::Reactivity => ("pet_attr_reactivities", "reactivity"),
    }
}

/// PostgreSQL-backed [`Database`].
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn select_pets(
        &self,
        user_id: Uuid,
        pet_id: Option<Uuid>,
    ) -> StorageResult<Vec<PetRecord>> {
        let rows = sqlx::query_as::<_, PetJoinRow>(SELECT_PETS)
            .bind(user_id)
            .bind(pet_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx("select pets", e))?;
        Ok(rows.into_iter().map(PetRecord::from).collect())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> StorageResult<Box<dyn Transaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::from_sqlx("begin transaction", e))?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn internal_id(&self, external_id: &str) -> StorageResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx("lookup internal id", e))
    }

    async fn user(&self, user_id: Uuid) -> StorageResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserJoinRow>(SELECT_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx("select user", e))?;

        Ok(row.map(|row| UserRecord {
            user: row.user,
            subscription: row.subscription,
            notifications: row.notifications,
        }))
    }

    async fn delete_user(&self, user_id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx("delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<Option<PetRecord>> {
        Ok(self.select_pets(user_id, Some(pet_id)).await?.into_iter().next())
    }

    async fn pets_for_user(&self, user_id: Uuid) -> StorageResult<Vec<PetRecord>> {
        self.select_pets(user_id, None).await
    }

    async fn delete_pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"DELETE FROM pets p
               WHERE p.id = $1
                 AND EXISTS (SELECT 1 FROM users_pets_link l
                             WHERE l.pet_id = p.id AND l.user_id = $2)"#,
        )
        .bind(pet_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_sqlx("delete pet", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx("ping", e))?;
        Ok(())
    }
}

/// A PostgreSQL transaction. Dropping it without committing rolls it back.
struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn insert_user(
        &mut self,
        external_id: &str,
        user: &CreateUserRequest,
    ) -> StorageResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO users (external_id, name, gender, timezone, has_onboarded)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, external_id, name, gender, timezone, has_onboarded"#,
        )
        .bind(external_id)
        .bind(&user.name)
        .bind(user.gender)
        .bind(&user.timezone)
        .bind(user.has_onboarded)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("insert user", e))
    }

    async fn insert_subscription(
        &mut self,
        user_id: Uuid,
        subscription: &Subscription,
    ) -> StorageResult<Subscription> {
        sqlx::query_as::<_, Subscription>(
            r#"INSERT INTO user_subscriptions
                   (user_id, subscription_type, is_trial_mode, trial_start_date)
               VALUES ($1, $2, $3, $4)
               RETURNING subscription_type, is_trial_mode, trial_start_date"#,
        )
        .bind(user_id)
        .bind(subscription.subscription_type)
        .bind(subscription.is_trial_mode)
        .bind(subscription.trial_start_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("insert subscription", e))
    }

    async fn insert_notifications(
        &mut self,
        user_id: Uuid,
        notifications: &Notifications,
    ) -> StorageResult<Notifications> {
        sqlx::query_as::<_, Notifications>(
            r#"INSERT INTO user_notifications
                   (user_id, enabled, is_registered, daily_enabled, playtime_enabled)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING enabled, is_registered, daily_enabled, playtime_enabled"#,
        )
        .bind(user_id)
        .bind(notifications.enabled)
        .bind(notifications.is_registered)
        .bind(notifications.daily_enabled)
        .bind(notifications.playtime_enabled)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("insert notifications", e))
    }

    async fn insert_pet(&mut self, pet: &CreatePetRequest) -> StorageResult<PetRow> {
        sqlx::query_as::<_, PetRow>(
            r#"INSERT INTO pets (name, birthday, photo_url, gender, size, weight)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, name, birthday, photo_url, gender, size, weight"#,
        )
        .bind(&pet.name)
        .bind(pet.birthday)
        .bind(&pet.photo_url)
        .bind(pet.gender)
        .bind(pet.size)
        .bind(pet.weight)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("insert pet", e))
    }

    async fn insert_pet_attributes(
        &mut self,
        pet_id: Uuid,
        is_sterilized: bool,
    ) -> StorageResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO pet_attrs (pet_id, is_sterilized) VALUES ($1, $2) RETURNING id",
        )
        .bind(pet_id)
        .bind(is_sterilized)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("insert pet attributes", e))
    }

    async fn insert_pet_attribute(
        &mut self,
        pet_attr_id: Uuid,
        attribute: PetAttribute,
    ) -> StorageResult<()> {
        let (table, column) = attribute_table(attribute.kind());
        let sql = format!("INSERT INTO {table} (pet_attr_id, {column}) VALUES ($1, $2)");

        let query = sqlx::query(&sql).bind(pet_attr_id);
        let query = match attribute {
            PetAttribute::AggressionLevel(value) => query.bind(value),
            PetAttribute::Allergy(value) => query.bind(value),
            PetAttribute::Behavior(value) => query.bind(value),
            PetAttribute::Breed(value) => query.bind(value),
            PetAttribute::Interaction(value) => query.bind(value),
            PetAttribute::Personality(value) => query.bind(value),
            PetAttribute::Reactivity(value) => query.bind(value),
        };

        query
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StorageError::from_sqlx(table, e))?;
        Ok(())
    }

    async fn link_pet_to_user(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        link: UserPetLink,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"INSERT INTO users_pets_link (user_id, pet_id, is_dog_owner, is_dog_sitter)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(user_id)
        .bind(pet_id)
        .bind(link.is_dog_owner)
        .bind(link.is_dog_sitter)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("link pet to user", e))?;
        Ok(())
    }

    async fn update_user(
        &mut self,
        user_id: Uuid,
        update: &UpdateUserRequest,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"UPDATE users
               SET name = COALESCE($2, name),
                   gender = COALESCE($3, gender),
                   timezone = COALESCE($4, timezone),
                   has_onboarded = COALESCE($5, has_onboarded),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(user_id)
        .bind(update.name.as_deref())
        .bind(update.gender)
        .bind(update.timezone.as_deref())
        .bind(update.has_onboarded)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("update user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_subscription(
        &mut self,
        user_id: Uuid,
        update: &UpdateSubscriptionRequest,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"UPDATE user_subscriptions
               SET subscription_type = COALESCE($2, subscription_type),
                   is_trial_mode = COALESCE($3, is_trial_mode),
                   trial_start_date = COALESCE($4, trial_start_date)
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(update.subscription_type)
        .bind(update.is_trial_mode)
        .bind(update.trial_start_date)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("update subscription", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_notifications(
        &mut self,
        user_id: Uuid,
        update: &UpdateNotificationsRequest,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"UPDATE user_notifications
               SET enabled = COALESCE($2, enabled),
                   is_registered = COALESCE($3, is_registered),
                   daily_enabled = COALESCE($4, daily_enabled),
                   playtime_enabled = COALESCE($5, playtime_enabled)
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(update.enabled)
        .bind(update.is_registered)
        .bind(update.daily_enabled)
        .bind(update.playtime_enabled)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("update notifications", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_pet(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        update: &UpdatePetRequest,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"UPDATE pets p
               SET name = COALESCE($3, p.name),
                   birthday = COALESCE($4, p.birthday),
                   photo_url = COALESCE($5, p.photo_url),
                   gender = COALESCE($6, p.gender),
                   size = COALESCE($7, p.size),
                   weight = COALESCE($8, p.weight),
                   updated_at = NOW()
               WHERE p.id = $1
                 AND EXISTS (SELECT 1 FROM users_pets_link l
                             WHERE l.pet_id = p.id AND l.user_id = $2)"#,
        )
        .bind(pet_id)
        .bind(user_id)
        .bind(update.name.as_deref())
        .bind(update.birthday)
        .bind(update.photo_url.as_deref())
        .bind(update.gender)
        .bind(update.size)
        .bind(update.weight)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("update pet", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn pet_attributes_id(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
    ) -> StorageResult<Option<Uuid>> {
        // Locks the row so concurrent replacements of the same pet serialize.
        sqlx::query_scalar::<_, Uuid>(
            r#"SELECT a.id FROM pet_attrs a
               JOIN users_pets_link l ON l.pet_id = a.pet_id
               WHERE a.pet_id = $1 AND l.user_id = $2
               FOR UPDATE OF a"#,
        )
        .bind(pet_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| StorageError::from_sqlx("select pet attributes", e))
    }

    async fn set_sterilized(
        &mut self,
        pet_attr_id: Uuid,
        is_sterilized: bool,
    ) -> StorageResult<()> {
        sqlx::query("UPDATE pet_attrs SET is_sterilized = $2 WHERE id = $1")
            .bind(pet_attr_id)
            .bind(is_sterilized)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StorageError::from_sqlx("update pet attributes", e))?;
        Ok(())
    }

    async fn clear_pet_attributes(
        &mut self,
        pet_attr_id: Uuid,
        kind: PetAttributeKind,
    ) -> StorageResult<()> {
        let (table, _) = attribute_table(kind);
        let sql = format!("DELETE FROM {table} WHERE pet_attr_id = $1");
        sqlx::query(&sql)
            .bind(pet_attr_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StorageError::from_sqlx(table, e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| StorageError::from_sqlx("commit", e))
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StorageError::from_sqlx("rollback", e))
    }
}
