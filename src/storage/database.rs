// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Narrow storage interface used by the repositories.
//!
//! The repositories orchestrate multi-row writes against these traits only,
//! so the transactional protocol does not depend on a particular driver.
//! [`PgDatabase`](super::PgDatabase) is the production implementation and
//! [`MemoryDatabase`](super::MemoryDatabase) backs the tests.
//!
//! A [`Transaction`] that is dropped without [`Transaction::commit`] must
//! discard every write it staged.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::StorageResult;
use crate::models::{
    CreatePetRequest, CreateUserRequest, Gender, Notifications, PetAggressionLevel, PetAllergy,
    PetAttributes, PetBehavior, PetBreed, PetInteraction, PetPersonality, PetReactivity, PetSize,
    Subscription, UpdateNotificationsRequest, UpdatePetAttributesRequest, UpdatePetRequest,
    UpdateSubscriptionRequest, UpdateUserRequest, UserPetLink,
};

/// Base row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub gender: Gender,
    pub timezone: String,
    pub has_onboarded: bool,
}

/// A user with its subscription and notification rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: UserRow,
    pub subscription: Subscription,
    pub notifications: Notifications,
}

/// Base row of the `pets` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PetRow {
    pub id: Uuid,
    pub name: String,
    pub birthday: NaiveDate,
    pub photo_url: String,
    pub gender: Gender,
    pub size: PetSize,
    pub weight: Decimal,
}

/// A pet with its attributes and the reading user's link flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetRecord {
    pub pet: PetRow,
    pub attributes: PetAttributes,
    pub link: UserPetLink,
}

/// One value of one attribute category, i.e. one association row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetAttribute {
    AggressionLevel(PetAggressionLevel),
    Allergy(PetAllergy),
    Behavior(PetBehavior),
    Breed(PetBreed),
    Interaction(PetInteraction),
    Personality(PetPersonality),
    Reactivity(PetReactivity),
}

/// Attribute category, i.e. one association table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetAttributeKind {
    AggressionLevel,
    Allergy,
    Behavior,
    Breed,
    Interaction,
    Personality,
    Reactivity,
}

impl PetAttribute {
    pub fn kind(&self) -> PetAttributeKind {
        match self {
            Self::AggressionLevel(_) => PetAttributeKind::AggressionLevel,
            Self::Allergy(_) => PetAttributeKind::Allergy,
            Self::Behavior(_) => PetAttributeKind::Behavior,
            Self::Breed(_) => PetAttributeKind::Breed,
            Self::Interaction(_) => PetAttributeKind::Interaction,
            Self::Personality(_) => PetAttributeKind::Personality,
            Self::Reactivity(_) => PetAttributeKind::Reactivity,
        }
    }

    /// The categories `update` replaces, each with its new values.
    pub fn replacements(
        update: &UpdatePetAttributesRequest,
    ) -> Vec<(PetAttributeKind, Vec<PetAttribute>)> {
        fn replace<T: Copy>(
            out: &mut Vec<(PetAttributeKind, Vec<PetAttribute>)>,
            kind: PetAttributeKind,
            values: &Option<Vec<T>>,
            wrap: fn(T) -> PetAttribute,
        ) {
            if let Some(values) = values {
                out.push((kind, values.iter().copied().map(wrap).collect()));
            }
        }

        use PetAttributeKind as K;
        let mut out = Vec::new();
        replace(&mut out, K::AggressionLevel, &update.aggression_levels, Self::AggressionLevel);
        replace(&mut out, K::Allergy, &update.allergies, Self::Allergy);
        replace(&mut out, K::Behavior, &update.behaviors, Self::Behavior);
        replace(&mut out, K::Breed, &update.breeds, Self::Breed);
        replace(&mut out, K::Interaction, &update.interactions, Self::Interaction);
        replace(&mut out, K::Personality, &update.personalities, Self::Personality);
        replace(&mut out, K::Reactivity, &update.reactivities, Self::Reactivity);
        out
    }

    /// Flatten every category list of `attributes` into association values.
    ///
    /// Categories come out in a fixed order; values keep their request order.
    pub fn collect(attributes: &PetAttributes) -> Vec<PetAttribute> {
        let mut values = Vec::new();
        values.extend(attributes.aggression_levels.iter().copied().map(Self::AggressionLevel));
        values.extend(attributes.allergies.iter().copied().map(Self::Allergy));
        values.extend(attributes.breeds.iter().copied().map(Self::Breed));
        values.extend(attributes.behaviors.iter().copied().map(Self::Behavior));
        values.extend(attributes.interactions.iter().copied().map(Self::Interaction));
        values.extend(attributes.personalities.iter().copied().map(Self::Personality));
        values.extend(attributes.reactivities.iter().copied().map(Self::Reactivity));
        values
    }

    /// Add this value to the matching list of `attributes`.
    pub fn apply_to(self, attributes: &mut PetAttributes) {
        match self {
            Self::AggressionLevel(v) => attributes.aggression_levels.push(v),
            Self::Allergy(v) => attributes.allergies.push(v),
            Self::Behavior(v) => attributes.behaviors.push(v),
            Self::Breed(v) => attributes.breeds.push(v),
            Self::Interaction(v) => attributes.interactions.push(v),
            Self::Personality(v) => attributes.personalities.push(v),
            Self::Reactivity(v) => attributes.reactivities.push(v),
        }
    }
}

/// Non-transactional access to storage.
#[async_trait]
pub trait Database: Send + Sync {
    /// Start a transaction. Writes become visible only after commit.
    async fn begin(&self) -> StorageResult<Box<dyn Transaction>>;

    /// Internal id of the user with the given external id, if any.
    async fn internal_id(&self, external_id: &str) -> StorageResult<Option<Uuid>>;

    async fn user(&self, user_id: Uuid) -> StorageResult<Option<UserRecord>>;

    /// Delete a user and its dependent rows. Returns `false` if no row matched.
    async fn delete_user(&self, user_id: Uuid) -> StorageResult<bool>;

    /// A pet linked to `user_id`.
    async fn pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<Option<PetRecord>>;

    /// Every pet linked to `user_id`.
    async fn pets_for_user(&self, user_id: Uuid) -> StorageResult<Vec<PetRecord>>;

    /// Delete a pet linked to `user_id`. Returns `false` if no row matched.
    async fn delete_pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<bool>;

    /// Cheap liveness check used by the readiness probe.
    async fn ping(&self) -> StorageResult<()>;
}

/// Writes scoped to a single storage transaction.
#[async_trait]
pub trait Transaction: Send {
    /// Insert the user root row and return it with its generated id.
    async fn insert_user(
        &mut self,
        external_id: &str,
        user: &CreateUserRequest,
    ) -> StorageResult<UserRow>;

    async fn insert_subscription(
        &mut self,
        user_id: Uuid,
        subscription: &Subscription,
    ) -> StorageResult<Subscription>;

    async fn insert_notifications(
        &mut self,
        user_id: Uuid,
        notifications: &Notifications,
    ) -> StorageResult<Notifications>;

    /// Insert the pet root row and return it with its generated id.
    async fn insert_pet(&mut self, pet: &CreatePetRequest) -> StorageResult<PetRow>;

    /// Insert the attributes row of a pet and return its id.
    async fn insert_pet_attributes(&mut self, pet_id: Uuid, is_sterilized: bool)
        -> StorageResult<Uuid>;

    async fn insert_pet_attribute(
        &mut self,
        pet_attr_id: Uuid,
        attribute: PetAttribute,
    ) -> StorageResult<()>;

    async fn link_pet_to_user(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        link: UserPetLink,
    ) -> StorageResult<()>;

    /// Apply the present fields of `update` to the user row.
    /// Returns `false` if no row matched.
    async fn update_user(&mut self, user_id: Uuid, update: &UpdateUserRequest)
        -> StorageResult<bool>;

    async fn update_subscription(
        &mut self,
        user_id: Uuid,
        update: &UpdateSubscriptionRequest,
    ) -> StorageResult<bool>;

    async fn update_notifications(
        &mut self,
        user_id: Uuid,
        update: &UpdateNotificationsRequest,
    ) -> StorageResult<bool>;

    /// Apply the present fields of `update` to a pet linked to `user_id`.
    /// Returns `false` if no such pet exists.
    async fn update_pet(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        update: &UpdatePetRequest,
    ) -> StorageResult<bool>;

    /// Id of the attributes row of a pet linked to `user_id`.
    async fn pet_attributes_id(&mut self, pet_id: Uuid, user_id: Uuid)
        -> StorageResult<Option<Uuid>>;

    async fn set_sterilized(&mut self, pet_attr_id: Uuid, is_sterilized: bool)
        -> StorageResult<()>;

    /// Delete every value of one category from an attributes row.
    async fn clear_pet_attributes(
        &mut self,
        pet_attr_id: Uuid,
        kind: PetAttributeKind,
    ) -> StorageResult<()>;

    async fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discard every staged write. Rolling back an already finished
    /// transaction is a no-op.
    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}
