// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process implementation of the storage interface.
//!
//! Backs the unit and router tests. It enforces the same constraints as the
//! PostgreSQL schema: unique external ids, one subscription/notifications/
//! attributes row per owner, foreign keys, column widths and cascading
//! deletes.
//!
//! Transactions stage their inserts and updates privately and publish them
//! atomically on commit. A [`FailPoint`] makes one operation fail, which lets
//! tests check that a write leaves nothing behind when a later step breaks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::database::{
    Database, PetAttribute, PetAttributeKind, PetRecord, PetRow, Transaction, UserRecord, UserRow,
};
use super::{StorageError, StorageResult};
use crate::models::{
    CreatePetRequest, CreateUserRequest, Notifications, PetAttributes, Subscription,
    UpdateNotificationsRequest, UpdatePetRequest, UpdateSubscriptionRequest, UpdateUserRequest,
    UserPetLink, MAX_EXTERNAL_ID_LEN, MAX_NAME_LEN, MAX_TIMEZONE_LEN,
};

/// Largest value of a `NUMERIC(5, 2)` column.
const NUMERIC_5_2_MAX: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// Operation that an injected failure is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertUser,
    InsertSubscription,
    InsertNotifications,
    InsertPet,
    InsertPetAttributes,
    InsertPetAttribute,
    LinkPetToUser,
    UpdateUser,
    UpdateSubscription,
    UpdateNotifications,
    UpdatePet,
    UpdatePetAttributes,
    Commit,
}

/// Number of rows per table, for assertions in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub subscriptions: usize,
    pub notifications: usize,
    pub pets: usize,
    pub pet_attrs: usize,
    pub attribute_values: usize,
    pub links: usize,
}

#[derive(Debug, Clone)]
struct StoredPet {
    row: PetRow,
    seq: u64,
}

#[derive(Debug, Clone)]
struct StoredPetAttrs {
    pet_id: Uuid,
    is_sterilized: bool,
}

/// An update staged by a transaction, applied to the shared tables on commit.
#[derive(Debug, Clone)]
enum PendingUpdate {
    User(Uuid, UpdateUserRequest),
    Subscription(Uuid, UpdateSubscriptionRequest),
    Notifications(Uuid, UpdateNotificationsRequest),
    Pet(Uuid, UpdatePetRequest),
    Sterilized(Uuid, bool),
    ClearAttributes(Uuid, PetAttributeKind),
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    subscriptions: HashMap<Uuid, Subscription>,
    notifications: HashMap<Uuid, Notifications>,
    pets: HashMap<Uuid, StoredPet>,
    pet_attrs: HashMap<Uuid, StoredPetAttrs>,
    attribute_values: Vec<(Uuid, PetAttribute)>,
    /// Keyed by `(user_id, pet_id)`.
    links: HashMap<(Uuid, Uuid), UserPetLink>,
    next_seq: u64,
}

impl Tables {
    fn has_external_id(&self, external_id: &str) -> bool {
        self.users.values().any(|u| u.external_id == external_id)
    }

    fn counts(&self) -> TableCounts {
        TableCounts {
            users: self.users.len(),
            subscriptions: self.subscriptions.len(),
            notifications: self.notifications.len(),
            pets: self.pets.len(),
            pet_attrs: self.pet_attrs.len(),
            attribute_values: self.attribute_values.len(),
            links: self.links.len(),
        }
    }

    fn pet_record(&self, pet: &StoredPet, link: UserPetLink) -> PetRecord {
        let mut attributes = PetAttributes::default();
        if let Some((attr_id, attrs)) = self
            .pet_attrs
            .iter()
            .find(|(_, attrs)| attrs.pet_id == pet.row.id)
        {
            attributes.is_sterilized = attrs.is_sterilized;
            for (_, value) in self.attribute_values.iter().filter(|(id, _)| id == attr_id) {
                value.apply_to(&mut attributes);
            }
        }

        PetRecord {
            pet: pet.row.clone(),
            attributes: attributes.normalized(),
            link,
        }
    }

    fn pet_attrs_id(&self, pet_id: Uuid) -> Option<Uuid> {
        self.pet_attrs
            .iter()
            .find(|(_, attrs)| attrs.pet_id == pet_id)
            .map(|(id, _)| *id)
    }

    /// Apply a staged update. Rows deleted in the meantime are skipped, as an
    /// `UPDATE` matching nothing would.
    fn apply(&mut self, update: PendingUpdate) {
        match update {
            PendingUpdate::User(id, update) => {
                if let Some(row) = self.users.get_mut(&id) {
                    if let Some(name) = update.name {
                        row.name = name;
                    }
                    if let Some(gender) = update.gender {
                        row.gender = gender;
                    }
                    if let Some(timezone) = update.timezone {
                        row.timezone = timezone;
                    }
                    if let Some(has_onboarded) = update.has_onboarded {
                        row.has_onboarded = has_onboarded;
                    }
                }
            }
            PendingUpdate::Subscription(id, update) => {
                if let Some(row) = self.subscriptions.get_mut(&id) {
                    if let Some(subscription_type) = update.subscription_type {
                        row.subscription_type = subscription_type;
                    }
                    if let Some(is_trial_mode) = update.is_trial_mode {
                        row.is_trial_mode = is_trial_mode;
                    }
                    if let Some(trial_start_date) = update.trial_start_date {
                        row.trial_start_date = trial_start_date;
                    }
                }
            }
            PendingUpdate::Notifications(id, update) => {
                if let Some(row) = self.notifications.get_mut(&id) {
                    row.enabled = update.enabled.unwrap_or(row.enabled);
                    row.is_registered = update.is_registered.unwrap_or(row.is_registered);
                    row.daily_enabled = update.daily_enabled.unwrap_or(row.daily_enabled);
                    row.playtime_enabled = update.playtime_enabled.unwrap_or(row.playtime_enabled);
                }
            }
            PendingUpdate::Pet(id, update) => {
                if let Some(StoredPet { row, .. }) = self.pets.get_mut(&id) {
                    if let Some(name) = update.name {
                        row.name = name;
                    }
                    if let Some(birthday) = update.birthday {
                        row.birthday = birthday;
                    }
                    if let Some(photo_url) = update.photo_url {
                        row.photo_url = photo_url;
                    }
                    if let Some(gender) = update.gender {
                        row.gender = gender;
                    }
                    if let Some(size) = update.size {
                        row.size = size;
                    }
                    if let Some(weight) = update.weight {
                        row.weight = weight;
                    }
                }
            }
            PendingUpdate::Sterilized(id, is_sterilized) => {
                if let Some(attrs) = self.pet_attrs.get_mut(&id) {
                    attrs.is_sterilized = is_sterilized;
                }
            }
            PendingUpdate::ClearAttributes(id, kind) => {
                self.attribute_values
                    .retain(|(attr_id, value)| !(*attr_id == id && value.kind() == kind));
            }
        }
    }
}

/// Mirror of a `VARCHAR(max)` column: longer values are rejected.
fn fit_varchar(operation: &str, value: &str, max: usize) -> StorageResult<()> {
    if value.chars().count() > max {
        return Err(StorageError::Invalid(format!(
            "{operation}: value too long for type character varying({max})"
        )));
    }
    Ok(())
}

/// Mirror of the `NUMERIC(5, 2) CHECK (weight >= 0)` column.
fn fit_weight(operation: &str, weight: Decimal) -> StorageResult<Decimal> {
    if weight.is_sign_negative() && !weight.is_zero() {
        return Err(StorageError::Constraint(format!(
            "{operation}: weight must not be negative"
        )));
    }
    let mut stored = weight;
    stored.rescale(2);
    if stored > NUMERIC_5_2_MAX {
        return Err(StorageError::Invalid(format!(
            "{operation}: numeric field overflow"
        )));
    }
    Ok(stored)
}

/// In-memory [`Database`].
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
    fail_at: Option<FailPoint>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every transaction started from this handle fail at `point`.
    ///
    /// The returned handle shares its tables with `self`.
    pub fn failing_at(&self, point: FailPoint) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            fail_at: Some(point),
        }
    }

    pub async fn counts(&self) -> TableCounts {
        self.tables.read().await.counts()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> StorageResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            tables: Arc::clone(&self.tables),
            fail_at: self.fail_at,
            staged: Tables::default(),
            pending: Vec::new(),
        }))
    }

    async fn internal_id(&self, external_id: &str) -> StorageResult<Option<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .map(|u| u.id))
    }

    async fn user(&self, user_id: Uuid) -> StorageResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        let record = match (
            tables.users.get(&user_id),
            tables.subscriptions.get(&user_id),
            tables.notifications.get(&user_id),
        ) {
            (Some(user), Some(subscription), Some(notifications)) => Some(UserRecord {
                user: user.clone(),
                subscription: subscription.clone(),
                notifications: notifications.clone(),
            }),
            _ => None,
        };
        Ok(record)
    }

    async fn delete_user(&self, user_id: Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&user_id).is_none() {
            return Ok(false);
        }
        tables.subscriptions.remove(&user_id);
        tables.notifications.remove(&user_id);
        tables.links.retain(|(owner, _), _| *owner != user_id);
        Ok(true)
    }

    async fn pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<Option<PetRecord>> {
        let tables = self.tables.read().await;
        let record = match (tables.links.get(&(user_id, pet_id)), tables.pets.get(&pet_id)) {
            (Some(link), Some(pet)) => Some(tables.pet_record(pet, *link)),
            _ => None,
        };
        Ok(record)
    }

    async fn pets_for_user(&self, user_id: Uuid) -> StorageResult<Vec<PetRecord>> {
        let tables = self.tables.read().await;
        let mut pets: Vec<(&StoredPet, UserPetLink)> = tables
            .links
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .filter_map(|((_, pet_id), link)| tables.pets.get(pet_id).map(|pet| (pet, *link)))
            .collect();
        pets.sort_by_key(|(pet, _)| pet.seq);

        Ok(pets
            .into_iter()
            .map(|(pet, link)| tables.pet_record(pet, link))
            .collect())
    }

    async fn delete_pet(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.links.contains_key(&(user_id, pet_id)) {
            return Ok(false);
        }

        tables.pets.remove(&pet_id);
        tables.links.retain(|(_, pet), _| *pet != pet_id);

        let attr_ids: Vec<Uuid> = tables
            .pet_attrs
            .iter()
            .filter(|(_, attrs)| attrs.pet_id == pet_id)
            .map(|(id, _)| *id)
            .collect();
        for attr_id in &attr_ids {
            tables.pet_attrs.remove(attr_id);
        }
        tables
            .attribute_values
            .retain(|(attr_id, _)| !attr_ids.contains(attr_id));

        Ok(true)
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Transaction over [`MemoryDatabase`]. Inserted rows live in `staged` and
/// updates in `pending` until commit.
struct MemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    fail_at: Option<FailPoint>,
    staged: Tables,
    pending: Vec<PendingUpdate>,
}

impl MemoryTransaction {
    fn check_fail_point(&self, point: FailPoint) -> StorageResult<()> {
        if self.fail_at == Some(point) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    async fn user_exists(&self, user_id: Uuid) -> bool {
        self.staged.users.contains_key(&user_id)
            || self.tables.read().await.users.contains_key(&user_id)
    }

    async fn pet_exists(&self, pet_id: Uuid) -> bool {
        self.staged.pets.contains_key(&pet_id)
            || self.tables.read().await.pets.contains_key(&pet_id)
    }

    async fn subscription_exists(&self, user_id: Uuid) -> bool {
        self.staged.subscriptions.contains_key(&user_id)
            || self.tables.read().await.subscriptions.contains_key(&user_id)
    }

    async fn notifications_exist(&self, user_id: Uuid) -> bool {
        self.staged.notifications.contains_key(&user_id)
            || self.tables.read().await.notifications.contains_key(&user_id)
    }

    async fn linked(&self, pet_id: Uuid, user_id: Uuid) -> bool {
        let key = (user_id, pet_id);
        self.staged.links.contains_key(&key) || self.tables.read().await.links.contains_key(&key)
    }

    async fn pet_attrs_exist(&self, pet_attr_id: Uuid) -> bool {
        self.staged.pet_attrs.contains_key(&pet_attr_id)
            || self.tables.read().await.pet_attrs.contains_key(&pet_attr_id)
    }
}

fn foreign_key(operation: &str, table: &str) -> StorageError {
    StorageError::Constraint(format!(
        "{operation}: referenced row in \"{table}\" does not exist"
    ))
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn insert_user(
        &mut self,
        external_id: &str,
        user: &CreateUserRequest,
    ) -> StorageResult<UserRow> {
        self.check_fail_point(FailPoint::InsertUser)?;
        fit_varchar("insert user", external_id, MAX_EXTERNAL_ID_LEN)?;
        fit_varchar("insert user", &user.name, MAX_NAME_LEN)?;
        fit_varchar("insert user", &user.timezone, MAX_TIMEZONE_LEN)?;

        if self.staged.has_external_id(external_id)
            || self.tables.read().await.has_external_id(external_id)
        {
            return Err(StorageError::Conflict(format!(
                "insert user: external id {external_id} already exists"
            )));
        }

        let row = UserRow {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            name: user.name.clone(),
            gender: user.gender,
            timezone: user.timezone.clone(),
            has_onboarded: user.has_onboarded,
        };
        self.staged.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_subscription(
        &mut self,
        user_id: Uuid,
        subscription: &Subscription,
    ) -> StorageResult<Subscription> {
        self.check_fail_point(FailPoint::InsertSubscription)?;

        if !self.user_exists(user_id).await {
            return Err(foreign_key("insert subscription", "users"));
        }
        if self.staged.subscriptions.contains_key(&user_id)
            || self.tables.read().await.subscriptions.contains_key(&user_id)
        {
            return Err(StorageError::Conflict(format!(
                "insert subscription: user {user_id} already has one"
            )));
        }

        self.staged.subscriptions.insert(user_id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn insert_notifications(
        &mut self,
        user_id: Uuid,
        notifications: &Notifications,
    ) -> StorageResult<Notifications> {
        self.check_fail_point(FailPoint::InsertNotifications)?;

        if !self.user_exists(user_id).await {
            return Err(foreign_key("insert notifications", "users"));
        }
        if self.staged.notifications.contains_key(&user_id)
            || self.tables.read().await.notifications.contains_key(&user_id)
        {
            return Err(StorageError::Conflict(format!(
                "insert notifications: user {user_id} already has them"
            )));
        }

        self.staged.notifications.insert(user_id, notifications.clone());
        Ok(notifications.clone())
    }

    async fn insert_pet(&mut self, pet: &CreatePetRequest) -> StorageResult<PetRow> {
        self.check_fail_point(FailPoint::InsertPet)?;
        fit_varchar("insert pet", &pet.name, MAX_NAME_LEN)?;
        let weight = fit_weight("insert pet", pet.weight)?;

        let row = PetRow {
            id: Uuid::new_v4(),
            name: pet.name.clone(),
            birthday: pet.birthday,
            photo_url: pet.photo_url.clone(),
            gender: pet.gender,
            size: pet.size,
            weight,
        };
        self.staged.pets.insert(
            row.id,
            StoredPet {
                row: row.clone(),
                seq: 0,
            },
        );
        Ok(row)
    }

    async fn insert_pet_attributes(
        &mut self,
        pet_id: Uuid,
        is_sterilized: bool,
    ) -> StorageResult<Uuid> {
        self.check_fail_point(FailPoint::InsertPetAttributes)?;

        if !self.pet_exists(pet_id).await {
            return Err(foreign_key("insert pet attributes", "pets"));
        }
        let taken = |tables: &Tables| tables.pet_attrs.values().any(|a| a.pet_id == pet_id);
        if taken(&self.staged) || taken(&*self.tables.read().await) {
            return Err(StorageError::Conflict(format!(
                "insert pet attributes: pet {pet_id} already has them"
            )));
        }

        let id = Uuid::new_v4();
        self.staged.pet_attrs.insert(
            id,
            StoredPetAttrs {
                pet_id,
                is_sterilized,
            },
        );
        Ok(id)
    }

    async fn insert_pet_attribute(
        &mut self,
        pet_attr_id: Uuid,
        attribute: PetAttribute,
    ) -> StorageResult<()> {
        self.check_fail_point(FailPoint::InsertPetAttribute)?;

        if !self.staged.pet_attrs.contains_key(&pet_attr_id)
            && !self.tables.read().await.pet_attrs.contains_key(&pet_attr_id)
        {
            return Err(foreign_key("insert pet attribute", "pet_attrs"));
        }

        self.staged.attribute_values.push((pet_attr_id, attribute));
        Ok(())
    }

    async fn link_pet_to_user(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        link: UserPetLink,
    ) -> StorageResult<()> {
        self.check_fail_point(FailPoint::LinkPetToUser)?;

        if !self.user_exists(user_id).await {
            return Err(foreign_key("link pet to user", "users"));
        }
        if !self.pet_exists(pet_id).await {
            return Err(foreign_key("link pet to user", "pets"));
        }
        let key = (user_id, pet_id);
        if self.staged.links.contains_key(&key)
            || self.tables.read().await.links.contains_key(&key)
        {
            return Err(StorageError::Conflict(format!(
                "link pet to user: pet {pet_id} is already linked to user {user_id}"
            )));
        }

        self.staged.links.insert(key, link);
        Ok(())
    }

    async fn update_user(
        &mut self,
        user_id: Uuid,
        update: &UpdateUserRequest,
    ) -> StorageResult<bool> {
        self.check_fail_point(FailPoint::UpdateUser)?;
        if let Some(name) = &update.name {
            fit_varchar("update user", name, MAX_NAME_LEN)?;
        }
        if let Some(timezone) = &update.timezone {
            fit_varchar("update user", timezone, MAX_TIMEZONE_LEN)?;
        }

        if !self.user_exists(user_id).await {
            return Ok(false);
        }
        self.pending.push(PendingUpdate::User(user_id, update.clone()));
        Ok(true)
    }

    async fn update_subscription(
        &mut self,
        user_id: Uuid,
        update: &UpdateSubscriptionRequest,
    ) -> StorageResult<bool> {
        self.check_fail_point(FailPoint::UpdateSubscription)?;

        if !self.subscription_exists(user_id).await {
            return Ok(false);
        }
        self.pending
            .push(PendingUpdate::Subscription(user_id, update.clone()));
        Ok(true)
    }

    async fn update_notifications(
        &mut self,
        user_id: Uuid,
        update: &UpdateNotificationsRequest,
    ) -> StorageResult<bool> {
        self.check_fail_point(FailPoint::UpdateNotifications)?;

        if !self.notifications_exist(user_id).await {
            return Ok(false);
        }
        self.pending
            .push(PendingUpdate::Notifications(user_id, update.clone()));
        Ok(true)
    }

    async fn update_pet(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
        update: &UpdatePetRequest,
    ) -> StorageResult<bool> {
        self.check_fail_point(FailPoint::UpdatePet)?;
        if let Some(name) = &update.name {
            fit_varchar("update pet", name, MAX_NAME_LEN)?;
        }
        let mut update = update.clone();
        if let Some(weight) = update.weight {
            update.weight = Some(fit_weight("update pet", weight)?);
        }

        if !self.linked(pet_id, user_id).await || !self.pet_exists(pet_id).await {
            return Ok(false);
        }
        self.pending.push(PendingUpdate::Pet(pet_id, update));
        Ok(true)
    }

    async fn pet_attributes_id(
        &mut self,
        pet_id: Uuid,
        user_id: Uuid,
    ) -> StorageResult<Option<Uuid>> {
        if !self.linked(pet_id, user_id).await {
            return Ok(None);
        }
        if let Some(id) = self.staged.pet_attrs_id(pet_id) {
            return Ok(Some(id));
        }
        Ok(self.tables.read().await.pet_attrs_id(pet_id))
    }

    async fn set_sterilized(
        &mut self,
        pet_attr_id: Uuid,
        is_sterilized: bool,
    ) -> StorageResult<()> {
        self.check_fail_point(FailPoint::UpdatePetAttributes)?;

        if self.pet_attrs_exist(pet_attr_id).await {
            self.pending
                .push(PendingUpdate::Sterilized(pet_attr_id, is_sterilized));
        }
        Ok(())
    }

    async fn clear_pet_attributes(
        &mut self,
        pet_attr_id: Uuid,
        kind: PetAttributeKind,
    ) -> StorageResult<()> {
        self.check_fail_point(FailPoint::UpdatePetAttributes)?;

        // Values inserted earlier in this transaction go now; committed ones on commit.
        self.staged
            .attribute_values
            .retain(|(attr_id, value)| !(*attr_id == pet_attr_id && value.kind() == kind));
        self.pending
            .push(PendingUpdate::ClearAttributes(pet_attr_id, kind));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.check_fail_point(FailPoint::Commit)?;

        let MemoryTransaction {
            tables,
            staged,
            pending,
            ..
        } = *self;
        let mut tables = tables.write().await;

        // Rows committed or deleted by others since the inserts were checked.
        for user in staged.users.values() {
            if tables.has_external_id(&user.external_id) {
                return Err(StorageError::Conflict(format!(
                    "commit: external id {} already exists",
                    user.external_id
                )));
            }
        }
        let user_known = |id: &Uuid| staged.users.contains_key(id) || tables.users.contains_key(id);
        let pet_known = |id: &Uuid| staged.pets.contains_key(id) || tables.pets.contains_key(id);
        let attrs_known = |id: &Uuid| {
            staged.pet_attrs.contains_key(id) || tables.pet_attrs.contains_key(id)
        };
        if !staged.subscriptions.keys().all(user_known)
            || !staged.notifications.keys().all(user_known)
            || !staged.links.keys().all(|(user, pet)| user_known(user) && pet_known(pet))
        {
            return Err(foreign_key("commit", "users"));
        }
        if !staged.pet_attrs.values().all(|a| pet_known(&a.pet_id)) {
            return Err(foreign_key("commit", "pets"));
        }
        if !staged.attribute_values.iter().all(|(id, _)| attrs_known(id)) {
            return Err(foreign_key("commit", "pet_attrs"));
        }

        // Clears target rows that existed before this transaction's inserts.
        let (clears, updates): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|update| matches!(update, PendingUpdate::ClearAttributes(..)));
        for clear in clears {
            tables.apply(clear);
        }

        tables.users.extend(staged.users);
        tables.subscriptions.extend(staged.subscriptions);
        tables.notifications.extend(staged.notifications);
        for (id, mut pet) in staged.pets {
            tables.next_seq += 1;
            pet.seq = tables.next_seq;
            tables.pets.insert(id, pet);
        }
        tables.pet_attrs.extend(staged.pet_attrs);
        tables.attribute_values.extend(staged.attribute_values);
        tables.links.extend(staged.links);
        for update in updates {
            tables.apply(update);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}
