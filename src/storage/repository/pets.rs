// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pet repository.
//!
//! Creating a pet writes the `pets` row, its `pet_attrs` row, one row per
//! attribute value across the seven category tables and finally the link to
//! the creating user, all in one transaction. Reads, updates and deletes only
//! see pets linked to the calling user.
//!
//! Attribute lists are returned in vocabulary order, both on create and on
//! every read.

use uuid::Uuid;

use super::{finish, matched};
use crate::models::{CreatePetRequest, PetResponse, UpdatePetAttributesRequest, UpdatePetRequest};
use crate::storage::database::{Database, PetAttribute, PetRecord, Transaction};
use crate::storage::{StorageError, StorageResult};

impl From<PetRecord> for PetResponse {
    fn from(record: PetRecord) -> Self {
        let pet = record.pet;
        PetResponse {
            pet_id: pet.id,
            pet: CreatePetRequest {
                name: pet.name,
                birthday: pet.birthday,
                photo_url: pet.photo_url,
                gender: pet.gender,
                size: pet.size,
                weight: pet.weight,
                attributes: record.attributes,
                link: record.link,
            },
        }
    }
}

/// Repository for pet operations, scoped to one user.
pub struct PetRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> PetRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Create a pet and link it to `user_id`.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreatePetRequest,
    ) -> StorageResult<PetResponse> {
        let mut tx = self.db.begin().await?;
        let result = insert_pet(tx.as_mut(), user_id, request).await;
        let response = finish(tx, result).await?;

        tracing::info!(%user_id, pet_id = %response.pet_id, "pet created");
        Ok(response)
    }

    pub async fn get(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<PetResponse> {
        self.db
            .pet(pet_id, user_id)
            .await?
            .map(PetResponse::from)
            .ok_or_else(|| StorageError::NotFound("Pet".to_string()))
    }

    /// Every pet linked to `user_id`, oldest first.
    pub async fn list(&self, user_id: Uuid) -> StorageResult<Vec<PetResponse>> {
        let pets = self.db.pets_for_user(user_id).await?;
        Ok(pets.into_iter().map(PetResponse::from).collect())
    }

    /// Update the base fields of a pet linked to `user_id`.
    pub async fn update(
        &self,
        pet_id: Uuid,
        user_id: Uuid,
        update: &UpdatePetRequest,
    ) -> StorageResult<PetResponse> {
        let mut tx = self.db.begin().await?;
        let result = tx.update_pet(pet_id, user_id, update).await;
        finish(tx, result.and_then(|found| matched(found, "Pet"))).await?;

        tracing::info!(%user_id, %pet_id, "pet updated");
        self.get(pet_id, user_id).await
    }

    /// Replace the attribute categories present in `update`.
    ///
    /// Each present category is cleared and refilled inside one transaction,
    /// so readers never observe a half-replaced list.
    pub async fn update_attributes(
        &self,
        pet_id: Uuid,
        user_id: Uuid,
        update: &UpdatePetAttributesRequest,
    ) -> StorageResult<PetResponse> {
        let mut tx = self.db.begin().await?;
        let result = replace_attributes(tx.as_mut(), pet_id, user_id, update).await;
        finish(tx, result).await?;

        tracing::info!(%user_id, %pet_id, "pet attributes updated");
        self.get(pet_id, user_id).await
    }

    /// Delete a pet linked to `user_id`. Attributes and links cascade.
    pub async fn delete(&self, pet_id: Uuid, user_id: Uuid) -> StorageResult<()> {
        if !self.db.delete_pet(pet_id, user_id).await? {
            return Err(StorageError::NotFound("Pet".to_string()));
        }
        tracing::info!(%user_id, %pet_id, "pet deleted");
        Ok(())
    }
}

async fn insert_pet(
    tx: &mut dyn Transaction,
    user_id: Uuid,
    request: &CreatePetRequest,
) -> StorageResult<PetResponse> {
    let pet = tx.insert_pet(request).await?;
    let pet_attr_id = tx
        .insert_pet_attributes(pet.id, request.attributes.is_sterilized)
        .await?;

    for value in PetAttribute::collect(&request.attributes) {
        tx.insert_pet_attribute(pet_attr_id, value).await?;
    }

    // The link goes last.
    tx.link_pet_to_user(pet.id, user_id, request.link).await?;

    Ok(PetResponse {
        pet_id: pet.id,
        pet: CreatePetRequest {
            name: pet.name,
            birthday: pet.birthday,
            photo_url: pet.photo_url,
            gender: pet.gender,
            size: pet.size,
            weight: pet.weight,
            attributes: request.attributes.clone().normalized(),
            link: request.link,
        },
    })
}

async fn replace_attributes(
    tx: &mut dyn Transaction,
    pet_id: Uuid,
    user_id: Uuid,
    update: &UpdatePetAttributesRequest,
) -> StorageResult<()> {
    let pet_attr_id = tx
        .pet_attributes_id(pet_id, user_id)
        .await?
        .ok_or_else(|| StorageError::NotFound("Pet".to_string()))?;

    if let Some(is_sterilized) = update.is_sterilized {
        tx.set_sterilized(pet_attr_id, is_sterilized).await?;
    }
    for (kind, values) in PetAttribute::replacements(update) {
        tx.clear_pet_attributes(pet_attr_id, kind).await?;
        for value in values {
            tx.insert_pet_attribute(pet_attr_id, value).await?;
        }
    }
    Ok(())
}
