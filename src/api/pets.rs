// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pet endpoints and the fixed attribute vocabularies.
//!
//! Pet routes act on the caller's own pets. The vocabulary routes are static
//! and public.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    auth::{require_auth, resolve_caller, CurrentUser},
    error::ApiError,
    models::{
        CreatePetRequest, MessageResponse, PetAggressionLevel, PetAllergy, PetBehavior, PetBreed,
        PetInteraction, PetPersonality, PetReactivity, PetResponse, UpdatePetAttributesRequest,
        UpdatePetRequest,
    },
    state::AppState,
    storage::PetRepository,
};

pub const PET_DELETED_MESSAGE: &str = "Pet deleted successfully.";
pub const MISSING_PET_ID_MESSAGE: &str = "Missing pet ID.";
pub const INVALID_PET_ID_MESSAGE: &str = "Invalid pet ID.";

pub fn router(state: AppState) -> Router<AppState> {
    let resolve = from_fn_with_state(state.clone(), resolve_caller);

    let protected = Router::new()
        .route(
            "/pets",
            post(create_pet)
                .get(list_pets)
                .layer(resolve.clone())
                .merge(delete(delete_pet_without_id)),
        )
        .route(
            "/pets/{id}",
            get(get_pet)
                .patch(update_pet)
                .delete(delete_pet)
                .layer(resolve.clone()),
        )
        .route(
            "/pets/attributes/{id}",
            patch(update_pet_attributes).layer(resolve),
        )
        .route_layer(from_fn_with_state(state, require_auth));

    let vocabularies = Router::new()
        .route("/pets/breeds", get(list_breeds))
        .route("/pets/aggression-levels", get(list_aggression_levels))
        .route("/pets/allergies", get(list_allergies))
        .route("/pets/behaviors", get(list_behaviors))
        .route("/pets/interactions", get(list_interactions))
        .route("/pets/personalities", get(list_personalities))
        .route("/pets/reactivities", get(list_reactivities));

    protected.merge(vocabularies)
}

fn parse_pet_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(INVALID_PET_ID_MESSAGE))
}

#[utoipa::path(
    post,
    path = "/api/v1/pets",
    request_body = CreatePetRequest,
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PetResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn create_pet(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<CreatePetRequest>, JsonRejection>,
) -> Result<Json<PetResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::bad_request)?;

    let pet = PetRepository::new(state.db.as_ref())
        .create(user_id, &request)
        .await?;
    Ok(Json(pet))
}

#[utoipa::path(
    get,
    path = "/api/v1/pets",
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [PetResponse]),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn list_pets(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<PetResponse>>, ApiError> {
    let pets = PetRepository::new(state.db.as_ref()).list(user_id).await?;
    Ok(Json(pets))
}

#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}",
    params(("id" = Uuid, Path, description = "Pet id")),
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PetResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn get_pet(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(pet_id): Path<String>,
) -> Result<Json<PetResponse>, ApiError> {
    let pet_id = parse_pet_id(&pet_id)?;
    let pet = PetRepository::new(state.db.as_ref())
        .get(pet_id, user_id)
        .await?;
    Ok(Json(pet))
}

#[utoipa::path(
    patch,
    path = "/api/v1/pets/{id}",
    params(("id" = Uuid, Path, description = "Pet id")),
    request_body = UpdatePetRequest,
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PetResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn update_pet(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(pet_id): Path<String>,
    payload: Result<Json<UpdatePetRequest>, JsonRejection>,
) -> Result<Json<PetResponse>, ApiError> {
    let pet_id = parse_pet_id(&pet_id)?;
    let Json(update) = payload?;
    update.validate().map_err(ApiError::bad_request)?;

    let pet = PetRepository::new(state.db.as_ref())
        .update(pet_id, user_id, &update)
        .await?;
    Ok(Json(pet))
}

/// Replace whole attribute categories. Each list present in the body
/// replaces the stored one; absent lists are kept.
#[utoipa::path(
    patch,
    path = "/api/v1/pets/attributes/{id}",
    params(("id" = Uuid, Path, description = "Pet id")),
    request_body = UpdatePetAttributesRequest,
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PetResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn update_pet_attributes(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(pet_id): Path<String>,
    payload: Result<Json<UpdatePetAttributesRequest>, JsonRejection>,
) -> Result<Json<PetResponse>, ApiError> {
    let pet_id = parse_pet_id(&pet_id)?;
    let Json(update) = payload?;

    let pet = PetRepository::new(state.db.as_ref())
        .update_attributes(pet_id, user_id, &update)
        .await?;
    Ok(Json(pet))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pets/{id}",
    params(("id" = Uuid, Path, description = "Pet id")),
    tag = "Pets",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn delete_pet(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(pet_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let pet_id = parse_pet_id(&pet_id)?;
    PetRepository::new(state.db.as_ref())
        .delete(pet_id, user_id)
        .await?;
    Ok(Json(MessageResponse::new(PET_DELETED_MESSAGE)))
}

/// `DELETE /pets` without an id.
pub async fn delete_pet_without_id() -> ApiError {
    ApiError::bad_request(MISSING_PET_ID_MESSAGE)
}

#[utoipa::path(get, path = "/api/v1/pets/breeds", tag = "Vocabularies",
    responses((status = 200, body = [PetBreed])))]
pub async fn list_breeds() -> Json<&'static [PetBreed]> {
    Json(PetBreed::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/aggression-levels", tag = "Vocabularies",
    responses((status = 200, body = [PetAggressionLevel])))]
pub async fn list_aggression_levels() -> Json<&'static [PetAggressionLevel]> {
    Json(PetAggressionLevel::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/allergies", tag = "Vocabularies",
    responses((status = 200, body = [PetAllergy])))]
pub async fn list_allergies() -> Json<&'static [PetAllergy]> {
    Json(PetAllergy::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/behaviors", tag = "Vocabularies",
    responses((status = 200, body = [PetBehavior])))]
pub async fn list_behaviors() -> Json<&'static [PetBehavior]> {
    Json(PetBehavior::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/interactions", tag = "Vocabularies",
    responses((status = 200, body = [PetInteraction])))]
pub async fn list_interactions() -> Json<&'static [PetInteraction]> {
    Json(PetInteraction::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/personalities", tag = "Vocabularies",
    responses((status = 200, body = [PetPersonality])))]
pub async fn list_personalities() -> Json<&'static [PetPersonality]> {
    Json(PetPersonality::ALL)
}

#[utoipa::path(get, path = "/api/v1/pets/reactivities", tag = "Vocabularies",
    responses((status = 200, body = [PetReactivity])))]
pub async fn list_reactivities() -> Json<&'static [PetReactivity]> {
    Json(PetReactivity::ALL)
}
