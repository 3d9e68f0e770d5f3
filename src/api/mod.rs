// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CreatePetRequest, CreateUserRequest, Gender, MessageResponse, Notifications,
        PetAggressionLevel, PetAllergy, PetAttributes, PetBehavior, PetBreed, PetInteraction,
        PetPersonality, PetReactivity, PetResponse, PetSize, Subscription, SubscriptionType,
        UpdateNotificationsRequest, UpdatePetAttributesRequest, UpdatePetRequest,
        UpdateSubscriptionRequest, UpdateUserRequest, UserPetLink, UserResponse,
    },
    state::AppState,
};

pub mod health;
pub mod pets;
pub mod users;

pub const WELCOME_MESSAGE: &str = "Welcome to Dogy API";
pub const WELCOME_V1_MESSAGE: &str = "Welcome to Dogy API v1";

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .merge(users::router(state.clone()))
        .merge(pets::router(state.clone()));

    Router::new()
        .route("/", get(welcome))
        .route("/api/v1", get(welcome_v1))
        .nest("/api/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME_MESSAGE))
}

async fn welcome_v1() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME_V1_MESSAGE))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        users::create_user,
        users::get_user,
        users::delete_user,
        users::update_user,
        users::update_subscription,
        users::update_notifications,
        pets::create_pet,
        pets::list_pets,
        pets::get_pet,
        pets::update_pet,
        pets::update_pet_attributes,
        pets::delete_pet,
        pets::list_breeds,
        pets::list_aggression_levels,
        pets::list_allergies,
        pets::list_behaviors,
        pets::list_interactions,
        pets::list_personalities,
        pets::list_reactivities
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            MessageResponse,
            Gender,
            SubscriptionType,
            Notifications,
            Subscription,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateSubscriptionRequest,
            UpdateNotificationsRequest,
            UserResponse,
            PetSize,
            PetAggressionLevel,
            PetAllergy,
            PetBehavior,
            PetBreed,
            PetInteraction,
            PetPersonality,
            PetReactivity,
            PetAttributes,
            UserPetLink,
            CreatePetRequest,
            UpdatePetRequest,
            UpdatePetAttributesRequest,
            PetResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "User profiles keyed by the token subject"),
        (name = "Pets", description = "Pets linked to the caller"),
        (name = "Vocabularies", description = "Fixed pet attribute values")
    )
)]
pub struct ApiDoc;
