// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! Create, read and delete exist with and without an `{id}` path segment.
//! On reads and deletes `{id}` is an external identifier to look up instead
//! of the caller, which only admins may use for someone else; on create it is
//! ignored and the token subject is used. Updates always act on the caller.

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Json, Router,
};

use crate::{
    auth::{require_auth, resolve_caller, resolve_identity, Auth, CurrentUser},
    error::ApiError,
    models::{
        validate_external_id, CreateUserRequest, MessageResponse, UpdateNotificationsRequest,
        UpdateSubscriptionRequest, UpdateUserRequest, UserResponse,
    },
    state::AppState,
    storage::{StorageError, UserRepository},
};

pub const USER_EXISTS_MESSAGE: &str = "User already exists.";
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully.";

pub fn router(state: AppState) -> Router<AppState> {
    let caller = from_fn_with_state(state.clone(), resolve_caller);
    let methods = post(create_user).merge(
        get(get_user)
            .delete(delete_user)
            .layer(from_fn_with_state(state.clone(), resolve_identity)),
    );

    Router::new()
        .route(
            "/users",
            methods
                .clone()
                .merge(patch(update_user).layer(caller.clone())),
        )
        .route("/users/{id}", methods)
        .route(
            "/users/subscription",
            patch(update_subscription).layer(caller.clone()),
        )
        .route(
            "/users/notifications",
            patch(update_notifications).layer(caller),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 409, body = MessageResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Auth(user): Auth,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    validate_external_id(&user.user_id).map_err(ApiError::bad_request)?;
    request.validate().map_err(ApiError::bad_request)?;

    let created = UserRepository::new(state.db.as_ref())
        .create(&user.user_id, &request)
        .await
        .map_err(|e| match e {
            StorageError::Conflict(_) => ApiError::conflict(USER_EXISTS_MESSAGE),
            other => other.into(),
        })?;

    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "External id of the user; omit the segment to read the caller")
    ),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(state.db.as_ref()).get(user_id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "External id of the user; omit the segment to delete the caller")
    ),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    UserRepository::new(state.db.as_ref()).delete(user_id).await?;
    Ok(Json(MessageResponse::new(USER_DELETED_MESSAGE)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users",
    request_body = UpdateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(update) = payload?;
    update.validate().map_err(ApiError::bad_request)?;

    let user = UserRepository::new(state.db.as_ref())
        .update(user_id, &update)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/subscription",
    request_body = UpdateSubscriptionRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(update) = payload?;
    let user = UserRepository::new(state.db.as_ref())
        .update_subscription(user_id, &update)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/notifications",
    request_body = UpdateNotificationsRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = MessageResponse),
        (status = 401, body = MessageResponse),
        (status = 404, body = MessageResponse)
    )
)]
pub async fn update_notifications(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<UpdateNotificationsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(update) = payload?;
    let user = UserRepository::new(state.db.as_ref())
        .update_notifications(user_id, &update)
        .await?;
    Ok(Json(user))
}
