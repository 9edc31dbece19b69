use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use super::dto::{CreateUserRequest, UpdateUserRequest};
use super::repo_types::User;
use super::services::apply_profile_update;
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/ranking", get(user_ranking))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/history", get(user_history))
}

/// Resolves a path id to a row. Unparsable ids, missing rows and lookup
/// failures all read as "not found".
async fn lookup(state: &AppState, id: &str) -> ApiResult<User> {
    let Ok(id) = id.parse::<i64>() else {
        return Err(ApiError::user_not_found());
    };
    match state.users.find_by_id(id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ApiError::user_not_found()),
        Err(e) => {
            error!(error = %e, id, "find_by_id failed");
            Err(ApiError::user_not_found())
        }
    }
}

#[instrument(skip(state, payload, _caller))]
pub async fn create_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = state
        .users
        .create(payload.into_new_user())
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            ApiError::Internal("Failed to create user".into())
        })?;

    info!(user_id = user.id, role = %user.role, "user created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "data": user })),
    ))
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = lookup(&state, &id).await?;
    Ok(Json(json!({ "data": user })))
}

#[instrument(skip(state, payload, _caller))]
pub async fn update_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    // The row is looked up before the body is inspected, and saved without a
    // transaction: concurrent writers race and the last one wins.
    let user = lookup(&state, &id).await?;
    let Json(payload) = payload?;

    let updated = state
        .users
        .save(&apply_profile_update(user, payload))
        .await
        .map_err(|e| {
            error!(error = %e, "update user failed");
            ApiError::Internal("Failed to update user".into())
        })?;

    Ok(Json(json!({ "message": "User updated successfully", "data": updated })))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
) -> ApiResult<Json<Value>> {
    let users = state.users.list().await.map_err(|e| {
        error!(error = %e, "list users failed");
        ApiError::Internal("Failed to retrieve users".into())
    })?;
    Ok(Json(json!({ "data": users })))
}

#[instrument(skip(state, _caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = lookup(&state, &id).await?;

    state.users.delete(user.id).await.map_err(|e| {
        error!(error = %e, user_id = user.id, "delete user failed");
        ApiError::Internal("Failed to delete user".into())
    })?;

    info!(user_id = user.id, "user deleted");
    Ok(Json(json!({ "message": "User deleted successfully", "id": user.id })))
}

#[instrument(skip(state, _caller))]
pub async fn user_ranking(
    State(state): State<AppState>,
    _caller: CurrentUser,
) -> ApiResult<Json<Value>> {
    let users = state.users.ranking().await.map_err(|e| {
        error!(error = %e, "rank users failed");
        ApiError::Internal("Failed to retrieve user rankings".into())
    })?;
    Ok(Json(json!({ "data": users })))
}

#[instrument(skip(state, _caller))]
pub async fn user_history(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let failed = || ApiError::Internal("Failed to retrieve user history".into());

    let user_id = id.parse::<i64>().map_err(|_| failed())?;
    let histories = state.users.history_for(user_id).await.map_err(|e| {
        error!(error = %e, user_id, "list user history failed");
        failed()
    })?;
    Ok(Json(json!({ "data": histories })))
}
