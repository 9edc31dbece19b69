use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest},
        extractors::{session_cookie, CurrentUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/validate", get(validate))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(payload) = payload?;
    let date_of_birth = payload.validate()?;

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::BadRequest("Failed to hash password".into())
    })?;

    // Duplicate email and duplicate bank account are not told apart.
    let user = state
        .users
        .create(payload.into_new_user(date_of_birth, hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "create user failed");
            ApiError::BadRequest("Failed to create user".into())
        })?;

    info!(user_id = user.id, "user signed up");
    Ok(Json(json!({})))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = match state.users.find_by_email(payload.email.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("login unknown email");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
        }
    };

    match verify_password(&payload.password, &user.password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = user.id, "login invalid password");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
        }
        Err(e) => {
            warn!(error = %e, user_id = user.id, "stored password is not a valid hash");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
        }
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::BadRequest("Failed to create token".into())
    })?;
    let cookie = session_cookie(token, keys.ttl, state.config.cookie.secure);

    info!(user_id = user.id, "user logged in");
    Ok((jar.add(cookie), Json(json!({}))))
}

#[instrument(skip_all)]
pub async fn validate(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "message": user }))
}
