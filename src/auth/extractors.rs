use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use time::Duration;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "Authorization";

/// The authenticated caller, loaded from the store by the token's subject.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state)
            .await
            .ok_or(ApiError::Unauthorized)?;

        let claims = JwtKeys::from_ref(state).verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized
        })?;

        match state.users.find_by_id(claims.sub).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                warn!(user_id = claims.sub, "token subject no longer exists");
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                warn!(error = %e, "load token subject failed");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Cookie first, then `Authorization: Bearer`.
async fn session_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()?;
    Some(bearer.token().to_string())
}

/// Session cookie for a freshly issued token.
pub fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .secure(secure)
        .build()
}
