use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub(crate) use dto::is_valid_email;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
