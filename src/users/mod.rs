use crate::state::AppState;
use axum::routing::{get, put};
use axum::Router;

mod dto;
pub mod handlers;
pub mod model;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/me", get(handlers::get_me))
        .route("/user/settings", put(handlers::update_settings))
}
