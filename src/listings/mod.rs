use crate::state::AppState;
use axum::routing::get;
use axum::Router;

pub mod availability;
mod dto;
pub mod handlers;
pub mod model;
pub mod query;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route("/properties/featured", get(handlers::featured_listings))
        .route(
            "/properties/:id",
            get(handlers::get_listing)
                .put(handlers::update_listing)
                .delete(handlers::delete_listing),
        )
}
