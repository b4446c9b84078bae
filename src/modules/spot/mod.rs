use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let key_routes = Router::new()
        .route("/spots/{id}/video/playlist", get(handler::get_spot_playlist))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::key_or_auth_middleware,
        ));

    let protected_routes = Router::new()
        .route("/spots/{id}/uploaded", post(handler::spot_uploaded))
        .route(
            "/spots/{id}/public-key",
            get(handler::get_public_key).patch(handler::update_public_key),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware,
        ));

    key_routes.merge(protected_routes)
}
