mod dto;
pub mod handlers;
pub mod model;
pub mod provider;
pub(crate) mod repo;
mod repo_types;
pub mod services;

use crate::{auth::extractors::require_auth, state::AppState};
use axum::{middleware, Router};

/// History and lookup routes, all behind the auth gate.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::weather_routes().route_layer(middleware::from_fn_with_state(state, require_auth))
}
