use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(handlers::status_page)).with_state(state)
}
