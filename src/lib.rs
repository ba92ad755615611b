// lib.rs
pub mod actions;
pub mod commands;
pub mod config;
pub mod devices;
pub mod docs;
pub mod error;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod serial;
pub mod utils;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::*;
use models::AppState;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: Arc<AppState>, settings: &crate::config::ServerSettings) -> Router {
    let static_dir = &settings.static_dir;

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/devices/power", get(list_power_devices))
        .route("/devices/power/update", post(update_power_device))
        .route("/devices/power/{device}", get(get_power_device))
        .route("/devices/power/{device}/on", get(turn_on_device))
        .route("/devices/power/{device}/off", get(turn_off_device))
        .route("/actions", get(list_actions))
        .route("/actions/{action}", get(perform_action).post(perform_action))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", docs::ApiDoc::openapi()))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}
