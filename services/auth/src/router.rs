use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use leadgate_core::health::{healthz, readyz};
use leadgate_core::middleware::request_id_layer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register::register))
        .route("/auth/login", post(handlers::login::login))
        .route("/auth/verify-otp", post(handlers::otp::verify_otp))
        .route(
            "/auth/forgot-password",
            post(handlers::password::forgot_password),
        )
        .route(
            "/auth/reset-password",
            post(handlers::password::reset_password),
        )
        .route("/auth/refresh-token", post(handlers::token::refresh_token))
        .route("/auth/logout", post(handlers::token::logout))
        .route("/auth/me", get(handlers::token::me))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
