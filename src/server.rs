use axum::{
    handler::HandlerWithoutStateExt,
    routing::{any_service, get, post_service},
    Router,
};
use deferstats::Client;
use tower_http::cors::CorsLayer;

use crate::handlers;

/// Builds the demo `Router`, showing each way of instrumenting a route.
pub fn create_router(client: Client) -> Router {
    Router::new()
        // ── Plain function, wrapped directly ────────────────────
        .route("/", any_service(client.wrap_fn(handlers::index)))
        // ── axum handler turned into a service, then wrapped ────
        .route(
            "/api/echo",
            post_service(client.wrap_service(handlers::echo.into_service())),
        )
        // ── Ordinary route with the instrumentation layer ───────
        .route("/api/slow", get(handlers::slow).layer(client.layer()))
        // ── Introspection (not instrumented) ────────────────────
        .route("/debug/stats", get(handlers::stats))
        .with_state(client)
        // ── Global middleware ───────────────────────────────────
        .layer(CorsLayer::permissive())
}
