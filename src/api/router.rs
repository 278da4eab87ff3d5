//! HTTP router.
//!
//! Returns a composable `Router`: REST routes nested under `/api/`, the
//! change feed at `/ws/changes`.
//!
//! Layers (outermost → innermost): CORS → Cache-Control → access log.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Build the full application router.
///
/// Handlers use `State<ApiContext>`; `with_state` turns the result into a
/// plain `Router` that can be served directly.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/doctors", get(endpoints::doctors::list))
        .route("/doctors/:id", get(endpoints::doctors::detail))
        .route("/time-slots", get(endpoints::doctors::time_slots))
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/appointments/stats", get(endpoints::appointments::stats))
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).delete(endpoints::appointments::delete),
        )
        .route(
            "/appointments/:id/status",
            put(endpoints::appointments::update_status),
        )
        .route(
            "/appointments/:id/clinical",
            put(endpoints::appointments::update_clinical),
        )
        .route(
            "/appointments/:id/messages",
            get(endpoints::chat::list).post(endpoints::chat::send),
        )
        .route("/assistant/triage", post(endpoints::assistant::triage))
        .route("/assistant/medicine", post(endpoints::assistant::medicine))
        .route("/assistant/chat", post(endpoints::assistant::chat));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .route("/ws/changes", get(websocket::ws_upgrade))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}
