// --- File: crates/services/tably_backend/src/routes.rs ---
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use tably_common::PUBLIC_CACHE_ONE_HOUR;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::{self, auth, clients, menu, orders};

/// Only successful menu reads may be cached.
fn menu_cache_control(response: &Response) -> Option<HeaderValue> {
    response
        .status()
        .is_success()
        .then(|| HeaderValue::from_static(PUBLIC_CACHE_ONE_HOUR))
}

fn menu_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/menu/categories", get(menu::categories))
        .route("/menu/products", get(menu::products))
        .route("/menu/products/", get(menu::missing_product_id))
        .route("/menu/products/{id}", get(menu::product))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            menu_cache_control,
        ))
}

/// Builds the full application router, everything under `/api`.
pub fn routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .route("/auth/request-otp", post(auth::request_otp))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/self", get(auth::current_client))
        .route("/auth/sessions", get(auth::list_sessions))
        .route("/clients", put(clients::missing_id))
        .route("/clients/", put(clients::missing_id))
        .route("/clients/{id}", put(clients::update_client))
        .route("/orders", post(orders::create_order))
        .merge(menu_routes())
        .method_not_allowed_fallback(handlers::fallback)
        .with_state(state);

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api);

    #[cfg(feature = "openapi")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        tracing::info!("Adding Swagger UI at /api/docs");
        app = app.merge(
            SwaggerUi::new("/api/docs")
                .url("/api/docs/openapi.json", crate::doc::ApiDoc::openapi()),
        );
    }

    app.fallback(handlers::fallback)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
