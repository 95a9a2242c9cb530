pub mod roles_routes;

use axum::{
    http::{Method, Uri},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::dto::envelope::Envelope;
use crate::middleware::{auth::auth_middleware, cors::cors_layer};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router completo de la API con autenticación, trazas y CORS
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(roles_routes::create_roles_router())
        .fallback(ruta_no_encontrada)
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_origins)),
        )
        .with_state(state)
}

/// Endpoint de salud
async fn health() -> Json<Envelope> {
    Json(Envelope::success(json!({
        "estado": "ok",
        "servicio": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Rutas desconocidas también responden con el sobre
async fn ruta_no_encontrada(method: Method, uri: Uri) -> AppError {
    AppError::RouteNotFound(format!("{} {}", method, uri.path()))
}
