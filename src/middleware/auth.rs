//! Middleware de autenticación JWT
//!
//! Cada ruta declara su política en `ROUTE_POLICIES`. Las rutas que exigen
//! token reciben la `ActorIdentity` en las extensions de la request; las de
//! lectura pasan sin validar nada.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Method},
    middleware::Next,
    response::Response,
};

use crate::{models::auth::ActorIdentity, state::AppState, utils::errors::AppError};

/// Política de autenticación de una ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Public,
    TokenRequired,
}

#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub method: &'static str,
    pub path: &'static str,
    pub policy: AuthPolicy,
}

const fn route(method: &'static str, path: &'static str, policy: AuthPolicy) -> RoutePolicy {
    RoutePolicy {
        method,
        path,
        policy,
    }
}

pub const ROUTE_POLICIES: &[RoutePolicy] = &[
    route("POST", "/roles/dame", AuthPolicy::Public),
    route("POST", "/roles/crear", AuthPolicy::TokenRequired),
    route("GET", "/roles", AuthPolicy::Public),
    route("POST", "/roles/borrar", AuthPolicy::TokenRequired),
    route("POST", "/roles/modificar", AuthPolicy::TokenRequired),
    route("POST", "/roles/listarPermisos", AuthPolicy::Public),
    route("POST", "/roles/asignarPermisos", AuthPolicy::TokenRequired),
    route("GET", "/permisos", AuthPolicy::Public),
    route("GET", "/health", AuthPolicy::Public),
];

/// Política aplicable; las rutas no registradas no exigen token
pub fn route_policy(method: &Method, path: &str) -> AuthPolicy {
    ROUTE_POLICIES
        .iter()
        .find(|r| r.method == method.as_str() && r.path == path)
        .map(|r| r.policy)
        .unwrap_or(AuthPolicy::Public)
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if route_policy(request.method(), request.uri().path()) == AuthPolicy::Public {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| {
            value.to_str().map_err(|_| {
                AppError::InvalidToken("Header Authorization con caracteres inválidos".to_string())
            })
        })
        .transpose()?;

    let actor = state.tokens.validate_header(auth_header)?;

    // Inyectar la identidad del administrador en las extensions
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// La identidad que dejó `auth_middleware`; sin ella la ruta no pasó por validación
#[async_trait]
impl<S> FromRequestParts<S> for ActorIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorIdentity>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken("Petición sin identidad autenticada".to_string()))
    }
}
