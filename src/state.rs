//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::roles_repository::RolesRepository;
use crate::services::token_service::TokenService;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub roles: Arc<dyn RolesRepository>,
    pub tokens: TokenService,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(roles: Arc<dyn RolesRepository>, config: EnvironmentConfig) -> Self {
        let tokens = TokenService::new(JwtConfig::from(&config));

        Self {
            roles,
            tokens,
            config,
        }
    }
}
