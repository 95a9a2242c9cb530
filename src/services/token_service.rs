use crate::models::auth::ActorIdentity;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Valida el header `Authorization` y devuelve la identidad del administrador
#[derive(Debug, Clone)]
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn validate_header(&self, auth_header: Option<&str>) -> AppResult<ActorIdentity> {
        let auth_header = auth_header
            .ok_or_else(|| AppError::InvalidToken("Token de autorización requerido".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let claims = verify_token(token, &self.config)?;

        Ok(ActorIdentity::from(claims))
    }
}
