//! Utilidades JWT
//!
//! Este módulo contiene funciones helper para verificar los tokens que emite
//! el servicio de login.

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    config::environment::EnvironmentConfig,
    models::auth::JwtClaims,
    utils::errors::AppError,
};

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
        }
    }
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::InvalidToken(format!("Token inválido: {}", e)))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::InvalidToken("El token no identifica al usuario".to_string()));
    }

    Ok(token_data.claims)
}

/// Extraer token del header Authorization; acepta `Bearer <token>` o el token solo
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let auth_header = auth_header.trim();
    let token = match auth_header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some((scheme, _)) => {
            return Err(AppError::InvalidToken(format!(
                "Esquema de autorización no soportado: {}",
                scheme
            )))
        }
        None if auth_header.eq_ignore_ascii_case("bearer") => "",
        None => auth_header,
    };

    if token.is_empty() {
        return Err(AppError::InvalidToken("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}

/// Firma un token como lo haría el servicio de login
#[cfg(test)]
pub(crate) fn generate_token(
    id_usuario: &str,
    usuario: Option<&str>,
    config: &JwtConfig,
) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = JwtClaims {
        sub: id_usuario.to_string(),
        usuario: usuario.map(str::to_string),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .unwrap()
}
