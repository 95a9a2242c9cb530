//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión al sobre de respuesta `{error, respuesta}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::dto::envelope::Envelope;

/// Mensaje genérico para fallos no clasificados
pub const MENSAJE_DEFAULT: &str = "Ha ocurrido un error mientras se procesaba su petición.";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Field decode error in '{campo}': {detalle}")]
    FieldDecode { campo: String, detalle: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid or missing token: {0}")]
    InvalidToken(String),

    #[error("Role {0} not found")]
    RoleNotFound(i64),

    #[error("Permissions not found: {0:?}")]
    PermissionNotFound(Vec<i64>),

    #[error("Role name '{0}' already exists")]
    DuplicateRoleName(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Código estable que viaja en `error.codigo`
    pub fn codigo(&self) -> &'static str {
        match self {
            AppError::MalformedRequest(_) => "ERROR_PETICION_MALFORMADA",
            AppError::FieldDecode { .. } => "ERROR_DECODIFICAR_CAMPO",
            AppError::Validation(_) => "ERROR_VALIDACION",
            AppError::InvalidToken(_) => "ERROR_TOKEN_INVALIDO",
            AppError::RoleNotFound(_) => "ERROR_NOEXISTE_ROL",
            AppError::PermissionNotFound(_) => "ERROR_NOEXISTE_PERMISO",
            AppError::DuplicateRoleName(_) => "ERROR_EXISTE_NOMBREROL",
            AppError::RouteNotFound(_) | AppError::Database(_) | AppError::Internal(_) => {
                "ERROR_DEFAULT"
            }
        }
    }

    /// Mensaje legible para el cliente
    pub fn mensaje(&self) -> String {
        match self {
            AppError::MalformedRequest(_) => {
                "La petición no tiene un formato válido.".to_string()
            }
            AppError::FieldDecode { campo, detalle } => {
                format!("No se pudo interpretar el campo {}: {}.", campo, detalle)
            }
            AppError::Validation(errors) => {
                let mut campos: Vec<&str> = errors.field_errors().keys().copied().collect();
                campos.sort_unstable();
                format!("Los siguientes campos no son válidos: {}.", campos.join(", "))
            }
            AppError::InvalidToken(_) => {
                "El token de autorización no es válido.".to_string()
            }
            AppError::RoleNotFound(_) => "No existe el rol.".to_string(),
            AppError::PermissionNotFound(ids) => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                format!("No existe el permiso ({}).", ids.join(", "))
            }
            AppError::DuplicateRoleName(_) => "El nombre de rol ya existe.".to_string(),
            AppError::RouteNotFound(_) => "El recurso solicitado no existe.".to_string(),
            AppError::Database(_) | AppError::Internal(_) => MENSAJE_DEFAULT.to_string(),
        }
    }

    /// Código HTTP: 422 para peticiones o tokens inválidos, 400 para el resto
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_)
            | AppError::FieldDecode { .. }
            | AppError::Validation(_)
            | AppError::InvalidToken(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => error!("Database error: {}", e),
            AppError::Internal(msg) => error!("Internal error: {}", msg),
            other => warn!(codigo = other.codigo(), "{}", other),
        }

        let envelope = Envelope::failure(self.codigo(), self.mensaje());
        (self.status_code(), Json(envelope)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de decodificación de campos
pub fn field_decode_error(campo: impl Into<String>, detalle: impl ToString) -> AppError {
    AppError::FieldDecode {
        campo: campo.into(),
        detalle: detalle.to_string(),
    }
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
