//! Decodificación del sobre de petición
//!
//! Las peticiones llegan como un objeto JSON cuyas claves de primer nivel
//! nombran secciones tipadas (`"Roles"`, `"Permisos"`). Este módulo valida el
//! objeto raíz y proyecta cada sección a su struct de petición.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::utils::errors::{field_decode_error, AppError, AppResult};

/// Cuerpo de la petición ya validado como objeto JSON
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    campos: Map<String, Value>,
}

impl RequestEnvelope {
    /// Parsear el cuerpo crudo; falla si no es un objeto JSON
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::MalformedRequest("cuerpo vacío".to_string()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedRequest(format!("JSON inválido: {}", e)))?;

        match value {
            Value::Object(campos) => Ok(Self { campos }),
            other => Err(AppError::MalformedRequest(format!(
                "se esperaba un objeto JSON, se recibió {}",
                tipo_json(&other)
            ))),
        }
    }

    /// Proyectar una sección objeto a un struct tipado
    pub fn section<T: DeserializeOwned>(&self, clave: &str) -> AppResult<T> {
        let value = self.required(clave)?;

        if !value.is_object() {
            return Err(field_decode_error(clave, "se esperaba un objeto"));
        }

        T::deserialize(value).map_err(|e| field_decode_error(clave, e))
    }

    /// Proyectar una sección lista a un `Vec` tipado
    pub fn section_list<T: DeserializeOwned>(&self, clave: &str) -> AppResult<Vec<T>> {
        let items = self
            .required(clave)?
            .as_array()
            .ok_or_else(|| field_decode_error(clave, "se esperaba una lista"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                T::deserialize(item).map_err(|e| field_decode_error(format!("{}[{}]", clave, i), e))
            })
            .collect()
    }

    fn required(&self, clave: &str) -> AppResult<&Value> {
        match self.campos.get(clave) {
            Some(Value::Null) | None => Err(field_decode_error(clave, "sección requerida")),
            Some(value) => Ok(value),
        }
    }
}

/// Extrae el cuerpo crudo y lo valida; los rechazos de axum (cuerpo demasiado
/// grande, stream cortado) también salen como `ERROR_PETICION_MALFORMADA`
#[async_trait]
impl<S> FromRequest<S> for RequestEnvelope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedRequest(rejection.body_text()))?;

        Self::parse(&body)
    }
}

fn tipo_json(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "un booleano",
        Value::Number(_) => "un número",
        Value::String(_) => "un texto",
        Value::Array(_) => "una lista",
        Value::Object(_) => "un objeto",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnteroOTexto {
    Entero(i64),
    Texto(String),
}

/// Acepta un entero JSON o un texto numérico (`2` o `"2"`)
pub fn entero_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match EnteroOTexto::deserialize(deserializer)? {
        EnteroOTexto::Entero(n) => Ok(n),
        EnteroOTexto::Texto(s) => s.trim().parse::<i64>().map_err(|_| {
            serde::de::Error::custom(format!("'{}' no es un entero válido", s))
        }),
    }
}
