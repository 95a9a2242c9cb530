//! Sobre de respuesta de la API
//!
//! Toda respuesta tiene exactamente la forma `{error, respuesta}`: en caso de
//! éxito `error` es `null`, en caso de fallo `respuesta` es `null`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::errors::{internal_error, AppResult};

/// Modelos que viajan etiquetados con su nombre de tipo, p. ej. `{"Roles": {...}}`
pub trait Tagged: Serialize {
    const TAG: &'static str;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnvelopeError {
    pub codigo: String,
    pub mensaje: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    pub error: Option<EnvelopeError>,
    pub respuesta: Option<Value>,
}

impl Envelope {
    /// Éxito sin contenido
    pub fn empty() -> Self {
        Self {
            error: None,
            respuesta: None,
        }
    }

    /// Éxito con un valor arbitrario, sin etiqueta
    pub fn success(respuesta: Value) -> Self {
        Self {
            error: None,
            respuesta: Some(respuesta),
        }
    }

    /// Éxito con un único modelo etiquetado
    pub fn model<T: Tagged>(model: &T) -> AppResult<Self> {
        Ok(Self::success(tag(model)?))
    }

    /// Éxito con una lista donde cada elemento va etiquetado
    pub fn models<T: Tagged>(models: &[T]) -> AppResult<Self> {
        let items = models.iter().map(tag).collect::<AppResult<Vec<_>>>()?;
        Ok(Self::success(Value::Array(items)))
    }

    pub fn failure(codigo: &str, mensaje: String) -> Self {
        Self {
            error: Some(EnvelopeError {
                codigo: codigo.to_string(),
                mensaje,
            }),
            respuesta: None,
        }
    }
}

fn tag<T: Tagged>(model: &T) -> AppResult<Value> {
    let value = serde_json::to_value(model)
        .map_err(|e| internal_error(&format!("Error serializando {}: {}", T::TAG, e)))?;

    let mut object = Map::new();
    object.insert(T::TAG.to_string(), value);
    Ok(Value::Object(object))
}
