//! Modelo de Rol
//!
//! Mapea a la tabla `roles`. `IdRol` y `FechaAlta` los asigna el servidor
//! y no cambian nunca; solo `Rol` y `Descripcion` son modificables.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::dto::envelope::Tagged;

/// Rol principal - mapea a la tabla roles
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Role {
    #[serde(rename = "IdRol")]
    pub id_rol: i64,
    #[serde(rename = "Rol")]
    pub rol: String,
    #[serde(rename = "FechaAlta", serialize_with = "fecha_alta::serialize")]
    pub fecha_alta: DateTime<Utc>,
    #[serde(rename = "Descripcion")]
    pub descripcion: String,
}

impl Tagged for Role {
    const TAG: &'static str = "Roles";
}

/// Datos para insertar un rol nuevo
#[derive(Debug, Clone)]
pub struct NewRole {
    pub rol: String,
    pub descripcion: String,
}

/// Cambios parciales sobre un rol; `None` deja el valor actual
#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub rol: Option<String>,
    pub descripcion: Option<String>,
}

impl RoleChanges {
    pub fn is_empty(&self) -> bool {
        self.rol.is_none() && self.descripcion.is_none()
    }
}

mod fecha_alta {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    const FORMATO: &str = "%Y-%m-%d %H:%M:%S%.6f";

    pub fn serialize<S>(fecha: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&fecha.format(FORMATO))
    }
}
