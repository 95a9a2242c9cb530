//! Modelo de Permiso
//!
//! Los permisos son de solo lectura para esta API; lo único mutable es su
//! asociación con los roles (tabla `permisos_rol`).

use serde::Serialize;
use sqlx::FromRow;

use crate::dto::envelope::Tagged;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Permission {
    #[serde(rename = "IdPermiso")]
    pub id_permiso: i64,
    #[serde(rename = "Permiso")]
    pub permiso: String,
}

impl Tagged for Permission {
    const TAG: &'static str = "Permisos";
}

impl Permission {
    pub fn new(id_permiso: i64, permiso: &str) -> Self {
        Self {
            id_permiso,
            permiso: permiso.to_string(),
        }
    }
}
