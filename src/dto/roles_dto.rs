use serde::Deserialize;
use validator::Validate;

use crate::dto::request_envelope::entero_flexible;

/// Sección `"Roles"` de las peticiones
pub const SECCION_ROLES: &str = "Roles";
/// Sección `"Permisos"` de la petición de asignación
pub const SECCION_PERMISOS: &str = "Permisos";

// Request que solo identifica un rol: dame, borrar, listarPermisos, asignarPermisos
#[derive(Debug, Deserialize)]
pub struct RoleIdRequest {
    #[serde(rename = "IdRol", deserialize_with = "entero_flexible")]
    pub id_rol: i64,
}

// Request para crear un rol
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[serde(rename = "Rol")]
    #[validate(length(min = 1, max = 60))]
    pub rol: String,

    #[serde(rename = "Descripcion", default)]
    #[validate(length(max = 255))]
    pub descripcion: Option<String>,
}

// Request para modificar un rol; los campos ausentes no se tocan
#[derive(Debug, Deserialize, Validate)]
pub struct ModifyRoleRequest {
    #[serde(rename = "IdRol", deserialize_with = "entero_flexible")]
    pub id_rol: i64,

    #[serde(rename = "Rol", default)]
    #[validate(length(min = 1, max = 60))]
    pub rol: Option<String>,

    #[serde(rename = "Descripcion", default)]
    #[validate(length(max = 255))]
    pub descripcion: Option<String>,
}

impl CreateRoleRequest {
    /// Recorta espacios del nombre; las reglas de longitud aplican al valor guardado
    pub fn normalized(mut self) -> Self {
        self.rol = self.rol.trim().to_string();
        self
    }
}

impl ModifyRoleRequest {
    pub fn normalized(mut self) -> Self {
        self.rol = self.rol.map(|rol| rol.trim().to_string());
        self
    }
}

// Elemento de la lista `"Permisos"`
#[derive(Debug, Deserialize)]
pub struct PermissionIdRequest {
    #[serde(rename = "IdPermiso", deserialize_with = "entero_flexible")]
    pub id_permiso: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::request_envelope::RequestEnvelope;

    #[test]
    fn test_create_request_optional_description() {
        let req = RequestEnvelope::parse(br#"{"Roles": {"Rol": "Encargados"}}"#).unwrap();
        let create: CreateRoleRequest = req.section(SECCION_ROLES).unwrap();
        assert_eq!(create.rol, "Encargados");
        assert!(create.descripcion.is_none());
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_long_name() {
        let create = CreateRoleRequest {
            rol: "x".repeat(61),
            descripcion: None,
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_modify_request_distinguishes_absent_fields() {
        let req = RequestEnvelope::parse(
            br#"{"Roles": {"IdRol": "7", "Descripcion": "Nueva descripcion"}}"#,
        )
        .unwrap();
        let modify: ModifyRoleRequest = req.section(SECCION_ROLES).unwrap();
        assert_eq!(modify.id_rol, 7);
        assert!(modify.rol.is_none());
        assert_eq!(modify.descripcion.as_deref(), Some("Nueva descripcion"));

        let empty_name = ModifyRoleRequest {
            id_rol: 7,
            rol: Some(String::new()),
            descripcion: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_name_limits_apply_after_trimming() {
        let padded = CreateRoleRequest {
            rol: format!("  {}  ", "x".repeat(60)),
            descripcion: None,
        }
        .normalized();
        assert_eq!(padded.rol.len(), 60);
        assert!(padded.validate().is_ok());

        let blank = ModifyRoleRequest {
            id_rol: 1,
            rol: Some("   ".to_string()),
            descripcion: None,
        }
        .normalized();
        assert_eq!(blank.rol.as_deref(), Some(""));
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_assign_request_sections() {
        let req = RequestEnvelope::parse(
            br#"{"Roles": {"IdRol": 9}, "Permisos": [{"IdPermiso": 3}, {"IdPermiso": "4"}]}"#,
        )
        .unwrap();
        let rol: RoleIdRequest = req.section(SECCION_ROLES).unwrap();
        let permisos: Vec<PermissionIdRequest> = req.section_list(SECCION_PERMISOS).unwrap();
        assert_eq!(rol.id_rol, 9);
        assert_eq!(
            permisos.iter().map(|p| p.id_permiso).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }
}
