//! Puerto de persistencia de roles y permisos
//!
//! El servicio de roles solo conoce este trait. Las implementaciones deben
//! garantizar que la unicidad del nombre y la asignación de permisos sean
//! atómicas.

use async_trait::async_trait;

use crate::models::permission::Permission;
use crate::models::role::{NewRole, Role, RoleChanges};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait RolesRepository: Send + Sync {
    /// Buscar un rol por id
    async fn find_role(&self, id_rol: i64) -> AppResult<Option<Role>>;

    /// Listar todos los roles ordenados por id
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Verificar si otro rol ya usa ese nombre
    async fn role_name_exists(&self, rol: &str, excluding: Option<i64>) -> AppResult<bool>;

    /// Insertar un rol; `DuplicateRoleName` si el nombre ya existe
    async fn create_role(&self, new_role: NewRole) -> AppResult<Role>;

    /// Aplicar cambios parciales; `Ok(None)` si el rol no existe
    async fn update_role(&self, id_rol: i64, changes: RoleChanges) -> AppResult<Option<Role>>;

    /// Borrar un rol y sus asignaciones; `false` si no existía
    async fn delete_role(&self, id_rol: i64) -> AppResult<bool>;

    /// Catálogo completo de permisos ordenado por id
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Permisos asignados a un rol
    async fn list_role_permissions(&self, id_rol: i64) -> AppResult<Vec<Permission>>;

    /// Asignar permisos a un rol, todo o nada.
    /// `RoleNotFound` o `PermissionNotFound` si alguna referencia no existe.
    async fn assign_permissions(&self, id_rol: i64, permisos: &[i64]) -> AppResult<()>;
}
