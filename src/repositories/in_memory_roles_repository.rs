use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::permission::Permission;
use crate::models::role::{NewRole, Role, RoleChanges};
use crate::repositories::roles_repository::RolesRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Default)]
struct Store {
    roles: BTreeMap<i64, Role>,
    permisos: BTreeMap<i64, Permission>,
    // (id_rol, id_permiso)
    asignaciones: BTreeSet<(i64, i64)>,
    siguiente_id: i64,
}

impl Store {
    fn name_taken(&self, rol: &str, excluding: Option<i64>) -> bool {
        self.roles
            .values()
            .any(|r| r.rol == rol && Some(r.id_rol) != excluding)
    }
}

/// Repositorio de roles en memoria.
///
/// Todas las mutaciones se serializan detrás de un único lock, así que la
/// verificación de unicidad y la escritura son atómicas.
#[derive(Debug, Default)]
pub struct InMemoryRolesRepository {
    store: RwLock<Store>,
}

impl InMemoryRolesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crear un repositorio con un catálogo de permisos precargado
    pub fn with_permissions(permisos: Vec<Permission>) -> Self {
        let store = Store {
            permisos: permisos.into_iter().map(|p| (p.id_permiso, p)).collect(),
            ..Store::default()
        };

        Self {
            store: RwLock::new(store),
        }
    }
}

/// Catálogo por defecto para el modo en memoria
pub fn default_permissions() -> Vec<Permission> {
    vec![
        Permission::new(1, "Crear rol"),
        Permission::new(2, "Borrar rol"),
        Permission::new(3, "Modificar rol"),
        Permission::new(4, "Asignar permisos"),
        Permission::new(5, "Listar roles"),
    ]
}

#[async_trait]
impl RolesRepository for InMemoryRolesRepository {
    async fn find_role(&self, id_rol: i64) -> AppResult<Option<Role>> {
        Ok(self.store.read().await.roles.get(&id_rol).cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.store.read().await.roles.values().cloned().collect())
    }

    async fn role_name_exists(&self, rol: &str, excluding: Option<i64>) -> AppResult<bool> {
        Ok(self.store.read().await.name_taken(rol, excluding))
    }

    async fn create_role(&self, new_role: NewRole) -> AppResult<Role> {
        let mut store = self.store.write().await;

        if store.name_taken(&new_role.rol, None) {
            return Err(AppError::DuplicateRoleName(new_role.rol));
        }

        store.siguiente_id += 1;
        let role = Role {
            id_rol: store.siguiente_id,
            rol: new_role.rol,
            fecha_alta: Utc::now(),
            descripcion: new_role.descripcion,
        };
        store.roles.insert(role.id_rol, role.clone());

        Ok(role)
    }

    async fn update_role(&self, id_rol: i64, changes: RoleChanges) -> AppResult<Option<Role>> {
        let mut store = self.store.write().await;

        if let Some(rol) = &changes.rol {
            if store.name_taken(rol, Some(id_rol)) {
                return Err(AppError::DuplicateRoleName(rol.clone()));
            }
        }

        let Some(role) = store.roles.get_mut(&id_rol) else {
            return Ok(None);
        };

        if let Some(rol) = changes.rol {
            role.rol = rol;
        }
        if let Some(descripcion) = changes.descripcion {
            role.descripcion = descripcion;
        }

        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, id_rol: i64) -> AppResult<bool> {
        let mut store = self.store.write().await;

        if store.roles.remove(&id_rol).is_none() {
            return Ok(false);
        }
        store.asignaciones.retain(|(rol, _)| *rol != id_rol);

        Ok(true)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.store.read().await.permisos.values().cloned().collect())
    }

    async fn list_role_permissions(&self, id_rol: i64) -> AppResult<Vec<Permission>> {
        let store = self.store.read().await;

        let permisos = store
            .asignaciones
            .range((id_rol, i64::MIN)..=(id_rol, i64::MAX))
            .filter_map(|(_, id_permiso)| store.permisos.get(id_permiso).cloned())
            .collect();

        Ok(permisos)
    }

    async fn assign_permissions(&self, id_rol: i64, permisos: &[i64]) -> AppResult<()> {
        let mut store = self.store.write().await;

        if !store.roles.contains_key(&id_rol) {
            return Err(AppError::RoleNotFound(id_rol));
        }

        let faltantes: Vec<i64> = permisos
            .iter()
            .copied()
            .filter(|id| !store.permisos.contains_key(id))
            .collect();

        if !faltantes.is_empty() {
            return Err(AppError::PermissionNotFound(faltantes));
        }

        store
            .asignaciones
            .extend(permisos.iter().map(|id_permiso| (id_rol, *id_permiso)));

        Ok(())
    }
}
