//! Gestor de roles y permisos
//!
//! Reglas de negocio sobre el repositorio: unicidad del nombre de rol,
//! existencia de roles y permisos referenciados, y registro de auditoría de
//! cada mutación con el administrador que la ejecuta.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::dto::roles_dto::{CreateRoleRequest, ModifyRoleRequest};
use crate::models::auth::ActorIdentity;
use crate::models::permission::Permission;
use crate::models::role::{NewRole, Role, RoleChanges};
use crate::repositories::roles_repository::RolesRepository;
use crate::utils::errors::{AppError, AppResult};

const AUDIT: &str = "roles_admin::audit";

pub struct RolesService {
    repository: Arc<dyn RolesRepository>,
}

impl RolesService {
    pub fn new(repository: Arc<dyn RolesRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_role(&self, id_rol: i64) -> AppResult<Role> {
        self.repository
            .find_role(id_rol)
            .await?
            .ok_or(AppError::RoleNotFound(id_rol))
    }

    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles().await
    }

    pub async fn create_role(
        &self,
        request: CreateRoleRequest,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        let request = request.normalized();
        request.validate()?;

        let rol = request.rol;

        if self.repository.role_name_exists(&rol, None).await? {
            return Err(AppError::DuplicateRoleName(rol));
        }

        // El repositorio vuelve a verificar la unicidad de forma atómica
        let role = self
            .repository
            .create_role(NewRole {
                rol,
                descripcion: request.descripcion.unwrap_or_default(),
            })
            .await?;

        info!(
            target: AUDIT,
            actor = %actor.id_usuario,
            accion = "crear_rol",
            id_rol = role.id_rol,
            "Rol '{}' creado",
            role.rol
        );

        Ok(role)
    }

    pub async fn delete_role(&self, id_rol: i64, actor: &ActorIdentity) -> AppResult<()> {
        if !self.repository.delete_role(id_rol).await? {
            return Err(AppError::RoleNotFound(id_rol));
        }

        info!(
            target: AUDIT,
            actor = %actor.id_usuario,
            accion = "borrar_rol",
            id_rol,
            "Rol borrado"
        );

        Ok(())
    }

    pub async fn modify_role(
        &self,
        request: ModifyRoleRequest,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        let request = request.normalized();
        request.validate()?;

        let id_rol = request.id_rol;
        let actual = self.get_role(id_rol).await?;
        let rol = request.rol;

        if let Some(rol) = &rol {
            if self.repository.role_name_exists(rol, Some(id_rol)).await? {
                return Err(AppError::DuplicateRoleName(rol.clone()));
            }
        }

        let changes = RoleChanges {
            rol,
            descripcion: request.descripcion,
        };

        if changes.is_empty() {
            return Ok(actual);
        }

        let role = self
            .repository
            .update_role(id_rol, changes)
            .await?
            .ok_or(AppError::RoleNotFound(id_rol))?;

        info!(
            target: AUDIT,
            actor = %actor.id_usuario,
            accion = "modificar_rol",
            id_rol,
            "Rol '{}' modificado",
            role.rol
        );

        Ok(role)
    }

    pub async fn list_role_permissions(&self, id_rol: i64) -> AppResult<Vec<Permission>> {
        if self.repository.find_role(id_rol).await?.is_none() {
            return Err(AppError::RoleNotFound(id_rol));
        }

        self.repository.list_role_permissions(id_rol).await
    }

    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.repository.list_permissions().await
    }

    /// Asignación aditiva: los permisos ya asignados se conservan
    pub async fn assign_permissions(
        &self,
        id_rol: i64,
        permisos: &[i64],
        actor: &ActorIdentity,
    ) -> AppResult<()> {
        let mut permisos = permisos.to_vec();
        permisos.sort_unstable();
        permisos.dedup();

        self.repository.assign_permissions(id_rol, &permisos).await?;

        info!(
            target: AUDIT,
            actor = %actor.id_usuario,
            accion = "asignar_permisos",
            id_rol,
            permisos = ?permisos,
            "Permisos asignados"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::in_memory_roles_repository::{
        default_permissions, InMemoryRolesRepository,
    };

    fn service() -> RolesService {
        RolesService::new(Arc::new(InMemoryRolesRepository::with_permissions(
            default_permissions(),
        )))
    }

    fn actor() -> ActorIdentity {
        ActorIdentity {
            id_usuario: "1".to_string(),
            usuario: Some("admin".to_string()),
        }
    }

    fn create(rol: &str) -> CreateRoleRequest {
        CreateRoleRequest {
            rol: rol.to_string(),
            descripcion: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let created = service.create_role(create("X"), &actor()).await.unwrap();
        let fetched = service.get_role(created.id_rol).await.unwrap();

        assert_eq!(fetched.rol, "X");
        assert_eq!(fetched.descripcion, "");
        assert_eq!(fetched.fecha_alta, created.fecha_alta);
    }

    #[tokio::test]
    async fn test_duplicate_name_does_not_mutate() {
        let service = service();
        service.create_role(create("Encargados"), &actor()).await.unwrap();

        let err = service
            .create_role(create("  Encargados "), &actor())
            .await
            .unwrap_err();

        assert_eq!(err.codigo(), "ERROR_EXISTE_NOMBREROL");
        assert_eq!(service.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let err = service().create_role(create("   "), &actor()).await.unwrap_err();
        assert_eq!(err.codigo(), "ERROR_VALIDACION");
    }

    #[tokio::test]
    async fn test_get_missing_role_is_not_found() {
        let err = service().get_role(99).await.unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(99)));
    }

    #[tokio::test]
    async fn test_modify_description_only_preserves_rest() {
        let service = service();
        let created = service.create_role(create("Vendedores"), &actor()).await.unwrap();

        let modified = service
            .modify_role(
                ModifyRoleRequest {
                    id_rol: created.id_rol,
                    rol: None,
                    descripcion: Some("Nueva descripcion".to_string()),
                },
                &actor(),
            )
            .await
            .unwrap();

        assert_eq!(modified.id_rol, created.id_rol);
        assert_eq!(modified.rol, created.rol);
        assert_eq!(modified.fecha_alta, created.fecha_alta);
        assert_eq!(modified.descripcion, "Nueva descripcion");
    }

    #[tokio::test]
    async fn test_modify_keeping_own_name_is_allowed() {
        let service = service();
        let created = service.create_role(create("Vendedores"), &actor()).await.unwrap();

        let modified = service
            .modify_role(
                ModifyRoleRequest {
                    id_rol: created.id_rol,
                    rol: Some("Vendedores".to_string()),
                    descripcion: None,
                },
                &actor(),
            )
            .await
            .unwrap();
        assert_eq!(modified.rol, "Vendedores");
    }

    #[tokio::test]
    async fn test_modify_to_taken_name_fails() {
        let service = service();
        service.create_role(create("A"), &actor()).await.unwrap();
        let b = service.create_role(create("B"), &actor()).await.unwrap();

        let err = service
            .modify_role(
                ModifyRoleRequest {
                    id_rol: b.id_rol,
                    rol: Some("A".to_string()),
                    descripcion: None,
                },
                &actor(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.codigo(), "ERROR_EXISTE_NOMBREROL");
    }

    #[tokio::test]
    async fn test_modify_missing_role() {
        let err = service()
            .modify_role(
                ModifyRoleRequest {
                    id_rol: 5,
                    rol: None,
                    descripcion: Some("x".to_string()),
                },
                &actor(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(5)));
    }

    #[tokio::test]
    async fn test_modify_missing_role_with_taken_name() {
        let service = service();
        service.create_role(create("A"), &actor()).await.unwrap();

        let err = service
            .modify_role(
                ModifyRoleRequest {
                    id_rol: 999,
                    rol: Some("A".to_string()),
                    descripcion: None,
                },
                &actor(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(999)));
    }

    #[tokio::test]
    async fn test_padded_name_within_limit_is_accepted() {
        let nombre = "x".repeat(60);
        let created = service()
            .create_role(create(&format!("  {}  ", nombre)), &actor())
            .await
            .unwrap();
        assert_eq!(created.rol, nombre);
    }

    #[tokio::test]
    async fn test_delete_missing_role_is_not_silent() {
        let service = service();
        let created = service.create_role(create("A"), &actor()).await.unwrap();

        service.delete_role(created.id_rol, &actor()).await.unwrap();
        let err = service.delete_role(created.id_rol, &actor()).await.unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(_)));
    }

    #[tokio::test]
    async fn test_new_role_has_no_permissions() {
        let service = service();
        let created = service.create_role(create("A"), &actor()).await.unwrap();
        assert!(service
            .list_role_permissions(created.id_rol)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_assign_is_all_or_nothing() {
        let service = service();
        let created = service.create_role(create("A"), &actor()).await.unwrap();

        let err = service
            .assign_permissions(created.id_rol, &[1, 404], &actor())
            .await
            .unwrap_err();

        match err {
            AppError::PermissionNotFound(ids) => assert_eq!(ids, vec![404]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(service
            .list_role_permissions(created.id_rol)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_assign_is_additive_and_deduplicated() {
        let service = service();
        let created = service.create_role(create("A"), &actor()).await.unwrap();

        service
            .assign_permissions(created.id_rol, &[2, 2], &actor())
            .await
            .unwrap();
        service
            .assign_permissions(created.id_rol, &[1, 2], &actor())
            .await
            .unwrap();

        let ids: Vec<i64> = service
            .list_role_permissions(created.id_rol)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id_permiso)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_assign_to_missing_role() {
        let err = service()
            .assign_permissions(77, &[1], &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(77)));
    }
}
