use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::permission::Permission;
use crate::models::role::{NewRole, Role, RoleChanges};
use crate::repositories::roles_repository::RolesRepository;
use crate::utils::errors::{AppError, AppResult};

const ROLE_COLUMNS: &str = "id_rol, rol, fecha_alta, COALESCE(descripcion, '') AS descripcion";

/// Repositorio de roles sobre PostgreSQL
#[derive(Clone)]
pub struct PostgresRolesRepository {
    pool: PgPool,
}

impl PostgresRolesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RolesRepository for PostgresRolesRepository {
    async fn find_role(&self, id_rol: i64) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE id_rol = $1",
            ROLE_COLUMNS
        ))
        .bind(id_rol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles ORDER BY id_rol",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn role_name_exists(&self, rol: &str, excluding: Option<i64>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE rol = $1 AND ($2::BIGINT IS NULL OR id_rol <> $2))",
        )
        .bind(rol)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn create_role(&self, new_role: NewRole) -> AppResult<Role> {
        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            INSERT INTO roles (rol, fecha_alta, descripcion)
            VALUES ($1, now(), $2)
            RETURNING {}
            "#,
            ROLE_COLUMNS
        ))
        .bind(&new_role.rol)
        .bind(&new_role.descripcion)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_role_conflict(e, &new_role.rol))?;

        Ok(role)
    }

    async fn update_role(&self, id_rol: i64, changes: RoleChanges) -> AppResult<Option<Role>> {
        let nombre = changes.rol.clone().unwrap_or_default();

        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            UPDATE roles
            SET rol = COALESCE($2, rol), descripcion = COALESCE($3, descripcion)
            WHERE id_rol = $1
            RETURNING {}
            "#,
            ROLE_COLUMNS
        ))
        .bind(id_rol)
        .bind(changes.rol)
        .bind(changes.descripcion)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_role_conflict(e, &nombre))?;

        Ok(role)
    }

    async fn delete_role(&self, id_rol: i64) -> AppResult<bool> {
        let mut transaction = self.pool.begin().await?;

        sqlx::query("DELETE FROM permisos_rol WHERE id_rol = $1")
            .bind(id_rol)
            .execute(&mut *transaction)
            .await?;

        let result = sqlx::query("DELETE FROM roles WHERE id_rol = $1")
            .bind(id_rol)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let permisos = sqlx::query_as::<_, Permission>(
            "SELECT id_permiso, permiso FROM permisos ORDER BY id_permiso",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permisos)
    }

    async fn list_role_permissions(&self, id_rol: i64) -> AppResult<Vec<Permission>> {
        let permisos = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id_permiso, p.permiso
            FROM permisos p
            INNER JOIN permisos_rol pr ON pr.id_permiso = p.id_permiso
            WHERE pr.id_rol = $1
            ORDER BY p.id_permiso
            "#,
        )
        .bind(id_rol)
        .fetch_all(&self.pool)
        .await?;

        Ok(permisos)
    }

    async fn assign_permissions(&self, id_rol: i64, permisos: &[i64]) -> AppResult<()> {
        let mut transaction = self.pool.begin().await?;

        // Bloquear el rol para que no se borre mientras se asigna
        let existe: Option<(i64,)> =
            sqlx::query_as("SELECT id_rol FROM roles WHERE id_rol = $1 FOR SHARE")
                .bind(id_rol)
                .fetch_optional(&mut *transaction)
                .await?;

        if existe.is_none() {
            return Err(AppError::RoleNotFound(id_rol));
        }

        let encontrados: Vec<(i64,)> =
            sqlx::query_as("SELECT id_permiso FROM permisos WHERE id_permiso = ANY($1)")
                .bind(permisos.to_vec())
                .fetch_all(&mut *transaction)
                .await?;

        let faltantes: Vec<i64> = permisos
            .iter()
            .copied()
            .filter(|id| !encontrados.iter().any(|(encontrado,)| encontrado == id))
            .collect();

        if !faltantes.is_empty() {
            return Err(AppError::PermissionNotFound(faltantes));
        }

        sqlx::query(
            r#"
            INSERT INTO permisos_rol (id_rol, id_permiso, fecha_alta)
            SELECT $1, id_permiso, now() FROM UNNEST($2::BIGINT[]) AS id_permiso
            ON CONFLICT (id_rol, id_permiso) DO NOTHING
            "#,
        )
        .bind(id_rol)
        .bind(permisos.to_vec())
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(())
    }
}

fn map_role_conflict(error: sqlx::Error, rol: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        if database_error.code().as_deref() == Some("23505") {
            return AppError::DuplicateRoleName(rol.to_string());
        }
    }

    AppError::Database(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    const ESQUEMA: [&str; 3] = [
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id_rol BIGSERIAL PRIMARY KEY,
            rol TEXT NOT NULL UNIQUE,
            fecha_alta TIMESTAMPTZ NOT NULL DEFAULT now(),
            descripcion TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS permisos (
            id_permiso BIGSERIAL PRIMARY KEY,
            permiso TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS permisos_rol (
            id_rol BIGINT NOT NULL REFERENCES roles (id_rol),
            id_permiso BIGINT NOT NULL REFERENCES permisos (id_permiso),
            fecha_alta TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (id_rol, id_permiso)
        )
        "#,
    ];

    async fn repository() -> PostgresRolesRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .unwrap();

        // Los tests corren en paralelo: el DDL va serializado
        let mut transaction = pool.begin().await.unwrap();
        sqlx::query("SELECT pg_advisory_xact_lock(727001)")
            .execute(&mut *transaction)
            .await
            .unwrap();
        for ddl in ESQUEMA {
            sqlx::query(ddl).execute(&mut *transaction).await.unwrap();
        }
        transaction.commit().await.unwrap();

        PostgresRolesRepository::new(pool)
    }

    fn unico(prefijo: &str) -> String {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{}-{}", prefijo, nanos)
    }

    fn nuevo(rol: &str) -> NewRole {
        NewRole {
            rol: rol.to_string(),
            descripcion: String::new(),
        }
    }

    async fn permiso(repo: &PostgresRolesRepository, nombre: &str) -> i64 {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO permisos (permiso) VALUES ($1) RETURNING id_permiso")
                .bind(nombre)
                .fetch_one(&repo.pool)
                .await
                .unwrap();
        id
    }

    #[tokio::test]
    #[ignore = "requiere DATABASE_URL"]
    async fn test_unique_violation_maps_to_duplicate_name() {
        let repo = repository().await;
        let nombre = unico("duplicado");

        repo.create_role(nuevo(&nombre)).await.unwrap();
        let err = repo.create_role(nuevo(&nombre)).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateRoleName(n) if n == nombre));
    }

    #[tokio::test]
    #[ignore = "requiere DATABASE_URL"]
    async fn test_partial_update_keeps_untouched_columns() {
        let repo = repository().await;
        let nombre = unico("parcial");
        let creado = repo.create_role(nuevo(&nombre)).await.unwrap();

        let modificado = repo
            .update_role(
                creado.id_rol,
                RoleChanges {
                    rol: None,
                    descripcion: Some("Nueva".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(modificado.rol, nombre);
        assert_eq!(modificado.descripcion, "Nueva");
        assert_eq!(modificado.fecha_alta, creado.fecha_alta);
        assert!(repo
            .update_role(-1, RoleChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    #[ignore = "requiere DATABASE_URL"]
    async fn test_assign_is_idempotent_and_all_or_nothing() {
        let repo = repository().await;
        let rol = repo.create_role(nuevo(&unico("asignar"))).await.unwrap();
        let a = permiso(&repo, "Permiso A").await;
        let b = permiso(&repo, "Permiso B").await;

        repo.assign_permissions(rol.id_rol, &[a]).await.unwrap();
        repo.assign_permissions(rol.id_rol, &[a, b]).await.unwrap();

        let err = repo
            .assign_permissions(rol.id_rol, &[a, -5])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionNotFound(ids) if ids == vec![-5]));

        let ids: Vec<i64> = repo
            .list_role_permissions(rol.id_rol)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id_permiso)
            .collect();
        assert_eq!(ids, vec![a, b]);

        assert!(repo.delete_role(rol.id_rol).await.unwrap());
        assert!(repo
            .list_role_permissions(rol.id_rol)
            .await
            .unwrap()
            .is_empty());
    }
}
