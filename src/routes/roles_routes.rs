use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::dto::envelope::Envelope;
use crate::dto::request_envelope::RequestEnvelope;
use crate::dto::roles_dto::{
    CreateRoleRequest, ModifyRoleRequest, PermissionIdRequest, RoleIdRequest, SECCION_PERMISOS,
    SECCION_ROLES,
};
use crate::models::auth::ActorIdentity;
use crate::services::roles_service::RolesService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_roles_router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(listar))
        .route("/roles/dame", post(dame))
        .route("/roles/crear", post(crear))
        .route("/roles/borrar", post(borrar))
        .route("/roles/modificar", post(modificar))
        .route("/roles/listarPermisos", post(listar_permisos))
        .route("/roles/asignarPermisos", post(asignar_permisos))
        .route("/permisos", get(listar_catalogo_permisos))
}

fn service(state: &AppState) -> RolesService {
    RolesService::new(state.roles.clone())
}

/// Devuelve un rol a partir de su Id
async fn dame(
    State(state): State<AppState>,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: RoleIdRequest = peticion.section(SECCION_ROLES)?;

    let resultado = service(&state).get_role(rol.id_rol).await?;

    Ok(Json(Envelope::model(&resultado)?))
}

async fn crear(
    State(state): State<AppState>,
    actor: ActorIdentity,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: CreateRoleRequest = peticion.section(SECCION_ROLES)?;

    let resultado = service(&state).create_role(rol, &actor).await?;

    Ok(Json(Envelope::model(&resultado)?))
}

/// Lista los roles
async fn listar(State(state): State<AppState>) -> AppResult<Json<Envelope>> {
    let resultado = service(&state).list_roles().await?;

    Ok(Json(Envelope::models(&resultado)?))
}

async fn borrar(
    State(state): State<AppState>,
    actor: ActorIdentity,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: RoleIdRequest = peticion.section(SECCION_ROLES)?;

    service(&state).delete_role(rol.id_rol, &actor).await?;

    Ok(Json(Envelope::empty()))
}

async fn modificar(
    State(state): State<AppState>,
    actor: ActorIdentity,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: ModifyRoleRequest = peticion.section(SECCION_ROLES)?;

    let resultado = service(&state).modify_role(rol, &actor).await?;

    Ok(Json(Envelope::model(&resultado)?))
}

/// Lista los permisos de un rol
async fn listar_permisos(
    State(state): State<AppState>,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: RoleIdRequest = peticion.section(SECCION_ROLES)?;

    let resultado = service(&state).list_role_permissions(rol.id_rol).await?;

    Ok(Json(Envelope::models(&resultado)?))
}

async fn asignar_permisos(
    State(state): State<AppState>,
    actor: ActorIdentity,
    peticion: RequestEnvelope,
) -> AppResult<Json<Envelope>> {
    let rol: RoleIdRequest = peticion.section(SECCION_ROLES)?;
    let permisos: Vec<PermissionIdRequest> = peticion.section_list(SECCION_PERMISOS)?;

    let ids: Vec<i64> = permisos.iter().map(|p| p.id_permiso).collect();
    service(&state)
        .assign_permissions(rol.id_rol, &ids, &actor)
        .await?;

    Ok(Json(Envelope::empty()))
}

/// Catálogo completo de permisos asignables
async fn listar_catalogo_permisos(State(state): State<AppState>) -> AppResult<Json<Envelope>> {
    let resultado = service(&state).list_permissions().await?;

    Ok(Json(Envelope::models(&resultado)?))
}
