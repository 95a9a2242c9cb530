use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use roles_admin::config::database::DatabaseConfig;
use roles_admin::config::environment::{EnvironmentConfig, StorageBackend};
use roles_admin::repositories::in_memory_roles_repository::default_permissions;
use roles_admin::repositories::{InMemoryRolesRepository, PostgresRolesRepository, RolesRepository};
use roles_admin::routes::create_router;
use roles_admin::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;

    info!(
        environment = %config.environment,
        storage = ?config.storage,
        "Iniciando API de roles y permisos"
    );

    let roles: Arc<dyn RolesRepository> = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            info!("Conectando a la base de datos {}", db_config.masked_url());

            let pool = db_config.create_pool().await.map_err(|e| {
                error!("Error conectando a la base de datos: {}", e);
                e
            })?;
            Arc::new(PostgresRolesRepository::new(pool))
        }
        StorageBackend::Memory => {
            if !config.is_development() {
                warn!("Persistencia en memoria fuera de development: los datos se pierden al reiniciar");
            }
            Arc::new(InMemoryRolesRepository::with_permissions(default_permissions()))
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    if config.cors_origins.is_empty() {
        warn!("CORS_ORIGINS vacío: se permite cualquier origen");
    }

    let app = create_router(AppState::new(roles, config));

    info!("Servidor iniciando en http://{}", addr);
    info!("   POST /roles/dame             - Dame rol");
    info!("   POST /roles/crear            - Crear rol (token)");
    info!("   GET  /roles                  - Listar roles");
    info!("   POST /roles/borrar           - Borrar rol (token)");
    info!("   POST /roles/modificar        - Modificar rol (token)");
    info!("   POST /roles/listarPermisos   - Listar permisos de un rol");
    info!("   POST /roles/asignarPermisos  - Asignar permisos (token)");
    info!("   GET  /permisos               - Catálogo de permisos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("Error del servidor: {}", e);
            e
        })?;

    info!("Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("Señal de terminación recibida, apagando servidor...");
        },
    }
}
