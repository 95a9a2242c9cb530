//! API de administración de roles y permisos
//!
//! Endpoints para crear, consultar, modificar y borrar roles, y para listar y
//! asignar permisos a un rol. Todas las respuestas usan el sobre
//! `{error, respuesta}`.

pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
