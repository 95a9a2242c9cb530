//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el gestor de
//! roles y la validación de tokens.

pub mod roles_service;
pub mod token_service;
