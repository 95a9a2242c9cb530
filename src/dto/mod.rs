//! Objetos de transferencia
//!
//! Sobres de petición y respuesta, y los structs tipados de cada sección.

pub mod envelope;
pub mod request_envelope;
pub mod roles_dto;
