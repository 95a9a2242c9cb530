use serde::{Deserialize, Serialize};

/// Claims del JWT que emite el servicio de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // id del usuario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at timestamp
}

/// Administrador que ejecuta una operación, derivado de un token válido
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorIdentity {
    pub id_usuario: String,
    pub usuario: Option<String>,
}

impl From<JwtClaims> for ActorIdentity {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id_usuario: claims.sub,
            usuario: claims.usuario,
        }
    }
}
