use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub nombre: String,
    pub rol: String,
    pub activo: bool,
}

impl User {
    /// The only identity the mock endpoint ever returns
    pub fn admin(email: &str) -> Self {
        Self {
            id: "1".to_string(),
            email: email.to_string(),
            nombre: "Administrador".to_string(),
            rol: "admin".to_string(),
            activo: true,
        }
    }
}

/// Payload of a successful `auth` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
    pub message: String,
}
