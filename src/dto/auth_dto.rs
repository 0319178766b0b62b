use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserResponse;

// Registro (JSON o formulario)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// Login (JSON o formulario)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Cambio de contraseña del usuario autenticado
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 1, max = 128))]
    pub new_password: String,
}

// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: i64, user: UserResponse) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}
