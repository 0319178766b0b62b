//! Servicio de autenticación
//!
//! Registro, login y cambio de contraseña sobre la colección de usuarios.
//! Las contraseñas se guardan con bcrypt y las sesiones son JWT.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::auth_dto::{LoginResponse, RegisterRequest};
use crate::models::{User, UserResponse};
use crate::repositories::UserRepository;
use crate::utils::errors::{bad_request_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::{validate_email, validate_password, validate_username};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Servicio de autenticación
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self {
            users,
            jwt,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Coste de bcrypt (los tests usan el mínimo, 4)
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Registra un usuario nuevo
    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserResponse> {
        let (username, email, password) = match (
            present(request.username),
            present(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) {
            (Some(u), Some(e), Some(p)) => (u, e.to_lowercase(), p),
            _ => return Err(bad_request_error("All fields are required")),
        };

        if validate_username(&username).is_err() {
            return Err(bad_request_error(
                "Username must be 3-20 characters, alphanumeric and underscores only",
            ));
        }
        if validate_email(&email).is_err() {
            return Err(bad_request_error("Please enter a valid email address"));
        }
        validate_password(&password).map_err(bad_request_error)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(&password).await?;
        let user = self.users.insert(User::new(username, email, password_hash)).await?;

        info!("👤 Usuario registrado: {}", user.username);
        Ok(user.into())
    }

    /// Login: actualiza `last_login` y emite un JWT
    pub async fn login(&self, username: Option<String>, password: Option<String>) -> AppResult<LoginResponse> {
        let (username, password) = match (present(username), password.filter(|p| !p.is_empty())) {
            (Some(u), Some(p)) => (u, p),
            _ => return Err(bad_request_error("Username and password are required")),
        };

        let mut user = match self.users.find_by_username(&username).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!("🔒 Login fallido para '{}'", username);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !self.verify_password(&password, &user.password_hash).await? {
            warn!("🔒 Contraseña incorrecta para '{}'", username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = Utc::now();
        user.last_login = Some(now);
        user.updated_at = now;
        self.users.update(&user).await?;

        let token = generate_token(user.id, &user.username, &self.jwt)?;
        info!("✅ Login correcto: {}", user.username);

        Ok(LoginResponse::bearer(token, self.jwt.expiration as i64, user.into()))
    }

    /// Cambia la contraseña tras verificar la actual
    pub async fn change_password(&self, user_id: Uuid, old_password: &str, new_password: &str) -> AppResult<()> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self.verify_password(old_password, &user.password_hash).await? {
            return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
        }
        validate_password(new_password).map_err(bad_request_error)?;

        user.password_hash = self.hash_password(new_password).await?;
        user.updated_at = Utc::now();
        if !self.users.update(&user).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!("🔑 Contraseña actualizada para {}", user.username);
        Ok(())
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<UserResponse> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    // bcrypt es CPU-bound: fuera de los workers de tokio
    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryUserRepository;
    use crate::utils::jwt::verify_token;

    fn service() -> AuthService {
        let jwt = JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        };
        AuthService::new(Arc::new(MemoryUserRepository::new()), jwt).with_cost(4)
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::BadRequest(m) | AppError::Conflict(m) | AppError::Unauthorized(m) | AppError::NotFound(m) => m,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_validation_messages() {
        let auth = service();

        let missing = RegisterRequest {
            username: Some("ravi".into()),
            ..Default::default()
        };
        assert_eq!(message(auth.register(missing).await.unwrap_err()), "All fields are required");

        let bad_name = register_request("r!", "ravi@example.com", "Secret1");
        assert_eq!(
            message(auth.register(bad_name).await.unwrap_err()),
            "Username must be 3-20 characters, alphanumeric and underscores only"
        );

        let bad_email = register_request("ravi", "ravi@", "Secret1");
        assert_eq!(
            message(auth.register(bad_email).await.unwrap_err()),
            "Please enter a valid email address"
        );

        let weak = register_request("ravi", "ravi@example.com", "secret");
        assert_eq!(
            message(auth.register(weak).await.unwrap_err()),
            "Password must contain at least one uppercase letter"
        );
    }

    #[tokio::test]
    async fn test_register_conflicts() {
        let auth = service();
        auth.register(register_request("ravi", "ravi@example.com", "Secret1"))
            .await
            .unwrap();

        let same_name = auth
            .register(register_request("ravi", "other@example.com", "Secret1"))
            .await
            .unwrap_err();
        assert_eq!(message(same_name), "Username already exists");

        let same_email = auth
            .register(register_request("ravi2", "RAVI@example.com", "Secret1"))
            .await
            .unwrap_err();
        assert_eq!(message(same_email), "Email already registered");
    }

    #[tokio::test]
    async fn test_login_issues_token_and_sets_last_login() {
        let auth = service();
        let user = auth
            .register(register_request("meera", "meera@example.com", "Secret1"))
            .await
            .unwrap();
        assert!(user.last_login.is_none());

        let response = auth.login(Some("meera".into()), Some("Secret1".into())).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert!(response.user.last_login.is_some());

        let claims = verify_token(&response.token, auth.jwt_config()).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "meera");
    }

    #[tokio::test]
    async fn test_login_failures_share_message() {
        let auth = service();
        auth.register(register_request("meera", "meera@example.com", "Secret1"))
            .await
            .unwrap();

        let wrong = auth.login(Some("meera".into()), Some("Wrong1".into())).await.unwrap_err();
        let unknown = auth.login(Some("nobody".into()), Some("Secret1".into())).await.unwrap_err();
        assert_eq!(message(wrong), INVALID_CREDENTIALS);
        assert_eq!(message(unknown), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = service();
        let user = auth
            .register(register_request("arjun", "arjun@example.com", "Secret1"))
            .await
            .unwrap();

        let wrong_old = auth.change_password(user.id, "Nope123", "Fresh2024").await.unwrap_err();
        assert_eq!(message(wrong_old), "Current password is incorrect");

        let weak_new = auth.change_password(user.id, "Secret1", "short").await.unwrap_err();
        assert!(matches!(weak_new, AppError::BadRequest(_)));

        auth.change_password(user.id, "Secret1", "Fresh2024").await.unwrap();
        assert!(auth.login(Some("arjun".into()), Some("Secret1".into())).await.is_err());
        assert!(auth.login(Some("arjun".into()), Some("Fresh2024".into())).await.is_ok());

        let ghost = auth.change_password(Uuid::new_v4(), "a", "Fresh2024").await.unwrap_err();
        assert_eq!(message(ghost), "User not found");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_does_not_block_runtime() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let jwt = JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        };
        let auth = AuthService::new(Arc::new(MemoryUserRepository::new()), jwt).with_cost(10);

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        auth.register(register_request("kiran", "kiran@example.com", "Secret1"))
            .await
            .unwrap();
        ticker.abort();

        assert!(ticks.load(Ordering::SeqCst) > 0);
    }
}
