use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::User;
use crate::repositories::listing_repository::is_unique_violation;
use crate::utils::errors::{conflict_error, AppError, AppResult};

/// Colección de usuarios
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Reemplaza el documento; `false` si el usuario no existe
    async fn update(&self, user: &User) -> AppResult<bool>;

    async fn count(&self) -> AppResult<u64>;
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(conflict_error("User", "username", &user.username));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(conflict_error("User", "email", &user.email));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }
}

/// Colección `users` en PostgreSQL (documentos JSONB)
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_field(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let document = sqlx::query_scalar::<_, Json<User>>(
            "SELECT document FROM users WHERE document->>$1 = $2",
        )
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(user)| user))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: User) -> AppResult<User> {
        let result = sqlx::query("INSERT INTO users (id, document) VALUES ($1, $2)")
            .bind(user.id)
            .bind(Json(&user))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(conflict_error("User", "username or email", &user.username))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let document = sqlx::query_scalar::<_, Json<User>>("SELECT document FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document.map(|Json(user)| user))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_by_field("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_by_field("email", email).await
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET document = $2, updated_at = now() WHERE id = $1")
            .bind(user.id)
            .bind(Json(user))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
