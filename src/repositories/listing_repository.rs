use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Listing, ListingUpdate};
use crate::services::search_service::{apply_filters, ListingFilters};
use crate::utils::errors::{conflict_error, AppError, AppResult};

/// Contador de actividad de un anuncio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Favorites,
}

impl Counter {
    pub fn field(&self) -> &'static str {
        match self {
            Counter::Views => "views",
            Counter::Favorites => "favorites",
        }
    }
}

/// Colección de anuncios
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(&self, listing: Listing) -> AppResult<Listing>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Listing>>;

    /// Todos los anuncios en orden de inserción
    async fn find_all(&self) -> AppResult<Vec<Listing>>;

    async fn find_filtered(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>> {
        Ok(apply_filters(self.find_all().await?, filters))
    }

    /// Merge parcial; `None` si el id no existe
    async fn update(&self, id: &str, update: &ListingUpdate) -> AppResult<Option<Listing>>;

    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// +1 al contador y refresca `last_updated`; `None` si el id no existe
    async fn increment(&self, id: &str, counter: Counter) -> AppResult<Option<Listing>>;

    async fn count(&self) -> AppResult<u64>;
}

/// Almacén en memoria; los escritores se serializan con el RwLock
#[derive(Default)]
pub struct MemoryListingRepository {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn insert(&self, listing: Listing) -> AppResult<Listing> {
        let mut listings = self.listings.write().await;
        if listings.iter().any(|l| l.id == listing.id) {
            return Err(conflict_error("Listing", "id", &listing.id));
        }
        listings.push(listing.clone());
        Ok(listing)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Listing>> {
        Ok(self.listings.read().await.clone())
    }

    async fn update(&self, id: &str, update: &ListingUpdate) -> AppResult<Option<Listing>> {
        let mut listings = self.listings.write().await;
        Ok(listings.iter_mut().find(|l| l.id == id).map(|listing| {
            listing.apply_update(update, Utc::now());
            listing.clone()
        }))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() < before)
    }

    async fn increment(&self, id: &str, counter: Counter) -> AppResult<Option<Listing>> {
        let mut listings = self.listings.write().await;
        Ok(listings.iter_mut().find(|l| l.id == id).map(|listing| {
            match counter {
                Counter::Views => listing.views += 1,
                Counter::Favorites => listing.favorites += 1,
            }
            listing.last_updated = Utc::now();
            listing.clone()
        }))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.listings.read().await.len() as u64)
    }
}

/// Colección `cars` en PostgreSQL (documentos JSONB)
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn insert(&self, listing: Listing) -> AppResult<Listing> {
        let result = sqlx::query("INSERT INTO cars (id, document) VALUES ($1, $2)")
            .bind(&listing.id)
            .bind(Json(&listing))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(listing),
            Err(e) if is_unique_violation(&e) => Err(conflict_error("Listing", "id", &listing.id)),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Listing>> {
        let document = sqlx::query_scalar::<_, Json<Listing>>("SELECT document FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document.map(|Json(listing)| listing))
    }

    async fn find_all(&self) -> AppResult<Vec<Listing>> {
        let documents = sqlx::query_scalar::<_, Json<Listing>>("SELECT document FROM cars ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;

        Ok(documents.into_iter().map(|Json(listing)| listing).collect())
    }

    async fn update(&self, id: &str, update: &ListingUpdate) -> AppResult<Option<Listing>> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, Json<Listing>>(
            "SELECT document FROM cars WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(mut listing)) = current else {
            return Ok(None);
        };

        listing.apply_update(update, Utc::now());

        sqlx::query("UPDATE cars SET document = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(Json(&listing))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Anuncio {} actualizado", id);
        Ok(Some(listing))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment(&self, id: &str, counter: Counter) -> AppResult<Option<Listing>> {
        let document = sqlx::query_scalar::<_, Json<Listing>>(
            r#"
            UPDATE cars
            SET document = jsonb_set(
                    jsonb_set(
                        document,
                        ARRAY[$2::text],
                        to_jsonb(COALESCE((document->>$2)::bigint, 0) + 1)
                    ),
                    '{last_updated}',
                    $3::jsonb
                ),
                updated_at = now()
            WHERE id = $1
            RETURNING document
            "#,
        )
        .bind(id)
        .bind(counter.field())
        .bind(Json(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(listing)| listing))
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

/// Violación de índice único (SQLSTATE 23505)
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
