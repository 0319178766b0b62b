use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ConditionReport, Listing, ListingStatus, ListingUpdate, NewListing};
use crate::services::search_service::{ListingFilters, SortKey};
use crate::utils::errors::{bad_request_error, missing_field_error, AppError, AppResult};
use crate::utils::format::{format_price, time_ago};

// Request para crear un anuncio. Todo opcional para poder nombrar el campo que falta.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 60))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub location: Option<String>,
    pub km_driven: Option<u32>,
    pub seller_type: Option<String>,
    pub status: Option<ListingStatus>,
}

impl CreateListingRequest {
    /// Comprueba campos obligatorios (en orden) y rangos, y construye el anuncio
    pub fn into_new_listing(self) -> AppResult<NewListing> {
        let brand = required_text("brand", self.brand.as_deref())?;
        let model = required_text("model", self.model.as_deref())?;
        let year = self.year.ok_or_else(|| missing_field_error("year"))?;
        let price = self.price.ok_or_else(|| missing_field_error("price"))?;
        let fuel = required_text("fuel", self.fuel.as_deref())?;
        let transmission = required_text("transmission", self.transmission.as_deref())?;
        let location = required_text("location", self.location.as_deref())?;

        self.validate()?;

        Ok(NewListing {
            brand,
            model,
            year,
            fuel,
            km_driven: self.km_driven.unwrap_or(0),
            price,
            location,
            seller_type: non_blank(self.seller_type).unwrap_or_else(|| "Individual".to_string()),
            transmission,
            status: self.status.unwrap_or_default(),
        })
    }
}

fn required_text(field: &str, value: Option<&str>) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(missing_field_error(field)),
    }
}

// Request de actualización parcial
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 60))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub fuel: Option<String>,
    pub km_driven: Option<u32>,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
    pub location: Option<String>,
    pub seller_type: Option<String>,
    pub transmission: Option<String>,
    pub status: Option<ListingStatus>,
    pub negotiable: Option<bool>,
    pub features: Option<Vec<String>>,
}

impl UpdateListingRequest {
    pub fn into_update(self) -> AppResult<ListingUpdate> {
        self.validate()?;
        let update = ListingUpdate {
            brand: self.brand,
            model: self.model,
            year: self.year,
            fuel: self.fuel,
            km_driven: self.km_driven,
            price: self.price,
            location: self.location,
            seller_type: self.seller_type,
            transmission: self.transmission,
            status: self.status,
            negotiable: self.negotiable,
            features: self.features,
        };
        if update.is_empty() {
            return Err(bad_request_error("No fields to update"));
        }
        Ok(update)
    }
}

// Query string de búsqueda. Cadenas vacías = no suministrado.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingFiltersQuery {
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub fuel: Option<String>,
    pub location: Option<String>,
    pub year: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub transmission: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<String>,
}

impl ListingFiltersQuery {
    pub fn into_filters(self) -> AppResult<ListingFilters> {
        let year: Option<i32> = parse_field("year", self.year)?;
        let status = match non_blank(self.status) {
            Some(raw) => Some(raw.parse::<ListingStatus>().map_err(AppError::BadRequest)?),
            None => None,
        };
        let sort_by = match non_blank(self.sort_by) {
            Some(raw) => Some(raw.parse::<SortKey>()?),
            None => None,
        };

        Ok(ListingFilters {
            brand: non_blank(self.brand),
            min_price: parse_field("min_price", self.min_price)?,
            max_price: parse_field("max_price", self.max_price)?,
            fuel: non_blank(self.fuel),
            location: non_blank(self.location),
            year_from: parse_field("year_from", self.year_from)?.or(year),
            year_to: parse_field("year_to", self.year_to)?.or(year),
            transmission: non_blank(self.transmission),
            status,
            search: non_blank(self.search),
            sort_by,
            limit: parse_field("limit", self.limit)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_field<T: FromStr>(field: &str, value: Option<String>) -> AppResult<Option<T>> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid value for {}: '{}'", field, raw))),
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// Resumen de un anuncio para los listados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub formatted_price: String,
    pub km_driven: u32,
    pub fuel: String,
    pub location: String,
    pub seller_type: String,
    pub transmission: String,
    pub status: ListingStatus,
    pub posted_date: DateTime<Utc>,
    pub last_updated: String,
    pub views: u64,
    pub favorites: u64,
    pub images: Vec<String>,
    pub condition: ConditionReport,
}

impl ListingSummary {
    pub fn from_listing(listing: Listing, now: DateTime<Utc>) -> Self {
        Self {
            formatted_price: format_price(listing.price),
            last_updated: time_ago(listing.last_updated, now),
            id: listing.id,
            brand: listing.brand,
            model: listing.model,
            year: listing.year,
            price: listing.price,
            km_driven: listing.km_driven,
            fuel: listing.fuel,
            location: listing.location,
            seller_type: listing.seller_type,
            transmission: listing.transmission,
            status: listing.status,
            posted_date: listing.posted_date,
            views: listing.views,
            favorites: listing.favorites,
            images: listing.details.images,
            condition: listing.details.condition,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCollection<T> {
    pub total: usize,
    pub listings: Vec<T>,
}

impl<T> ListingCollection<T> {
    pub fn new(listings: Vec<T>) -> Self {
        Self {
            total: listings.len(),
            listings,
        }
    }
}
