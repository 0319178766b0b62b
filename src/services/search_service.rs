//! Motor de búsqueda de anuncios
//!
//! Aplica una conjunción de filtros opcionales sobre el conjunto de anuncios
//! y ordena el resultado por la clave elegida. Funciones puras: no tocan el
//! almacén, así se pueden usar desde cualquier repositorio.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Listing, ListingStatus};
use crate::utils::errors::AppError;

/// Clave de ordenación de resultados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    Date,
    KmLow,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price_low" => Ok(SortKey::PriceLow),
            "price_high" => Ok(SortKey::PriceHigh),
            "date" => Ok(SortKey::Date),
            "km_low" => Ok(SortKey::KmLow),
            other => Err(AppError::BadRequest(format!(
                "Unknown sort key '{}'. Expected one of: price_low, price_high, date, km_low",
                other
            ))),
        }
    }
}

/// Especificación de filtros. `None` = sin restricción para ese campo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub brand: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub fuel: Option<String>,
    pub location: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub transmission: Option<String>,
    pub status: Option<ListingStatus>,
    pub search: Option<String>,
    pub sort_by: Option<SortKey>,
    pub limit: Option<usize>,
}

impl ListingFilters {
    /// Comprueba si un anuncio cumple todos los filtros presentes
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(brand) = &self.brand {
            if !eq_ignore_case(&listing.brand, brand) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price > max {
                return false;
            }
        }
        if let Some(fuel) = &self.fuel {
            if !eq_ignore_case(&listing.fuel, fuel) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&listing.location, location) {
                return false;
            }
        }
        if let Some(from) = self.year_from {
            if listing.year < from {
                return false;
            }
        }
        if let Some(to) = self.year_to {
            if listing.year > to {
                return false;
            }
        }
        if let Some(transmission) = &self.transmission {
            if !eq_ignore_case(&listing.transmission, transmission) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if listing.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let haystack = format!("{} {}", listing.brand, listing.model);
            if !contains_ignore_case(&haystack, search) {
                return false;
            }
        }
        true
    }
}

fn eq_ignore_case(value: &str, expected: &str) -> bool {
    value.to_lowercase() == expected.trim().to_lowercase()
}

fn contains_ignore_case(value: &str, needle: &str) -> bool {
    value.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Filtra y ordena. El orden de entrada se conserva en empates.
pub fn apply_filters(listings: Vec<Listing>, filters: &ListingFilters) -> Vec<Listing> {
    let mut results: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| filters.matches(listing))
        .collect();

    if let Some(key) = filters.sort_by {
        sort_listings(&mut results, key);
    }

    if let Some(limit) = filters.limit {
        results.truncate(limit);
    }

    results
}

/// Ordenación estable por la clave dada
pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    match key {
        SortKey::PriceLow => listings.sort_by_key(|l| l.price),
        SortKey::PriceHigh => listings.sort_by_key(|l| Reverse(l.price)),
        SortKey::Date => listings.sort_by_key(|l| Reverse(l.posted_date)),
        SortKey::KmLow => listings.sort_by_key(|l| l.km_driven),
    }
}
