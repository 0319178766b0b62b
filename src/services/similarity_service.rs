//! Puntuación de similitud entre anuncios
//!
//! Heurística entera: +3 misma marca, +2 precio dentro de ±30% del objetivo,
//! +1 año a ±3, +1 mismo combustible, +1 misma ubicación.

use serde::{Deserialize, Serialize};

use crate::models::Listing;

const BRAND_WEIGHT: u32 = 3;
const PRICE_WEIGHT: u32 = 2;
const YEAR_WEIGHT: u32 = 1;
const FUEL_WEIGHT: u32 = 1;
const LOCATION_WEIGHT: u32 = 1;

const PRICE_TOLERANCE: f64 = 0.3;
const YEAR_TOLERANCE: i32 = 3;

pub const DEFAULT_SIMILAR_LIMIT: usize = 4;

/// Anuncio acompañado de su puntuación. El anuncio almacenado no se modifica.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub similarity_score: u32,
}

/// Puntuación de `candidate` respecto a `target`.
/// El denominador del término de precio es el precio del objetivo.
pub fn score(target: &Listing, candidate: &Listing) -> u32 {
    let mut score = 0;

    if candidate.brand == target.brand {
        score += BRAND_WEIGHT;
    }

    if target.price > 0 {
        let diff = (candidate.price - target.price).abs() as f64 / target.price as f64;
        if diff <= PRICE_TOLERANCE {
            score += PRICE_WEIGHT;
        }
    }

    if (candidate.year - target.year).abs() <= YEAR_TOLERANCE {
        score += YEAR_WEIGHT;
    }

    if candidate.fuel == target.fuel {
        score += FUEL_WEIGHT;
    }

    if candidate.location == target.location {
        score += LOCATION_WEIGHT;
    }

    score
}

/// Anuncios similares al objetivo, de mayor a menor puntuación.
/// Excluye el propio objetivo y las puntuaciones nulas; empates en orden de almacén.
pub fn similar_listings(target: &Listing, all: &[Listing], limit: usize) -> Vec<ScoredListing> {
    let mut similar: Vec<ScoredListing> = all
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .filter_map(|candidate| {
            let similarity_score = score(target, candidate);
            (similarity_score > 0).then(|| ScoredListing {
                listing: candidate.clone(),
                similarity_score,
            })
        })
        .collect();

    similar.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
    similar.truncate(limit);
    similar
}
