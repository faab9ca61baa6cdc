//! Listing projections returned by the execution boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fuel vocabulary used by the `fuel_type` equality facet.
///
/// Wire tokens are lowercase. Unknown tokens at the decode boundary are
/// treated as "no constraint", not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
    Lpg,
    Cng,
}

impl FuelType {
    /// The wire token for this fuel type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
            FuelType::Lpg => "lpg",
            FuelType::Cng => "cng",
        }
    }

    /// Parse a wire token. Matching is case-insensitive.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "petrol" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "hybrid" => Some(FuelType::Hybrid),
            "electric" => Some(FuelType::Electric),
            "lpg" => Some(FuelType::Lpg),
            "cng" => Some(FuelType::Cng),
            _ => None,
        }
    }
}

/// Read-only projection of a listing shown in search result cards.
///
/// Owned by the external data store; the search core reads it and never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    /// Asking price in whole currency units.
    pub price: i64,
    /// First-registration year.
    pub year: i32,
    /// Odometer reading in kilometres.
    pub km: i64,
    pub fuel_type: FuelType,
    /// Engine power in horsepower.
    pub power: i32,
    /// Engine displacement in cubic centimetres.
    pub engine_size: Option<i32>,
    pub location: Option<String>,
    /// Primary photo reference (storage key or URL).
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw answer from the execution boundary: one page of items plus the
/// match count before pagination was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    pub items: Vec<ListingSummary>,
    pub total_count: u64,
}
