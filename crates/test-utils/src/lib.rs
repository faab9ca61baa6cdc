//! Vettura test utilities.
//!
//! Helpers for integration testing: listing fixtures, an in-memory
//! `ListingStore` that honors predicates/sort/pagination the way a real
//! backend must, and a tracing initializer for test logs.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use vettura_search::listing::{FuelType, ListingSummary, QueryResults};
use vettura_search::query::{Predicate, QueryDescriptor};
use vettura_search::session::ListingStore;
use vettura_search::{SortDirection, SortField};

/// Initialize tracing for a test binary. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a listing fixture with sensible defaults.
pub fn listing(brand: &str, model: &str) -> ListingBuilder {
    ListingBuilder {
        inner: ListingSummary {
            id: Uuid::now_v7(),
            brand: brand.to_string(),
            model: model.to_string(),
            price: 10_000,
            year: 2018,
            km: 80_000,
            fuel_type: FuelType::Petrol,
            power: 110,
            engine_size: Some(1400),
            location: None,
            photo: None,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
                .single()
                .unwrap_or_default(),
        },
    }
}

/// Fluent builder for listing fixtures.
#[derive(Debug, Clone)]
pub struct ListingBuilder {
    inner: ListingSummary,
}

impl ListingBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.inner.id = id;
        self
    }

    pub fn price(mut self, price: i64) -> Self {
        self.inner.price = price;
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.inner.year = year;
        self
    }

    pub fn km(mut self, km: i64) -> Self {
        self.inner.km = km;
        self
    }

    pub fn fuel(mut self, fuel: FuelType) -> Self {
        self.inner.fuel_type = fuel;
        self
    }

    pub fn power(mut self, power: i32) -> Self {
        self.inner.power = power;
        self
    }

    pub fn engine_size(mut self, cc: i32) -> Self {
        self.inner.engine_size = Some(cc);
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.inner.location = Some(location.to_string());
        self
    }

    pub fn photo(mut self, photo: &str) -> Self {
        self.inner.photo = Some(photo.to_string());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.inner.created_at = created_at;
        self
    }

    /// Shift `created_at` by whole days relative to the default epoch,
    /// for tests that only care about relative recency.
    pub fn created_days_later(mut self, days: i64) -> Self {
        self.inner.created_at += chrono::Duration::days(days);
        self
    }

    pub fn build(self) -> ListingSummary {
        self.inner
    }
}

/// In-memory `ListingStore` backed by a plain scan.
///
/// Honors every predicate (inclusive range bounds, exact equality,
/// case-insensitive substring match for text), sorts by the requested
/// field, and applies the pagination window after counting — the same
/// contract a SQL-backed store must provide.
pub struct InMemoryListings {
    listings: Vec<ListingSummary>,
}

impl InMemoryListings {
    pub fn new(listings: Vec<ListingSummary>) -> Self {
        Self { listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryListings {
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryResults> {
        let mut matched: Vec<ListingSummary> = self
            .listings
            .iter()
            .filter(|l| query.predicates.iter().all(|p| matches(l, p)))
            .cloned()
            .collect();

        sort_listings(&mut matched, query.sort.field, query.sort.direction);

        let total_count = matched.len() as u64;
        let items: Vec<ListingSummary> = matched
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();

        Ok(QueryResults { items, total_count })
    }
}

/// `ListingStore` that always fails, for exercising the `Failed` state.
pub struct FailingStore;

#[async_trait]
impl ListingStore for FailingStore {
    async fn execute(&self, _query: &QueryDescriptor) -> Result<QueryResults> {
        Err(anyhow!("listing store unavailable"))
    }
}

fn matches(listing: &ListingSummary, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => {
            text_field(listing, field).is_some_and(|v| v == *value)
        }
        Predicate::GreaterOrEqual { field, value } => {
            numeric_field(listing, field).is_some_and(|v| v >= *value)
        }
        Predicate::LessOrEqual { field, value } => {
            numeric_field(listing, field).is_some_and(|v| v <= *value)
        }
        Predicate::ContainsInsensitive { field, value } => text_field(listing, field)
            .is_some_and(|v| v.to_lowercase().contains(&value.to_lowercase())),
    }
}

/// Numeric facet fields. Unknown fields match nothing (restrict rather
/// than widen).
fn numeric_field(listing: &ListingSummary, field: &str) -> Option<i64> {
    match field {
        "price" => Some(listing.price),
        "year" => Some(i64::from(listing.year)),
        "km" => Some(listing.km),
        "power" => Some(i64::from(listing.power)),
        _ => None,
    }
}

fn text_field<'a>(listing: &'a ListingSummary, field: &str) -> Option<&'a str> {
    match field {
        "brand" => Some(&listing.brand),
        "model" => Some(&listing.model),
        "fuel_type" => Some(listing.fuel_type.as_str()),
        "location" => listing.location.as_deref(),
        _ => None,
    }
}

fn sort_listings(listings: &mut [ListingSummary], field: SortField, direction: SortDirection) {
    listings.sort_by(|a, b| {
        let ordering = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Km => a.km.cmp(&b.km),
            SortField::Power => a.power.cmp(&b.power),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
