//! Query descriptor construction.
//!
//! Translates a filter state plus sort selection into a backend-agnostic
//! `QueryDescriptor`. The builder is pure: no clock, no randomness, same
//! inputs always produce the same descriptor, and predicates come out in
//! facet-key order with the lower bound before the upper.

use serde::{Deserialize, Serialize};

use crate::facet::SortSpec;
use crate::filter::{Constraint, FilterState};

/// A single backend-agnostic filter condition.
///
/// Field names are facet keys; stores treat them as column names.
/// `ContainsInsensitive` is the one documented text-match contract
/// (case-insensitive substring), applied uniformly to brand and model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Equals { field: String, value: String },
    GreaterOrEqual { field: String, value: i64 },
    LessOrEqual { field: String, value: i64 },
    ContainsInsensitive { field: String, value: String },
}

impl Predicate {
    /// The field this predicate constrains.
    pub fn field(&self) -> &str {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::GreaterOrEqual { field, .. }
            | Predicate::LessOrEqual { field, .. }
            | Predicate::ContainsInsensitive { field, .. } => field,
        }
    }
}

/// Backend-agnostic query: predicates, ordering, pagination window.
///
/// Constructed fresh on every filter/sort/page change and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
    pub limit: u32,
    pub offset: u64,
}

/// Builds `QueryDescriptor`s from a filter state and sort selection.
pub struct ListingQueryBuilder {
    filter: FilterState,
    sort: SortSpec,
}

impl ListingQueryBuilder {
    pub fn new(filter: FilterState, sort: SortSpec) -> Self {
        Self { filter, sort }
    }

    /// Build the descriptor for one result page.
    ///
    /// `page` is 1-based; a page below 1 is a caller error and is
    /// clamped to 1 with a warning rather than failing the query.
    pub fn build(&self, page: u32, per_page: u32) -> QueryDescriptor {
        let page = if page < 1 {
            tracing::warn!(page, "page index below 1, clamping to 1");
            1
        } else {
            page
        };

        let mut predicates = Vec::new();
        for (key, constraint) in self.filter.iter() {
            match constraint {
                Constraint::Range(range) => {
                    if let Some(min) = range.min {
                        predicates.push(Predicate::GreaterOrEqual {
                            field: key.to_string(),
                            value: min,
                        });
                    }
                    if let Some(max) = range.max {
                        predicates.push(Predicate::LessOrEqual {
                            field: key.to_string(),
                            value: max,
                        });
                    }
                }
                Constraint::Equals(value) => predicates.push(Predicate::Equals {
                    field: key.to_string(),
                    value: value.clone(),
                }),
                Constraint::Text(value) => predicates.push(Predicate::ContainsInsensitive {
                    field: key.to_string(),
                    value: value.clone(),
                }),
            }
        }

        QueryDescriptor {
            predicates,
            sort: self.sort,
            limit: per_page,
            offset: u64::from(page - 1) * u64::from(per_page),
        }
    }
}
