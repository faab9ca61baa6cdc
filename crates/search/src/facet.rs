//! Facet vocabulary for listing search.
//!
//! Single source of truth for which listing attributes are filterable
//! and sortable, their value domains, and their URL parameter names.
//! Range facets expand to `<key>_min`/`<key>_max` URL parameters; all
//! other facets use their key verbatim.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// URL parameter carrying the active sort order.
pub const SORT_PARAM: &str = "search[order]";

/// Facet keys for the standard car-listing vocabulary.
///
/// These double as the field names in query predicates, so stores can
/// treat them as column names.
pub mod keys {
    pub const PRICE: &str = "price";
    pub const YEAR: &str = "year";
    pub const KM: &str = "km";
    pub const FUEL_TYPE: &str = "fuel_type";
    pub const BRAND: &str = "brand";
    pub const MODEL: &str = "model";
}

/// How a facet constrains results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// Numeric interval with optional lower/upper bounds.
    Range,
    /// Exact match on a single scalar.
    Equality,
    /// Case-insensitive substring match.
    Text,
}

/// Value domain of a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Number,
    Keyword,
    Enum,
}

/// One filterable listing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub key: &'static str,
    pub kind: FacetKind,
    pub value_type: ValueType,
}

impl Facet {
    const fn new(key: &'static str, kind: FacetKind, value_type: ValueType) -> Self {
        Self {
            key,
            kind,
            value_type,
        }
    }
}

/// The set of facets a search session understands.
///
/// Keys are unique within the set. `standard()` is the car-listing
/// vocabulary; `resolve` failures at the decode boundary mean "ignore
/// this parameter", never a fatal error.
#[derive(Debug, Clone)]
pub struct FacetSet {
    facets: &'static [Facet],
}

/// The standard car-listing facets.
const STANDARD_FACETS: &[Facet] = &[
    Facet::new(keys::PRICE, FacetKind::Range, ValueType::Number),
    Facet::new(keys::YEAR, FacetKind::Range, ValueType::Number),
    Facet::new(keys::KM, FacetKind::Range, ValueType::Number),
    Facet::new(keys::FUEL_TYPE, FacetKind::Equality, ValueType::Enum),
    Facet::new(keys::BRAND, FacetKind::Text, ValueType::Keyword),
    Facet::new(keys::MODEL, FacetKind::Text, ValueType::Keyword),
];

impl FacetSet {
    /// The standard car-listing facet vocabulary.
    pub fn standard() -> Self {
        Self {
            facets: STANDARD_FACETS,
        }
    }

    /// Look up a facet by key.
    pub fn resolve(&self, key: &str) -> Result<&Facet, SearchError> {
        self.facets
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| SearchError::UnknownFacet(key.to_string()))
    }

    /// Iterate over all facets in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.facets.iter()
    }

    /// The labelled sort choices offered to the UI.
    pub fn sort_options(&self) -> &'static [SortOption] {
        SORT_OPTIONS
    }
}

impl Default for FacetSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sortable listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Price,
    Km,
    Power,
}

impl SortField {
    /// Backend column name.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Price => "price",
            SortField::Km => "km",
            SortField::Power => "power",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One active sort order: exactly one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest listings first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse a wire token such as `price:asc`.
    ///
    /// Unrecognized tokens fall back to the default (`created_at:desc`);
    /// this is the single place that fallback lives.
    pub fn parse(token: &str) -> Self {
        SORT_OPTIONS
            .iter()
            .find(|o| o.value.as_token() == token)
            .map(|o| o.value)
            .unwrap_or_default()
    }

    /// The wire token for this sort order.
    pub fn as_token(&self) -> &'static str {
        match (self.field, self.direction) {
            (SortField::CreatedAt, SortDirection::Desc) => "created_at:desc",
            (SortField::CreatedAt, SortDirection::Asc) => "created_at:asc",
            (SortField::Price, SortDirection::Asc) => "price:asc",
            (SortField::Price, SortDirection::Desc) => "price:desc",
            (SortField::Km, SortDirection::Asc) => "km:asc",
            (SortField::Km, SortDirection::Desc) => "km:desc",
            (SortField::Power, SortDirection::Asc) => "power:asc",
            (SortField::Power, SortDirection::Desc) => "power:desc",
        }
    }
}

/// A labelled sort choice for UI dropdowns.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SortOption {
    pub label: &'static str,
    pub value: SortSpec,
}

const SORT_OPTIONS: &[SortOption] = &[
    SortOption {
        label: "Newest first",
        value: SortSpec::new(SortField::CreatedAt, SortDirection::Desc),
    },
    SortOption {
        label: "Oldest first",
        value: SortSpec::new(SortField::CreatedAt, SortDirection::Asc),
    },
    SortOption {
        label: "Price: low to high",
        value: SortSpec::new(SortField::Price, SortDirection::Asc),
    },
    SortOption {
        label: "Price: high to low",
        value: SortSpec::new(SortField::Price, SortDirection::Desc),
    },
    SortOption {
        label: "Mileage: low to high",
        value: SortSpec::new(SortField::Km, SortDirection::Asc),
    },
    SortOption {
        label: "Mileage: high to low",
        value: SortSpec::new(SortField::Km, SortDirection::Desc),
    },
    SortOption {
        label: "Power: low to high",
        value: SortSpec::new(SortField::Power, SortDirection::Asc),
    },
    SortOption {
        label: "Power: high to low",
        value: SortSpec::new(SortField::Power, SortDirection::Desc),
    },
];
