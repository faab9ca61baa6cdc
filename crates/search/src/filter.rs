//! Filter state and its URL codec.
//!
//! `FilterState` is the complete set of active facet constraints. The
//! codec maps it to and from a flat list of query-string pairs: range
//! facets expand to `<key>_min`/`<key>_max`, everything else uses the
//! facet key verbatim, and unconstrained facets are omitted entirely.
//!
//! Decoding is deliberately lenient. Unknown parameters and malformed
//! values drop the affected constraint and nothing else, so the browse
//! view stays usable with a hand-edited URL. Route-derived facets
//! (brand/model path segments) are decoded separately and win over
//! query-string values on conflict.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::SearchError;
use crate::facet::{keys, FacetKind, FacetSet, SortSpec, ValueType, SORT_PARAM};
use crate::listing::FuelType;

/// Numeric interval constraint with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConstraint {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RangeConstraint {
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub const fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// A range with both bounds absent constrains nothing.
    pub fn is_unconstrained(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Constraint value for one facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Range(RangeConstraint),
    Equals(String),
    Text(String),
}

impl Constraint {
    fn constrains_nothing(&self) -> bool {
        match self {
            Constraint::Range(r) => r.is_unconstrained(),
            Constraint::Equals(v) | Constraint::Text(v) => v.is_empty(),
        }
    }
}

/// The complete set of active facet constraints, keyed by facet key.
///
/// Absent key means "no constraint". Setters normalize on write: a
/// range with both bounds absent or an empty string never survives, so
/// two states describing the same constraints compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    constraints: BTreeMap<String, Constraint>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a range constraint. An unconstrained range clears the key.
    pub fn set_range(&mut self, key: &str, range: RangeConstraint) {
        self.insert(key, Constraint::Range(range));
    }

    /// Set an equality constraint. An empty value clears the key.
    pub fn set_equals(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Constraint::Equals(value.into()));
    }

    /// Set a text (substring-match) constraint. An empty value clears
    /// the key.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Constraint::Text(value.into()));
    }

    /// Remove the constraint for a facet, if any.
    pub fn clear(&mut self, key: &str) {
        self.constraints.remove(key);
    }

    /// Remove all constraints.
    pub fn clear_all(&mut self) {
        self.constraints.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Constraint> {
        self.constraints.get(key)
    }

    /// The range constraint for a facet, if one is set.
    pub fn range(&self, key: &str) -> Option<RangeConstraint> {
        match self.constraints.get(key) {
            Some(Constraint::Range(r)) => Some(*r),
            _ => None,
        }
    }

    /// The text or equality value for a facet, if one is set.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.constraints.get(key) {
            Some(Constraint::Equals(v)) | Some(Constraint::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Iterate constraints in key order (deterministic).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.constraints.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Drop constraints that constrain nothing. Idempotent; states built
    /// through the setters are already normalized, this covers states
    /// arriving through deserialization.
    pub fn normalize(mut self) -> Self {
        self.constraints.retain(|_, c| !c.constrains_nothing());
        self
    }

    fn insert(&mut self, key: &str, constraint: Constraint) {
        if constraint.constrains_nothing() {
            self.constraints.remove(key);
        } else {
            self.constraints.insert(key.to_string(), constraint);
        }
    }

    fn merge_bound(&mut self, key: &str, value: i64, upper: bool) {
        let mut range = self.range(key).unwrap_or_default();
        if upper {
            range.max = Some(value);
        } else {
            range.min = Some(value);
        }
        self.set_range(key, range);
    }
}

/// Brand/model scope derived from the page's route path segments.
///
/// A session scoped to a brand or brand/model page always carries these
/// constraints; they take precedence over query-string values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteScope {
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl RouteScope {
    /// Scope for a browse-by-brand page.
    pub fn brand(brand: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            model: None,
        }
    }

    /// Scope for a browse-by-brand-and-model page.
    pub fn brand_model(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            model: Some(model.into()),
        }
    }

    /// Apply this scope on top of a decoded state, overriding any
    /// conflicting query-string values.
    pub fn apply(&self, state: &mut FilterState) {
        if let Some(ref brand) = self.brand {
            state.set_text(keys::BRAND, brand.clone());
        }
        if let Some(ref model) = self.model {
            state.set_text(keys::MODEL, model.clone());
        }
    }
}

/// Encode a filter state as flat query-string pairs, in key order.
///
/// Unconstrained facets are omitted; no key is ever emitted with an
/// empty value.
pub fn encode(state: &FilterState) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, constraint) in state.iter() {
        match constraint {
            Constraint::Range(range) => {
                if let Some(min) = range.min {
                    pairs.push((format!("{key}_min"), min.to_string()));
                }
                if let Some(max) = range.max {
                    pairs.push((format!("{key}_max"), max.to_string()));
                }
            }
            Constraint::Equals(value) | Constraint::Text(value) => {
                pairs.push((key.to_string(), value.clone()));
            }
        }
    }
    pairs
}

/// Encode a filter state plus the active sort order.
///
/// The sort parameter is emitted only when it differs from the default,
/// keeping canonical URLs short.
pub fn encode_with_sort(state: &FilterState, sort: SortSpec) -> Vec<(String, String)> {
    let mut pairs = encode(state);
    if sort != SortSpec::default() {
        pairs.push((SORT_PARAM.to_string(), sort.as_token().to_string()));
    }
    pairs
}

/// Decode query-string pairs into a filter state.
///
/// Unknown parameters are ignored; malformed values drop only the
/// affected constraint. Route-derived facets are applied last and win
/// over query-string values.
pub fn decode(facets: &FacetSet, pairs: &[(String, String)], route: &RouteScope) -> FilterState {
    let mut state = FilterState::new();

    for (key, value) in pairs {
        if key == SORT_PARAM || value.is_empty() {
            continue;
        }

        if decode_range_param(facets, &mut state, key, value) {
            continue;
        }

        let Ok(facet) = facets.resolve(key) else {
            continue;
        };
        match facet.kind {
            // A bare range key has no single-value meaning; only the
            // `_min`/`_max` forms are defined.
            FacetKind::Range => {}
            FacetKind::Equality => {
                if facet.value_type == ValueType::Enum {
                    match FuelType::parse(value) {
                        Some(fuel) => state.set_equals(key, fuel.as_str()),
                        None => drop_malformed(key, value),
                    }
                } else {
                    state.set_equals(key, value.clone());
                }
            }
            FacetKind::Text => state.set_text(key, value.clone()),
        }
    }

    route.apply(&mut state);
    state
}

/// Decode the sort parameter from query-string pairs, falling back to
/// the default order when absent or unrecognized.
pub fn decode_sort(pairs: &[(String, String)]) -> SortSpec {
    pairs
        .iter()
        .find(|(key, _)| key == SORT_PARAM)
        .map(|(_, value)| SortSpec::parse(value))
        .unwrap_or_default()
}

/// Serialize pairs as an application/x-www-form-urlencoded query string.
pub fn to_query_string(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Parse a query string into pairs. Percent-decoding failures are not
/// possible; invalid sequences decode to replacement characters.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Handle `<key>_min`/`<key>_max` parameters. Returns true when the
/// parameter named a range facet (even if its value was dropped as
/// malformed).
fn decode_range_param(
    facets: &FacetSet,
    state: &mut FilterState,
    key: &str,
    value: &str,
) -> bool {
    let (base, upper) = if let Some(base) = key.strip_suffix("_min") {
        (base, false)
    } else if let Some(base) = key.strip_suffix("_max") {
        (base, true)
    } else {
        return false;
    };

    let Ok(facet) = facets.resolve(base) else {
        return false;
    };
    if facet.kind != FacetKind::Range {
        return false;
    }

    match parse_bound(key, value) {
        Ok(bound) => state.merge_bound(base, bound, upper),
        Err(_) => drop_malformed(key, value),
    }
    true
}

/// Parse a numeric bound value.
pub(crate) fn parse_bound(key: &str, value: &str) -> Result<i64, SearchError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| SearchError::MalformedValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn drop_malformed(key: &str, value: &str) {
    tracing::debug!(key, value, "dropping malformed filter value");
}
