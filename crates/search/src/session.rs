//! Listing search session.
//!
//! Long-lived orchestration for one browsing view: holds the current
//! filter state, rebuilds and re-executes the query on every mutation,
//! and exposes the current result page to the presentation layer.
//!
//! The underlying transport cannot cancel an in-flight query, so the
//! session tags every issued request with a monotonically increasing
//! sequence number and discards any completion that is not the latest
//! issued. That last-write-wins rule is the only ordering contract:
//! a stale response can never overwrite the result of a newer filter.
//!
//! One logical consumer drives a session (`&mut self` mutations); there
//! is no concurrent writer and therefore no locking.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::error::SearchError;
use crate::facet::{keys, FacetSet, SortSpec};
use crate::filter::{self, FilterState, RangeConstraint, RouteScope};
use crate::listing::{FuelType, QueryResults};
use crate::pager::ResultPage;
use crate::query::{ListingQueryBuilder, QueryDescriptor};

/// Maximum page size a session will request (guardrail).
pub const MAX_PAGE_SIZE: u32 = 100;

/// Execution boundary consumed by the session.
///
/// Implementations must honor every predicate, the sort order, and the
/// pagination window, and report the match count before pagination.
/// Whether that happens in SQL, a search index, or an in-memory scan is
/// not the session's concern.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryResults>;
}

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Items per page (default: 20).
    pub page_size: u32,

    /// Upper bound for `page_size`; larger requests are clamped
    /// (default: [`MAX_PAGE_SIZE`]).
    pub max_page_size: u32,

    /// Sort order applied until the caller picks one.
    pub default_sort: SortSpec,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: MAX_PAGE_SIZE,
            default_sort: SortSpec::default(),
        }
    }
}

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No query issued yet.
    Idle,
    /// A query is in flight.
    Loading,
    /// The current page reflects the latest issued query.
    Ready,
    /// The latest query failed; the last good page is retained.
    Failed,
}

/// One issued query execution, tagged for supersede detection.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub seq: u64,
    pub descriptor: QueryDescriptor,
}

/// Outcome of feeding a response back into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was the latest issued and was applied.
    Applied,
    /// A newer request had been issued; the response was discarded.
    Superseded,
}

/// Search session for one browsing view.
pub struct SearchSession {
    store: Arc<dyn ListingStore>,
    facets: FacetSet,
    config: SessionConfig,
    route: RouteScope,
    filter: FilterState,
    sort: SortSpec,
    page: u32,
    page_size: u32,
    seq: u64,
    state: SessionState,
    current: Option<ResultPage>,
    last_error: Option<SearchError>,
}

impl SearchSession {
    /// Create a session over an injected execution boundary.
    pub fn new(store: Arc<dyn ListingStore>, config: SessionConfig) -> Self {
        let page_size = clamp_page_size(config.page_size, config.max_page_size);
        Self {
            store,
            facets: FacetSet::standard(),
            sort: config.default_sort,
            page_size,
            config,
            route: RouteScope::default(),
            filter: FilterState::new(),
            page: 1,
            seq: 0,
            state: SessionState::Idle,
            current: None,
            last_error: None,
        }
    }

    /// Scope the session to a brand or brand/model page. The scope's
    /// constraints are always present and survive filter mutations.
    pub fn with_route_scope(mut self, route: RouteScope) -> Self {
        self.route = route;
        self.route.apply(&mut self.filter);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The page shown to the user. In `Failed` this is the last good
    /// page, so the UI is not forced to blank itself.
    pub fn current_page(&self) -> Option<&ResultPage> {
        self.current.as_ref()
    }

    /// The failure behind the current `Failed` state, if any.
    pub fn last_error(&self) -> Option<&SearchError> {
        self.last_error.as_ref()
    }

    /// The effective filter state (route scope already applied).
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    /// Query-string pairs mirroring the current filter and sort state,
    /// for the UI to write into the address bar.
    pub fn url_pairs(&self) -> Vec<(String, String)> {
        filter::encode_with_sort(&self.filter, self.sort)
    }

    /// The current state as an x-www-form-urlencoded query string.
    pub fn url_query_string(&self) -> String {
        filter::to_query_string(&self.url_pairs())
    }

    // ── mutations ─────────────────────────────────────────────────────
    //
    // Every mutation re-enters Loading and issues exactly one query
    // execution. Filter and sort changes reset to page 1; a page-size
    // change does too (never tries to preserve scroll position).

    /// Replace the price range constraint.
    pub fn set_price_range(&mut self, range: RangeConstraint) -> QueryRequest {
        self.update_filter(|f| f.set_range(keys::PRICE, range))
    }

    /// Replace the first-registration-year range constraint.
    pub fn set_year_range(&mut self, range: RangeConstraint) -> QueryRequest {
        self.update_filter(|f| f.set_range(keys::YEAR, range))
    }

    /// Replace the mileage range constraint.
    pub fn set_km_range(&mut self, range: RangeConstraint) -> QueryRequest {
        self.update_filter(|f| f.set_range(keys::KM, range))
    }

    /// Set or clear the fuel type constraint.
    pub fn set_fuel_type(&mut self, fuel: Option<FuelType>) -> QueryRequest {
        self.update_filter(|f| match fuel {
            Some(fuel) => f.set_equals(keys::FUEL_TYPE, fuel.as_str()),
            None => f.clear(keys::FUEL_TYPE),
        })
    }

    /// Apply an arbitrary filter edit, then re-issue. Route-scope
    /// constraints are re-applied afterwards, so they cannot be edited
    /// away.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) -> QueryRequest {
        edit(&mut self.filter);
        self.route.apply(&mut self.filter);
        self.page = 1;
        self.issue()
    }

    /// Drop every constraint except the route scope.
    pub fn clear_filters(&mut self) -> QueryRequest {
        self.update_filter(FilterState::clear_all)
    }

    /// Change the sort order.
    pub fn set_sort(&mut self, sort: SortSpec) -> QueryRequest {
        self.sort = sort;
        self.page = 1;
        self.issue()
    }

    /// Jump to a page. Pages below 1 are clamped by the query builder.
    pub fn set_page(&mut self, page: u32) -> QueryRequest {
        self.page = page.max(1);
        self.issue()
    }

    /// Change the page size (clamped to the configured maximum) and
    /// reset to page 1.
    pub fn set_page_size(&mut self, page_size: u32) -> QueryRequest {
        self.page_size = clamp_page_size(page_size, self.config.max_page_size);
        self.page = 1;
        self.issue()
    }

    /// Restore filter and sort state from URL query-string pairs, e.g.
    /// on back/forward navigation. Resets to page 1.
    pub fn apply_url(&mut self, pairs: &[(String, String)]) -> QueryRequest {
        self.filter = filter::decode(&self.facets, pairs, &self.route);
        self.sort = filter::decode_sort(pairs);
        self.page = 1;
        self.issue()
    }

    // ── execution ─────────────────────────────────────────────────────

    /// Issue a query for the current filter/sort/page. Enters `Loading`
    /// and supersedes any request still in flight.
    pub fn issue(&mut self) -> QueryRequest {
        self.seq += 1;
        if self.state != SessionState::Loading {
            tracing::debug!(from = ?self.state, seq = self.seq, "entering Loading");
        }
        self.state = SessionState::Loading;

        let descriptor = ListingQueryBuilder::new(self.filter.clone(), self.sort)
            .build(self.page, self.page_size);
        QueryRequest {
            seq: self.seq,
            descriptor,
        }
    }

    /// Feed a query response back into the session.
    ///
    /// Responses for anything but the latest issued request are
    /// discarded: this is how a slow, superseded query is prevented from
    /// overwriting newer results, since the transport offers no real
    /// cancellation.
    pub fn complete(&mut self, seq: u64, outcome: Result<QueryResults>) -> Completion {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "discarding superseded response");
            return Completion::Superseded;
        }

        match outcome {
            Ok(results) => {
                self.current = Some(ResultPage::new(
                    results.items,
                    results.total_count,
                    self.page,
                    self.page_size,
                ));
                self.last_error = None;
                self.state = SessionState::Ready;
                tracing::debug!(seq, "entering Ready");
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "query execution failed");
                // Last good page stays in `current`.
                self.last_error = Some(SearchError::Execution(e));
                self.state = SessionState::Failed;
            }
        }
        Completion::Applied
    }

    /// Run an issued request against the injected store and feed the
    /// response back in.
    pub async fn execute(&mut self, request: QueryRequest) -> SessionState {
        let store = Arc::clone(&self.store);
        let outcome = store.execute(&request.descriptor).await;
        self.complete(request.seq, outcome);
        self.state
    }

    /// Issue and execute in one step — the sequential convenience path.
    pub async fn refresh(&mut self) -> SessionState {
        let request = self.issue();
        self.execute(request).await
    }
}

fn clamp_page_size(requested: u32, max: u32) -> u32 {
    if requested > max {
        tracing::warn!(requested, capped = max, "page size exceeds maximum, capping");
        return max;
    }
    if requested == 0 {
        tracing::warn!("page size of 0 requested, using 1");
        return 1;
    }
    requested
}
