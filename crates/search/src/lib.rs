//! Vettura marketplace search core.
//!
//! The faceted search/filter engine behind the listing browse views:
//! a facet vocabulary, a URL filter-state codec, a backend-agnostic
//! query builder, a result pager, and a long-lived search session with
//! last-write-wins supersede semantics for in-flight queries.
//!
//! Persistence, HTTP, auth, and rendering live elsewhere; the only
//! thing a consumer must provide is a [`session::ListingStore`]
//! implementation that honors predicates, sort, and pagination.

pub mod error;
pub mod facet;
pub mod filter;
pub mod listing;
pub mod pager;
pub mod query;
pub mod session;

#[cfg(feature = "sql")]
pub mod sql;

pub use error::SearchError;
pub use facet::{FacetSet, SortDirection, SortField, SortSpec};
pub use filter::{FilterState, RangeConstraint, RouteScope};
pub use listing::{FuelType, ListingSummary, QueryResults};
pub use pager::ResultPage;
pub use query::{Predicate, QueryDescriptor};
pub use session::{ListingStore, SearchSession, SessionConfig, SessionState};
