//! SQL rendering for query descriptors (feature `sql`).
//!
//! For stores backed by a relational database: turns a
//! [`QueryDescriptor`](crate::query::QueryDescriptor) into `SELECT` and
//! `COUNT(*)` statements over the `listing` table using SeaQuery's
//! Postgres builder. The count statement carries the same predicates but
//! no ordering or pagination.

use sea_query::{
    Alias, Asterisk, Expr, ExprTrait, Func, Order, PostgresQueryBuilder, Query, SelectStatement,
};

use crate::facet::SortDirection;
use crate::query::{Predicate, QueryDescriptor};

/// Table holding listing rows.
const LISTING_TABLE: &str = "listing";

/// Render the paginated SELECT for a descriptor.
pub fn select_sql(descriptor: &QueryDescriptor) -> String {
    let mut query = Query::select();
    query.column((Alias::new(LISTING_TABLE), Asterisk));
    query.from(Alias::new(LISTING_TABLE));

    add_predicates(&mut query, &descriptor.predicates);

    let order = match descriptor.sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    query.order_by(
        (
            Alias::new(LISTING_TABLE),
            Alias::new(descriptor.sort.field.column()),
        ),
        order,
    );

    query.limit(u64::from(descriptor.limit));
    query.offset(descriptor.offset);

    query.to_string(PostgresQueryBuilder)
}

/// Render the COUNT query for the same predicates.
pub fn count_sql(predicates: &[Predicate]) -> String {
    let mut query = Query::select();
    query.expr(Expr::col(Asterisk).count());
    query.from(Alias::new(LISTING_TABLE));

    add_predicates(&mut query, predicates);

    query.to_string(PostgresQueryBuilder)
}

fn add_predicates(query: &mut SelectStatement, predicates: &[Predicate]) {
    for predicate in predicates {
        match predicate {
            Predicate::Equals { field, value } => {
                query.and_where(column(field).eq(value.clone()));
            }
            Predicate::GreaterOrEqual { field, value } => {
                query.and_where(column(field).gte(*value));
            }
            Predicate::LessOrEqual { field, value } => {
                query.and_where(column(field).lte(*value));
            }
            Predicate::ContainsInsensitive { field, value } => {
                let pattern = format!("%{}%", escape_like_wildcards(&value.to_lowercase()));
                query.and_where(Expr::expr(Func::lower(column(field))).like(pattern));
            }
        }
    }
}

fn column(field: &str) -> Expr {
    Expr::col((Alias::new(LISTING_TABLE), Alias::new(field)))
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{keys, SortSpec};
    use crate::filter::{FilterState, RangeConstraint};
    use crate::query::ListingQueryBuilder;

    fn descriptor() -> QueryDescriptor {
        let mut state = FilterState::new();
        state.set_range(keys::PRICE, RangeConstraint::between(5000, 15000));
        state.set_equals(keys::FUEL_TYPE, "diesel");
        state.set_text(keys::BRAND, "alfa");
        ListingQueryBuilder::new(state, SortSpec::parse("price:asc")).build(2, 20)
    }

    #[test]
    fn select_contains_expected_clauses() {
        let sql = select_sql(&descriptor());

        assert!(sql.contains("FROM \"listing\""), "{sql}");
        assert!(sql.contains("\"price\" >= 5000"), "{sql}");
        assert!(sql.contains("\"price\" <= 15000"), "{sql}");
        assert!(sql.contains("\"fuel_type\" = 'diesel'"), "{sql}");
        assert!(sql.contains("LIKE"), "{sql}");
        assert!(sql.contains("%alfa%"), "{sql}");
        assert!(sql.contains("ORDER BY"), "{sql}");
        assert!(sql.contains("LIMIT 20"), "{sql}");
        assert!(sql.contains("OFFSET 20"), "{sql}");
    }

    #[test]
    fn contains_match_lowercases_both_sides() {
        let descriptor = ListingQueryBuilder::new(
            {
                let mut state = FilterState::new();
                state.set_text(keys::BRAND, "Alfa Romeo");
                state
            },
            SortSpec::default(),
        )
        .build(1, 10);

        let sql = select_sql(&descriptor);
        assert!(sql.contains("LOWER"), "{sql}");
        assert!(sql.contains("%alfa romeo%"), "{sql}");
    }

    #[test]
    fn count_has_no_pagination_or_order() {
        let sql = count_sql(&descriptor().predicates);

        assert!(sql.contains("COUNT(*)"), "{sql}");
        assert!(sql.contains("FROM \"listing\""), "{sql}");
        assert!(!sql.contains("LIMIT"), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        let descriptor = ListingQueryBuilder::new(
            {
                let mut state = FilterState::new();
                state.set_text(keys::MODEL, "100%_special");
                state
            },
            SortSpec::default(),
        )
        .build(1, 10);

        let sql = select_sql(&descriptor);
        assert!(
            !sql.contains("%100%_special%"),
            "raw wildcard chars should NOT appear unescaped: {sql}"
        );
    }

    #[test]
    fn escape_like_wildcards_function() {
        assert_eq!(escape_like_wildcards("golf"), "golf");
        assert_eq!(escape_like_wildcards("100%"), "100\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
    }
}
