//! End-to-end session tests against the in-memory store.

use std::sync::Arc;

use vettura_search::facet::keys;
use vettura_search::filter::{RangeConstraint, RouteScope};
use vettura_search::listing::FuelType;
use vettura_search::session::{
    Completion, ListingStore, SearchSession, SessionConfig, SessionState,
};
use vettura_search::{QueryResults, SortSpec};

use vettura_test_utils::{init_tracing, listing, FailingStore, InMemoryListings};

fn showroom() -> Arc<InMemoryListings> {
    Arc::new(InMemoryListings::new(vec![
        listing("Fiat", "Panda").price(7000).km(90_000).build(),
        listing("Fiat", "500").price(9000).km(40_000).build(),
        listing("Fiat", "Tipo")
            .price(12_500)
            .km(60_000)
            .fuel(FuelType::Diesel)
            .created_days_later(1)
            .build(),
        listing("Alfa Romeo", "Giulia")
            .price(28_000)
            .km(30_000)
            .fuel(FuelType::Diesel)
            .power(190)
            .created_days_later(5)
            .build(),
        listing("Alfa Romeo", "Giulietta")
            .price(14_000)
            .km(75_000)
            .created_days_later(3)
            .build(),
        listing("Volkswagen", "Golf")
            .price(15_000)
            .km(120_000)
            .fuel(FuelType::Diesel)
            .created_days_later(2)
            .build(),
        listing("Volkswagen", "Polo").price(11_000).km(55_000).build(),
    ]))
}

fn small_pages(page_size: u32) -> SessionConfig {
    SessionConfig {
        page_size,
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn initial_refresh_shows_newest_first() {
    init_tracing();
    let mut session = SearchSession::new(showroom(), small_pages(3));

    assert_eq!(session.refresh().await, SessionState::Ready);

    let page = session.current_page().expect("page after refresh");
    assert_eq!(page.total_count, 7);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].model, "Giulia");
    assert!(page.has_next);
    assert!(!page.has_prev);
    assert_eq!(page.visible_range(), Some((1, 3)));
}

#[tokio::test]
async fn filtering_narrows_and_resets_to_first_page() {
    let mut session = SearchSession::new(showroom(), small_pages(2));
    session.refresh().await;

    let request = session.set_page(3);
    session.execute(request).await;
    assert_eq!(session.current_page().map(|p| p.page), Some(3));

    let request = session.set_fuel_type(Some(FuelType::Diesel));
    session.execute(request).await;

    let page = session.current_page().expect("filtered page");
    assert_eq!(page.page, 1);
    assert_eq!(page.total_count, 3);
    assert!(page.items.iter().all(|l| l.fuel_type == FuelType::Diesel));
}

#[tokio::test]
async fn brand_scope_with_price_band() {
    let mut session = SearchSession::new(showroom(), SessionConfig::default())
        .with_route_scope(RouteScope::brand("alfa"));

    let request = session.set_price_range(RangeConstraint::at_most(20_000));
    session.execute(request).await;

    let page = session.current_page().expect("scoped page");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].model, "Giulietta");
}

#[tokio::test]
async fn pagination_walk() {
    let mut session = SearchSession::new(showroom(), small_pages(3));
    let request = session.set_sort(SortSpec::parse("price:asc"));
    session.execute(request).await;

    let first = session.current_page().expect("first page").clone();
    assert_eq!(first.items[0].price, 7000);
    assert!(first.has_next);

    let request = session.set_page(3);
    session.execute(request).await;
    let last = session.current_page().expect("last page");
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].price, 28_000);
    assert!(!last.has_next);
    assert!(last.has_prev);
    assert_eq!(last.visible_range(), Some((7, 7)));
}

#[tokio::test]
async fn zero_results_render_as_empty_range() {
    let mut session = SearchSession::new(showroom(), SessionConfig::default());
    let request = session.set_price_range(RangeConstraint::at_least(1_000_000));
    session.execute(request).await;

    let page = session.current_page().expect("empty page");
    assert_eq!(page.total_count, 0);
    assert_eq!(page.visible_range(), None);
    assert!(!page.has_next);
    assert!(!page.has_prev);
}

#[tokio::test]
async fn out_of_order_completion_keeps_newest_filter() {
    let store: Arc<dyn ListingStore> = showroom();
    let mut session = SearchSession::new(Arc::clone(&store), small_pages(10));

    // Two rapid filter changes: A (diesel) then B (petrol). Resolve them
    // out of order and check B wins.
    let request_a = session.set_fuel_type(Some(FuelType::Diesel));
    let request_b = session.set_fuel_type(Some(FuelType::Petrol));

    let response_a = store.execute(&request_a.descriptor).await;
    let response_b = store.execute(&request_b.descriptor).await;

    assert_eq!(
        session.complete(request_b.seq, response_b),
        Completion::Applied
    );
    assert_eq!(
        session.complete(request_a.seq, response_a),
        Completion::Superseded
    );

    let page = session.current_page().expect("page after race");
    assert!(
        page.items.iter().all(|l| l.fuel_type == FuelType::Petrol),
        "stale diesel results must not overwrite the petrol filter"
    );
}

#[tokio::test]
async fn failure_keeps_last_good_page_and_recovers() {
    let mut session = SearchSession::new(showroom(), small_pages(4));
    session.refresh().await;
    let good_total = session.current_page().map(|p| p.total_count);

    let request = session.set_page(2);
    session.complete(
        request.seq,
        Err(anyhow::anyhow!("connection reset by peer")),
    );

    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.last_error().is_some());
    assert_eq!(session.current_page().map(|p| p.total_count), good_total);

    // Next mutation retries and recovers.
    assert_eq!(session.refresh().await, SessionState::Ready);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn failing_store_never_panics_the_session() {
    let mut session = SearchSession::new(Arc::new(FailingStore), SessionConfig::default());
    assert_eq!(session.refresh().await, SessionState::Failed);
    assert!(session.current_page().is_none());
}

#[tokio::test]
async fn url_round_trip_through_session() {
    let mut session = SearchSession::new(showroom(), SessionConfig::default());
    session.update_filter(|f| {
        f.set_range(keys::PRICE, RangeConstraint::between(8000, 16_000));
        f.set_text(keys::BRAND, "volks");
    });
    session.set_sort(SortSpec::parse("km:asc"));

    let pairs = session.url_pairs();

    let mut restored = SearchSession::new(showroom(), SessionConfig::default());
    let request = restored.apply_url(&pairs);
    restored.execute(request).await;

    assert_eq!(restored.filter(), session.filter());
    assert_eq!(restored.sort(), SortSpec::parse("km:asc"));
    let page = restored.current_page().expect("restored page");
    assert_eq!(page.total_count, 2);
    assert_eq!(page.items[0].model, "Polo");
}

#[tokio::test]
async fn hand_edited_url_still_loads() {
    let mut session = SearchSession::new(showroom(), SessionConfig::default());
    let pairs: Vec<(String, String)> = vec![
        ("price_min".to_string(), "abc".to_string()),
        ("price_max".to_string(), "13000".to_string()),
        ("fuel_type".to_string(), "warp_core".to_string()),
        ("search[order]".to_string(), "bogus:foo".to_string()),
    ];

    let request = session.apply_url(&pairs);
    assert_eq!(session.execute(request).await, SessionState::Ready);

    let page = session.current_page().expect("page");
    // Only the well-formed price_max survives; sort falls back to newest.
    assert_eq!(page.total_count, 4);
    assert_eq!(session.sort(), SortSpec::default());
}

#[tokio::test]
async fn page_size_change_resets_and_requeries() {
    let mut session = SearchSession::new(showroom(), small_pages(2));
    session.refresh().await;
    let request = session.set_page(2);
    session.execute(request).await;

    let request = session.set_page_size(5);
    session.execute(request).await;

    let page = session.current_page().expect("resized page");
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 5);
    assert_eq!(page.items.len(), 5);
}

#[test]
fn empty_session_result_is_queryable() {
    // QueryResults is plain data; make sure an empty result set is
    // representable without special cases.
    let results = QueryResults {
        items: vec![],
        total_count: 0,
    };
    assert!(results.items.is_empty());
}
