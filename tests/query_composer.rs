use storefront::query::{
    Facet, FilterOverride, FilterState, MAX_PAGE_SIZE, PriceBucket, SearchPage, SortOrder,
};

fn sample_states() -> Vec<FilterState> {
    vec![
        FilterState::default(),
        FilterState::parse("category=Shampoo&brand=Dove&price=51-200&rating=4&order=lowest&page=3"),
        FilterState::parse("query=argan%20oil&pageSize=24&order=toprated"),
        FilterState::parse("query=50%25+off&category=Hair%20%26%20Scalp&rating=0"),
        FilterState::parse("brand=L%27Or%C3%A9al&price=201-1000&order=highest&page=9&pageSize=1"),
    ]
}

#[test]
fn parse_of_serialize_is_identity() {
    for state in sample_states() {
        let serialized = state.serialize();
        assert_eq!(FilterState::parse(&serialized), state, "round trip of {serialized}");
        assert_eq!(FilterState::parse(&format!("?{serialized}")), state);
    }
}

#[test]
fn serialize_is_canonical_and_lists_every_facet() {
    assert_eq!(
        FilterState::default().serialize(),
        "category=all&query=all&brand=all&price=all&rating=all&order=newest&page=1&pageSize=12"
    );

    // key order in the input does not matter
    let a = FilterState::parse("brand=Dove&category=Shampoo");
    let b = FilterState::parse("category=Shampoo&brand=Dove");
    assert_eq!(a.serialize(), b.serialize());
}

#[test]
fn missing_or_unknown_keys_fall_back_to_defaults() {
    let defaults = FilterState::default();
    assert_eq!(FilterState::parse(""), defaults);
    assert_eq!(FilterState::parse("?"), defaults);
    assert_eq!(FilterState::parse("color=red&size=xl"), defaults);
    assert_eq!(
        FilterState::parse("price=cheap&order=random&rating=lots&page=two&pageSize=-4"),
        defaults
    );
    assert_eq!(FilterState::parse("page=0&rating=9"), defaults);
    assert_eq!(FilterState::parse("&&=&page"), defaults);

    assert_eq!(defaults.order(), SortOrder::Newest);
    assert_eq!(defaults.page(), 1);
    assert_eq!(defaults.page_size(), 12);
    assert!(defaults.query().is_all());
    assert!(!defaults.is_filtered());
}

#[test]
fn blank_text_facets_mean_all() {
    let state = FilterState::parse("query=&category=%20&brand=all");
    assert!(state.query().is_all());
    assert!(state.category().is_all());
    assert!(state.brand().is_all());
}

#[test]
fn page_size_is_clamped() {
    let state = FilterState::parse("pageSize=5000");
    assert_eq!(state.page_size(), MAX_PAGE_SIZE);
    assert_eq!(FilterState::parse("pageSize=0").page_size(), 12);
}

#[test]
fn override_replaces_only_named_facets() {
    let base = FilterState::parse(
        "category=Shampoo&query=repair&brand=Pantene&price=1-50&rating=3&order=lowest&page=4&pageSize=24",
    );
    let next = base.with_override(&FilterOverride::new().brand("Dove"));

    assert_eq!(next.brand(), &Facet::Only("Dove".to_string()));
    assert_eq!(next.category(), base.category());
    assert_eq!(next.query(), base.query());
    assert_eq!(next.price(), base.price());
    assert_eq!(next.rating(), base.rating());
    assert_eq!(next.order(), base.order());
    assert_eq!(next.page(), base.page());
    assert_eq!(next.page_size(), base.page_size());

    assert_eq!(base.with_override(&FilterOverride::new()), base);
    assert!(FilterOverride::new().is_empty());
}

#[test]
fn override_can_clear_a_facet() {
    let base = FilterState::parse("category=Shampoo&rating=4&price=51-200");
    let next = base.with_override(
        &FilterOverride::new()
            .category("all")
            .any_rating()
            .price(PriceBucket::All),
    );
    assert!(!next.is_filtered());
    assert_eq!(
        next.link(),
        "/search?category=all&query=all&brand=all&price=all&rating=all&order=newest&page=1&pageSize=12"
    );
}

#[test]
fn text_is_percent_encoded_in_links() {
    let state = FilterState::default().with_override(&FilterOverride::new().query("50% off & more"));
    let path = state.search_path();
    assert!(path.starts_with("/api/products/search?category=all&query=50%25+off+%26+more&"));
    assert_eq!(FilterState::parse(path.split_once('?').unwrap().1), state);
}

#[test]
fn offset_follows_page_and_size() {
    let state = FilterState::parse("page=3&pageSize=10");
    assert_eq!(state.offset(), 20);
    assert_eq!(FilterState::default().offset(), 0);
}

#[test]
fn price_buckets_cover_cent_ranges() {
    assert_eq!(PriceBucket::All.bounds_cents(), None);
    assert_eq!(PriceBucket::From1To50.bounds_cents(), Some((100, 5_000)));
    assert_eq!(PriceBucket::From51To200.bounds_cents(), Some((5_100, 20_000)));
    assert_eq!(PriceBucket::From201To1000.bounds_cents(), Some((20_100, 100_000)));
    for bucket in PriceBucket::CHOICES {
        assert_eq!(PriceBucket::from_param(bucket.as_param()), Some(bucket));
    }
}

#[test]
fn search_page_counts_pages_and_bounds() {
    let filter = FilterState::parse("page=2&pageSize=5");
    let page = SearchPage::new(vec![1, 2, 3, 4, 5], &filter, 11);
    assert_eq!(page.pages, 3);
    assert_eq!(page.page, 2);
    assert!(page.in_bounds());

    let beyond = FilterState::parse("page=7&pageSize=5");
    let empty: SearchPage<i32> = SearchPage::new(Vec::new(), &beyond, 11);
    assert!(!empty.in_bounds());
    assert!(empty.is_empty());

    let nothing: SearchPage<i32> = SearchPage::new(Vec::new(), &FilterState::default(), 0);
    assert_eq!(nothing.pages, 0);
    assert!(!nothing.in_bounds());
}

#[test]
fn page_links_keep_active_facets() {
    let filter = FilterState::parse("brand=Dove&order=highest&pageSize=2&page=2");
    let page = SearchPage::new(vec!["a", "b"], &filter, 5);
    let links = page.page_links(&filter);

    assert_eq!(links.len(), 3);
    assert_eq!(links.iter().filter(|link| link.current).count(), 1);
    assert!(links[1].current);
    for link in &links {
        let linked = FilterState::parse(link.href.trim_start_matches("/search?"));
        assert_eq!(linked.page(), link.page);
        assert_eq!(linked.brand(), filter.brand());
        assert_eq!(linked.order(), SortOrder::Highest);
        assert_eq!(linked.page_size(), 2);
    }
}

#[test]
fn search_page_uses_camel_case_fields() {
    let page: SearchPage<u8> = serde_json::from_str(
        r#"{"products":[1,2],"page":1,"pages":1,"countProducts":2}"#,
    )
    .expect("decode");
    assert_eq!(page.count_products, 2);
    let json = serde_json::to_value(&page).expect("encode");
    assert_eq!(json["countProducts"], 2);
}

#[test]
fn price_links_cover_every_bucket_and_mark_the_active_one() {
    let filter = FilterState::parse("category=Shampoo&price=51-200&page=2");
    let links = filter.price_links();

    let labels: Vec<&str> = links.iter().map(|link| link.label).collect();
    assert_eq!(labels, ["Any", "$1 to $50", "$51 to $200", "$201 to $1000"]);
    assert_eq!(links.iter().filter(|link| link.active).count(), 1);
    assert!(links[2].active);

    let cheapest = FilterState::parse(links[1].href.trim_start_matches("/search?"));
    assert_eq!(cheapest.price(), PriceBucket::From1To50);
    assert_eq!(cheapest.category(), &Facet::Only("Shampoo".to_string()));
    assert_eq!(cheapest.page(), 2);

    let any = FilterState::parse(links[0].href.trim_start_matches("/search?"));
    assert_eq!(any.price(), PriceBucket::All);
}

#[test]
fn sort_links_follow_display_order() {
    let filter = FilterState::parse("brand=Dove&order=toprated");
    let links = filter.sort_links();

    let labels: Vec<&str> = links.iter().map(|link| link.label).collect();
    assert_eq!(
        labels,
        [
            "Newest Arrivals",
            "Price: Low to High",
            "Price: High to Low",
            "Avg. Customer Reviews"
        ]
    );
    assert!(links[3].active);
    assert!(!links[0].active);
    for (link, order) in links.iter().zip(SortOrder::CHOICES) {
        let linked = FilterState::parse(link.href.trim_start_matches("/search?"));
        assert_eq!(linked.order(), order);
        assert_eq!(linked.brand(), &Facet::Only("Dove".to_string()));
    }
}
