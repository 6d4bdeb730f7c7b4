use listing_board::api::{AvailableFacets, CASE_STUDY_FACETS, UPDATE_FACETS};
use listing_board::listing::{
    Facet, FacetSet, FilterState, Listable, Listing, ListingOptions, Phase, ReadyKind, SortOrder,
    Tiering, compute_page,
};
use listing_board::types::{CaseStudy, Language, Update};

fn case_studies() -> Vec<CaseStudy> {
    serde_json::from_str(include_str!("fixtures/case_studies.json")).unwrap()
}

fn updates() -> Vec<Update> {
    #[derive(serde::Deserialize)]
    struct Wrapped {
        items: Vec<Update>,
    }
    serde_json::from_str::<Wrapped>(include_str!("fixtures/updates.json"))
        .unwrap()
        .items
}

fn page_ids<T: Listable>(
    items: &[T],
    state: &FilterState,
    options: &ListingOptions,
) -> Vec<String> {
    compute_page(items, state, options)
        .items
        .iter()
        .map(|item| item.id().to_owned())
        .collect()
}

fn updates_options() -> ListingOptions {
    ListingOptions {
        tiering: Tiering::CriticalFirst,
        ..ListingOptions::default()
    }
}

#[test]
fn pages_hold_at_most_nine_items() {
    let items = case_studies();
    let mut state = FilterState::default();
    let options = ListingOptions::default();

    let first = compute_page(&items, &state, &options);
    assert_eq!(first.items.len(), 9);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.total_items, 10);

    state.set_page(2, first.total_pages);
    let second = compute_page(&items, &state, &options);
    assert_eq!(second.items.len(), 1);
    assert!(second.has_prev());
    assert!(!second.has_next());
}

#[test]
fn featured_only_yields_three_on_one_page() {
    let items = case_studies();
    let mut state = FilterState::default();
    state.set_featured_only(true);
    let page = compute_page(&items, &state, &ListingOptions::default());
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn newest_first_keeps_same_day_items_and_puts_undated_last() {
    let items = case_studies();
    let state = FilterState::default();
    let ids = page_ids(&items, &state, &ListingOptions::default());
    assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8", "10"]);

    let mut state = FilterState::with_sort(SortOrder::Oldest);
    state.set_page(2, 2);
    assert_eq!(page_ids(&items, &state, &ListingOptions::default()), ["9"]);
}

#[test]
fn search_respects_language() {
    let items = case_studies();
    let mut state = FilterState::default();
    state.set_search("bio");

    let en = ListingOptions::default();
    assert_eq!(page_ids(&items, &state, &en), ["1"]);

    let hu = ListingOptions {
        language: Language::Hu,
        ..ListingOptions::default()
    };
    assert!(page_ids(&items, &state, &hu).is_empty());
}

#[test]
fn facet_selection_is_case_insensitive() {
    let items = case_studies();
    let mut state = FilterState::default();
    state.select(Facet::Tag, "pp");
    assert_eq!(
        page_ids(&items, &state, &ListingOptions::default()),
        ["2", "4", "5", "8"]
    );
}

#[test]
fn critical_updates_precede_others_in_both_orders() {
    let items = updates();
    let newest = FilterState::default();
    assert_eq!(
        page_ids(&items, &newest, &updates_options()),
        ["u4", "u2", "u1", "u3", "u5"]
    );

    let oldest = FilterState::with_sort(SortOrder::Oldest);
    assert_eq!(
        page_ids(&items, &oldest, &updates_options()),
        ["u2", "u4", "u5", "u3", "u1"]
    );
}

#[test]
fn critical_only_and_category_filters_combine() {
    let items = updates();
    let mut state = FilterState::default();
    state.set_critical_only(true);
    state.select(Facet::Category, "production");
    assert_eq!(page_ids(&items, &state, &updates_options()), ["u4"]);
}

#[test]
fn derived_facets_follow_first_appearance() {
    let items = case_studies();
    let facets = FacetSet::from_items(&items, CASE_STUDY_FACETS);
    let industries: Vec<&str> = facets.values(Facet::Industry).collect();
    assert_eq!(
        industries,
        ["Packaging", "Automotive", "Medical", "Electronics", "Consumer goods"]
    );
    // "PP" and "pp" differ only by case and are kept as stored.
    assert!(facets.contains_ignore_case(Facet::Tag, "pp"));
}

#[test]
fn listing_lifecycle_with_clear_and_no_results() {
    let mut listing: Listing<Update> =
        Listing::new(updates_options(), UPDATE_FACETS, SortOrder::Newest);
    assert!(matches!(listing.phase(), Phase::Loading));

    let generation = listing.begin_fetch();
    assert!(listing.resolve(generation, Ok(updates())));
    assert_eq!(listing.ready_kind(), Some(ReadyKind::HasResults));
    assert_eq!(listing.facets().len(Facet::Priority), 4);

    listing.filter_mut().set_search("no such update");
    assert_eq!(listing.ready_kind(), Some(ReadyKind::NoResults));
    assert!(listing.current_page().unwrap().is_empty());

    listing.filter_mut().clear();
    assert_eq!(listing.filtered_count(), 5);
    assert!(!listing.filter().featured_only());
    assert!(!listing.filter().critical_only());
}

#[test]
fn remote_facets_replace_derived_ones() {
    let mut listing: Listing<Update> =
        Listing::new(updates_options(), UPDATE_FACETS, SortOrder::Newest);
    let available: AvailableFacets =
        serde_json::from_value(serde_json::json!({"availableCategories": ["Quality"]})).unwrap();
    listing.set_remote_facets(available.to_facet_set(UPDATE_FACETS));

    let generation = listing.begin_fetch();
    listing.resolve(generation, Ok(updates()));
    let categories: Vec<&str> = listing.facets().values(Facet::Category).collect();
    assert_eq!(categories, ["Quality"]);
}
