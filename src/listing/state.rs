use std::fmt;

use super::{
    Facet, FacetSet, FilterState, Listable, ListingOptions, Page, SortOrder, compute_page,
    filter_items, pager,
};
use crate::api::ApiError;
use crate::types::Language;

/// Token identifying one fetch. Only the latest one's response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a listing view.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Loading,
    Ready(Vec<T>),
    Error(ApiError),
}

/// Sub-state of [`Phase::Ready`], recomputed after every filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyKind {
    HasResults,
    NoResults,
}

/// A listing view: fetched collection, derived facets and filter state.
pub struct Listing<T> {
    phase: Phase<T>,
    latest: Generation,
    facets: FacetSet,
    remote_facets: bool,
    tracked_facets: Vec<Facet>,
    filter: FilterState,
    options: ListingOptions,
}

impl<T: Listable> Listing<T> {
    /// New listing in `Loading`, before any fetch was issued.
    pub fn new(options: ListingOptions, facets: &[Facet], sort: SortOrder) -> Self {
        Self {
            phase: Phase::Loading,
            latest: Generation::default(),
            facets: FacetSet::new(),
            remote_facets: false,
            tracked_facets: facets.to_vec(),
            filter: FilterState::with_sort(sort),
            options,
        }
    }

    /// Start a fetch: enter `Loading`, drop the shown collection, and return
    /// the token the response must carry.
    pub fn begin_fetch(&mut self) -> Generation {
        self.latest = self.latest.next();
        self.phase = Phase::Loading;
        self.latest
    }

    /// Apply a fetch outcome. Returns `false` if `generation` is stale.
    pub fn resolve(&mut self, generation: Generation, result: Result<Vec<T>, ApiError>) -> bool {
        if generation != self.latest {
            tracing::debug!(
                "listing: dropping stale response {generation} (latest {})",
                self.latest
            );
            return false;
        }
        match result {
            Ok(items) => {
                if !self.remote_facets {
                    self.facets = FacetSet::from_items(&items, &self.tracked_facets);
                }
                tracing::debug!("listing: {generation} ready with {} items", items.len());
                self.phase = Phase::Ready(items);
            }
            Err(e) => {
                tracing::debug!("listing: {generation} failed: {e}");
                self.phase = Phase::Error(e);
            }
        }
        true
    }

    /// Retry after a failure. No-op (returns `None`) in any other phase.
    pub fn retry(&mut self) -> Option<Generation> {
        matches!(self.phase, Phase::Error(_)).then(|| self.begin_fetch())
    }

    /// Use facet values from the debug endpoint instead of deriving them.
    pub fn set_remote_facets(&mut self, facets: FacetSet) {
        self.facets = facets;
        self.remote_facets = true;
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn items(&self) -> Option<&[T]> {
        match &self.phase {
            Phase::Ready(items) => Some(items),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.phase {
            Phase::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Mutable filter access; predicate setters reset to page 1 themselves.
    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn options(&self) -> &ListingOptions {
        &self.options
    }

    /// Switch content language. Search results change, so back to page 1.
    pub fn set_language(&mut self, language: Language) {
        self.options.language = language;
        self.filter.set_page(1, 1);
    }

    /// Size of the filtered collection (0 unless `Ready`).
    pub fn filtered_count(&self) -> usize {
        self.items().map_or(0, |items| {
            filter_items(items, &self.filter, self.options.language).len()
        })
    }

    pub fn total_pages(&self) -> usize {
        pager::total_pages(self.filtered_count(), self.options.page_size)
    }

    /// The page to display, when `Ready`.
    pub fn current_page(&self) -> Option<Page<'_, T>> {
        self.items()
            .map(|items| compute_page(items, &self.filter, &self.options))
    }

    pub fn ready_kind(&self) -> Option<ReadyKind> {
        self.items().map(|_| {
            if self.filtered_count() == 0 {
                ReadyKind::NoResults
            } else {
                ReadyKind::HasResults
            }
        })
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.total_pages();
        self.filter.next_page(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.filter.prev_page()
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.filter.set_page(page, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::test_support::{Item, ids};
    use crate::listing::{DEFAULT_PAGE_SIZE, Tiering};

    fn listing() -> Listing<Item> {
        Listing::new(
            ListingOptions::default(),
            &[Facet::Industry, Facet::Tag],
            SortOrder::Newest,
        )
    }

    fn many(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(&format!("{i:02}")).date(&format!("2024-01-{:02}", i % 28 + 1)))
            .collect()
    }

    fn network_error() -> ApiError {
        ApiError::Network {
            url: "http://cms/api".into(),
            message: "connection refused".into(),
        }
    }

    #[test]
    fn starts_loading_then_ready() {
        let mut l = listing();
        assert_eq!(l.phase(), &Phase::Loading);
        let generation = l.begin_fetch();
        assert!(l.resolve(generation, Ok(many(3))));
        assert_eq!(l.items().map(<[Item]>::len), Some(3));
        assert_eq!(l.ready_kind(), Some(ReadyKind::HasResults));
    }

    #[test]
    fn stale_response_never_overwrites_fresher_state() {
        let mut l = listing();
        let first = l.begin_fetch();
        let second = l.begin_fetch();
        assert!(l.resolve(second, Ok(many(2))));
        assert!(!l.resolve(first, Ok(many(20))));
        assert_eq!(l.items().map(<[Item]>::len), Some(2));

        assert!(!l.resolve(first, Err(network_error())));
        assert!(l.error().is_none());
    }

    #[test]
    fn failure_discards_previous_collection_and_retry_reloads() {
        let mut l = listing();
        let g = l.begin_fetch();
        l.resolve(g, Ok(many(5)));
        let g = l.begin_fetch();
        l.resolve(g, Err(network_error()));
        assert!(l.items().is_none());
        assert!(l.current_page().is_none());
        assert_eq!(l.error(), Some(&network_error()));

        let retry = l.retry().unwrap();
        assert_eq!(l.phase(), &Phase::Loading);
        assert!(retry > g);
        l.resolve(retry, Ok(many(1)));
        assert_eq!(l.ready_kind(), Some(ReadyKind::HasResults));
    }

    #[test]
    fn retry_is_noop_unless_errored() {
        let mut l = listing();
        assert!(l.retry().is_none());
        let g = l.begin_fetch();
        l.resolve(g, Ok(vec![]));
        assert!(l.retry().is_none());
        assert_eq!(l.ready_kind(), Some(ReadyKind::NoResults));
    }

    #[test]
    fn no_results_after_filtering_then_clear_restores() {
        let mut l = listing();
        let g = l.begin_fetch();
        l.resolve(g, Ok(many(12)));
        l.filter_mut().set_search("does-not-exist");
        assert_eq!(l.ready_kind(), Some(ReadyKind::NoResults));
        assert_eq!(l.total_pages(), 0);
        let page = l.current_page().unwrap();
        assert_eq!(page.number, 1);
        assert!(page.is_empty());

        l.filter_mut().clear();
        assert_eq!(l.filtered_count(), 12);
        assert_eq!(l.ready_kind(), Some(ReadyKind::HasResults));
    }

    #[test]
    fn pages_hold_at_most_page_size_and_navigation_clamps() {
        let mut l = listing();
        let g = l.begin_fetch();
        l.resolve(g, Ok(many(20)));
        assert_eq!(l.total_pages(), 3);
        assert_eq!(l.current_page().unwrap().items.len(), DEFAULT_PAGE_SIZE);

        assert!(!l.prev_page());
        assert!(l.next_page());
        assert!(l.next_page());
        assert!(!l.next_page());
        let last = l.current_page().unwrap();
        assert_eq!(last.number, 3);
        assert_eq!(last.items.len(), 2);

        l.go_to_page(40);
        assert_eq!(l.filter().page(), 3);
    }

    #[test]
    fn facets_derived_from_collection_unless_remote() {
        let mut l = listing();
        let g = l.begin_fetch();
        l.resolve(g, Ok(vec![Item::new("1").industry("Medical").tags(&["abs"])]));
        assert_eq!(
            l.facets().values(Facet::Industry).collect::<Vec<_>>(),
            vec!["Medical"]
        );

        let mut remote = FacetSet::new();
        remote.extend(Facet::Industry, ["Automotive", "Medical", "Packaging"]);
        l.set_remote_facets(remote);
        let g = l.begin_fetch();
        l.resolve(g, Ok(vec![Item::new("2").industry("Medical")]));
        assert_eq!(l.facets().len(Facet::Industry), 3);
    }

    #[test]
    fn language_change_resets_page() {
        let mut l = listing();
        let g = l.begin_fetch();
        l.resolve(g, Ok(many(20)));
        l.next_page();
        l.set_language(Language::Hu);
        assert_eq!(l.filter().page(), 1);
        assert_eq!(l.options().language, Language::Hu);
    }

    #[test]
    fn critical_first_listing_hoists_on_every_page() {
        let mut items = many(15);
        items.push(Item::new("crit-old").date("2001-01-01").critical());
        items.push(Item::new("crit-new").date("2030-01-01").critical());
        let mut l = Listing::new(
            ListingOptions {
                tiering: Tiering::CriticalFirst,
                ..ListingOptions::default()
            },
            &[],
            SortOrder::Oldest,
        );
        let g = l.begin_fetch();
        l.resolve(g, Ok(items));
        let page = l.current_page().unwrap();
        assert_eq!(ids(&page.items)[..2], ["crit-old", "crit-new"]);
    }
}
