use std::collections::BTreeMap;

use super::{Facet, Listable, SortOrder, pager};
use crate::types::Language;

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Transient per-listing UI state.
///
/// Every mutation of a predicate (search text, facet selection, toggles,
/// sort order) sends the view back to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    selected: BTreeMap<Facet, String>,
    featured_only: bool,
    critical_only: bool,
    sort: SortOrder,
    default_sort: SortOrder,
    page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_sort(SortOrder::default())
    }
}

impl FilterState {
    /// Fresh state whose default (and "clear filters") sort is `sort`.
    pub fn with_sort(sort: SortOrder) -> Self {
        Self {
            search: String::new(),
            selected: BTreeMap::new(),
            featured_only: false,
            critical_only: false,
            sort,
            default_sort: sort,
            page: 1,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected(&self, facet: Facet) -> Option<&str> {
        self.selected.get(&facet).map(String::as_str)
    }

    pub fn selections(&self) -> impl Iterator<Item = (Facet, &str)> {
        self.selected.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn featured_only(&self) -> bool {
        self.featured_only
    }

    pub fn critical_only(&self) -> bool {
        self.critical_only
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// 1-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// True when any predicate narrows the collection.
    pub fn is_filtering(&self) -> bool {
        !self.search.trim().is_empty()
            || !self.selected.is_empty()
            || self.featured_only
            || self.critical_only
    }

    // --- predicate mutations (reset to page 1) ---

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Select `value` for `facet`. An empty value or `"all"` clears it.
    pub fn select(&mut self, facet: Facet, value: &str) {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            self.selected.remove(&facet);
        } else {
            self.selected.insert(facet, value.to_owned());
        }
        self.page = 1;
    }

    pub fn clear_facet(&mut self, facet: Facet) {
        self.selected.remove(&facet);
        self.page = 1;
    }

    pub fn set_featured_only(&mut self, on: bool) {
        self.featured_only = on;
        self.page = 1;
    }

    pub fn set_critical_only(&mut self, on: bool) {
        self.critical_only = on;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    /// Reset every predicate, the sort order and the page to their defaults.
    pub fn clear(&mut self) {
        *self = Self::with_sort(self.default_sort);
    }

    /// Apply a structured query string (see [`parse_query`]).
    pub fn apply_query(&mut self, query: &str) {
        let parsed = parse_query(query);
        self.search = parsed.text;
        for (facet, value) in parsed.facets {
            self.select(facet, &value);
        }
        if parsed.featured {
            self.featured_only = true;
        }
        if parsed.critical {
            self.critical_only = true;
        }
        if let Some(sort) = parsed.sort {
            self.sort = sort;
        }
        self.page = 1;
    }

    // --- navigation (no predicate change) ---

    /// Jump to `page`, clamped into `[1, max(total_pages, 1)]`.
    pub fn set_page(&mut self, page: usize, total_pages: usize) {
        self.page = pager::clamp_page(page, total_pages);
    }

    /// Advance one page; returns `false` (and does nothing) on the last page.
    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.page >= total_pages {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back one page; returns `false` (and does nothing) on page 1.
    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }
}

// ---------------------------------------------------------------------------
// Structured query parsing
// ---------------------------------------------------------------------------

/// Parsed structured query.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Free-text remainder.
    pub text: String,
    pub facets: Vec<(Facet, String)>,
    pub featured: bool,
    pub critical: bool,
    pub sort: Option<SortOrder>,
}

/// Parse a query string, extracting structured prefixes.
///
/// Supported prefixes:
/// - `<facet>:value` (`industry:`, `tag:`, `priority:`, `category:`, `change-type:`)
/// - `is:featured` / `is:critical`
/// - `sort:newest` / `sort:oldest`
///
/// Remaining text is used for free-text matching.
pub fn parse_query(query: &str) -> ParsedQuery {
    let mut result = ParsedQuery::default();
    let mut text_parts = Vec::new();

    for token in query.split_whitespace() {
        let Some((key, val)) = token.split_once(':') else {
            text_parts.push(token);
            continue;
        };
        if key.eq_ignore_ascii_case("is") {
            match val.to_lowercase().as_str() {
                "featured" => result.featured = true,
                "critical" => result.critical = true,
                _ => text_parts.push(token),
            }
        } else if key.eq_ignore_ascii_case("sort") {
            match val.parse::<SortOrder>() {
                Ok(sort) => result.sort = Some(sort),
                Err(_) => text_parts.push(token),
            }
        } else if let Ok(facet) = key.parse::<Facet>()
            && !val.is_empty()
        {
            result.facets.push((facet, val.to_owned()));
        } else {
            text_parts.push(token);
        }
    }

    result.text = text_parts.join(" ");
    result
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Whether `item` passes every active predicate of `state`.
pub fn matches<T: Listable>(item: &T, state: &FilterState, lang: Language) -> bool {
    let query = state.search.trim().to_lowercase();
    if !query.is_empty() {
        let haystack = item.search_fields(lang).join("\n").to_lowercase();
        if !haystack.contains(&query) {
            return false;
        }
    }

    for (facet, wanted) in &state.selected {
        let wanted = wanted.to_lowercase();
        let hit = item
            .facet_values(*facet)
            .iter()
            .any(|v| v.trim().to_lowercase() == wanted);
        if !hit {
            return false;
        }
    }

    if state.featured_only && !item.is_featured() {
        return false;
    }
    if state.critical_only && !item.is_critical() {
        return false;
    }
    true
}

/// Items passing `state`, in input order.
pub fn filter_items<'a, T: Listable>(
    items: &'a [T],
    state: &FilterState,
    lang: Language,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches(*item, state, lang))
        .collect()
}
