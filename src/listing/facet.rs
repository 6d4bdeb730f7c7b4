use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::{Facet, Listable};

/// Distinct values per facet, in first-seen order.
///
/// Used only to populate filter controls; recomputed whenever the base
/// collection changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacetSet {
    values: IndexMap<Facet, IndexSet<String>>,
}

impl FacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the values of `facets` seen across `items`.
    ///
    /// Every requested facet gets an entry, even if no item carries it.
    pub fn from_items<T: Listable>(items: &[T], facets: &[Facet]) -> Self {
        let mut set = Self::new();
        for &facet in facets {
            set.values.entry(facet).or_default();
            for item in items {
                for value in item.facet_values(facet) {
                    set.insert(facet, value);
                }
            }
        }
        set
    }

    /// Add a value; blank values and exact duplicates are ignored.
    pub fn insert(&mut self, facet: Facet, value: &str) {
        let value = value.trim();
        let entry = self.values.entry(facet).or_default();
        if !value.is_empty() {
            entry.insert(value.to_owned());
        }
    }

    pub fn extend<'a>(&mut self, facet: Facet, values: impl IntoIterator<Item = &'a str>) {
        self.values.entry(facet).or_default();
        for value in values {
            self.insert(facet, value);
        }
    }

    pub fn values(&self, facet: Facet) -> impl Iterator<Item = &str> {
        self.values
            .get(&facet)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn len(&self, facet: Facet) -> usize {
        self.values.get(&facet).map_or(0, IndexSet::len)
    }

    /// Facets present in this set, in insertion order.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.values.keys().copied()
    }

    pub fn contains_ignore_case(&self, facet: Facet, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        self.values(facet).any(|v| v.to_lowercase() == needle)
    }

    /// The stored spelling of `value`, matched case-insensitively.
    pub fn canonical(&self, facet: Facet, value: &str) -> Option<&str> {
        let needle = value.trim().to_lowercase();
        self.values(facet).find(|v| v.to_lowercase() == needle)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(IndexSet::is_empty)
    }
}

/// Tags that co-occur with `tag` on the items carrying it.
///
/// Comparison is case-insensitive; the first spelling seen wins. Ordered by
/// descending co-occurrence, ties in first-seen order. `tag` itself is never
/// returned.
pub fn related_tags<T: Listable>(items: &[T], tag: &str, limit: usize) -> Vec<String> {
    let needle = tag.trim().to_lowercase();
    let mut counts: IndexMap<String, (String, usize)> = IndexMap::new();

    for item in items {
        let tags = item.facet_values(Facet::Tag);
        if !tags.iter().any(|t| t.trim().to_lowercase() == needle) {
            continue;
        }
        let mut seen_here = HashSet::new();
        for t in tags {
            let trimmed = t.trim();
            let lower = trimmed.to_lowercase();
            if lower.is_empty() || lower == needle || !seen_here.insert(lower.clone()) {
                continue;
            }
            counts.entry(lower).or_insert_with(|| (trimmed.to_owned(), 0)).1 += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::test_support::Item;

    #[test]
    fn from_items_dedups_in_first_seen_order() {
        let items = vec![
            Item::new("1").industry("Automotive").tags(&["pp", "recycled"]),
            Item::new("2").industry("Medical").tags(&["recycled", " pla "]),
            Item::new("3").industry("Automotive").tags(&[""]),
        ];
        let set = FacetSet::from_items(&items, &[Facet::Industry, Facet::Tag]);
        assert_eq!(
            set.values(Facet::Industry).collect::<Vec<_>>(),
            vec!["Automotive", "Medical"]
        );
        assert_eq!(
            set.values(Facet::Tag).collect::<Vec<_>>(),
            vec!["pp", "recycled", "pla"]
        );
    }

    #[test]
    fn from_items_is_stable_for_stable_input() {
        let items = vec![
            Item::new("1").tags(&["b", "a"]),
            Item::new("2").tags(&["c", "a"]),
        ];
        let first = FacetSet::from_items(&items, &[Facet::Tag]);
        let second = FacetSet::from_items(&items, &[Facet::Tag]);
        assert_eq!(
            first.values(Facet::Tag).collect::<Vec<_>>(),
            second.values(Facet::Tag).collect::<Vec<_>>()
        );
    }

    #[test]
    fn requested_facets_always_present() {
        let items: Vec<Item> = vec![];
        let set = FacetSet::from_items(&items, &[Facet::Priority]);
        assert_eq!(set.facets().collect::<Vec<_>>(), vec![Facet::Priority]);
        assert!(set.is_empty());
    }

    #[test]
    fn contains_and_canonical_ignore_case() {
        let mut set = FacetSet::new();
        set.extend(Facet::Tag, ["Sustainability", "PET"]);
        assert!(set.contains_ignore_case(Facet::Tag, "sustainability"));
        assert_eq!(set.canonical(Facet::Tag, "pet"), Some("PET"));
        assert!(!set.contains_ignore_case(Facet::Tag, "abs"));
    }

    #[test]
    fn related_tags_exclude_current_tag_case_insensitively() {
        let items = vec![
            Item::new("1").tags(&["Recycling", "PET", "packaging"]),
            Item::new("2").tags(&["recycling", "pet", "automotive"]),
            Item::new("3").tags(&["automotive", "abs"]),
        ];
        let related = related_tags(&items, "RECYCLING", 10);
        assert_eq!(related, vec!["PET", "packaging", "automotive"]);
    }

    #[test]
    fn related_tags_respect_limit() {
        let items = vec![Item::new("1").tags(&["a", "b", "c", "d"])];
        assert_eq!(related_tags(&items, "a", 2), vec!["b", "c"]);
        assert!(related_tags(&items, "zzz", 5).is_empty());
    }
}
