// listing module: client-side data shaping for resource listings.
//
// fetch → facets (once per fetch) → filter/search → sort → paginate

pub mod debounce;
pub mod facet;
pub mod filter;
pub mod pager;
pub mod sort;
pub mod state;
#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Language;

pub use debounce::SearchDebounce;
pub use facet::{FacetSet, related_tags};
pub use filter::{FilterState, filter_items};
pub use pager::{DEFAULT_PAGE_SIZE, Page, paginate};
pub use sort::{SortOrder, Tiering, sort_items};
pub use state::{Generation, Listing, Phase, ReadyKind};

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// A named, discrete filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Industry,
    Tag,
    Priority,
    Category,
    ChangeType,
}

#[derive(Debug, Error)]
#[error("unknown facet \"{0}\" (expected industry, tag, priority, category or change-type)")]
pub struct FacetParseError(pub String);

impl Facet {
    pub fn name(self) -> &'static str {
        match self {
            Self::Industry => "industry",
            Self::Tag => "tag",
            Self::Priority => "priority",
            Self::Category => "category",
            Self::ChangeType => "change-type",
        }
    }

    /// Query-string key understood by the collection endpoints.
    pub fn query_param(self) -> &'static str {
        match self {
            Self::Industry => "industry",
            Self::Tag => "tag",
            Self::Priority => "priority",
            Self::Category => "updateCategory",
            Self::ChangeType => "changeType",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facet {
    type Err = FacetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "industry" => Ok(Self::Industry),
            "tag" | "tags" => Ok(Self::Tag),
            "priority" => Ok(Self::Priority),
            "category" | "updatecategory" => Ok(Self::Category),
            "changetype" => Ok(Self::ChangeType),
            _ => Err(FacetParseError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Listable items
// ---------------------------------------------------------------------------

/// Anything rendered in a paginated listing grid.
pub trait Listable {
    fn id(&self) -> &str;

    /// Parsed publication date; `None` when missing or unparseable.
    fn published(&self) -> Option<DateTime<Utc>>;

    fn is_featured(&self) -> bool;

    /// Whether the item is hoisted by [`Tiering::CriticalFirst`].
    fn is_critical(&self) -> bool {
        false
    }

    /// Text fields searched by free-text queries, localized to `lang`.
    fn search_fields(&self, lang: Language) -> Vec<&str>;

    /// Values this item carries for `facet` (empty when not applicable).
    fn facet_values(&self, facet: Facet) -> Vec<&str>;
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Per-listing settings that do not change with user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub language: Language,
    pub page_size: usize,
    pub tiering: Tiering,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            page_size: DEFAULT_PAGE_SIZE,
            tiering: Tiering::DateOnly,
        }
    }
}

/// Filter, sort and slice `items` into the page selected by `state`.
pub fn compute_page<'a, T: Listable>(
    items: &'a [T],
    state: &FilterState,
    options: &ListingOptions,
) -> Page<'a, T> {
    let mut visible = filter_items(items, state, options.language);
    sort_items(&mut visible, state.sort(), options.tiering);
    paginate(visible, state.page(), options.page_size)
}
