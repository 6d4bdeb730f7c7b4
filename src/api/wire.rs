use serde::{Deserialize, Serialize};

use crate::listing::{Facet, FacetSet};

/// A collection response: a bare JSON array, or an object wrapping one
/// under `items` or `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Collection<T> {
    List(Vec<T>),
    Wrapped {
        #[serde(alias = "data")]
        items: Vec<T>,
    },
}

impl<T> Collection<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::List(items) | Self::Wrapped { items } => items,
        }
    }
}

/// Envelope returned by `?debug=true`.
#[derive(Debug, Deserialize)]
pub(crate) struct DebugEnvelope {
    #[serde(default)]
    pub(crate) debug: AvailableFacets,
}

/// Every facet value the CMS knows about, independent of current filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailableFacets {
    pub available_tags: Vec<String>,
    pub available_priorities: Vec<String>,
    pub available_categories: Vec<String>,
    pub available_change_types: Vec<String>,
    pub available_industries: Vec<String>,
}

impl AvailableFacets {
    pub fn values(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Tag => &self.available_tags,
            Facet::Priority => &self.available_priorities,
            Facet::Category => &self.available_categories,
            Facet::ChangeType => &self.available_change_types,
            Facet::Industry => &self.available_industries,
        }
    }

    /// Build a [`FacetSet`] for `facets`, deduplicated in server order.
    pub fn to_facet_set(&self, facets: &[Facet]) -> FacetSet {
        let mut set = FacetSet::new();
        for &facet in facets {
            set.extend(facet, self.values(facet).iter().map(String::as_str));
        }
        set
    }
}
