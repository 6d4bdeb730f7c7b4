use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::wire::{AvailableFacets, Collection, DebugEnvelope};
use crate::listing::{Facet, FilterState};
use crate::types::Update;

pub const UPDATES_PATH: &str = "api/combined-updates";

/// Facets offered as filters on the updates index.
pub const UPDATE_FACETS: &[Facet] = &[Facet::Priority, Facet::Category, Facet::ChangeType];

/// Server-side query for the updates endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateQuery {
    pub search: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub change_type: Option<String>,
    pub featured: bool,
}

impl UpdateQuery {
    /// Mirror the server-understood parts of `state`.
    ///
    /// `critical_only` and tag selections stay client-side.
    pub fn from_filter(state: &FilterState) -> Self {
        let search = state.search().trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_owned()),
            priority: state.selected(Facet::Priority).map(str::to_owned),
            category: state.selected(Facet::Category).map(str::to_owned),
            change_type: state.selected(Facet::ChangeType).map(str::to_owned),
            featured: state.featured_only(),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(priority) = &self.priority {
            params.push((Facet::Priority.query_param(), priority.clone()));
        }
        if let Some(category) = &self.category {
            params.push((Facet::Category.query_param(), category.clone()));
        }
        if let Some(change_type) = &self.change_type {
            params.push((Facet::ChangeType.query_param(), change_type.clone()));
        }
        if self.featured {
            params.push(("featured", "true".to_owned()));
        }
        params
    }
}

pub async fn fetch_updates(
    client: &ApiClient,
    query: &UpdateQuery,
    force: bool,
) -> Result<Vec<Update>, ApiError> {
    let collection: Collection<Update> = client
        .get_json(UPDATES_PATH, &query.params(), force)
        .await?;
    Ok(collection.into_vec())
}

/// All priorities, categories, change types and tags, regardless of filtering.
pub async fn fetch_update_facets(
    client: &ApiClient,
    force: bool,
) -> Result<AvailableFacets, ApiError> {
    let envelope: DebugEnvelope = client
        .get_json(UPDATES_PATH, &[("debug", "true".to_owned())], force)
        .await?;
    Ok(envelope.debug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_has_no_params() {
        assert!(UpdateQuery::default().params().is_empty());
    }

    #[test]
    fn from_filter_mirrors_server_side_predicates() {
        let mut state = FilterState::default();
        state.set_search("  cleanroom ");
        state.select(Facet::Priority, "high");
        state.select(Facet::ChangeType, "feature");
        state.select(Facet::Tag, "pp");
        state.set_featured_only(true);
        state.set_critical_only(true);

        let query = UpdateQuery::from_filter(&state);
        assert_eq!(
            query.params(),
            vec![
                ("search", "cleanroom".to_owned()),
                ("priority", "high".to_owned()),
                ("changeType", "feature".to_owned()),
                ("featured", "true".to_owned()),
            ]
        );
    }

    #[test]
    fn category_uses_update_category_param() {
        let query = UpdateQuery {
            category: Some("Production".into()),
            ..UpdateQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![("updateCategory", "Production".to_owned())]
        );
    }
}
