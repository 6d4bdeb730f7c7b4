use serde::Serialize;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::wire::{AvailableFacets, Collection, DebugEnvelope};
use crate::listing::{Facet, FacetSet, related_tags};
use crate::types::CaseStudy;

pub const CASE_STUDIES_PATH: &str = "api/combined-case-studies";

/// Facets offered as filters on case-study listings.
pub const CASE_STUDY_FACETS: &[Facet] = &[Facet::Industry, Facet::Tag];

/// Server-side query for the case-study endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseStudyQuery {
    pub tag: Option<String>,
}

impl CaseStudyQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(tag) = self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            params.push(("tag", tag.to_owned()));
        }
        params
    }
}

/// Everything a case-study tag page shows.
#[derive(Debug, Clone, Serialize)]
pub struct TagPage {
    /// The tag as spelled by the CMS.
    pub tag: String,
    pub items: Vec<CaseStudy>,
    pub related: Vec<String>,
}

pub async fn fetch_case_studies(
    client: &ApiClient,
    query: &CaseStudyQuery,
    force: bool,
) -> Result<Vec<CaseStudy>, ApiError> {
    let collection: Collection<CaseStudy> = client
        .get_json(CASE_STUDIES_PATH, &query.params(), force)
        .await?;
    Ok(collection.into_vec())
}

/// All tags (and other facet values) regardless of filtering.
pub async fn fetch_case_study_facets(
    client: &ApiClient,
    force: bool,
) -> Result<AvailableFacets, ApiError> {
    let envelope: DebugEnvelope = client
        .get_json(CASE_STUDIES_PATH, &[("debug", "true".to_owned())], force)
        .await?;
    Ok(envelope.debug)
}

/// Fetch the tagged collection and the full tag list concurrently, then
/// assemble the tag page.
pub async fn fetch_tag_page(
    client: &ApiClient,
    tag: &str,
    related_limit: usize,
    force: bool,
) -> Result<TagPage, ApiError> {
    let query = CaseStudyQuery {
        tag: Some(tag.to_owned()),
    };
    let (items, available) = tokio::join!(
        fetch_case_studies(client, &query, force),
        fetch_case_study_facets(client, force),
    );
    build_tag_page(tag, items?, &available?, related_limit)
}

/// Resolve `tag` against the available tags and narrow `items` to it.
///
/// When the debug endpoint reports no tags at all, the tag counts as known
/// if any fetched item carries it.
pub fn build_tag_page(
    tag: &str,
    mut items: Vec<CaseStudy>,
    available: &AvailableFacets,
    related_limit: usize,
) -> Result<TagPage, ApiError> {
    let known = if available.available_tags.is_empty() {
        FacetSet::from_items(&items, &[Facet::Tag])
    } else {
        available.to_facet_set(&[Facet::Tag])
    };
    let Some(canonical) = known.canonical(Facet::Tag, tag).map(str::to_owned) else {
        tracing::debug!("api: tag {tag:?} not among {} known tags", known.len(Facet::Tag));
        return Err(ApiError::TagNotFound {
            tag: tag.trim().to_owned(),
        });
    };

    let needle = canonical.to_lowercase();
    items.retain(|study| study.tags.iter().any(|t| t.trim().to_lowercase() == needle));
    let related = related_tags(&items, &canonical, related_limit);

    Ok(TagPage {
        tag: canonical,
        items,
        related,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, LocalizedText};

    fn study(id: &str, tags: &[&str]) -> CaseStudy {
        CaseStudy {
            id: id.to_owned(),
            slug: id.to_owned(),
            title: LocalizedText::new().with(Language::En, id),
            description: LocalizedText::new(),
            summary: LocalizedText::new(),
            client_name: String::new(),
            industry: None,
            technologies: vec![],
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            featured: false,
            published_at: None,
            published_date: None,
            date: None,
            author: None,
        }
    }

    fn available(tags: &[&str]) -> AvailableFacets {
        AvailableFacets {
            available_tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            ..AvailableFacets::default()
        }
    }

    #[test]
    fn query_params_skip_blank_tag() {
        assert!(CaseStudyQuery::default().params().is_empty());
        let blank = CaseStudyQuery {
            tag: Some("  ".into()),
        };
        assert!(blank.params().is_empty());
        let tagged = CaseStudyQuery {
            tag: Some("recycling".into()),
        };
        assert_eq!(tagged.params(), vec![("tag", "recycling".to_owned())]);
    }

    #[test]
    fn tag_page_uses_canonical_spelling_and_narrows_items() {
        let items = vec![
            study("1", &["Recycling", "PET"]),
            study("2", &["automotive"]),
            study("3", &["recycling", "packaging"]),
        ];
        let page = build_tag_page("RECYCLING", items, &available(&["Recycling", "automotive"]), 5)
            .unwrap();
        assert_eq!(page.tag, "Recycling");
        assert_eq!(
            page.items.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
        assert_eq!(page.related, vec!["PET", "packaging"]);
    }

    #[test]
    fn unknown_tag_is_tag_not_found() {
        let err = build_tag_page("unicorn", vec![study("1", &["pp"])], &available(&["pp"]), 5)
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::TagNotFound {
                tag: "unicorn".into()
            }
        );
    }

    #[test]
    fn empty_tag_list_falls_back_to_fetched_items() {
        let page = build_tag_page("pp", vec![study("1", &["PP"])], &available(&[]), 5).unwrap();
        assert_eq!(page.tag, "PP");
        assert_eq!(page.items.len(), 1);

        let err = build_tag_page("pp", vec![], &available(&[]), 5).unwrap_err();
        assert!(matches!(err, ApiError::TagNotFound { .. }));
    }

    #[test]
    fn known_tag_with_no_items_is_empty_not_error() {
        let page = build_tag_page("pp", vec![], &available(&["pp"]), 5).unwrap();
        assert!(page.items.is_empty());
        assert!(page.related.is_empty());
    }
}
