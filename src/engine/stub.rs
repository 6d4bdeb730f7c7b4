use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::case_studies::build_tag_page;
use crate::api::{ApiError, AvailableFacets};
use crate::types::{CaseStudy, Update};

use super::interface::{CollectionKind, Engine, EngineHandle, Event, Request};

/// A stub engine that serves pre-loaded fixture data without any network calls.
///
/// Useful for integration tests and demos that must not require a running CMS.
/// Set `failure` to make every fetch fail with that error.
#[derive(Default)]
pub struct StubEngine {
    pub case_studies: Vec<CaseStudy>,
    pub updates: Vec<Update>,
    pub facets: AvailableFacets,
    pub failure: Option<ApiError>,
}

impl Engine for StubEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("stub tokio runtime");
            rt.block_on(self.run_loop(rx));
        });
        EngineHandle::new(tx)
    }
}

impl StubEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        while let Some(req) = rx.recv().await {
            match req {
                Request::FetchCaseStudies {
                    generation,
                    query,
                    reply_tx,
                    ..
                } => {
                    let event = match &self.failure {
                        Some(error) => failed(Some(generation), "stub", error),
                        None => {
                            let tag = query.tag.map(|t| t.trim().to_lowercase());
                            let items = self
                                .case_studies
                                .iter()
                                .filter(|s| {
                                    tag.as_ref().is_none_or(|tag| {
                                        s.tags.iter().any(|t| t.trim().to_lowercase() == *tag)
                                    })
                                })
                                .cloned()
                                .collect();
                            Event::CaseStudiesFetched { generation, items }
                        }
                    };
                    let _ = reply_tx.send(event);
                }
                Request::FetchTagPage {
                    generation,
                    tag,
                    related_limit,
                    reply_tx,
                    ..
                } => {
                    let result = match &self.failure {
                        Some(error) => Err(error.clone()),
                        None => build_tag_page(
                            &tag,
                            self.case_studies.clone(),
                            &self.facets,
                            related_limit,
                        ),
                    };
                    let event = match result {
                        Ok(page) => Event::TagPageFetched { generation, page },
                        Err(error) => failed(Some(generation), "stub", &error),
                    };
                    let _ = reply_tx.send(event);
                }
                Request::FetchUpdates {
                    generation,
                    reply_tx,
                    ..
                } => {
                    let event = match &self.failure {
                        Some(error) => failed(Some(generation), "stub", error),
                        None => Event::UpdatesFetched {
                            generation,
                            items: self.updates.clone(),
                        },
                    };
                    let _ = reply_tx.send(event);
                }
                Request::FetchFacets { kind, reply_tx, .. } => {
                    let event = match &self.failure {
                        Some(error) => failed(None, "stub", error),
                        None => Event::FacetsFetched {
                            kind,
                            facets: facets_for(kind, &self.facets),
                        },
                    };
                    let _ = reply_tx.send(event);
                }

                Request::Shutdown => break,
            }
        }
    }
}

fn failed(
    generation: Option<crate::listing::Generation>,
    context: &str,
    error: &ApiError,
) -> Event {
    Event::FetchError {
        generation,
        context: context.into(),
        error: error.clone(),
    }
}

/// Case-study debug responses carry tags and industries only.
fn facets_for(kind: CollectionKind, all: &AvailableFacets) -> AvailableFacets {
    match kind {
        CollectionKind::CaseStudies => AvailableFacets {
            available_tags: all.available_tags.clone(),
            available_industries: all.available_industries.clone(),
            ..AvailableFacets::default()
        },
        CollectionKind::Updates => all.clone(),
    }
}
