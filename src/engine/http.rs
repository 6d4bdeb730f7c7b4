use std::sync::mpsc::Sender;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::{ApiClient, ApiError, case_studies, updates};
use crate::config::types::ApiConfig;

use super::interface::{CollectionKind, Engine, EngineHandle, Event, Request};

/// The real backend engine, talking to the CMS over HTTP.
pub struct HttpEngine {
    config: ApiConfig,
}

impl HttpEngine {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}

impl Engine for HttpEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        let handle = EngineHandle::new(tx);
        let _ = std::thread::Builder::new()
            .name("listing-engine".to_owned())
            .spawn(move || {
                let rt = tokio::runtime::Runtime::new().expect("tokio runtime init");
                rt.block_on(self.run_loop(rx));
            });
        handle
    }
}

impl HttpEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        let client = ApiClient::new(&self.config);
        if let Err(ref e) = client {
            tracing::debug!("engine: client init failed: {e}");
        }

        while let Some(req) = rx.recv().await {
            if matches!(req, Request::Shutdown) {
                tracing::debug!("engine: shutting down");
                break;
            }
            // Requests run concurrently; ordering is restored on the UI side
            // by generation tokens.
            tokio::spawn(handle_request(req, client.clone()));
        }
    }
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

async fn handle_request(req: Request, client: Result<ApiClient, ApiError>) {
    tracing::debug!("engine: received request");
    match req {
        // --- Fetch case studies ---
        Request::FetchCaseStudies {
            generation,
            query,
            force,
            reply_tx,
        } => {
            let Some(client) =
                ready_client(&client, &reply_tx, Some(generation), "FetchCaseStudies")
            else {
                return;
            };
            match case_studies::fetch_case_studies(client, &query, force).await {
                Ok(items) => {
                    tracing::debug!(
                        "engine: sending CaseStudiesFetched{generation} count={}",
                        items.len()
                    );
                    let _ = reply_tx.send(Event::CaseStudiesFetched { generation, items });
                }
                Err(e) => {
                    tracing::debug!("engine: FetchCaseStudies{generation} error: {e}");
                    let _ = reply_tx.send(Event::FetchError {
                        generation: Some(generation),
                        context: format!("FetchCaseStudies{generation}"),
                        error: e,
                    });
                }
            }
        }

        // --- Fetch tag page ---
        Request::FetchTagPage {
            generation,
            tag,
            related_limit,
            force,
            reply_tx,
        } => {
            let Some(client) = ready_client(&client, &reply_tx, Some(generation), "FetchTagPage")
            else {
                return;
            };
            match case_studies::fetch_tag_page(client, &tag, related_limit, force).await {
                Ok(page) => {
                    tracing::debug!(
                        "engine: sending TagPageFetched{generation} tag={:?} count={}",
                        page.tag,
                        page.items.len()
                    );
                    let _ = reply_tx.send(Event::TagPageFetched { generation, page });
                }
                Err(e) => {
                    tracing::debug!("engine: FetchTagPage{generation} {tag:?} error: {e}");
                    let _ = reply_tx.send(Event::FetchError {
                        generation: Some(generation),
                        context: format!("FetchTagPage{generation}"),
                        error: e,
                    });
                }
            }
        }

        // --- Fetch updates ---
        Request::FetchUpdates {
            generation,
            query,
            force,
            reply_tx,
        } => {
            let Some(client) = ready_client(&client, &reply_tx, Some(generation), "FetchUpdates")
            else {
                return;
            };
            match updates::fetch_updates(client, &query, force).await {
                Ok(items) => {
                    tracing::debug!(
                        "engine: sending UpdatesFetched{generation} count={}",
                        items.len()
                    );
                    let _ = reply_tx.send(Event::UpdatesFetched { generation, items });
                }
                Err(e) => {
                    tracing::debug!("engine: FetchUpdates{generation} error: {e}");
                    let _ = reply_tx.send(Event::FetchError {
                        generation: Some(generation),
                        context: format!("FetchUpdates{generation}"),
                        error: e,
                    });
                }
            }
        }

        // --- Fetch facets (debug endpoint) ---
        Request::FetchFacets {
            kind,
            force,
            reply_tx,
        } => {
            let Some(client) = ready_client(&client, &reply_tx, None, "FetchFacets") else {
                return;
            };
            let result = match kind {
                CollectionKind::CaseStudies => {
                    case_studies::fetch_case_study_facets(client, force).await
                }
                CollectionKind::Updates => updates::fetch_update_facets(client, force).await,
            };
            match result {
                Ok(facets) => {
                    tracing::debug!("engine: sending FacetsFetched {kind:?}");
                    let _ = reply_tx.send(Event::FacetsFetched { kind, facets });
                }
                Err(e) => {
                    tracing::debug!("engine: FetchFacets {kind:?} error: {e}");
                    let _ = reply_tx.send(Event::FetchError {
                        generation: None,
                        context: format!("FetchFacets {kind:?}"),
                        error: e,
                    });
                }
            }
        }

        Request::Shutdown => {}
    }
}

/// Return the client, or reply with the construction error.
fn ready_client<'a>(
    client: &'a Result<ApiClient, ApiError>,
    reply_tx: &Sender<Event>,
    generation: Option<crate::listing::Generation>,
    context: &str,
) -> Option<&'a ApiClient> {
    match client {
        Ok(c) => Some(c),
        Err(e) => {
            let _ = reply_tx.send(Event::FetchError {
                generation,
                context: context.to_owned(),
                error: e.clone(),
            });
            None
        }
    }
}
