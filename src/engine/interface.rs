use std::sync::mpsc::Sender;

use crate::api::{ApiError, AvailableFacets, CaseStudyQuery, TagPage, UpdateQuery};
use crate::listing::Generation;
use crate::types::{CaseStudy, Update};

/// Handle to the backend engine held by the UI layer.
///
/// Cheaply cloneable. When the last handle is dropped the sender channel
/// closes, signalling the engine to shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: tokio::sync::mpsc::UnboundedSender<Request>,
}

impl EngineHandle {
    pub(super) fn new(tx: tokio::sync::mpsc::UnboundedSender<Request>) -> Self {
        Self { tx }
    }

    /// Send a request to the engine. Non-blocking.
    pub fn send(&self, req: Request) {
        // Ignore errors: if the receiver is gone the engine has already shut down.
        let _ = self.tx.send(req);
    }
}

/// Trait implemented by both `HttpEngine` and `StubEngine`.
pub trait Engine: Send + 'static {
    fn start(self) -> EngineHandle;
}

/// Which collection a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    CaseStudies,
    Updates,
}

/// All operations the UI layer can send to the engine.
pub enum Request {
    FetchCaseStudies {
        generation: Generation,
        query: CaseStudyQuery,
        /// Skip the moka cache and fetch fresh data.
        force: bool,
        reply_tx: Sender<Event>,
    },
    /// Tagged collection plus the full tag list, fetched concurrently.
    FetchTagPage {
        generation: Generation,
        tag: String,
        related_limit: usize,
        force: bool,
        reply_tx: Sender<Event>,
    },
    FetchUpdates {
        generation: Generation,
        query: UpdateQuery,
        force: bool,
        reply_tx: Sender<Event>,
    },
    /// Debug-endpoint facet values, independent of current filtering.
    FetchFacets {
        kind: CollectionKind,
        force: bool,
        reply_tx: Sender<Event>,
    },
    Shutdown,
}

/// All events the engine can push back to UI views.
pub enum Event {
    CaseStudiesFetched {
        generation: Generation,
        items: Vec<CaseStudy>,
    },
    TagPageFetched {
        generation: Generation,
        page: TagPage,
    },
    UpdatesFetched {
        generation: Generation,
        items: Vec<Update>,
    },
    FacetsFetched {
        kind: CollectionKind,
        facets: AvailableFacets,
    },
    /// Unified error event for all fetch failures. `generation` is `None`
    /// for facet fetches, which are not tied to a listing generation.
    FetchError {
        generation: Option<Generation>,
        context: String,
        error: ApiError,
    },
}
