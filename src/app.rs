//! Application layer shared by the one-shot commands and `browse`.

use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Serialize;

use crate::api::{
    ApiError, AvailableFacets, CASE_STUDY_FACETS, CaseStudyQuery, ErrorKind, UPDATE_FACETS,
    UpdateQuery,
};
use crate::config::types::AppConfig;
use crate::engine::{CollectionKind, EngineHandle, Event, Request};
use crate::listing::{Facet, FilterState, Generation, Listing, ListingOptions, SortOrder, Tiering};
use crate::render::{TableRow, render_facets, render_json, render_page, render_tag_header};
use crate::types::{CaseStudy, Language, Update};

// ---------------------------------------------------------------------------
// Listing kinds
// ---------------------------------------------------------------------------

/// Collections selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingKind {
    CaseStudies,
    Updates,
}

impl ListingKind {
    pub fn collection(self) -> CollectionKind {
        match self {
            Self::CaseStudies => CollectionKind::CaseStudies,
            Self::Updates => CollectionKind::Updates,
        }
    }

    pub fn facets(self) -> &'static [Facet] {
        match self {
            Self::CaseStudies => CASE_STUDY_FACETS,
            Self::Updates => UPDATE_FACETS,
        }
    }
}

/// An engine event, narrowed to what a listing of `T` cares about.
#[derive(Debug)]
pub enum Delivery<T> {
    Items {
        generation: Generation,
        items: Vec<T>,
    },
    Failed {
        generation: Option<Generation>,
        error: ApiError,
    },
    Facets(AvailableFacets),
    Ignored,
}

/// Binds a listing to its engine requests and events.
pub trait ListingSource {
    type Item: TableRow + Serialize + Clone + Send + 'static;

    const KIND: CollectionKind;
    const FACETS: &'static [Facet];
    const TIERING: Tiering;
    /// Predicate changes are sent to the server and trigger a refetch.
    const SERVER_FILTERING: bool;
    /// Facet values come from the debug endpoint rather than the collection.
    const REMOTE_FACETS: bool;

    fn request(
        generation: Generation,
        filter: &FilterState,
        force: bool,
        reply_tx: Sender<Event>,
    ) -> Request;

    fn unpack(event: Event) -> Delivery<Self::Item>;
}

/// `/case-studies`: fetch once, filter locally.
pub struct CaseStudies;

/// `/updates`: server-side filtering, critical items first.
pub struct Updates;

impl ListingSource for CaseStudies {
    type Item = CaseStudy;

    const KIND: CollectionKind = CollectionKind::CaseStudies;
    const FACETS: &'static [Facet] = CASE_STUDY_FACETS;
    const TIERING: Tiering = Tiering::DateOnly;
    const SERVER_FILTERING: bool = false;
    const REMOTE_FACETS: bool = false;

    fn request(
        generation: Generation,
        _filter: &FilterState,
        force: bool,
        reply_tx: Sender<Event>,
    ) -> Request {
        Request::FetchCaseStudies {
            generation,
            query: CaseStudyQuery::default(),
            force,
            reply_tx,
        }
    }

    fn unpack(event: Event) -> Delivery<CaseStudy> {
        match event {
            Event::CaseStudiesFetched { generation, items } => {
                Delivery::Items { generation, items }
            }
            other => common_delivery(other, Self::KIND),
        }
    }
}

impl ListingSource for Updates {
    type Item = Update;

    const KIND: CollectionKind = CollectionKind::Updates;
    const FACETS: &'static [Facet] = UPDATE_FACETS;
    const TIERING: Tiering = Tiering::CriticalFirst;
    const SERVER_FILTERING: bool = true;
    const REMOTE_FACETS: bool = true;

    fn request(
        generation: Generation,
        filter: &FilterState,
        force: bool,
        reply_tx: Sender<Event>,
    ) -> Request {
        Request::FetchUpdates {
            generation,
            query: UpdateQuery::from_filter(filter),
            force,
            reply_tx,
        }
    }

    fn unpack(event: Event) -> Delivery<Update> {
        match event {
            Event::UpdatesFetched { generation, items } => Delivery::Items { generation, items },
            other => common_delivery(other, Self::KIND),
        }
    }
}

fn common_delivery<T>(event: Event, kind: CollectionKind) -> Delivery<T> {
    match event {
        Event::FetchError {
            generation, error, ..
        } => Delivery::Failed { generation, error },
        Event::FacetsFetched { kind: k, facets } if k == kind => Delivery::Facets(facets),
        _ => Delivery::Ignored,
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// A fresh listing for source `S` in `Loading`, configured from `config`.
pub fn new_listing<S: ListingSource>(config: &AppConfig, language: Language) -> Listing<S::Item> {
    let options = ListingOptions {
        language,
        page_size: config.defaults.page_size.max(1),
        tiering: S::TIERING,
    };
    Listing::new(options, S::FACETS, config.defaults.sort)
}

/// How long a command waits for the engine before giving up.
///
/// Twice the HTTP timeout plus one second.
pub fn reply_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.api.timeout_secs.saturating_mul(2) + 1)
}

/// Send one request and block until its reply arrives.
pub fn request_blocking(
    engine: &EngineHandle,
    timeout: Duration,
    build: impl FnOnce(Sender<Event>) -> Request,
) -> Result<Event> {
    let (reply_tx, reply_rx) = mpsc::channel();
    engine.send(build(reply_tx));
    reply_rx
        .recv_timeout(timeout)
        .context("no reply from the content API engine")
}

/// Filter and page arguments of a one-shot listing command.
#[derive(Debug, Clone, Default)]
pub struct ListingArgs {
    pub search: Option<String>,
    pub selections: Vec<(Facet, String)>,
    pub featured: bool,
    pub critical: bool,
    pub sort: Option<SortOrder>,
    pub page: Option<usize>,
    pub language: Option<Language>,
    pub json: bool,
}

impl ListingArgs {
    pub fn apply(&self, filter: &mut FilterState) {
        if let Some(search) = &self.search {
            filter.set_search(search.as_str());
        }
        for (facet, value) in &self.selections {
            filter.select(*facet, value);
        }
        filter.set_featured_only(self.featured);
        filter.set_critical_only(self.critical);
        if let Some(sort) = self.sort {
            filter.set_sort(sort);
        }
    }

    fn language(&self, config: &AppConfig) -> Language {
        self.language.unwrap_or(config.defaults.language)
    }
}

fn api_failure(error: ApiError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

/// Fetch, filter, sort and render one page of source `S`.
pub fn run_listing<S: ListingSource>(
    engine: &EngineHandle,
    config: &AppConfig,
    args: &ListingArgs,
) -> Result<String> {
    let language = args.language(config);
    let mut listing = new_listing::<S>(config, language);
    args.apply(listing.filter_mut());

    let generation = listing.begin_fetch();
    let filter = listing.filter().clone();
    let event = request_blocking(engine, reply_timeout(config), |tx| {
        S::request(generation, &filter, false, tx)
    })?;

    match S::unpack(event) {
        Delivery::Items { generation, items } => {
            tracing::debug!("app: {} items for {generation}", items.len());
            listing.resolve(generation, Ok(items));
        }
        Delivery::Failed { error, .. } => return Err(api_failure(error)),
        Delivery::Facets(_) | Delivery::Ignored => bail!("unexpected reply from engine"),
    }

    if let Some(page) = args.page {
        listing.go_to_page(page);
    }
    let page = listing.current_page().context("listing is not ready")?;
    if args.json {
        Ok(render_json(&page)?)
    } else {
        Ok(render_page(&page, language, &config.defaults.date_format))
    }
}

/// Render the case-study page for a single tag, with related tags.
pub fn run_tag_page(
    engine: &EngineHandle,
    config: &AppConfig,
    tag: &str,
    args: &ListingArgs,
) -> Result<String> {
    let language = args.language(config);
    let mut listing = new_listing::<CaseStudies>(config, language);
    args.apply(listing.filter_mut());

    let generation = listing.begin_fetch();
    let related_limit = config.defaults.related_tags;
    let event = request_blocking(engine, reply_timeout(config), |reply_tx| {
        Request::FetchTagPage {
            generation,
            tag: tag.to_owned(),
            related_limit,
            force: false,
            reply_tx,
        }
    })?;

    let tag_page = match event {
        Event::TagPageFetched { page, .. } => page,
        Event::FetchError { error, .. } if error.kind() == ErrorKind::TagNotFound => {
            bail!("{}", error.user_message())
        }
        Event::FetchError { error, .. } => return Err(api_failure(error)),
        _ => bail!("unexpected reply from engine"),
    };

    let header = render_tag_header(&tag_page);
    listing.resolve(generation, Ok(tag_page.items.clone()));
    if let Some(page) = args.page {
        listing.go_to_page(page);
    }
    let page = listing.current_page().context("listing is not ready")?;

    if args.json {
        #[derive(Serialize)]
        struct TagPageJson<'a, 'p> {
            tag: &'a str,
            related: &'a [String],
            page: &'a crate::listing::Page<'p, CaseStudy>,
        }
        let json = TagPageJson {
            tag: &tag_page.tag,
            related: &tag_page.related,
            page: &page,
        };
        return Ok(serde_json::to_string_pretty(&json)?);
    }
    Ok(format!(
        "{header}\n{}",
        render_page(&page, language, &config.defaults.date_format)
    ))
}

/// List every available facet value for `kind`.
pub fn run_facets(engine: &EngineHandle, config: &AppConfig, kind: ListingKind) -> Result<String> {
    let collection = kind.collection();
    let event = request_blocking(engine, reply_timeout(config), |reply_tx| {
        Request::FetchFacets {
            kind: collection,
            force: false,
            reply_tx,
        }
    })?;
    match event {
        Event::FacetsFetched { facets, .. } => {
            Ok(render_facets(&facets.to_facet_set(kind.facets())))
        }
        Event::FetchError { error, .. } => Err(api_failure(error)),
        _ => bail!("unexpected reply from engine"),
    }
}
