//! Interactive `browse` session: a line-driven listing view.
//!
//! Stdin lines and engine events are merged onto one channel. Search input
//! is debounced; every other command applies at once.

use std::io::{BufRead, Write};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;

use crate::app::{Delivery, ListingSource, new_listing, reply_timeout};
use crate::config::types::AppConfig;
use crate::engine::{EngineHandle, Event, Request};
use crate::listing::{
    Facet, FacetParseError, Listing, Phase, SearchDebounce, SortOrder,
    sort::SortOrderParseError,
};
use crate::render::{render_error, render_facets, render_page};
use crate::types::{Language, LanguageParseError};

pub const HELP: &str = "\
Commands:
  search <text>          free-text search (empty clears it)
  query <text>           search with facet:value, is:featured, is:critical, sort:oldest
  filter <facet> <value> select a facet value (`all` clears it)
  unfilter <facet>       clear a facet selection
  featured               toggle featured-only
  critical               toggle critical-only (updates)
  sort newest|oldest     change sort order
  next, prev, page <n>   paginate
  clear                  reset search, filters and sort
  lang en|hu|de          switch content language
  facets                 list available filter values
  retry                  refetch after an error
  show                   redraw the current page
  help, quit
";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Query(String),
    Filter(Facet, String),
    Unfilter(Facet),
    Featured,
    Critical,
    Sort(SortOrder),
    Next,
    Prev,
    Page(usize),
    Clear,
    Lang(Language),
    Facets,
    Retry,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Facet(#[from] FacetParseError),
    #[error(transparent)]
    Sort(#[from] SortOrderParseError),
    #[error(transparent)]
    Language(#[from] LanguageParseError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_lowercase().as_str() {
            "search" | "s" | "/" => Self::Search(rest.to_owned()),
            "query" | "q" => Self::Query(rest.to_owned()),
            "filter" | "f" => {
                let (facet, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("filter <facet> <value>"))?;
                Self::Filter(facet.parse()?, value.trim().to_owned())
            }
            "unfilter" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("unfilter <facet>"));
                }
                Self::Unfilter(rest.parse()?)
            }
            "featured" => Self::Featured,
            "critical" => Self::Critical,
            "sort" => Self::Sort(rest.parse()?),
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "page" => Self::Page(
                rest.parse()
                    .map_err(|_| CommandError::Usage("page <number>"))?,
            ),
            "clear" => Self::Clear,
            "lang" | "language" => Self::Lang(rest.parse()?),
            "facets" => Self::Facets,
            "retry" | "r" => Self::Retry,
            "show" | "" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_owned())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session<'a, S: ListingSource, W: Write> {
    engine: &'a EngineHandle,
    config: &'a AppConfig,
    listing: Listing<S::Item>,
    debounce: SearchDebounce,
    reply_tx: Sender<Event>,
    out: W,
    _source: PhantomData<S>,
}

impl<'a, S: ListingSource, W: Write> Session<'a, S, W> {
    pub fn new(
        engine: &'a EngineHandle,
        config: &'a AppConfig,
        language: Language,
        reply_tx: Sender<Event>,
        out: W,
    ) -> Self {
        Self {
            engine,
            config,
            listing: new_listing::<S>(config, language),
            debounce: SearchDebounce::new(Duration::from_millis(
                config.defaults.search_debounce_ms,
            )),
            reply_tx,
            out,
            _source: PhantomData,
        }
    }

    pub fn listing(&self) -> &Listing<S::Item> {
        &self.listing
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Initial collection fetch, plus remote facet values where used.
    pub fn start(&mut self) -> Result<()> {
        if S::REMOTE_FACETS {
            self.engine.send(Request::FetchFacets {
                kind: S::KIND,
                force: false,
                reply_tx: self.reply_tx.clone(),
            });
        }
        self.fetch(false)
    }

    /// A fetch is in flight or search input is pending.
    pub fn is_busy(&self) -> bool {
        matches!(self.listing.phase(), Phase::Loading) || self.debounce.is_pending()
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    fn fetch(&mut self, force: bool) -> Result<()> {
        let generation = self.listing.begin_fetch();
        tracing::debug!("session: fetching {:?} {generation}", S::KIND);
        self.engine.send(S::request(
            generation,
            self.listing.filter(),
            force,
            self.reply_tx.clone(),
        ));
        self.render()
    }

    /// Predicates changed: refetch when the server filters, else redraw.
    fn refresh(&mut self) -> Result<()> {
        if S::SERVER_FILTERING {
            self.fetch(false)
        } else {
            self.render()
        }
    }

    pub fn render(&mut self) -> Result<()> {
        let text = match self.listing.phase() {
            Phase::Loading => "Loading…\n".to_owned(),
            Phase::Error(error) => render_error(error),
            Phase::Ready(_) => match self.listing.current_page() {
                Some(page) => render_page(
                    &page,
                    self.listing.options().language,
                    &self.config.defaults.date_format,
                ),
                None => String::new(),
            },
        };
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn say(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", message.as_ref())?;
        Ok(())
    }

    /// Apply debounced search input once it is due.
    pub fn flush_debounce(&mut self, now: Instant) -> Result<()> {
        if let Some(text) = self.debounce.poll(now) {
            self.listing.filter_mut().set_search(text);
            self.refresh()?;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.say(e.to_string())?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Search(text) => self.debounce.input(text, Instant::now()),
            Command::Query(query) => {
                self.debounce.cancel();
                self.listing.filter_mut().apply_query(&query);
                self.refresh()?;
            }
            Command::Filter(facet, value) => {
                if !S::FACETS.contains(&facet) {
                    self.say(format!("`{facet}` is not a filter here"))?;
                    return Ok(Flow::Continue);
                }
                let value = self
                    .listing
                    .facets()
                    .canonical(facet, &value)
                    .map_or(value.clone(), str::to_owned);
                self.listing.filter_mut().select(facet, &value);
                self.refresh()?;
            }
            Command::Unfilter(facet) => {
                self.listing.filter_mut().clear_facet(facet);
                self.refresh()?;
            }
            Command::Featured => {
                let on = !self.listing.filter().featured_only();
                self.listing.filter_mut().set_featured_only(on);
                self.refresh()?;
            }
            Command::Critical => {
                let on = !self.listing.filter().critical_only();
                self.listing.filter_mut().set_critical_only(on);
                self.render()?;
            }
            Command::Sort(order) => {
                self.listing.filter_mut().set_sort(order);
                self.render()?;
            }
            Command::Next => {
                if self.listing.next_page() {
                    self.render()?;
                } else {
                    self.say("Already on the last page.")?;
                }
            }
            Command::Prev => {
                if self.listing.prev_page() {
                    self.render()?;
                } else {
                    self.say("Already on the first page.")?;
                }
            }
            Command::Page(page) => {
                self.listing.go_to_page(page);
                self.render()?;
            }
            Command::Clear => {
                self.debounce.cancel();
                self.listing.filter_mut().clear();
                self.refresh()?;
            }
            Command::Lang(language) => {
                self.listing.set_language(language);
                self.render()?;
            }
            Command::Facets => {
                let text = render_facets(self.listing.facets());
                self.out.write_all(text.as_bytes())?;
            }
            Command::Retry => match self.listing.retry() {
                Some(generation) => {
                    tracing::debug!("session: retrying {:?} {generation}", S::KIND);
                    self.engine.send(S::request(
                        generation,
                        self.listing.filter(),
                        true,
                        self.reply_tx.clone(),
                    ));
                    self.render()?;
                }
                None => self.say("Nothing to retry.")?,
            },
            Command::Show => self.render()?,
            Command::Help => self.out.write_all(HELP.as_bytes())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match S::unpack(event) {
            Delivery::Items { generation, items } => {
                if self.listing.resolve(generation, Ok(items)) {
                    self.render()?;
                }
            }
            Delivery::Failed {
                generation: Some(generation),
                error,
            } => {
                if self.listing.resolve(generation, Err(error)) {
                    self.render()?;
                }
            }
            Delivery::Failed {
                generation: None,
                error,
            } => {
                tracing::debug!("session: facet fetch failed: {error}");
                self.say(format!("Could not load filter options ({error})."))?;
            }
            Delivery::Facets(available) => {
                self.listing
                    .set_remote_facets(available.to_facet_set(S::FACETS));
            }
            Delivery::Ignored => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

enum Input {
    Line(String),
    Closed,
    Engine(Event),
}

/// Run a `browse` session reading commands from `input` until `quit` or EOF.
///
/// After EOF the session still waits for an in-flight fetch or pending
/// search, bounded by the reply timeout.
pub fn run<S, R, W>(
    engine: &EngineHandle,
    config: &AppConfig,
    language: Language,
    input: R,
    out: W,
) -> Result<()>
where
    S: ListingSource,
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<Input>();
    let (reply_tx, reply_rx) = mpsc::channel::<Event>();

    let engine_tx = tx.clone();
    std::thread::spawn(move || {
        for event in reply_rx {
            if engine_tx.send(Input::Engine(event)).is_err() {
                break;
            }
        }
    });
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Closed);
    });

    let mut session = Session::<'_, S, W>::new(engine, config, language, reply_tx, out);
    session.say("Type `help` for commands.")?;
    session.start()?;

    let idle_limit = reply_timeout(config);
    let mut closed = false;
    loop {
        if closed && !session.is_busy() {
            break;
        }
        let wait = match session.debounce_deadline() {
            Some(deadline) => Some(deadline.saturating_duration_since(Instant::now())),
            None if closed => Some(idle_limit),
            None => None,
        };
        let received = match wait {
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(input) => Some(input),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(input) => Some(input),
                Err(_) => break,
            },
        };

        session.flush_debounce(Instant::now())?;
        match received {
            Some(Input::Line(line)) => {
                if session.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
            Some(Input::Engine(event)) => session.handle_event(event)?,
            Some(Input::Closed) => closed = true,
            None if closed && !session.debounce.is_pending() => {
                tracing::debug!("session: gave up waiting after EOF");
                break;
            }
            None => {}
        }
    }
    Ok(())
}
