use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use listing_board::app::{self, CaseStudies, ListingArgs, ListingKind, ListingSource, Updates};
use listing_board::config::loader;
use listing_board::config::types::AppConfig;
use listing_board::engine::{Engine, EngineHandle, HttpEngine};
use listing_board::listing::{Facet, SortOrder};
use listing_board::session;
use listing_board::types::Language;

#[derive(Parser)]
#[command(
    name = "listing-board",
    version,
    about = "Browse case studies and updates from the content API"
)]
struct Cli {
    /// Path to config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long, global = true)]
    debug: bool,

    /// Override the content API origin.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List case studies.
    CaseStudies {
        /// Only case studies carrying this tag.
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the case-study page for one tag, with related tags.
    Tag {
        tag: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List updates, critical ones first.
    Updates {
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        change_type: Option<String>,
        /// Only critical updates.
        #[arg(long)]
        critical: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List every available filter value.
    Facets {
        #[arg(value_enum)]
        kind: ListingKind,
    },
    /// Interactive session reading commands from stdin.
    Browse {
        #[arg(value_enum)]
        kind: ListingKind,
        /// Content language.
        #[arg(long)]
        lang: Option<Language>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Free-text search.
    #[arg(short, long)]
    search: Option<String>,
    /// Only featured items.
    #[arg(long)]
    featured: bool,
    /// newest or oldest.
    #[arg(long)]
    sort: Option<SortOrder>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Content language (en, hu, de).
    #[arg(long)]
    lang: Option<Language>,
    /// Print the page as JSON.
    #[arg(long)]
    json: bool,
}

impl FilterArgs {
    fn into_listing_args(self, selections: Vec<(Facet, Option<String>)>) -> ListingArgs {
        ListingArgs {
            search: self.search,
            selections: selections
                .into_iter()
                .filter_map(|(facet, value)| value.map(|v| (facet, v)))
                .collect(),
            featured: self.featured,
            critical: false,
            sort: self.sort,
            page: Some(self.page),
            language: self.lang,
            json: self.json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let mut config = loader::load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    // The engine runs on its own thread. Dropping the handle at the end of
    // `main` closes the channel and stops it.
    let engine = HttpEngine::new(config.api.clone()).start();
    tracing::info!("listing-board starting against {}", config.api.base_url);

    let output = match cli.command {
        Commands::CaseStudies {
            tag,
            industry,
            filters,
        } => {
            let args =
                filters.into_listing_args(vec![(Facet::Tag, tag), (Facet::Industry, industry)]);
            app::run_listing::<CaseStudies>(&engine, &config, &args)?
        }
        Commands::Tag { tag, filters } => {
            let args = filters.into_listing_args(Vec::new());
            app::run_tag_page(&engine, &config, &tag, &args)?
        }
        Commands::Updates {
            priority,
            category,
            change_type,
            critical,
            filters,
        } => {
            let mut args = filters.into_listing_args(vec![
                (Facet::Priority, priority),
                (Facet::Category, category),
                (Facet::ChangeType, change_type),
            ]);
            args.critical = critical;
            app::run_listing::<Updates>(&engine, &config, &args)?
        }
        Commands::Facets { kind } => app::run_facets(&engine, &config, kind)?,
        Commands::Browse { kind, lang } => {
            let language = lang.unwrap_or(config.defaults.language);
            return match kind {
                ListingKind::CaseStudies => browse::<CaseStudies>(&engine, &config, language),
                ListingKind::Updates => browse::<Updates>(&engine, &config, language),
            };
        }
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn browse<S: ListingSource>(
    engine: &EngineHandle,
    config: &AppConfig,
    language: Language,
) -> Result<()> {
    let stdin = std::io::BufReader::new(std::io::stdin());
    session::run::<S, _, _>(engine, config, language, stdin, std::io::stdout().lock())
}
