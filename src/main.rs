use std::collections::HashSet;

use anyhow::anyhow;
use clap::{Parser, Subcommand};

use event_scrape::models::{RequestParams, ALL_EVENT_TAGS};
use event_scrape::parsers::{self, EventRef};

#[derive(Parser)]
#[command(
    name = "event-scrape",
    about = "Fetch normalized event listings from ticketing sites"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available source parsers
    Parsers,
    /// Fetch one event by id or url and print it as JSON
    Event {
        /// Source parser name
        #[arg(short, long, default_value = "radario")]
        source: String,
        /// Raw event id
        #[arg(long, conflicts_with = "url")]
        id: Option<i64>,
        /// Event page url
        #[arg(long)]
        url: Option<String>,
    },
    /// Fetch upcoming events and print them as JSON lines
    Events {
        /// Source parser name
        #[arg(short, long, default_value = "radario")]
        source: String,
        /// Short city name (spb, msk, kzn)
        #[arg(long)]
        city: Option<String>,
        /// Category name, repeatable
        #[arg(short, long)]
        category: Vec<String>,
        /// Include online events
        #[arg(long)]
        online: bool,
        /// Days ahead to cover, counted from tomorrow
        #[arg(long)]
        days: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parsers => {
            for parser in parsers::active_parsers() {
                println!("{}\t{}", parser.name(), parser.base_url());
            }
        }
        Commands::Event { source, id, url } => {
            let parser = parsers::find_parser(&source)
                .ok_or_else(|| anyhow!("unknown source parser: {source}"))?;
            let event_ref = match (id, url.as_deref()) {
                (Some(id), _) => EventRef::Id(id),
                (None, Some(url)) => EventRef::Url(url),
                (None, None) => return Err(anyhow!("either --id or --url is required")),
            };
            let event = parser.get_event(event_ref, ALL_EVENT_TAGS)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Commands::Events {
            source,
            city,
            category,
            online,
            days,
        } => {
            let parser = parsers::find_parser(&source)
                .ok_or_else(|| anyhow!("unknown source parser: {source}"))?;
            let params = RequestParams {
                city,
                category,
                online,
                days,
                ..RequestParams::default()
            };
            let mut seen_ids = HashSet::new();
            let events = parser.get_events(&params, ALL_EVENT_TAGS, &mut seen_ids)?;
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
            tracing::info!(count = events.len(), "collection finished");
        }
    }
    Ok(())
}
