use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonfeed::util::{is_remote, sanitize_line, truncate_to_width};
use jsonfeed::{
    follow_pages, load_from_uri, serialize, serialize_compact, Feed, FetchError, FetchText,
    FetcherConfig, FileFetcher, HttpFetcher,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jsonfeed", about = "Inspect and reformat JSON Feed documents")]
struct Args {
    /// TOML file with fetcher settings
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a one-screen summary of a feed
    Show {
        /// http(s) URL or local path
        source: String,
        /// Maximum line width for item rows
        #[arg(long, default_value_t = 80)]
        width: usize,
    },
    /// Print the canonical serialization of a feed
    Fmt {
        source: String,
        /// Single-line output instead of indented
        #[arg(long)]
        compact: bool,
    },
    /// Follow next_url links and report each page
    Pages {
        source: String,
        /// Overrides max_pages from the config file
        #[arg(long)]
        max: Option<usize>,
    },
}

/// Picks the transport for a source string.
enum SourceFetcher {
    Http(HttpFetcher),
    File(FileFetcher),
}

impl SourceFetcher {
    fn for_source(source: &str, config: &FetcherConfig) -> Result<Self> {
        if is_remote(source) {
            let fetcher =
                HttpFetcher::new(config.clone()).context("Failed to build HTTP client")?;
            Ok(Self::Http(fetcher))
        } else {
            Ok(Self::File(FileFetcher::new(config)))
        }
    }
}

impl FetchText for SourceFetcher {
    async fn fetch_text(&self, uri: &str) -> Result<String, FetchError> {
        match self {
            Self::Http(f) => f.fetch_text(uri).await,
            Self::File(f) => f.fetch_text(uri).await,
        }
    }
}

fn print_summary(feed: &Feed, width: usize) {
    println!("{}", sanitize_line(feed.title.as_deref().unwrap_or("(untitled feed)")));
    if let Some(home) = &feed.home_page_url {
        println!("  home:    {}", sanitize_line(home));
    }
    if let Some(description) = &feed.description {
        println!("  about:   {}", truncate_to_width(&sanitize_line(description), width));
    }
    if feed.is_expired() {
        println!("  expired: yes");
    }
    println!("  version: {}", sanitize_line(&feed.version));
    println!("  items:   {}", feed.items.len());
    println!();

    for item in &feed.items {
        let label = item
            .title
            .as_deref()
            .or(item.summary.as_deref())
            .or(item.content_text.as_deref())
            .unwrap_or("(untitled)");
        let id = item.id.as_deref().unwrap_or("-");
        let row = format!("{}  {}", sanitize_line(id), sanitize_line(label));
        println!("{}", truncate_to_width(&row, width));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => FetcherConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => FetcherConfig::default(),
    };

    match args.command {
        Command::Show { source, width } => {
            let fetcher = SourceFetcher::for_source(&source, &config)?;
            let feed = load_from_uri(&source, &fetcher)
                .await
                .with_context(|| format!("Failed to load feed from {}", source))?;
            print_summary(&feed, width);
        }
        Command::Fmt { source, compact } => {
            let fetcher = SourceFetcher::for_source(&source, &config)?;
            let feed = load_from_uri(&source, &fetcher)
                .await
                .with_context(|| format!("Failed to load feed from {}", source))?;
            if compact {
                println!("{}", serialize_compact(&feed));
            } else {
                println!("{}", serialize(&feed));
            }
        }
        Command::Pages { source, max } => {
            let fetcher = SourceFetcher::for_source(&source, &config)?;
            let max_pages = max.unwrap_or(config.max_pages);
            let pages = follow_pages(&source, &fetcher, max_pages)
                .await
                .with_context(|| format!("Failed to walk pages starting at {}", source))?;
            for (index, page) in pages.iter().enumerate() {
                println!(
                    "page {}: {} items{}",
                    index + 1,
                    page.items.len(),
                    page.next_url
                        .as_deref()
                        .map(|n| format!(" -> {}", sanitize_line(n)))
                        .unwrap_or_default()
                );
            }
            tracing::info!(pages = pages.len(), "Walked pagination chain");
        }
    }

    Ok(())
}
