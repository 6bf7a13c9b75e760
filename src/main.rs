//! devscrape CLI - scrape dev.to articles into SQLite

use clap::{Parser, Subcommand};
use devscrape::config::{self, DevscrapeConfig};
use devscrape::ui::{self, Icons, Spinner};
use devscrape::{DevToClient, Scraper, SqliteStore};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "devscrape")]
#[command(version)]
#[command(about = "Scrape dev.to article listings and bodies into a local SQLite database")]
#[command(long_about = r#"
devscrape walks the dev.to articles API page by page, starting at page 1,
and stores users, organizations, article headers and article bodies.
Rows already in the database are skipped, and bodies are only fetched for
articles that do not have one yet.

Example usage:
  devscrape scrape
  devscrape scrape --database data/articles.db --max-pages 5
  devscrape init
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every listing page into the database
    Scrape {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// API root, e.g. https://dev.to/api
        #[arg(short, long)]
        base_url: Option<String>,

        /// Pause after each article body request, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Config file (defaults to devscrape.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a config file with the default settings
    Init {
        /// Where to write the config
        #[arg(short, long, default_value = "devscrape.toml")]
        config: PathBuf,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Scrape { database, base_url, delay_ms, max_pages, config: config_path } => {
            let file_config = config::load_config(config_path.as_deref())?.unwrap_or_default();
            let flags = DevscrapeConfig {
                database: database.map(|p| p.display().to_string()),
                base_url,
                delay_ms,
                max_pages,
            };
            let settings = DevscrapeConfig::defaults().merge(file_config).merge(flags);

            let db_path = settings.database_path();
            config::ensure_db_dir(&db_path)?;

            ui::header("Scraping dev.to articles");
            ui::info(Icons::GLOBE, "API", settings.base_url());
            ui::info(Icons::DATABASE, "Database", &db_path.display().to_string());

            let store = SqliteStore::open(&db_path)?;
            let client = DevToClient::new(settings.base_url())?;
            let scraper = Scraper::new(client, settings.scrape_options());

            let spinner = Spinner::new("Fetching page 1");
            let result = scraper.run_with(&store, |page, summary| {
                spinner.set_message(&format!(
                    "{} Page {} stored ({} listings so far), fetching page {}",
                    Icons::PAGE,
                    page,
                    summary.listings,
                    page + 1
                ));
            });
            spinner.finish_and_clear();
            let closed = store.close();

            match result {
                Ok(summary) => {
                    closed?;
                    println!("{}", ui::summary_table(&summary));
                    ui::success(&format!(
                        "Done: {} rows written from {} pages",
                        summary.rows_written(),
                        summary.pages
                    ));
                }
                Err(e) => {
                    if let Err(close_err) = closed {
                        tracing::warn!(error = %close_err, "failed to close database");
                    }
                    ui::error(&format!("Scrape aborted: {}", e));
                    return Err(e.into());
                }
            }
        }

        Commands::Init { config: path, force } => {
            config::write_config(&path, &DevscrapeConfig::defaults(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
