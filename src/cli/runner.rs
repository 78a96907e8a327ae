//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ScraperConfig;
use crate::engine::ListScraper;
use crate::error::{Result, ResultExt};
use crate::http::HttpClient;
use crate::loader::load_config;
use crate::log::{ConsoleSink, LogRecord, LogSink, TracingSink};
use crate::site::DeclarativeSite;
use crate::types::JsonValue;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                site,
                start_page,
                max_pages,
                progress,
            } => {
                self.scrape(site, *start_page, *max_pages, *progress)
                    .await
            }
            Commands::Validate { site } => self.validate(site),
        }
    }

    /// Load the config and apply command-line overrides
    fn load(
        &self,
        path: &Path,
        start_page: Option<u32>,
        max_pages: Option<u32>,
    ) -> Result<ScraperConfig> {
        let mut config = load_config(path)?;
        if let Some(page) = start_page {
            config.scrape.start_page = page;
        }
        if let Some(max) = max_pages {
            config.scrape.max_pages = Some(max);
        }
        config.validate()?;
        Ok(config)
    }

    /// Scrape a site, printing one record message per item
    async fn scrape(
        &self,
        path: &Path,
        start_page: Option<u32>,
        max_pages: Option<u32>,
        progress: bool,
    ) -> Result<()> {
        let config = self.load(path, start_page, max_pages)?;

        let client = HttpClient::with_config(config.client_config()?)
            .context("Failed to build HTTP client")?;
        let source =
            DeclarativeSite::new(config.site.clone())?.with_retry(config.retry.clone());

        let sink: Arc<dyn LogSink<JsonValue>> = if progress {
            Arc::new(ConsoleSink::stderr())
        } else {
            Arc::new(TracingSink::new())
        };

        let mut scraper = ListScraper::new(source, Arc::new(client))
            .with_config(config.scrape.clone())
            .with_log_sink(Arc::clone(&sink));

        let format = self.cli.format;
        scraper.on_item_end(move |event| {
            if let Some(item) = event.take_item() {
                output_message(
                    format,
                    &json!({
                        "type": "RECORD",
                        "record": {
                            "id": event.id(),
                            "url": event.url(),
                            "data": item,
                        }
                    }),
                );
            }
            Ok(())
        });

        let result = scraper.scrape_from_start().await;
        let stats = scraper.stats();

        let summary = format!(
            "Site '{}': {} pages, {} items ({} ok, {} skipped, {} failed, {} missing data) in {}ms",
            config.site.name,
            stats.pages_fetched,
            stats.items_total(),
            stats.items_ok,
            stats.items_skipped,
            stats.items_failed,
            stats.items_missing,
            stats.duration_ms
        );
        sink.emit(LogRecord::Message(&summary));

        output_message(
            format,
            &json!({
                "type": "STATS",
                "stats": stats,
                "item_count": scraper.item_count(),
            }),
        );

        result.map(|_| ())
    }

    /// Validate a site file
    fn validate(&self, path: &Path) -> Result<()> {
        let config = self.load(path, None, None)?;
        DeclarativeSite::new(config.site.clone())?;

        output_message(
            self.cli.format,
            &json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!(
                        "Site '{}' is valid ({} list pages, {} detail)",
                        config.site.name,
                        config.site.format.as_str(),
                        config.site.detail.kind()
                    )
                }
            }),
        );

        Ok(())
    }
}

/// Print one message to stdout
fn output_message(format: OutputFormat, msg: &JsonValue) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        }
    }
}
