//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated list scraper
#[derive(Parser, Debug)]
#[command(name = "listscraper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape a site
    Run {
        /// Site definition or scraper config file (YAML)
        #[arg(short, long)]
        site: PathBuf,

        /// First list page (overrides the config)
        #[arg(long)]
        start_page: Option<u32>,

        /// Maximum list pages to fetch (overrides the config)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Print a progress line per page to stderr
        #[arg(long)]
        progress: bool,
    },

    /// Validate a site file
    Validate {
        /// Site definition or scraper config file (YAML)
        #[arg(short, long)]
        site: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "listscraper",
            "run",
            "--site",
            "shop.yaml",
            "--max-pages",
            "3",
            "--progress",
        ]);

        match cli.command {
            Commands::Run {
                site,
                start_page,
                max_pages,
                progress,
            } => {
                assert_eq!(site, PathBuf::from("shop.yaml"));
                assert_eq!(start_page, None);
                assert_eq!(max_pages, Some(3));
                assert!(progress);
            }
            Commands::Validate { .. } => panic!("expected run"),
        }
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["listscraper", "validate", "-s", "a.yaml", "-f", "pretty", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(matches!(cli.command, Commands::Validate { .. }));
    }

    #[test]
    fn test_site_required() {
        assert!(Cli::try_parse_from(["listscraper", "run"]).is_err());
    }
}
