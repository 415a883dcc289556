//! Command-line interface for the headless page driver.
//!
//! Everything is passed as flags; logging alone reads `RUST_LOG`.

use clap::Parser;

/// Run the FlashNews page controller against a page without a browser.
///
/// # Examples
///
/// ```sh
/// # Load a saved page and report its state after start-up
/// flashnews_page --page ./news.html --location http://localhost:8080/flashnews/news
///
/// # Fetch the live page and replay a scripted session
/// flashnews_page --page http://localhost:8080/flashnews/news --scenario ./session.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Page markup: a file path or an http(s) URL
    #[arg(short, long)]
    pub page: String,

    /// Document location used to resolve form actions (defaults to the page URL)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Optional path to a YAML timing configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Optional path to a YAML scenario of user actions
    #[arg(short, long)]
    pub scenario: Option<String>,

    /// Override the auto-refresh period in milliseconds
    #[arg(long)]
    pub refresh_period_ms: Option<u64>,
}

impl Cli {
    /// Whether `--page` names a remote page rather than a file.
    pub fn page_is_remote(&self) -> bool {
        self.page.starts_with("http://") || self.page.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "flashnews_page",
            "--page",
            "./news.html",
            "--location",
            "http://localhost:8080/flashnews/news",
        ]);

        assert_eq!(cli.page, "./news.html");
        assert_eq!(
            cli.location.as_deref(),
            Some("http://localhost:8080/flashnews/news")
        );
        assert!(!cli.page_is_remote());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "flashnews_page",
            "-p",
            "https://example.com/news",
            "-c",
            "/tmp/page.yaml",
            "-s",
            "/tmp/session.yaml",
        ]);

        assert!(cli.page_is_remote());
        assert_eq!(cli.config.as_deref(), Some("/tmp/page.yaml"));
        assert_eq!(cli.scenario.as_deref(), Some("/tmp/session.yaml"));
    }

    #[test]
    fn test_cli_refresh_override() {
        let cli = Cli::parse_from([
            "flashnews_page",
            "--page",
            "news.html",
            "--refresh-period-ms",
            "1000",
        ]);

        assert_eq!(cli.refresh_period_ms, Some(1000));
        assert!(cli.scenario.is_none());
        assert!(cli.location.is_none());
    }

    #[test]
    fn test_cli_requires_page() {
        assert!(Cli::try_parse_from(["flashnews_page"]).is_err());
    }
}
