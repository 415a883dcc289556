//! # FlashNews page driver
//!
//! Runs the FlashNews listing-page controller headlessly: loads the page
//! markup, wires every behavior, optionally replays a scripted session and
//! prints what the page did as JSON.
//!
//! ## Usage
//!
//! ```sh
//! flashnews_page --page ./news.html --location http://localhost:8080/flashnews/news
//! ```
//!
//! ## Flow
//!
//! 1. **Load**: read the page from disk or fetch it over HTTP
//! 2. **Start**: build the controller and wire the page
//! 3. **Replay**: run the scenario steps, if any
//! 4. **Report**: print the page snapshot and tear the page down

use clap::Parser;
use flashnews_page::cli::Cli;
use flashnews_page::{
    Document, HttpTransport, PageConfig, PageController, PageError, Scenario, Window,
};
use std::error::Error;
use tokio::task::LocalSet;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr; stdout carries the JSON report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let local = LocalSet::new();
    if let Err(e) = local.run_until(run(args)).await {
        error!(error = %e, code = e.error_code(), "page driver failed");
        return Err(e.into());
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(page = %args.page))]
async fn run(args: Cli) -> Result<(), PageError> {
    let start_time = std::time::Instant::now();

    let mut config = match args.config.as_deref() {
        Some(path) => PageConfig::load(path).await?,
        None => PageConfig::default(),
    };
    if let Some(ms) = args.refresh_period_ms {
        config.refresh_period_ms = ms;
    }

    let scenario = match args.scenario.as_deref() {
        Some(path) => Scenario::load(path).await?,
        None => Scenario::default(),
    };

    let (markup, page_url) = load_page(&args).await?;
    let location = match args.location.as_deref() {
        Some(raw) => Some(Url::parse(raw)?),
        None => page_url,
    };
    if location.is_none() {
        debug!("no document location; form actions stay relative");
    }

    let page = PageController::new(
        Document::parse(&markup),
        Window::new(location),
        HttpTransport::new(),
        config,
    );
    page.start()?;
    scenario.run(&page).await?;

    let report = serde_json::to_string_pretty(&page.snapshot())?;
    println!("{report}");

    page.unload();
    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "page driver finished"
    );
    Ok(())
}

/// Page markup plus the URL it came from, when fetched remotely.
async fn load_page(args: &Cli) -> Result<(String, Option<Url>), PageError> {
    if args.page_is_remote() {
        let url = Url::parse(&args.page)?;
        let body = reqwest::get(url.clone())
            .await?
            .error_for_status()?
            .text()
            .await?;
        info!(%url, bytes = body.len(), "Fetched page");
        Ok((body, Some(url)))
    } else {
        let body = tokio::fs::read_to_string(&args.page).await?;
        info!(path = %args.page, bytes = body.len(), "Read page from disk");
        Ok((body, None))
    }
}
