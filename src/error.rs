//! Error types for the page controller and its headless driver.
//!
//! Missing page elements are never errors: the matching feature is simply
//! inactive. The variants here cover the few things that can genuinely fail:
//! malformed selectors, the refresh request, and the driver's own I/O.

use thiserror::Error;

/// A CSS selector the matcher could not parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported selector syntax at {position} in '{selector}'")]
    Unsupported { selector: String, position: usize },
}

/// Failure of the refresh POST.
///
/// Only transport and body-read failures land here. A response with an
/// HTTP error status still counts as a settled, successful request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the driver binary and configuration loading.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("no element matches '{selector}' (step {step})")]
    NoSuchElement { selector: String, step: usize },
}

impl PageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PageError::Io(_) => "page.io_failed",
            PageError::Yaml(_) => "page.config_invalid",
            PageError::Fetch(_) => "page.fetch_failed",
            PageError::Url(_) => "page.url_invalid",
            PageError::Report(_) => "page.report_failed",
            PageError::Selector(_) => "page.selector_invalid",
            PageError::NoSuchElement { .. } => "page.element_missing",
        }
    }
}
