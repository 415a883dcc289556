//! The refresh request seam.
//!
//! The controller only ever talks to the network through [`Transport`], so
//! tests substitute a scripted implementation and the driver binary uses
//! [`HttpTransport`] on top of `reqwest`.
//!
//! # Success semantics
//!
//! A request succeeds when it completes and its body can be read. The HTTP
//! status is logged but never turns a settled request into a failure; the
//! page reloads either way and the server's own error page is what the user
//! sees next.

use std::time::Instant;

use itertools::Itertools;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::TransportError;

/// Async form submission used by the refresh operation.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// POST `fields` to `url` and return the response body.
    async fn post_form(&self, url: &str, fields: &[(String, String)])
        -> Result<String, TransportError>;
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String, TransportError> {
        let parsed = Url::parse(url).map_err(|source| TransportError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_form(fields))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if status.is_success() {
            info!(
                status = status.as_u16(),
                bytes = body.len(),
                elapsed_ms = dt.as_millis() as u64,
                "refresh request settled"
            );
        } else {
            warn!(
                status = status.as_u16(),
                bytes = body.len(),
                elapsed_ms = dt.as_millis() as u64,
                "refresh request settled with an error status"
            );
        }
        Ok(body)
    }
}

/// `application/x-www-form-urlencoded` body for `fields`.
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .join("&")
}
