//! Version Fetcher
//!
//! Fetches the latest release tag through a CORS proxy and keeps it in a
//! session-wide label. Failures are logged and leave the label untouched.

use parking_lot::RwLock;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::surface::SharedSurface;
use crate::config::VersionConfig;
use crate::errors::VersionError;
use crate::observability::telemetry::sanitize_for_log;

/// Session-wide version string, shared by every reader.
#[derive(Debug, Clone)]
pub struct VersionLabel {
    inner: Arc<RwLock<String>>,
}

impl VersionLabel {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(placeholder.into())),
        }
    }

    pub fn get(&self) -> String {
        self.inner.read().clone()
    }

    pub fn set(&self, value: impl Into<String>) {
        *self.inner.write() = value.into();
    }
}

/// JSON envelope returned by the proxy.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
}

/// Pull the version out of an HTML fragment: the text of the first child
/// element of the first element matching `selector`, trimmed.
pub fn extract_version(html: &str, selector: &str) -> Result<String, VersionError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| VersionError::Parse(format!("bad selector '{}': {}", selector, e)))?;
    let document = Html::parse_document(html);

    let missing = || VersionError::MissingElement {
        selector: selector.to_string(),
    };

    let title = document.select(&parsed).next().ok_or_else(missing)?;
    let child = title
        .children()
        .find_map(ElementRef::wrap)
        .ok_or_else(missing)?;

    let text = child.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        return Err(missing());
    }
    Ok(text.to_string())
}

#[derive(Clone)]
pub struct VersionService {
    client: reqwest::Client,
    config: VersionConfig,
    label: VersionLabel,
    display: Option<SharedSurface>,
}

impl VersionService {
    pub fn new(
        config: VersionConfig,
        label: VersionLabel,
        display: Option<SharedSurface>,
    ) -> Result<Self, VersionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VersionError::Network(e.to_string()))?;
        Ok(Self {
            client,
            config,
            label,
            display,
        })
    }

    pub fn label(&self) -> &VersionLabel {
        &self.label
    }

    /// `<proxy>?url=<upstream>`, with the upstream value encoded.
    pub fn request_url(&self) -> Result<url::Url, VersionError> {
        let mut url = url::Url::parse(&self.config.proxy_url)
            .map_err(|e| VersionError::InvalidUrl(format!("{}: {}", self.config.proxy_url, e)))?;
        url.query_pairs_mut()
            .append_pair("url", &self.config.upstream_url);
        Ok(url)
    }

    /// Fetch and parse the version without touching the label.
    pub async fn fetch(&self) -> Result<String, VersionError> {
        let url = self.request_url()?;
        debug!(url = %url, "fetching version");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VersionError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: ProxyEnvelope =
            serde_json::from_str(&body).map_err(|e| VersionError::Parse(e.to_string()))?;
        let contents = envelope
            .contents
            .ok_or_else(|| VersionError::Parse("envelope has no contents".to_string()))?;

        extract_version(&contents, &self.config.selector)
    }

    /// Fetch, then store the label and update the display on success.
    ///
    /// Never fails: errors are logged and the label keeps its value.
    pub async fn refresh(&self) -> Option<String> {
        match self.fetch().await {
            Ok(version) => {
                info!(version = %sanitize_for_log(&version), "version fetched");
                self.label.set(version.clone());
                if let Some(display) = &self.display {
                    display.lock().set_text(&version);
                }
                Some(version)
            }
            Err(e) => {
                warn!(error = %e, "version fetch failed, keeping current label");
                None
            }
        }
    }
}
