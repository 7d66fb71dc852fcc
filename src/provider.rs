//! Country data provider client.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper around a REST countries endpoint. One GET, no retry.
//! Parsing lives in `parse_records` so it can be tested without a network.
//! Records that do not match the expected shape are dropped rather than
//! failing the whole payload; only a payload that is not a JSON array, or
//! that yields no usable entries at all, is an error.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::FlagCatalog;
use crate::config::HttpTimeouts;

// =============================================================================
// ERROR
// =============================================================================

/// Ways the provider can be unavailable. The game treats all of them alike:
/// the catalog stays empty and starting is blocked.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request did not complete.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}")]
    Status { status: u16 },

    /// The body was not a JSON array.
    #[error("provider payload parse failed: {0}")]
    Parse(String),

    /// The payload parsed but contained no playable entries.
    #[error("provider payload contained no usable countries")]
    Empty,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One country record as delivered by the provider. Both fields are optional
/// on the wire; `FlagCatalog::populate` drops records missing either.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderRecord {
    #[serde(default)]
    pub name: Option<CountryName>,
    #[serde(default)]
    pub flags: Option<FlagImages>,
}

/// v3 endpoints nest the display name under `common`; v2 sends a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CountryName {
    Plain(String),
    Structured {
        #[serde(default)]
        common: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagImages {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl ProviderRecord {
    /// Build a record with both fields present.
    #[must_use]
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: Some(CountryName::Plain(name.to_string())),
            flags: Some(FlagImages { png: Some(image.to_string()), svg: None }),
        }
    }

    /// Display name, trimmed. `None` when absent or blank.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        let raw = match self.name.as_ref()? {
            CountryName::Plain(s) => s.as_str(),
            CountryName::Structured { common } => common.as_deref()?,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Flag image URI, preferring PNG. `None` when absent or blank.
    #[must_use]
    pub fn image_reference(&self) -> Option<&str> {
        let flags = self.flags.as_ref()?;
        [flags.png.as_deref(), flags.svg.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct CountryProvider {
    http: reqwest::Client,
    url: String,
}

impl CountryProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode every record from the provider.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status, or a body that
    /// is not a JSON array.
    pub async fn fetch(&self) -> Result<Vec<ProviderRecord>, ProviderError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ProviderError::Status { status });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        parse_records(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode a provider payload. Elements that fail to decode are skipped.
///
/// # Errors
///
/// Returns `ProviderError::Parse` when the body is not a JSON array.
pub fn parse_records(json: &str) -> Result<Vec<ProviderRecord>, ProviderError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let total = values.len();

    let records: Vec<ProviderRecord> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if records.len() < total {
        warn!(skipped = total - records.len(), "provider records did not decode");
    }
    Ok(records)
}

/// Fetch once and populate a catalog from the result.
///
/// # Errors
///
/// Any provider failure, or `ProviderError::Empty` when nothing playable
/// survived filtering.
pub async fn load_catalog(provider: &CountryProvider) -> Result<FlagCatalog, ProviderError> {
    let records = provider.fetch().await?;
    let fetched = records.len();
    let catalog = FlagCatalog::populate(records);
    if catalog.is_empty() {
        return Err(ProviderError::Empty);
    }
    info!(fetched, playable = catalog.len(), url = provider.url(), "catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
