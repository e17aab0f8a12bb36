//! Reward illustrations
//!
//! Purely cosmetic: a few image URLs shown next to the verdict. Lookups
//! never affect scoring; any failure just means no pictures.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::config::IllustrationSettings;
use crate::domain::Outcome;

/// Finds image URLs for a verdict mark (`correct` / `incorrect`)
pub trait Illustrator: Send + Sync {
    fn illustrate(&self, mark: &str) -> Result<Vec<String>>;
}

/// Never returns any images
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIllustrations;

impl Illustrator for NoIllustrations {
    fn illustrate(&self, _mark: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Queries an image search endpoint: `GET {endpoint}?q=<mark>&limit=<n>`.
///
/// The endpoint answers with a JSON array of URLs, or an object with a
/// `urls` array.
#[derive(Clone)]
pub struct HttpIllustrator {
    endpoint: String,
    limit: usize,
    client: ureq::Agent,
}

impl HttpIllustrator {
    pub fn new(endpoint: impl Into<String>, limit: usize, timeout: Duration) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();

        Self {
            endpoint: endpoint.into(),
            limit,
            client,
        }
    }
}

impl Illustrator for HttpIllustrator {
    fn illustrate(&self, mark: &str) -> Result<Vec<String>> {
        let body: serde_json::Value = self
            .client
            .get(&self.endpoint)
            .set("Accept", "application/json")
            .query("q", mark)
            .query("limit", &self.limit.to_string())
            .call()
            .context("Failed to reach image search")?
            .into_json()
            .context("Failed to parse image search response")?;

        let mut urls = parse_urls(&body)?;
        urls.truncate(self.limit);
        Ok(urls)
    }
}

fn parse_urls(body: &serde_json::Value) -> Result<Vec<String>> {
    let list = match body {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get("urls") {
            Some(serde_json::Value::Array(items)) => items,
            _ => bail!("image search response has no `urls` array"),
        },
        _ => bail!("unexpected image search response"),
    };
    Ok(list
        .iter()
        .filter_map(|v| v.as_str())
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(String::from)
        .collect())
}

/// Build the illustrator described by the settings
pub fn from_settings(settings: &IllustrationSettings) -> Box<dyn Illustrator> {
    if settings.enabled && !settings.endpoint.trim().is_empty() {
        Box::new(HttpIllustrator::new(
            settings.endpoint.trim(),
            settings.limit,
            Duration::from_secs(settings.timeout_secs),
        ))
    } else {
        Box::new(NoIllustrations)
    }
}

/// Images for an outcome; errors are logged and swallowed
pub fn illustrations_for(illustrator: &dyn Illustrator, outcome: Outcome) -> Vec<String> {
    match illustrator.illustrate(outcome.as_str()) {
        Ok(urls) => urls,
        Err(e) => {
            warn!("[lingvo:images] Illustrations unavailable for {}: {:#}", outcome, e);
            Vec::new()
        }
    }
}
