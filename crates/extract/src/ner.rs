use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::schema::ExternalEntity;

/// Named-entity recognizer consulted once per extraction.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Vec<ExternalEntity>>;

    /// Readiness check used at startup. Defaults to ready.
    async fn ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Client for an HTTP NER service (`POST /ner`, `GET /health`).
#[derive(Clone)]
pub struct HttpRecognizer {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct NerResponse {
    #[serde(default)]
    entities: Vec<ExternalEntity>,
}

impl HttpRecognizer {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build NER HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EntityRecognizer for HttpRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<ExternalEntity>> {
        let url = format!("{}/ner", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&NerRequest { text })
            .send()
            .await
            .context("Failed to send request to NER service")?;

        if !response.status().is_success() {
            anyhow::bail!("NER request failed: {}", response.status());
        }

        let ner_response: NerResponse = response
            .json()
            .await
            .context("Failed to parse NER response")?;

        Ok(ner_response.entities)
    }

    async fn ready(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach NER service")?;

        if !response.status().is_success() {
            anyhow::bail!("NER service not ready: {}", response.status());
        }
        Ok(())
    }
}
