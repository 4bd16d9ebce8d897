// marksman-core/src/analysis/google.rs
//! Client for the Cloud Natural Language REST API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use marksman_scoring::{EntityType, KeywordEntry};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::LanguageAnalyzer;
use crate::errors::AnalyzerError;

pub const DEFAULT_ENDPOINT: &str = "https://language.googleapis.com";

/// Connection settings for [`GoogleLanguageClient`]. The API key is always
/// injected by the caller.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl AnalyzerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
}

#[derive(Deserialize)]
struct ApiEntity {
    name: String,
    #[serde(rename = "type", default)]
    entity_type: EntityType,
    #[serde(default)]
    salience: f64,
    #[serde(default)]
    mentions: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse {
    document_sentiment: ApiSentiment,
}

#[derive(Deserialize)]
struct ApiSentiment {
    #[serde(default)]
    score: f64,
}

#[derive(Deserialize)]
struct SyntaxResponse {
    #[serde(default)]
    tokens: Vec<ApiToken>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiToken {
    part_of_speech: ApiPartOfSpeech,
}

#[derive(Deserialize)]
struct ApiPartOfSpeech {
    tag: String,
}

pub struct GoogleLanguageClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleLanguageClient {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        if config.api_key.trim().is_empty() {
            return Err(AnalyzerError::NotConfigured("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("marksman/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, text: &str) -> Result<R, AnalyzerError> {
        let url = format!("{}/v1/documents:{}", self.endpoint, method);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&AnalyzeRequest {
                document: Document { kind: "PLAIN_TEXT", content: text },
                encoding_type: "UTF8",
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("{} returned {}", method, status);
            return Err(AnalyzerError::Status { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AnalyzerError::Decode(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl LanguageAnalyzer for GoogleLanguageClient {
    fn name(&self) -> &str {
        "google"
    }

    async fn extract_entities(&self, text: &str) -> Result<Vec<KeywordEntry>, AnalyzerError> {
        let resp: EntitiesResponse = self.call("analyzeEntities", text).await?;
        Ok(resp
            .entities
            .into_iter()
            .map(|e| KeywordEntry::new(&e.name, e.salience, e.entity_type, e.mentions.len() as u32))
            .collect())
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<f64, AnalyzerError> {
        let resp: SentimentResponse = self.call("analyzeSentiment", text).await?;
        Ok(resp.document_sentiment.score.clamp(-1.0, 1.0))
    }

    async fn analyze_syntax(&self, text: &str) -> Result<Vec<String>, AnalyzerError> {
        let resp: SyntaxResponse = self.call("analyzeSyntax", text).await?;
        Ok(resp.tokens.into_iter().map(|t| t.part_of_speech.tag).collect())
    }
}
