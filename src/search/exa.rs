// src/search/exa.rs
//! Exa REST API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ProfileSearch, SearchQuery, TextOptions};
use crate::error::{SearchError, SearchResult};
use crate::types::SearchCandidate;

pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";
pub const API_KEY_ENV: &str = "EXA_API_KEY";

/// Placeholder left in unedited environment templates; treated as no key.
const PLACEHOLDER_API_KEY: &str = "your_exa_api_key_here";

const SEARCH_ENDPOINT: &str = "/search";
const CONTENTS_ENDPOINT: &str = "/contents";

pub struct ExaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    contents: ContentsOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ContentsOptions<'a> {
    text: &'a TextOptions,
}

#[derive(Debug, Serialize)]
struct ContentsRequest<'a> {
    urls: [&'a str; 1],
    text: &'a TextOptions,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    text: Option<String>,
}

impl From<ExaResult> for SearchCandidate {
    fn from(r: ExaResult) -> Self {
        SearchCandidate {
            title: r.title.unwrap_or_default(),
            url: r.url,
            text: r.text,
        }
    }
}

impl ExaClient {
    pub fn new(api_key: &str, base_url: &str, timeout_seconds: u64) -> SearchResult<Self> {
        let api_key = api_key.trim();
        if !is_usable_api_key(api_key) {
            return Err(SearchError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client with the key from `EXA_API_KEY`.
    pub fn from_env(base_url: &str, timeout_seconds: u64) -> SearchResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| SearchError::MissingApiKey)?;
        Self::new(&api_key, base_url, timeout_seconds)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> SearchResult<ResultsResponse> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

pub fn is_usable_api_key(api_key: &str) -> bool {
    let api_key = api_key.trim();
    !api_key.is_empty() && api_key != PLACEHOLDER_API_KEY
}

#[async_trait]
impl ProfileSearch for ExaClient {
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<SearchCandidate>> {
        info!(query = %query.query, num_results = query.num_results, "Exa search");

        let request = SearchRequest {
            query: &query.query,
            num_results: query.num_results,
            category: query.category.as_deref(),
            include_domains: &query.include_domains,
            contents: ContentsOptions { text: &query.text },
        };

        let response = self.post(SEARCH_ENDPOINT, &request).await?;
        let results: Vec<SearchCandidate> =
            response.results.into_iter().map(SearchCandidate::from).collect();

        debug!(query = %query.query, count = results.len(), "Exa search complete");
        Ok(results)
    }

    async fn fetch_contents(
        &self,
        url: &str,
        text: &TextOptions,
    ) -> SearchResult<Option<SearchCandidate>> {
        debug!(url, "Exa contents fetch");

        let request = ContentsRequest { urls: [url], text };
        let response = self.post(CONTENTS_ENDPOINT, &request).await?;
        Ok(response.results.into_iter().next().map(SearchCandidate::from))
    }
}
