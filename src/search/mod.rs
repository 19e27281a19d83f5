// src/search/mod.rs
use async_trait::async_trait;
use serde::Serialize;

pub mod exa;

pub use exa::ExaClient;

use crate::error::SearchResult;
use crate::types::SearchCandidate;

/// How much page text the provider should return with each result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    pub max_characters: usize,
    pub include_html_tags: bool,
}

impl TextOptions {
    pub fn plain(max_characters: usize) -> Self {
        Self {
            max_characters,
            include_html_tags: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub category: Option<String>,
    pub include_domains: Vec<String>,
    pub num_results: usize,
    pub text: TextOptions,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, num_results: usize, text: TextOptions) -> Self {
        Self {
            query: query.into(),
            category: None,
            include_domains: Vec::new(),
            num_results,
            text,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.is_empty());
        self
    }

    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }
}

/// Profile search provider.
#[async_trait]
pub trait ProfileSearch: Send + Sync {
    /// Run a query and return results with their page text.
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<SearchCandidate>>;

    /// Fetch the page text for one URL. `None` when the provider has nothing for it.
    async fn fetch_contents(
        &self,
        url: &str,
        text: &TextOptions,
    ) -> SearchResult<Option<SearchCandidate>>;
}
