// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::search::exa::DEFAULT_BASE_URL;
use crate::search::TextOptions;

pub const DEFAULT_CONFIG_FILE: &str = "enrich.yaml";

/// Everything a run needs, passed explicitly to the batch driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub input_path: PathBuf,
    pub pending_path: PathBuf,
    pub output_path: PathBuf,
    pub error_log_path: PathBuf,
    pub batch_size: usize,
    pub request_delay_ms: u64,
    /// Institution whose mention marks the right candidate and sets the education flag.
    pub anchor_term: String,
    pub education_label: String,
    /// Organization whose roles and tenure are extracted.
    pub target_org: String,
    /// Output columns for the organization are `<prefix>_role` and `<prefix>_years`.
    pub org_column_prefix: String,
    pub org_web_fallback: bool,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub num_results: usize,
    pub category: Option<String>,
    pub include_domains: Vec<String>,
    pub max_characters: usize,
    pub fetch_max_characters: usize,
    pub org_search_results: usize,
    pub org_search_max_characters: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("slack.csv"),
            pending_path: PathBuf::from("remaining.csv"),
            output_path: PathBuf::from("enriched_linkedin.csv"),
            error_log_path: PathBuf::from("enrichment_errors.log"),
            batch_size: 10,
            request_delay_ms: 1000,
            anchor_term: "Berkeley".to_string(),
            education_label: "UC Berkeley".to_string(),
            target_org: "Blockchain at Berkeley".to_string(),
            org_column_prefix: "bab".to_string(),
            org_web_fallback: true,
            search: SearchSettings::default(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            num_results: 5,
            category: Some("people".to_string()),
            include_domains: vec!["linkedin.com".to_string()],
            max_characters: 10_000,
            fetch_max_characters: 10_000,
            org_search_results: 3,
            org_search_max_characters: 2_000,
        }
    }
}

impl SearchSettings {
    pub fn profile_text(&self) -> TextOptions {
        TextOptions::plain(self.max_characters)
    }

    pub fn fetch_text(&self) -> TextOptions {
        TextOptions::plain(self.fetch_max_characters)
    }

    pub fn org_text(&self) -> TextOptions {
        TextOptions::plain(self.org_search_max_characters)
    }
}

impl EnrichConfig {
    /// Load from a YAML file. A missing file yields the defaults; relative
    /// paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().context("Failed to get current directory")?,
        };

        let config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Self::default()
        };

        config.validate()?;
        Ok(config.resolve_paths(&base_dir))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid configuration YAML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if self.target_org.trim().is_empty() {
            anyhow::bail!("target_org must not be empty");
        }
        if self.search.num_results == 0 {
            anyhow::bail!("search.num_results must be at least 1");
        }
        Ok(())
    }

    /// Make every configured path absolute against `base_dir`.
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        for path in [
            &mut self.input_path,
            &mut self.pending_path,
            &mut self.output_path,
            &mut self.error_log_path,
        ] {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        self
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        if let Some(n) = batch_size.filter(|n| *n > 0) {
            self.batch_size = n;
        }
        self
    }

    pub fn with_request_delay_ms(mut self, delay_ms: Option<u64>) -> Self {
        if let Some(ms) = delay_ms {
            self.request_delay_ms = ms;
        }
        self
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
