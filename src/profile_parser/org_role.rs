// src/profile_parser/org_role.rs
//! Roles held at one named organization, and the span of time they cover.

use anyhow::{Context, Result};
use regex::Regex;

use crate::types::SearchCandidate;

/// Phrases too generic to count as a role when scraped from web pages.
const GENERIC_ROLE_WORDS: &[&str] = &["member", "the", "about", "from", "and", "with"];

/// Role reported when a page links the person to the organization but names no role.
pub const DEFAULT_WEB_ROLE: &str = "Member";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgRole {
    pub role: String,
    pub years: String,
}

/// Compiled patterns for a single organization.
#[derive(Debug, Clone)]
pub struct OrgRoleExtractor {
    org_lower: String,
    tenure_re: Regex,
    web_role_re: Regex,
}

impl OrgRoleExtractor {
    pub fn new(org_name: &str) -> Result<Self> {
        let org = regex::escape(org_name.trim());

        // Header and date range may be separated by any amount of whitespace, blank lines included.
        let tenure_re = Regex::new(&format!(
            r"###\s+(.+?)\s+at\s+(?:\[)?{org}(?:\])?(?:<[^>]*>|\([^)]*\))?[\s\S]*?(\w+\s+\d{{4}})\s*-\s*((?:\w+\s+\d{{4}})|Present)"
        ))
        .with_context(|| format!("Failed to build tenure pattern for {}", org_name))?;

        let web_role_re = Regex::new(&format!(r"(?i)(?:(\w[\w\s]+?)\s+(?:of|at|for)\s+)?{org}"))
            .with_context(|| format!("Failed to build web role pattern for {}", org_name))?;

        Ok(Self {
            org_lower: org_name.trim().to_lowercase(),
            tenure_re,
            web_role_re,
        })
    }

    /// All roles at the organization, most recent first, and the span from the
    /// earliest start to the latest end. `None` when the profile lists none.
    ///
    /// Profiles list experience newest first, so the earliest start comes from
    /// the last match and the latest end from the first.
    pub fn extract(&self, text: &str) -> Option<OrgRole> {
        let tenures: Vec<(&str, &str, &str)> = self
            .tenure_re
            .captures_iter(text)
            .filter_map(|caps| {
                Some((
                    caps.get(1)?.as_str().trim(),
                    caps.get(2)?.as_str(),
                    caps.get(3)?.as_str(),
                ))
            })
            .collect();

        let (_, _, latest_end) = *tenures.first()?;
        let (_, earliest_start, _) = *tenures.last()?;

        let role = tenures
            .iter()
            .map(|(title, _, _)| *title)
            .collect::<Vec<_>>()
            .join(" / ");

        Some(OrgRole {
            role,
            years: format!("{} - {}", earliest_start, latest_end),
        })
    }

    /// Role pulled from general web results mentioning the person and the organization.
    ///
    /// Only the first result naming both is considered. Never yields years.
    pub fn role_from_web(&self, results: &[SearchCandidate], full_name: &str) -> Option<String> {
        let first_name = full_name.split_whitespace().next()?.to_lowercase();

        let page = results.iter().find(|r| {
            let text = r.text_str().to_lowercase();
            text.contains(&first_name) && text.contains(&self.org_lower)
        })?;

        let role = self
            .web_role_re
            .captures(page.text_str())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|role| !role.is_empty())
            .filter(|role| !GENERIC_ROLE_WORDS.contains(&role.to_lowercase().as_str()));

        Some(role.unwrap_or_else(|| DEFAULT_WEB_ROLE.to_string()))
    }
}
