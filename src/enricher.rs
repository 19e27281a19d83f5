// src/enricher.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EnrichConfig;
use crate::error::SearchResult;
use crate::matching::{has_experience_section, select_candidate, Selection};
use crate::names;
use crate::profile_parser::ProfileParser;
use crate::search::{ProfileSearch, SearchQuery};
use crate::types::{OutputRecord, PersonRecord};

/// Profile chosen for a person, with the best text we could get for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundProfile {
    pub url: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
    /// Primary search failed; the message goes to the error log.
    Failed(String),
}

/// Result for one person. `record` is always present, empty-filled unless found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonOutcome {
    pub search_name: String,
    pub record: OutputRecord,
    pub outcome: Outcome,
}

pub struct Enricher {
    search: Arc<dyn ProfileSearch>,
    parser: ProfileParser,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(search: Arc<dyn ProfileSearch>, config: &EnrichConfig) -> Result<Self> {
        let parser = ProfileParser::new(
            &config.anchor_term,
            &config.education_label,
            &config.target_org,
        )?;
        Ok(Self {
            search,
            parser,
            config: config.clone(),
        })
    }

    /// Look the person up and build their output row. Never fails: search
    /// errors are reported through [`Outcome::Failed`].
    pub async fn enrich(&self, person: &PersonRecord) -> PersonOutcome {
        let search_name = names::search_name(person);

        let (record, outcome) = match self.search_profile(&search_name).await {
            Ok(Some(found)) => {
                let mut profile = self.parser.parse(found.text.as_deref());
                if profile.org_role.is_empty() && self.config.org_web_fallback {
                    if let Some(role) = self.org_role_from_web(&search_name).await {
                        profile.org_role = role;
                    }
                }
                (
                    OutputRecord::found(person, &found.url, profile),
                    Outcome::Found,
                )
            }
            Ok(None) => (OutputRecord::empty(person), Outcome::NotFound),
            Err(e) => (OutputRecord::empty(person), Outcome::Failed(e.to_string())),
        };

        PersonOutcome {
            search_name,
            record,
            outcome,
        }
    }

    /// Search for the person's profile and pick the best matching result.
    pub async fn search_profile(&self, search_name: &str) -> SearchResult<Option<FoundProfile>> {
        let settings = &self.config.search;
        let query = SearchQuery::new(
            format!("{} {}", search_name, self.config.anchor_term),
            settings.num_results,
            settings.profile_text(),
        )
        .with_category(settings.category.clone())
        .with_domains(settings.include_domains.clone());

        let results = self.search.search(&query).await?;
        let Some(selection) = select_candidate(&results, search_name, &self.config.anchor_term)
        else {
            debug!(search_name, candidates = results.len(), "No matching candidate");
            return Ok(None);
        };

        let text = self.resolve_profile_text(&selection).await;
        Ok(Some(FoundProfile {
            url: selection.best.url.clone(),
            text,
        }))
    }

    /// Text of the selected profile, refetched with a larger budget when the
    /// search returned it without an experience section.
    pub async fn resolve_profile_text(&self, selection: &Selection) -> Option<String> {
        let original = selection.best.text.clone();
        if original.as_deref().is_some_and(has_experience_section) {
            return original;
        }

        let options = self.config.search.fetch_text();
        for candidate in selection.fetch_order() {
            match self.search.fetch_contents(&candidate.url, &options).await {
                Ok(Some(fetched)) => {
                    if let Some(text) = fetched.text.filter(|t| has_experience_section(t)) {
                        debug!(url = %candidate.url, "Fetched full profile text");
                        return Some(text);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(url = %candidate.url, error = %e, "Content fetch failed, trying next candidate");
                }
            }
        }

        original
    }

    /// Role at the target organization from a general web search. Any
    /// provider failure yields `None`.
    pub async fn org_role_from_web(&self, search_name: &str) -> Option<String> {
        let settings = &self.config.search;
        let query = SearchQuery::new(
            format!("\"{}\" \"{}\"", search_name, self.config.target_org),
            settings.org_search_results,
            settings.org_text(),
        );

        match self.search.search(&query).await {
            Ok(results) => {
                let role = self
                    .parser
                    .org_extractor()
                    .role_from_web(&results, search_name);
                if let Some(role) = &role {
                    info!(search_name, role = %role, "Organization role found on the web");
                }
                role
            }
            Err(e) => {
                warn!(search_name, error = %e, "Organization web search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::TextOptions;
    use crate::types::SearchCandidate;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by query text / URL.
    #[derive(Default)]
    struct FakeSearch {
        searches: HashMap<String, Vec<SearchCandidate>>,
        failing_searches: Vec<String>,
        contents: HashMap<String, String>,
        failing_fetches: Vec<String>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProfileSearch for FakeSearch {
        async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<SearchCandidate>> {
            if self.failing_searches.contains(&query.query) {
                return Err(SearchError::Network("connection reset".to_string()));
            }
            Ok(self.searches.get(&query.query).cloned().unwrap_or_default())
        }

        async fn fetch_contents(
            &self,
            url: &str,
            _text: &TextOptions,
        ) -> SearchResult<Option<SearchCandidate>> {
            self.fetched.lock().unwrap().push(url.to_string());
            if self.failing_fetches.iter().any(|u| u == url) {
                return Err(SearchError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.contents.get(url).map(|text| SearchCandidate {
                title: String::new(),
                url: url.to_string(),
                text: Some(text.clone()),
            }))
        }
    }

    fn candidate(title: &str, url: &str, text: &str) -> SearchCandidate {
        SearchCandidate {
            title: title.to_string(),
            url: url.to_string(),
            text: Some(text.to_string()),
        }
    }

    fn enricher(fake: FakeSearch) -> (Enricher, Arc<FakeSearch>) {
        let fake = Arc::new(fake);
        let enricher = Enricher::new(fake.clone(), &EnrichConfig::default()).unwrap();
        (enricher, fake)
    }

    const FULL_TEXT: &str = "Jane Doe\nEngineer\nOakland, CA\n## Experience\n### Engineer at [Acme](u) (Current)\nJan 2024 - Present\n### Treasurer at Blockchain at Berkeley\nJan 2021 - Dec 2022\n";

    #[tokio::test]
    async fn test_found_profile_is_parsed() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![candidate("Jane Doe | LinkedIn", "https://li/in/janedoe", FULL_TEXT)],
        );
        let (enricher, fake) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.outcome, Outcome::Found);
        assert_eq!(result.record.linkedin_url, "https://li/in/janedoe");
        assert_eq!(result.record.profile.current_company, "Acme");
        assert_eq!(result.record.profile.org_role, "Treasurer");
        assert_eq!(result.record.profile.org_years, "Jan 2021 - Dec 2022");
        assert!(fake.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_name_searched_with_guessed_surname() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Ashvin Nihalani Berkeley".to_string(),
            vec![candidate(
                "Ashvin N. | LinkedIn",
                "https://li/in/ashvinnihalani",
                FULL_TEXT,
            )],
        );
        let (enricher, _) = enricher(fake);

        let person = PersonRecord::new("Ashvin", "anihalani5@gmail.com").with_username("nihalani");
        let result = enricher.enrich(&person).await;
        assert_eq!(result.search_name, "Ashvin Nihalani");
        assert_eq!(result.outcome, Outcome::Found);
        // Output keeps the roster name.
        assert_eq!(result.record.fullname, "Ashvin");
    }

    #[tokio::test]
    async fn test_not_found_gives_empty_row() {
        let (enricher, _) = enricher(FakeSearch::default());
        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.outcome, Outcome::NotFound);
        assert_eq!(result.record, OutputRecord::empty(&PersonRecord::new("Jane Doe", "jane@x.io")));
    }

    #[tokio::test]
    async fn test_search_failure_reported() {
        let mut fake = FakeSearch::default();
        fake.failing_searches.push("Jane Doe Berkeley".to_string());
        let (enricher, _) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert!(matches!(result.outcome, Outcome::Failed(ref m) if m.contains("connection reset")));
        assert!(!result.record.is_found());
    }

    #[tokio::test]
    async fn test_truncated_text_refetched_from_next_candidate() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![
                candidate("Jane Doe | LinkedIn", "https://li/in/jd1", "Jane Doe\nBerkeley grad"),
                candidate("Jane Doe - PM", "https://li/in/jd2", "Jane Doe\nPM"),
            ],
        );
        fake.failing_fetches.push("https://li/in/jd1".to_string());
        fake.contents
            .insert("https://li/in/jd2".to_string(), FULL_TEXT.to_string());
        let (enricher, fake) = enricher(fake);

        let found = enricher.search_profile("Jane Doe").await.unwrap().unwrap();
        assert_eq!(found.url, "https://li/in/jd1");
        assert_eq!(found.text.as_deref(), Some(FULL_TEXT));
        assert_eq!(
            *fake.fetched.lock().unwrap(),
            vec!["https://li/in/jd1", "https://li/in/jd2"]
        );
    }

    #[tokio::test]
    async fn test_truncated_text_kept_when_fetches_fail() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![candidate("Jane Doe | LinkedIn", "https://li/in/jd1", "Jane Doe\nBerkeley grad")],
        );
        fake.contents
            .insert("https://li/in/jd1".to_string(), "still truncated".to_string());
        let (enricher, _) = enricher(fake);

        let found = enricher.search_profile("Jane Doe").await.unwrap().unwrap();
        assert_eq!(found.text.as_deref(), Some("Jane Doe\nBerkeley grad"));
    }

    #[tokio::test]
    async fn test_result_without_text_is_fetched() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![SearchCandidate {
                title: "Jane Doe | LinkedIn".to_string(),
                url: "https://li/in/jd1".to_string(),
                text: None,
            }],
        );
        fake.contents
            .insert("https://li/in/jd1".to_string(), FULL_TEXT.to_string());
        let (enricher, fake) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.outcome, Outcome::Found);
        assert_eq!(result.record.profile.current_company, "Acme");
        assert_eq!(*fake.fetched.lock().unwrap(), vec!["https://li/in/jd1"]);
    }

    #[tokio::test]
    async fn test_result_without_text_and_nothing_fetched_stays_empty() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![SearchCandidate {
                title: "Jane Doe | LinkedIn".to_string(),
                url: "https://li/in/jd1".to_string(),
                text: None,
            }],
        );
        let (enricher, _) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.outcome, Outcome::Found);
        assert_eq!(result.record.linkedin_url, "https://li/in/jd1");
        assert_eq!(result.record.profile.current_title, "");
    }

    #[tokio::test]
    async fn test_org_role_from_web_fallback() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![candidate(
                "Jane Doe | LinkedIn",
                "https://li/in/jd",
                "Jane Doe\nEngineer\n## Experience\n### Engineer at Acme\nJan 2024 - Present",
            )],
        );
        fake.searches.insert(
            "\"Jane Doe\" \"Blockchain at Berkeley\"".to_string(),
            vec![candidate("Team", "https://bab.example/team", "Jane Doe, Treasurer. Educator at Blockchain at Berkeley")],
        );
        let (enricher, _) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.record.profile.org_role, "Educator");
        assert_eq!(result.record.profile.org_years, "");
    }

    #[tokio::test]
    async fn test_org_web_failure_is_swallowed() {
        let mut fake = FakeSearch::default();
        fake.searches.insert(
            "Jane Doe Berkeley".to_string(),
            vec![candidate("Jane Doe | LinkedIn", "https://li/in/jd", "Jane Doe\n## Experience\n")],
        );
        fake.failing_searches
            .push("\"Jane Doe\" \"Blockchain at Berkeley\"".to_string());
        let (enricher, _) = enricher(fake);

        let result = enricher.enrich(&PersonRecord::new("Jane Doe", "jane@x.io")).await;
        assert_eq!(result.outcome, Outcome::Found);
        assert_eq!(result.record.profile.org_role, "");
    }
}
