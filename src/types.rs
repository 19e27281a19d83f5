// src/types.rs
use serde::{Deserialize, Serialize};

/// Identity of one roster entry, as exported from the chat workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub fullname: String,
    pub email: String,
    pub username: Option<String>,
}

impl PersonRecord {
    pub fn new(fullname: &str, email: &str) -> Self {
        Self {
            fullname: fullname.trim().to_string(),
            email: email.trim().to_string(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        let username = username.trim();
        self.username = if username.is_empty() {
            None
        } else {
            Some(username.to_string())
        };
        self
    }

    /// Part of the email address before the `@`.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or("")
    }
}

/// One result returned by the profile search provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub title: String,
    pub url: String,
    pub text: Option<String>,
}

impl SearchCandidate {
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Structured fields pulled out of a profile's free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub current_title: String,
    pub current_company: String,
    pub linkedin_headline: String,
    pub location: String,
    pub education: String,
    pub org_role: String,
    pub org_years: String,
}

/// One row of the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub fullname: String,
    pub email: String,
    pub linkedin_url: String,
    #[serde(flatten)]
    pub profile: ParsedProfile,
}

impl OutputRecord {
    /// Row for a person whose profile could not be found.
    pub fn empty(person: &PersonRecord) -> Self {
        Self {
            fullname: person.fullname.clone(),
            email: person.email.clone(),
            ..Default::default()
        }
    }

    pub fn found(person: &PersonRecord, url: &str, profile: ParsedProfile) -> Self {
        Self {
            fullname: person.fullname.clone(),
            email: person.email.clone(),
            linkedin_url: url.to_string(),
            profile,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.linkedin_url.is_empty()
    }

    /// Header row; the organization columns are named `<prefix>_role` and `<prefix>_years`.
    pub fn headers(org_prefix: &str) -> Vec<String> {
        let mut headers: Vec<String> = [
            "fullname",
            "email",
            "linkedin_url",
            "current_title",
            "current_company",
            "linkedin_headline",
            "location",
            "education",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        headers.push(format!("{}_role", org_prefix));
        headers.push(format!("{}_years", org_prefix));
        headers
    }

    /// Values in the same order as [`OutputRecord::headers`].
    pub fn values(&self) -> [&str; 10] {
        [
            self.fullname.as_str(),
            self.email.as_str(),
            self.linkedin_url.as_str(),
            self.profile.current_title.as_str(),
            self.profile.current_company.as_str(),
            self.profile.linkedin_headline.as_str(),
            self.profile.location.as_str(),
            self.profile.education.as_str(),
            self.profile.org_role.as_str(),
            self.profile.org_years.as_str(),
        ]
    }
}

/// Counters reported at the end of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
    pub remaining: usize,
}
