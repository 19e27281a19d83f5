// src/profile_parser/mod.rs
//! Structured fields from the markdown-like profile text returned by the search provider.

use anyhow::Result;

pub mod fields;
pub mod org_role;

pub use org_role::{OrgRole, OrgRoleExtractor};

use crate::types::ParsedProfile;

pub struct ProfileParser {
    anchor_lower: String,
    education_label: String,
    org: OrgRoleExtractor,
}

impl ProfileParser {
    pub fn new(anchor_term: &str, education_label: &str, target_org: &str) -> Result<Self> {
        Ok(Self {
            anchor_lower: anchor_term.trim().to_lowercase(),
            education_label: education_label.to_string(),
            org: OrgRoleExtractor::new(target_org)?,
        })
    }

    pub fn org_extractor(&self) -> &OrgRoleExtractor {
        &self.org
    }

    /// Every rule runs independently; a field the text does not carry stays empty.
    pub fn parse(&self, text: Option<&str>) -> ParsedProfile {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return ParsedProfile::default(),
        };

        let lines = fields::normalized_lines(text);
        let current = fields::current_role(text);
        let org = self.org.extract(text).unwrap_or_default();

        ParsedProfile {
            current_title: current.as_ref().map(|r| r.title.clone()).unwrap_or_default(),
            current_company: current.map(|r| r.company).unwrap_or_default(),
            linkedin_headline: fields::headline(&lines).unwrap_or_default(),
            location: fields::location(&lines).unwrap_or_default(),
            education: fields::education(text, &self.anchor_lower, &self.education_label)
                .unwrap_or_default(),
            org_role: org.role,
            org_years: org.years,
        }
    }
}
