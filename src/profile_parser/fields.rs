// src/profile_parser/fields.rs
//! One rule per extracted field. Each rule works on its own and returns
//! `None` when the text does not carry the field.

use regex::Regex;
use std::sync::LazyLock;

use crate::matching::EXPERIENCE_MARKER;

/// `### <title> at <company> (Current)` where company is `[label](url)`,
/// `[label]<url>` or plain text.
static CURRENT_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s+(.+?)\s+at\s+(?:\[([^\]]+)\](?:<[^>]*>|\([^)]*\))|([^\n(]+))\s*\(Current\)")
        .expect("valid regex")
});

static ROLE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s+(.+?)\s+at\s+(?:\[([^\]]+)\](?:<[^>]*>|\([^)]*\))|([^\n(]+))")
        .expect("valid regex")
});

static TRAILING_CURRENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(Current\)\s*$").expect("valid regex"));

static AUDIENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)connections|followers").expect("valid regex"));

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([A-Z]{2}\)\s*$").expect("valid regex"));

static CITY_REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+.*,\s*[A-Z]").expect("valid regex"));

/// Window of summary lines that may hold the location (0-indexed, inclusive).
const LOCATION_FIRST_LINE: usize = 2;
const LOCATION_LAST_LINE: usize = 5;

/// Non-empty trimmed lines of the profile text.
pub fn normalized_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// The line after the name banner.
pub fn headline(lines: &[&str]) -> Option<String> {
    lines.get(1).map(|line| line.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRole {
    pub title: String,
    pub company: String,
}

/// Role marked `(Current)`, else the first role listed under the experience heading.
pub fn current_role(text: &str) -> Option<CurrentRole> {
    let caps = CURRENT_ROLE_RE.captures(text).or_else(|| {
        let start = text.find(EXPERIENCE_MARKER)?;
        ROLE_HEADER_RE.captures(&text[start..])
    })?;

    let title = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let company = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    let company = TRAILING_CURRENT_RE.replace(company, "").trim().to_string();

    Some(CurrentRole {
        title: title.to_string(),
        company,
    })
}

/// Location line from the profile summary block.
///
/// Stops at the connections/followers line, which closes the summary.
pub fn location(lines: &[&str]) -> Option<String> {
    let window = lines
        .iter()
        .skip(LOCATION_FIRST_LINE)
        .take(LOCATION_LAST_LINE - LOCATION_FIRST_LINE + 1);

    for line in window {
        if AUDIENCE_RE.is_match(line) {
            break;
        }
        if COUNTRY_CODE_RE.is_match(line) {
            return Some(COUNTRY_CODE_RE.replace(line, "").trim().to_string());
        }
        if CITY_REGION_RE.is_match(line) && !line.contains("at ") && !line.contains("##") {
            return Some(line.trim().to_string());
        }
    }
    None
}

/// `label` when the text mentions the anchor term anywhere.
pub fn education(text: &str, anchor_lower: &str, label: &str) -> Option<String> {
    (!anchor_lower.is_empty() && text.to_lowercase().contains(anchor_lower))
        .then(|| label.to_string())
}
