// src/matching.rs
//! Decide which search result, if any, is the person we are looking for.

use crate::types::SearchCandidate;

/// Heading whose presence means the profile text was not truncated.
pub const EXPERIENCE_MARKER: &str = "## Experience";

/// True when the result title (or, for the surname, the URL slug) carries the name.
///
/// The first name must appear in the title. The surname may appear in the
/// title or the URL, since display names are often abbreviated ("Ashvin N.")
/// while the slug keeps the full surname.
pub fn name_matches(full_name: &str, title: &str, url: &str) -> bool {
    let lowered = full_name.to_lowercase();
    let parts: Vec<&str> = lowered.split_whitespace().collect();
    let Some(&first) = parts.first() else {
        return false;
    };
    let last = if parts.len() > 1 { parts[parts.len() - 1] } else { "" };

    let title_lower = title.to_lowercase();
    let url_lower = url.to_lowercase();

    let first_in = title_lower.contains(first);
    let last_in = last.is_empty() || title_lower.contains(last) || url_lower.contains(last);
    first_in && last_in
}

/// Chosen candidate plus the other name matches, in result order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub best: SearchCandidate,
    pub alternates: Vec<SearchCandidate>,
}

impl Selection {
    /// Candidates to try when the best text is truncated: best first, then the rest.
    pub fn fetch_order(&self) -> impl Iterator<Item = &SearchCandidate> {
        std::iter::once(&self.best).chain(self.alternates.iter())
    }
}

/// Pick the first name-matching candidate whose text mentions `anchor`,
/// falling back to the first name match. `None` when nothing matches.
pub fn select_candidate(
    candidates: &[SearchCandidate],
    full_name: &str,
    anchor: &str,
) -> Option<Selection> {
    let matches: Vec<&SearchCandidate> = candidates
        .iter()
        .filter(|c| name_matches(full_name, &c.title, &c.url))
        .collect();

    if matches.is_empty() {
        return None;
    }

    let anchor_lower = anchor.trim().to_lowercase();
    let best_idx = matches
        .iter()
        .position(|c| mentions(c.text_str(), &anchor_lower))
        .unwrap_or(0);

    let best = matches[best_idx].clone();
    let alternates = matches
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != best_idx)
        .map(|(_, c)| (*c).clone())
        .collect();

    Some(Selection { best, alternates })
}

/// Case-insensitive containment; `needle_lower` must already be lowercased.
pub fn mentions(text: &str, needle_lower: &str) -> bool {
    !needle_lower.is_empty() && text.to_lowercase().contains(needle_lower)
}

pub fn has_experience_section(text: &str) -> bool {
    text.contains(EXPERIENCE_MARKER)
}
