// src/names.rs
//! Rebuild a searchable full name for roster entries that only carry a first name.

use crate::types::PersonRecord;

/// Name to search for. Multi-word names are used as they are; single-word
/// names go through [`guess_fullname`].
pub fn search_name(person: &PersonRecord) -> String {
    let fullname = person.fullname.trim();
    if fullname.contains(' ') {
        fullname.to_string()
    } else {
        guess_fullname(person)
    }
}

/// Guess a surname for a single-word `fullname` from the email local-part or
/// the username. Returns the original name when nothing plausible is found.
pub fn guess_fullname(person: &PersonRecord) -> String {
    let fullname = person.fullname.trim();
    if fullname.contains(' ') || fullname.is_empty() {
        return fullname.to_string();
    }

    let first_lower = fullname.to_lowercase();
    let username = person.username.as_deref().map(str::trim).unwrap_or("");

    // "lelandlee4@gmail.com" -> "Leland Lee"
    for source in [person.email_local_part(), username] {
        let source_lower = source.to_lowercase();
        let source_lower = source_lower.trim_end_matches(|c: char| c.is_ascii_digit());
        if let Some(rest) = surname_after_prefix(source_lower, &first_lower) {
            return format!("{} {}", fullname, capitalize(rest));
        }
    }

    if username.chars().count() > 2
        && username.to_lowercase() != first_lower
        && is_alphabetic(username)
    {
        return format!("{} {}", fullname, capitalize(username));
    }

    fullname.to_string()
}

fn surname_after_prefix<'a>(source: &'a str, first: &str) -> Option<&'a str> {
    if source.chars().count() <= first.chars().count() {
        return None;
    }
    let rest = source.strip_prefix(first)?;
    (rest.chars().count() > 1 && is_alphabetic(rest)).then_some(rest)
}

fn is_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
