//! Citekey validation, normalization and generation.
//!
//! A citekey is the primary key of a paper across every store: it names the
//! bib file, the metadata file, the managed document and the note. Valid keys:
//! - Are not empty
//! - Contain no whitespace or control characters
//! - Contain no path separators (`/`, `\`)
//! - Contain none of the BibTeX delimiters `{`, `}`, `,`, `"`, `#`, `%`, `=`
//! - Do not start with a dot (no hidden files, no `..`)

use crate::bibtex::BibEntry;
use std::collections::BTreeSet;

/// Validates a citekey.
///
/// # Examples
/// ```
/// use pubsapp::citekey::validate;
///
/// assert!(validate("smith2020").is_ok());
/// assert!(validate("Smith:2020-b").is_ok());
///
/// assert!(validate("").is_err());
/// assert!(validate("smith 2020").is_err());
/// assert!(validate("../etc/passwd").is_err());
/// assert!(validate("a/b").is_err());
/// ```
pub fn validate(citekey: &str) -> Result<(), CitekeyError> {
    let Some(first) = citekey.chars().next() else {
        return Err(CitekeyError::Empty);
    };
    if first == '.' {
        return Err(CitekeyError::LeadingDot);
    }

    for ch in citekey.chars() {
        if ch == '/' || ch == '\\' {
            return Err(CitekeyError::PathSeparator(ch));
        }
        if !is_valid_citekey_char(ch) {
            return Err(CitekeyError::InvalidCharacter(ch));
        }
    }

    Ok(())
}

fn is_valid_citekey_char(ch: char) -> bool {
    !(ch.is_whitespace() || ch.is_control() || "{},\"#%=/\\".contains(ch))
}

/// Drops every character `validate` would reject, and leading dots.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|&c| is_valid_citekey_char(c))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// Suffix for the `n`-th collision, in bijective base 26:
/// `0 -> ""`, `1 -> "a"`, `26 -> "z"`, `27 -> "aa"`.
pub fn suffix(n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let letter = (b'a' + ((n - 1) % 26) as u8) as char;
    let mut s = suffix((n - 1) / 26);
    s.push(letter);
    s
}

/// Returns `base_key` if it is free, otherwise the first `base_key + suffix(n)`
/// absent from `existing`.
pub fn generate_unique(base_key: &str, existing: &BTreeSet<String>) -> String {
    (0..)
        .map(|n| format!("{}{}", base_key, suffix(n)))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| base_key.to_string())
}

/// Builds a base citekey from the first author's last name and the year,
/// e.g. `smith2020`. Falls back to the first word of the title.
pub fn generate_citekey(entry: &BibEntry) -> String {
    let name = entry
        .get_field("author")
        .or_else(|| entry.get_field("editor"))
        .and_then(first_last_name)
        .or_else(|| {
            entry
                .get_field("title")
                .and_then(|t| t.split_whitespace().next())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let name: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    let year = entry.get_field("year").unwrap_or("").trim();

    let key = normalize(&format!("{}{}", name, year));
    if key.is_empty() {
        "unknown".to_string()
    } else {
        key
    }
}

/// Last name of the first person in a BibTeX name list.
/// Handles both `Last, First` and `First Last`.
fn first_last_name(names: &str) -> Option<String> {
    let first = names.split(" and ").next()?.trim();
    let first = first.trim_matches(|c: char| c == '{' || c == '}');
    if first.is_empty() {
        return None;
    }
    let last = match first.split_once(',') {
        Some((last, _)) => last.trim(),
        None => first.split_whitespace().last()?,
    };
    Some(last.to_string())
}

/// Error type for citekey validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitekeyError {
    /// Citekey is empty
    Empty,
    /// Citekey starts with a dot
    LeadingDot,
    /// Citekey contains a path separator
    PathSeparator(char),
    /// Citekey contains whitespace, a control character or a BibTeX delimiter
    InvalidCharacter(char),
}

impl std::fmt::Display for CitekeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CitekeyError::Empty => write!(f, "citekey cannot be empty"),
            CitekeyError::LeadingDot => write!(f, "citekey cannot start with '.'"),
            CitekeyError::PathSeparator(ch) => {
                write!(f, "citekey cannot contain path separator '{}'", ch)
            }
            CitekeyError::InvalidCharacter(ch) => {
                write!(f, "citekey contains invalid character {:?}", ch)
            }
        }
    }
}

impl std::error::Error for CitekeyError {}
