//! Canonical content hashing.
//!
//! The hash is a pure function of normalized content: whitespace and case
//! differences in the text and the order of tags do not change it.
//!
//! Canonical form: `title|description|tag1,tag2`. Inside each field `\\`,
//! `|` and `,` are backslash-escaped, so no two distinct snapshots share a
//! canonical string.

use sha2::{Digest, Sha256};

/// Trim, lower-case and collapse runs of whitespace to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize, de-duplicate and sort tags. Blank tags are dropped.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if matches!(c, '\\' | '|' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The exact string that is hashed.
pub fn canonical_form(title: &str, description: &str, tags: &[String]) -> String {
    let tags: Vec<String> = normalize_tags(tags)
        .iter()
        .map(|t| escape_field(t))
        .collect();
    format!(
        "{}|{}|{}",
        escape_field(&normalize(title)),
        escape_field(&normalize(description)),
        tags.join(",")
    )
}

/// Lowercase hex SHA-256 of the canonical form.
pub fn content_hash(title: &str, description: &str, tags: &[String]) -> String {
    hex::encode(Sha256::digest(
        canonical_form(title, description, tags).as_bytes(),
    ))
}
