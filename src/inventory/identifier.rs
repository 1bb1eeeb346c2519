//! Identifier extraction from profile references

use once_cell::sync::Lazy;
use regex::Regex;

/// Profile URL shape that carries a numeric account identifier
static PROFILE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"steamcommunity\.com/profiles/").expect("Invalid profile URL regex"));

/// Extract the account identifier from a profile reference
///
/// The identifier is the final path segment of a URL containing
/// `steamcommunity.com/profiles/`. A trailing slash leaves the final segment
/// empty, which counts as no identifier.
pub fn extract_identifier(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if !PROFILE_URL_REGEX.is_match(reference) {
        return None;
    }

    let id = reference.rsplit('/').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
