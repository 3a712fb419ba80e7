//! Segment-wise URL path matching against allow-list patterns.
//!
//! A pattern is a `/`-separated list of segments where `*` stands for
//! exactly one segment. A pattern may be longer than the candidate path;
//! the extra positions only match when they are wildcards.

use crate::constants::WILDCARD_SEGMENT;
use http::Uri;

/// Extract the path component of an absolute URL or origin-relative path.
///
/// Scheme, authority, query and fragment are discarded. Inputs without a
/// scheme are taken verbatim up to the first `?` or `#`.
///
/// # Returns
/// `None` when the input is empty, cannot be parsed, or carries no path.
pub fn extract_path(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    if !candidate.contains("://") && !candidate.starts_with("//") {
        let end = candidate.find(['?', '#']).unwrap_or(candidate.len());
        let path = &candidate[..end];
        return (!path.is_empty()).then(|| path.to_string());
    }

    let uri = parse_absolute(candidate)?;
    let path = uri.path();
    (!path.is_empty()).then(|| path.to_string())
}

/// Host of an absolute (or protocol-relative) referer URL.
///
/// # Returns
/// `None` for relative referers or values that do not parse as a URI.
pub fn referer_host(referer: &str) -> Option<String> {
    let referer = referer.trim();
    if !referer.contains("://") && !referer.starts_with("//") {
        return None;
    }
    parse_absolute(referer)?.host().map(str::to_string)
}

fn parse_absolute(candidate: &str) -> Option<Uri> {
    let parsed = if candidate.starts_with("//") {
        format!("http:{candidate}").parse::<Uri>()
    } else {
        candidate.parse::<Uri>()
    };
    match parsed {
        Ok(uri) => Some(uri),
        Err(err) => {
            tracing::debug!("Unparsable URL {:?}: {}", candidate, err);
            None
        }
    }
}

/// Split a path (or pattern) into segments after trimming outer slashes.
///
/// The root path yields a single empty segment.
pub fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// Whether one pre-split pattern matches the candidate segments.
pub fn pattern_matches(pattern: &[&str], candidate: &[&str]) -> bool {
    if pattern.len() < candidate.len() {
        return false;
    }
    pattern.iter().enumerate().all(|(index, segment)| {
        *segment == WILDCARD_SEGMENT || candidate.get(index) == Some(segment)
    })
}

/// Decide whether `candidate_url` matches at least one of `patterns`.
///
/// # Returns
/// `false` for an empty pattern list or a candidate without a path.
pub fn matches<S: AsRef<str>>(candidate_url: &str, patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let Some(path) = extract_path(candidate_url) else {
        return false;
    };
    let candidate = segments(&path);
    patterns
        .iter()
        .any(|pattern| pattern_matches(&segments(pattern.as_ref()), &candidate))
}
