/// Window title → folder name.
///
/// `sanitize` is total: whatever the window manager reports, the result is a
/// single path segment that every desktop filesystem accepts. Shorthands are
/// looked up against the sanitized string, which is why check mode prints it.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest folder name produced, in characters.
pub const MAX_FOLDER_NAME_CHARS: usize = 100;

/// Name used when a title sanitizes to nothing usable.
pub const FALLBACK_NAME: &str = "Untitled";

/// Characters illegal in a path segment on at least one supported platform.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turns a raw window title into a filesystem-safe folder name.
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .take(MAX_FOLDER_NAME_CHARS)
        .collect();

    // Windows silently drops trailing dots, which would make `a.` and `a`
    // collide; strip them up front.
    let name = replaced.trim_end_matches('.');

    match name {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        _ => name.to_string(),
    }
}

/// Exact-match substitutions from sanitized title to folder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShorthandTable(BTreeMap<String, String>);

impl ShorthandTable {
    /// Returns the shorthand for `sanitized`, or `sanitized` itself.
    ///
    /// A single lookup; the replacement is never looked up again.
    pub fn resolve<'a>(&'a self, sanitized: &'a str) -> &'a str {
        self.0.get(sanitized).map(String::as_str).unwrap_or(sanitized)
    }

    /// The shorthand for `sanitized`, if one is configured.
    pub fn get(&self, sanitized: &str) -> Option<&str> {
        self.0.get(sanitized).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for ShorthandTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
