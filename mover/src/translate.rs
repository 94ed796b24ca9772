/// Prefix rewriting for recording paths.
///
/// OBS reports paths as it sees them; when it writes to a share that this
/// process mounts elsewhere, the table maps one view onto the other.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One `from` → `to` prefix rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub from: String,
    pub to: String,
}

/// Ordered prefix rules. The first entry whose `from` prefixes the path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(Vec<TranslationEntry>);

impl TranslationTable {
    /// Rewrites the prefix of `path` using the first matching entry.
    ///
    /// Matching is per path component, so `/mnt/drive` does not match
    /// `/mnt/drive2/out.mkv`. Paths with no matching entry come back unchanged.
    pub fn translate(&self, path: &Path) -> PathBuf {
        for entry in &self.0 {
            if let Ok(rest) = path.strip_prefix(&entry.from) {
                let to = Path::new(&entry.to);
                return if rest.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rest)
                };
            }
        }
        path.to_path_buf()
    }

    pub fn entries(&self) -> &[TranslationEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(from, to)| TranslationEntry { from, to })
                .collect(),
        )
    }
}
