//! Fragment Source - Discovery and Parsing
//!
//! Walks a folder, picks the matching JSON files in sorted path order and
//! parses each into a flat key -> value fragment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// One parsed input file. Key order follows the file.
pub type Fragment = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fragment {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which files under a root are fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// Every `*.json` file.
    AnyJson,
    /// Only files named `<stem>.json`.
    Named(String),
}

impl NameFilter {
    pub fn matches(&self, path: &Path) -> bool {
        if path.extension().map_or(true, |e| e != "json") {
            return false;
        }
        match self {
            NameFilter::AnyJson => true,
            NameFilter::Named(stem) => path.file_stem().is_some_and(|s| s == stem.as_str()),
        }
    }
}

/// Yields the parsed fragments under a root.
pub trait FragmentSource {
    fn fragments(&self, root: &Path, filter: &NameFilter) -> Result<Vec<Fragment>, SourceError>;
}

/// Reads fragments from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectorySource;

impl DirectorySource {
    /// Matching files under `root`, sorted by path text for determinism.
    pub fn discover(root: &Path, filter: &NameFilter) -> Result<Vec<PathBuf>, SourceError> {
        if !root.exists() {
            tracing::debug!(root = %root.display(), "source folder missing, nothing to read");
            return Ok(vec![]);
        }

        let mut paths = vec![];
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| SourceError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && filter.matches(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        // whole-path text order: "a.json" sorts before "a/b.json"
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Ok(paths)
    }

    pub fn read_fragment(path: &Path) -> Result<Fragment, SourceError> {
        tracing::debug!(path = %path.display(), "reading file");
        let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SourceError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl FragmentSource for DirectorySource {
    fn fragments(&self, root: &Path, filter: &NameFilter) -> Result<Vec<Fragment>, SourceError> {
        Self::discover(root, filter)?
            .iter()
            .map(|path| Self::read_fragment(path))
            .collect()
    }
}

/// Merge fragments by key; later fragments overwrite earlier keys.
pub fn merge_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Fragment {
    let mut merged = Fragment::new();
    for fragment in fragments {
        for (key, value) in fragment {
            merged.insert(key, value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_filter_matches() {
        assert!(NameFilter::AnyJson.matches(Path::new("a/b.json")));
        assert!(!NameFilter::AnyJson.matches(Path::new("a/b.toml")));
        let named = NameFilter::Named("hestalon".into());
        assert!(named.matches(Path::new("styles/x/hestalon.json")));
        assert!(!named.matches(Path::new("styles/other.json")));
    }

    #[test]
    fn test_discover_sorted_recursive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "z.json", "{}");
        write(dir.path(), "a/b.json", "{}");
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "notes.txt", "");
        let paths = DirectorySource::discover(dir.path(), &NameFilter::AnyJson).unwrap();
        let rel: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a.json", "a/b.json", "z.json"]);
    }

    #[test]
    fn test_sibling_file_merges_before_folder_contents() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/b.json", r#"{"key": "folder"}"#);
        write(dir.path(), "a.json", r#"{"key": "file"}"#);
        let merged = merge_fragments(
            DirectorySource
                .fragments(dir.path(), &NameFilter::AnyJson)
                .unwrap(),
        );
        assert_eq!(merged["key"], json!("folder"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let fragments = DirectorySource
            .fragments(&dir.path().join("nope"), &NameFilter::AnyJson)
            .unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_malformed_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad.json", "{ \"a\": ");
        let err = DirectorySource
            .fragments(dir.path(), &NameFilter::AnyJson)
            .unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_merge_later_wins_keeps_position() {
        let first: Fragment = serde_json::from_value(json!({"a": 1, "b": 2})).unwrap();
        let second: Fragment = serde_json::from_value(json!({"c": 3, "a": 9})).unwrap();
        let merged = merge_fragments(vec![first, second]);
        let keys: Vec<_> = merged.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged["a"], json!(9));
    }
}
