//! Reads the gallery sort index of one entry in a sub directory.
//!
//! Pack directories and `.toml` manifests carry the index as a structured
//! `sort` field. Legacy sub sources only carry it inside a method body such as
//! `sort() {\n    return 250;\n  }`, so those are scanned as text.
use std::fs;
use std::io;
use std::path::Path;

use gallery::{LocalPack, MANIFEST_FILE};
use serde::Deserialize;

const SORT_MARKER: &str = "sort() {";
const RETURN_MARKER: &str = "return ";

/// Finds `sort() {`, then the next `return ` after it, and parses the text up
/// to the following `;` as an integer.
pub fn extract_sort_index(text: &str) -> Option<i64> {
    let sort_at = text.find(SORT_MARKER)?;
    let body = &text[sort_at + SORT_MARKER.len()..];
    let return_at = body.find(RETURN_MARKER)?;
    let value = &body[return_at + RETURN_MARKER.len()..];
    let end = value.find(';')?;
    value[..end].trim().parse().ok()
}

/// Reads the top-level `sort` field of a sub manifest.
pub fn manifest_sort_index(text: &str) -> Option<i64> {
    #[derive(Deserialize)]
    struct SortOnly {
        sort: Option<i64>,
    }

    toml::from_str::<SortOnly>(text).ok()?.sort
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortSource {
    /// Directory holding a `sub.toml`.
    Pack,
    /// Standalone `.toml` manifest file.
    Manifest,
    /// Any other file; scanned as source text.
    Source,
    /// Directories without a manifest and special files.
    Unsupported,
}

impl SortSource {
    pub fn detect(path: &Path) -> Self {
        if path.is_dir() {
            if LocalPack::is_pack_dir(path) {
                Self::Pack
            } else {
                Self::Unsupported
            }
        } else if !path.is_file() {
            Self::Unsupported
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            Self::Manifest
        } else {
            Self::Source
        }
    }

    pub fn read(self, path: &Path) -> io::Result<Option<i64>> {
        match self {
            Self::Pack => Ok(manifest_sort_index(&fs::read_to_string(
                path.join(MANIFEST_FILE),
            )?)),
            Self::Manifest => Ok(manifest_sort_index(&fs::read_to_string(path)?)),
            Self::Source => {
                // Sub sources are UTF-8 in practice; stray bytes must not hide the marker.
                let bytes = fs::read(path)?;
                Ok(extract_sort_index(&String::from_utf8_lossy(&bytes)))
            }
            Self::Unsupported => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_value_from_method_body() {
        let text = "export default class Sub {\n  sort() {\n    return 250;\n  }\n}\n";
        assert_eq!(extract_sort_index(text), Some(250));
    }

    #[test]
    fn skips_returns_before_the_sort_method() {
        let text = "key() { return 'x'; }\n  sort() {\n    return 7;\n  }";
        assert_eq!(extract_sort_index(text), Some(7));
    }

    #[test]
    fn missing_markers_or_non_numeric_values_yield_none() {
        assert_eq!(extract_sort_index("name() { return 'a'; }"), None);
        assert_eq!(extract_sort_index("sort() {\n  // no value\n}"), None);
        assert_eq!(extract_sort_index("sort() {\n  return this.base;\n}"), None);
        assert_eq!(extract_sort_index("sort() {\n  return 12"), None);
        assert_eq!(extract_sort_index("// sort() {\n  return 5;"), Some(5));
    }

    #[test]
    fn reads_manifest_sort_field() {
        assert_eq!(
            manifest_sort_index("key = \"a\"\nname = \"A\"\nsort = 260\n"),
            Some(260)
        );
        assert_eq!(manifest_sort_index("key = \"a\"\n"), None);
        assert_eq!(manifest_sort_index("not toml at all ="), None);
    }

    #[test]
    fn detects_source_kinds() {
        let temp = tempfile::tempdir().unwrap();
        let pack = temp.path().join("pack");
        fs::create_dir_all(&pack).unwrap();
        fs::write(pack.join(MANIFEST_FILE), "key = \"p\"\nname = \"P\"\nsort = 210\n").unwrap();
        let plain_dir = temp.path().join("plain");
        fs::create_dir_all(&plain_dir).unwrap();
        let manifest = temp.path().join("loose.toml");
        fs::write(&manifest, "sort = 3\n").unwrap();
        let source = temp.path().join("sub.ts");
        fs::write(&source, "sort() {\n    return 99;\n  }").unwrap();

        assert_eq!(SortSource::detect(&pack), SortSource::Pack);
        assert_eq!(SortSource::detect(&plain_dir), SortSource::Unsupported);
        assert_eq!(SortSource::detect(&manifest), SortSource::Manifest);
        assert_eq!(SortSource::detect(&source), SortSource::Source);

        assert_eq!(SortSource::Pack.read(&pack).unwrap(), Some(210));
        assert_eq!(SortSource::Manifest.read(&manifest).unwrap(), Some(3));
        assert_eq!(SortSource::Source.read(&source).unwrap(), Some(99));
        assert_eq!(SortSource::Unsupported.read(&plain_dir).unwrap(), None);
    }
}
