//! Holds the gallery: every descriptor keyed by its unique key, with the
//! ordering a host presents them in. Descriptors come from `builtin`, from
//! pack directories found under search roots, or from any `ShaderSub`.
//!
//! Types:
//!
//! - `Gallery` owns the descriptors and enforces key uniqueness on insert.
//! - `RegistryError` reports rejected registrations.
//! - `LoadReport` lists which pack directories loaded and which failed.
//!
//! Functions:
//!
//! - `Gallery::register` and `register_sub` add entries.
//! - `Gallery::load_roots` scans search roots for `sub.toml` directories.
//! - `Gallery::iter_sorted` yields descriptors by sort index, then key.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::builtin;
use crate::descriptor::ShaderDescriptor;
use crate::pack::LocalPack;
use crate::sub::{describe, ShaderSub};
use crate::validate::{validate_collection, ValidationReport};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("sub key must not be empty")]
    EmptyKey,

    #[error("sub key '{0}' is already registered")]
    DuplicateKey(String),
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<(String, PathBuf)>,
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug, Default, Clone)]
pub struct Gallery {
    entries: BTreeMap<String, ShaderDescriptor>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut gallery = Self::new();
        for descriptor in builtin::descriptors() {
            if let Err(err) = gallery.register(descriptor) {
                warn!(error = %err, "skipping built-in sub");
            }
        }
        gallery
    }

    pub fn register(&mut self, descriptor: ShaderDescriptor) -> Result<(), RegistryError> {
        let key = descriptor.key();
        if key.trim().is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        if self.entries.contains_key(key) {
            return Err(RegistryError::DuplicateKey(key.to_string()));
        }
        debug!(key, sort = ?descriptor.sort_index(), "registered sub");
        self.entries.insert(key.to_string(), descriptor);
        Ok(())
    }

    pub fn register_sub(&mut self, sub: &dyn ShaderSub) -> Result<(), RegistryError> {
        self.register(describe(sub))
    }

    pub fn remove(&mut self, key: &str) -> Option<ShaderDescriptor> {
        let removed = self.entries.remove(key);
        if let Some(descriptor) = &removed {
            ShaderSub::destroy(descriptor);
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<&ShaderDescriptor> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Gallery order: entries with a sort index first, ascending, then the
    /// unsorted ones; ties fall back to the key.
    pub fn iter_sorted(&self) -> Vec<&ShaderDescriptor> {
        let mut ordered: Vec<&ShaderDescriptor> = self.entries.values().collect();
        ordered.sort_by(|a, b| gallery_order(a, b));
        ordered
    }

    pub fn validate(&self) -> ValidationReport {
        validate_collection(self.entries.values())
    }

    pub fn load_pack(&mut self, dir: &Path) -> anyhow::Result<String> {
        let descriptor = LocalPack::load(dir)?.into_descriptor()?;
        let key = descriptor.key().to_string();
        self.register(descriptor)?;
        Ok(key)
    }

    /// Registers every pack directory directly below each root. Missing roots
    /// are skipped; broken packs are logged and collected in the report.
    pub fn load_roots(&mut self, roots: &[PathBuf]) -> LoadReport {
        let mut report = LoadReport::default();
        for root in roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "sub root missing; skipping");
                continue;
            }
            let mut children = match fs::read_dir(root) {
                Ok(entries) => entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| LocalPack::is_pack_dir(path))
                    .collect::<Vec<_>>(),
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "failed to list sub root");
                    report.failed.push((root.clone(), err.to_string()));
                    continue;
                }
            };
            children.sort();

            for dir in children {
                match self.load_pack(&dir) {
                    Ok(key) => {
                        debug!(key = %key, path = %dir.display(), "loaded sub pack");
                        report.loaded.push((key, dir));
                    }
                    Err(err) => {
                        warn!(path = %dir.display(), error = %err, "failed to load sub pack");
                        report.failed.push((dir, format!("{err:#}")));
                    }
                }
            }
        }
        report
    }
}

fn gallery_order(a: &ShaderDescriptor, b: &ShaderDescriptor) -> Ordering {
    match (a.sort_index(), b.sort_index()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.key().cmp(b.key()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0); }";

    fn sub(key: &str, sort: Option<u16>) -> ShaderDescriptor {
        ShaderDescriptor::builder(key, key.to_uppercase())
            .sort_opt(sort)
            .fragment(IMAGE)
            .build()
    }

    fn write_pack_dir(root: &Path, name: &str, manifest: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("sub.toml"), manifest).unwrap();
        fs::write(dir.join("image.glsl"), IMAGE).unwrap();
    }

    #[test]
    fn rejects_duplicate_and_empty_keys() {
        let mut gallery = Gallery::new();
        gallery.register(sub("a", Some(1))).unwrap();
        assert!(matches!(
            gallery.register(sub("a", Some(2))),
            Err(RegistryError::DuplicateKey(key)) if key == "a"
        ));
        assert!(matches!(
            gallery.register(sub(" ", None)),
            Err(RegistryError::EmptyKey)
        ));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.get("a").unwrap().sort_index(), Some(1));
    }

    #[test]
    fn orders_by_sort_index_then_key_with_unsorted_last() {
        let mut gallery = Gallery::new();
        let entries = [
            ("zeta", None),
            ("beta", Some(5)),
            ("alpha", Some(5)),
            ("eta", Some(1)),
            ("ant", None),
        ];
        for (key, sort) in entries {
            gallery.register(sub(key, sort)).unwrap();
        }
        let order: Vec<&str> = gallery.iter_sorted().into_iter().map(|d| d.key()).collect();
        assert_eq!(order, vec!["eta", "alpha", "beta", "ant", "zeta"]);
    }

    #[test]
    fn builtins_register_cleanly() {
        let gallery = Gallery::with_builtins();
        assert!(!gallery.is_empty());
        assert!(gallery.contains("gradient"));
        assert!(!gallery.validate().has_errors());
    }

    #[test]
    fn load_roots_registers_packs_and_reports_failures() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("subs");
        write_pack_dir(&root, "one", "key = \"one\"\nname = \"One\"\nsort = 3\n");
        write_pack_dir(&root, "two", "key = \"two\"\nname = \"Two\"\nwebgl = 9\n");
        write_pack_dir(&root, "zdup", "key = \"one\"\nname = \"Again\"\n");
        fs::write(root.join("stray.txt"), "not a pack").unwrap();

        let mut gallery = Gallery::new();
        let report = gallery.load_roots(&[root.clone(), temp.path().join("absent")]);

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().any(|(_, msg)| msg.contains("already registered")));
        assert_eq!(gallery.keys().collect::<Vec<_>>(), vec!["one"]);
    }

    #[test]
    fn remove_returns_descriptor() {
        let mut gallery = Gallery::new();
        gallery.register(sub("gone", None)).unwrap();
        assert!(gallery.remove("gone").is_some());
        assert!(gallery.remove("gone").is_none());
    }
}
