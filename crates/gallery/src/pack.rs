//! Wraps a sub directory so the registry and the CLI can load manifests,
//! read GLSL sources and write descriptors back out consistently. Filesystem
//! validation stays here; callers only see `ShaderDescriptor`s.
//!
//! Types:
//!
//! - `PackError` classifies manifest parsing, validation and I/O failures.
//! - `LocalPack` stores the resolved root directory and parsed `SubManifest`.
//!
//! Functions:
//!
//! - `LocalPack::load` reads `sub.toml`, validates it and returns a handle.
//! - `LocalPack::into_descriptor` reads every GLSL file and builds the
//!   descriptor; missing sources are reported together.
//! - `write_pack` materializes a descriptor as a directory `load` accepts.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::descriptor::{ShaderDescriptor, WebGlVersion};
use crate::manifest::{BufferEntry, ChannelEntry, SubManifest, MANIFEST_FILE};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("failed to serialize manifest: {0}")]
    ManifestSerialize(#[from] toml::ser::Error),

    #[error("manifest validation failed: {0:?}")]
    ManifestValidation(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct LocalPack {
    root: PathBuf,
    manifest: SubManifest,
}

impl LocalPack {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, PackError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(PackError::ManifestMissing(manifest_path));
        }

        let manifest_raw = fs::read_to_string(&manifest_path)?;
        let manifest: SubManifest = toml::from_str(&manifest_raw)?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(PackError::ManifestValidation(issues));
        }

        debug!(path = %root.display(), key = %manifest.key, "loaded sub manifest");
        Ok(Self { root, manifest })
    }

    pub fn is_pack_dir(path: &Path) -> bool {
        path.is_dir() && path.join(MANIFEST_FILE).is_file()
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn manifest(&self) -> &SubManifest {
        &self.manifest
    }

    pub fn fragment_path(&self) -> PathBuf {
        self.root.join(&self.manifest.fragment)
    }

    /// Every GLSL file the manifest references, in load order.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(common) = &self.manifest.common {
            paths.push(self.root.join(common));
        }
        paths.push(self.fragment_path());
        paths.extend(
            self.manifest
                .buffers
                .iter()
                .map(|entry| self.root.join(&entry.source)),
        );
        paths
    }

    pub fn into_descriptor(self) -> Result<ShaderDescriptor, PackError> {
        let missing: Vec<String> = self
            .source_paths()
            .into_iter()
            .filter(|path| !path.is_file())
            .map(|path| format!("missing shader source: {}", path.display()))
            .collect();
        if !missing.is_empty() {
            return Err(PackError::ManifestValidation(missing));
        }

        let manifest = self.manifest;
        let webgl = WebGlVersion::from_major(manifest.webgl).unwrap_or_default();
        let mut builder = ShaderDescriptor::builder(manifest.key, manifest.name)
            .sort_opt(manifest.sort)
            .webgl(webgl)
            .fragment(fs::read_to_string(self.root.join(&manifest.fragment))?);
        if let Some(common) = &manifest.common {
            builder = builder.common(fs::read_to_string(self.root.join(common))?);
        }
        if let Some(precision) = manifest.precision {
            builder = builder.precision(precision);
        }
        if let Some(description) = manifest.description {
            builder = builder.description(description);
        }
        for tag in manifest.tags {
            builder = builder.tag(tag);
        }
        for entry in &manifest.buffers {
            let source = fs::read_to_string(self.root.join(&entry.source))?;
            builder = builder.buffer(source, entry.channel);
        }
        for entry in manifest.channels {
            builder = builder.channel(entry.channel, entry.source);
        }
        Ok(builder.build())
    }
}

/// Writes `descriptor` as a pack under `dir`, returning the manifest path.
pub fn write_pack(descriptor: &ShaderDescriptor, dir: &Path) -> Result<PathBuf, PackError> {
    fs::create_dir_all(dir)?;

    let common = match descriptor.common_source() {
        Some(source) => {
            let path = PathBuf::from("common.glsl");
            fs::write(dir.join(&path), source)?;
            Some(path)
        }
        None => None,
    };

    let fragment = PathBuf::from("image.glsl");
    fs::write(dir.join(&fragment), descriptor.fragment_source())?;

    let mut buffers = Vec::new();
    for (position, pass) in descriptor.auxiliary_buffers().iter().enumerate() {
        let source = PathBuf::from(format!("buffer_{}.glsl", buffer_letter(position)));
        fs::write(dir.join(&source), &pass.glsl_source)?;
        buffers.push(BufferEntry {
            source,
            channel: pass.channel_index,
        });
    }

    let manifest = SubManifest {
        key: descriptor.key().to_string(),
        name: descriptor.name().to_string(),
        sort: descriptor.sort_index(),
        webgl: descriptor.webgl().major(),
        fragment,
        common,
        precision: descriptor.fragment_precision().map(str::to_string),
        description: descriptor.description().map(str::to_string),
        tags: descriptor.tags().to_vec(),
        buffers,
        channels: descriptor
            .input_channels()
            .iter()
            .map(|binding| ChannelEntry {
                channel: binding.channel,
                source: binding.source.clone(),
            })
            .collect(),
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, toml::to_string(&manifest)?)?;
    debug!(path = %manifest_path.display(), key = descriptor.key(), "wrote sub pack");
    Ok(manifest_path)
}

fn buffer_letter(position: usize) -> char {
    (b'a' + (position % 26) as u8) as char
}
