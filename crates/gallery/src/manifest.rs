//! Defines the `sub.toml` schema for subs stored on disk. A manifest names the
//! GLSL files that make up a sub and carries the metadata a `ShaderDescriptor`
//! needs, so `pack` can turn a directory into a descriptor and back.
//!
//! Types:
//!
//! - `SubManifest` captures key, name, sort index, GLSL file names and wiring.
//! - `BufferEntry` points at one auxiliary buffer source and its channel.
//! - `ChannelEntry` mirrors `ChannelBinding` with on-disk friendly field names.
//!
//! Functions:
//!
//! - `SubManifest::validate` returns human-readable issues so pack loaders can
//!   surface misconfigurations before any GLSL is read.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::descriptor::{ChannelSource, MAX_CHANNELS, MAX_CHANNEL_INDEX, MAX_SORT_INDEX};

pub const MANIFEST_FILE: &str = "sub.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SubManifest {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<u16>,
    #[serde(default = "default_webgl")]
    pub webgl: u8,
    #[serde(default = "default_fragment")]
    pub fragment: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub buffers: Vec<BufferEntry>,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

fn default_webgl() -> u8 {
    2
}

fn default_fragment() -> PathBuf {
    PathBuf::from("image.glsl")
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BufferEntry {
    pub source: PathBuf,
    pub channel: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChannelEntry {
    pub channel: u8,
    #[serde(flatten)]
    pub source: ChannelSource,
}

impl SubManifest {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.key.trim().is_empty() {
            issues.push("manifest key must not be empty".to_string());
        }
        if !matches!(self.webgl, 1 | 2) {
            issues.push(format!("unsupported webgl version {}", self.webgl));
        }
        if let Some(sort) = self.sort {
            if sort > MAX_SORT_INDEX {
                issues.push(format!("sort index {sort} exceeds {MAX_SORT_INDEX}"));
            }
        }
        if self.buffers.len() > MAX_CHANNELS {
            issues.push(format!(
                "{} buffers declared, at most {MAX_CHANNELS} allowed",
                self.buffers.len()
            ));
        }
        if self.channels.len() > MAX_CHANNELS {
            issues.push(format!(
                "{} channels declared, at most {MAX_CHANNELS} allowed",
                self.channels.len()
            ));
        }
        for entry in &self.buffers {
            if entry.channel > MAX_CHANNEL_INDEX {
                issues.push(format!(
                    "buffer '{}' uses channel {} which exceeds Shadertoy limit",
                    entry.source.display(),
                    entry.channel
                ));
            }
        }
        for entry in &self.channels {
            if entry.channel > MAX_CHANNEL_INDEX {
                issues.push(format!(
                    "channel {} exceeds Shadertoy limit",
                    entry.channel
                ));
            }
            if let ChannelSource::Buffer { pass } = entry.source {
                if pass >= self.buffers.len() {
                    issues.push(format!(
                        "channel {} references buffer {pass} which is undefined",
                        entry.channel
                    ));
                }
            }
        }
        issues
    }
}
