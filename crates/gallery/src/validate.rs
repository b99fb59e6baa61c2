//! Structural checks over descriptors. Nothing here compiles GLSL; the checks
//! cover the contract a host relies on before it ever sees the source text:
//! unique non-empty keys, a `mainImage` entry point, and channel slots that
//! fit the four `iChannelN` samplers.
//!
//! Types:
//!
//! - `Issue` is one finding, tagged with the sub key and a `Severity`.
//! - `ValidationReport` aggregates issues across a collection.
//!
//! Functions:
//!
//! - `ShaderDescriptor::validate` runs the per-descriptor checks.
//! - `validate_collection` adds the cross-descriptor key uniqueness check.
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::descriptor::{
    ChannelSource, ShaderDescriptor, MAX_CHANNELS, MAX_CHANNEL_INDEX, MAX_SORT_INDEX,
};

pub const ENTRY_POINT: &str = "mainImage(";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub key: String,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    fn error(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let key = if self.key.is_empty() {
            "<empty key>"
        } else {
            self.key.as_str()
        };
        write!(f, "{level}: [{key}] {}", self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl ShaderDescriptor {
    pub fn validate(&self) -> Vec<Issue> {
        let key = self.key();
        let mut issues = Vec::new();

        if key.trim().is_empty() {
            issues.push(Issue::error(key, "key must not be empty"));
        }
        if self.name().trim().is_empty() {
            issues.push(Issue::warning(key, "display name is empty"));
        }
        if let Some(index) = self.sort_index() {
            if index > MAX_SORT_INDEX {
                issues.push(Issue::error(
                    key,
                    format!("sort index {index} exceeds {MAX_SORT_INDEX}"),
                ));
            }
        }

        if self.fragment_source().trim().is_empty() {
            issues.push(Issue::error(key, "fragment source is empty"));
        } else if !self.fragment_source().contains(ENTRY_POINT) {
            issues.push(Issue::error(
                key,
                "fragment source does not define mainImage(...)",
            ));
        }
        if let Some(common) = self.common_source() {
            if common.trim().is_empty() {
                issues.push(Issue::error(key, "common source is present but empty"));
            }
        }

        let buffers = self.auxiliary_buffers();
        if buffers.len() > MAX_CHANNELS {
            issues.push(Issue::error(
                key,
                format!(
                    "{} auxiliary buffers declared, at most {MAX_CHANNELS} allowed",
                    buffers.len()
                ),
            ));
        }
        let mut buffer_slots = BTreeSet::new();
        for (position, pass) in buffers.iter().enumerate() {
            if pass.channel_index > MAX_CHANNEL_INDEX {
                issues.push(Issue::error(
                    key,
                    format!(
                        "buffer {position} targets channel {} which exceeds Shadertoy limit",
                        pass.channel_index
                    ),
                ));
            } else if !buffer_slots.insert(pass.channel_index) {
                issues.push(Issue::error(
                    key,
                    format!(
                        "buffer {position} reuses channel {} already taken by another buffer",
                        pass.channel_index
                    ),
                ));
            }
            if pass.glsl_source.trim().is_empty() {
                issues.push(Issue::error(key, format!("buffer {position} source is empty")));
            } else if !pass.glsl_source.contains(ENTRY_POINT) {
                issues.push(Issue::error(
                    key,
                    format!("buffer {position} source does not define mainImage(...)"),
                ));
            }
        }

        let channels = self.input_channels();
        if channels.len() > MAX_CHANNELS {
            issues.push(Issue::error(
                key,
                format!(
                    "{} channels declared, at most {MAX_CHANNELS} allowed",
                    channels.len()
                ),
            ));
        }
        let mut channel_slots = BTreeSet::new();
        for binding in channels {
            if binding.channel > MAX_CHANNEL_INDEX {
                issues.push(Issue::error(
                    key,
                    format!(
                        "channel {} exceeds Shadertoy limit of iChannel{MAX_CHANNEL_INDEX}",
                        binding.channel
                    ),
                ));
                continue;
            }
            if !channel_slots.insert(binding.channel) {
                issues.push(Issue::error(
                    key,
                    format!("channel {} bound more than once", binding.channel),
                ));
            }
            if let ChannelSource::Buffer { pass } = binding.source {
                if pass >= buffers.len() {
                    issues.push(Issue::error(
                        key,
                        format!(
                            "channel {} references buffer {pass} which is undefined",
                            binding.channel
                        ),
                    ));
                }
            }
            let sampler = format!("iChannel{}", binding.channel);
            if !self.sources().any(|source| source.contains(&sampler)) {
                issues.push(Issue::warning(
                    key,
                    format!("channel {} is bound but {sampler} is never sampled", binding.channel),
                ));
            }
        }

        issues
    }
}

pub fn validate_collection<'a, I>(descriptors: I) -> ValidationReport
where
    I: IntoIterator<Item = &'a ShaderDescriptor>,
{
    let mut report = ValidationReport::default();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for descriptor in descriptors {
        report.checked += 1;
        report.issues.extend(descriptor.validate());
        let count = seen.entry(descriptor.key()).or_insert(0);
        *count += 1;
        if *count == 2 {
            report.issues.push(Issue::error(
                descriptor.key(),
                "key is not unique across the gallery",
            ));
        }
    }

    report
}
