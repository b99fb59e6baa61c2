//! Defines the record every gallery entry reduces to. Built-in subs, on-disk
//! packs and arbitrary `ShaderSub` implementors all end up as a
//! `ShaderDescriptor`, which `registry` orders and `validate` checks.
//!
//! Types:
//!
//! - `ShaderDescriptor` holds the key, display name, sort index, GLSL text and
//!   channel wiring for one sub. It is immutable once built.
//! - `BufferPass` is an auxiliary render pass whose output feeds a channel.
//! - `ChannelBinding` pairs an `iChannelN` slot with a `ChannelSource`.
//! - `WebGlVersion` records which GLSL dialect the host must compile.
//!
//! Functions:
//!
//! - `ShaderDescriptor::builder` starts a `ShaderDescriptorBuilder`, the only
//!   way to assemble a descriptor outside of deserialization.
use serde::{Deserialize, Serialize};

/// Upper bound on auxiliary buffers and channel bindings per sub.
pub const MAX_CHANNELS: usize = 4;

/// Highest `iChannelN` slot the Shadertoy convention exposes.
pub const MAX_CHANNEL_INDEX: u8 = 3;

/// Highest sort index the gallery orders by.
pub const MAX_SORT_INDEX: u16 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebGlVersion {
    WebGl1,
    #[default]
    WebGl2,
}

impl WebGlVersion {
    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            1 => Some(Self::WebGl1),
            2 => Some(Self::WebGl2),
            _ => None,
        }
    }

    pub fn major(self) -> u8 {
        match self {
            Self::WebGl1 => 1,
            Self::WebGl2 => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPass {
    pub glsl_source: String,
    pub channel_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    pub channel: u8,
    #[serde(flatten)]
    pub source: ChannelSource,
}

impl ChannelBinding {
    pub fn new(channel: u8, source: ChannelSource) -> Self {
        Self { channel, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelSource {
    /// Named static texture supplied by the host, e.g. `TEXTURE1`.
    Texture { name: String },
    /// Procedurally generated noise texture of `size`x`size` texels.
    Noise { size: u32 },
    /// Output of `auxiliary_buffers[pass]`.
    Buffer { pass: usize },
    Keyboard,
    /// Previous frame of the image pass.
    SelfFeedback,
}

impl ChannelSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Texture { .. } => "texture",
            Self::Noise { .. } => "noise",
            Self::Buffer { .. } => "buffer",
            Self::Keyboard => "keyboard",
            Self::SelfFeedback => "self_feedback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderDescriptor {
    key: String,
    name: String,
    sort_index: Option<u16>,
    webgl: WebGlVersion,
    fragment_source: String,
    common_source: Option<String>,
    auxiliary_buffers: Vec<BufferPass>,
    input_channels: Vec<ChannelBinding>,
    tags: Vec<String>,
    fragment_precision: Option<String>,
    description: Option<String>,
}

impl ShaderDescriptor {
    pub fn builder(key: impl Into<String>, name: impl Into<String>) -> ShaderDescriptorBuilder {
        ShaderDescriptorBuilder {
            inner: ShaderDescriptor {
                key: key.into(),
                name: name.into(),
                sort_index: None,
                webgl: WebGlVersion::default(),
                fragment_source: String::new(),
                common_source: None,
                auxiliary_buffers: Vec::new(),
                input_channels: Vec::new(),
                tags: Vec::new(),
                fragment_precision: None,
                description: None,
            },
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort_index(&self) -> Option<u16> {
        self.sort_index
    }

    pub fn webgl(&self) -> WebGlVersion {
        self.webgl
    }

    pub fn uses_webgl2(&self) -> bool {
        self.webgl == WebGlVersion::WebGl2
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn common_source(&self) -> Option<&str> {
        self.common_source.as_deref()
    }

    pub fn auxiliary_buffers(&self) -> &[BufferPass] {
        &self.auxiliary_buffers
    }

    pub fn input_channels(&self) -> &[ChannelBinding] {
        &self.input_channels
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn fragment_precision(&self) -> Option<&str> {
        self.fragment_precision.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Every GLSL text the host compiles for this sub: common, image, buffers.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.common_source
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.fragment_source.as_str()))
            .chain(self.auxiliary_buffers.iter().map(|b| b.glsl_source.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct ShaderDescriptorBuilder {
    inner: ShaderDescriptor,
}

impl ShaderDescriptorBuilder {
    pub fn sort(mut self, index: u16) -> Self {
        self.inner.sort_index = Some(index);
        self
    }

    pub fn sort_opt(mut self, index: Option<u16>) -> Self {
        self.inner.sort_index = index;
        self
    }

    pub fn webgl(mut self, version: WebGlVersion) -> Self {
        self.inner.webgl = version;
        self
    }

    pub fn fragment(mut self, source: impl Into<String>) -> Self {
        self.inner.fragment_source = source.into();
        self
    }

    pub fn common(mut self, source: impl Into<String>) -> Self {
        self.inner.common_source = Some(source.into());
        self
    }

    pub fn buffer(mut self, source: impl Into<String>, channel_index: u8) -> Self {
        self.inner.auxiliary_buffers.push(BufferPass {
            glsl_source: source.into(),
            channel_index,
        });
        self
    }

    pub fn channel(mut self, channel: u8, source: ChannelSource) -> Self {
        self.inner
            .input_channels
            .push(ChannelBinding::new(channel, source));
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.inner.tags.push(tag.into());
        self
    }

    pub fn precision(mut self, precision: impl Into<String>) -> Self {
        self.inner.fragment_precision = Some(precision.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    pub fn build(self) -> ShaderDescriptor {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_passes_and_channels() {
        let descriptor = ShaderDescriptor::builder("trail", "Trail")
            .sort(120)
            .fragment("void mainImage(out vec4 c, in vec2 p) { c = texture(iChannel0, p); }")
            .buffer("void mainImage(out vec4 c, in vec2 p) { c = vec4(0.0); }", 0)
            .channel(0, ChannelSource::Buffer { pass: 0 })
            .channel(1, ChannelSource::Noise { size: 256 })
            .tag("feedback")
            .build();

        assert_eq!(descriptor.key(), "trail");
        assert_eq!(descriptor.sort_index(), Some(120));
        assert!(descriptor.uses_webgl2());
        assert_eq!(descriptor.auxiliary_buffers().len(), 1);
        assert_eq!(descriptor.input_channels()[1].source.kind(), "noise");
        assert_eq!(descriptor.sources().count(), 2);
    }

    #[test]
    fn channel_binding_serializes_with_type_tag() {
        let binding = ChannelBinding::new(
            2,
            ChannelSource::Texture {
                name: "TEXTURE1".into(),
            },
        );
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["channel"], 2);
        assert_eq!(json["type"], "texture");
        assert_eq!(json["name"], "TEXTURE1");
    }
}
