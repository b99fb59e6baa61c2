use crate::descriptor::{BufferPass, ChannelBinding, ShaderDescriptor, WebGlVersion};

/// Capability set a host needs from one gallery entry.
///
/// `key`, `name` and `user_fragment` are required; everything else has a
/// default matching a plain single-pass WebGL2 shader. Lifecycle hooks run on
/// the host side when the sub's canvas is mounted and unmounted.
pub trait ShaderSub {
    fn key(&self) -> &str;

    fn name(&self) -> &str;

    fn user_fragment(&self) -> &str;

    fn sort(&self) -> Option<u16> {
        None
    }

    fn webgl(&self) -> WebGlVersion {
        WebGlVersion::WebGl2
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn common(&self) -> Option<&str> {
        None
    }

    fn buffers(&self) -> &[BufferPass] {
        &[]
    }

    fn channels(&self) -> &[ChannelBinding] {
        &[]
    }

    fn fragment_precision(&self) -> Option<&str> {
        None
    }

    fn initial(&self) {}

    fn destroy(&self) {}
}

impl ShaderSub for ShaderDescriptor {
    fn key(&self) -> &str {
        ShaderDescriptor::key(self)
    }

    fn name(&self) -> &str {
        ShaderDescriptor::name(self)
    }

    fn user_fragment(&self) -> &str {
        self.fragment_source()
    }

    fn sort(&self) -> Option<u16> {
        self.sort_index()
    }

    fn webgl(&self) -> WebGlVersion {
        ShaderDescriptor::webgl(self)
    }

    fn tags(&self) -> &[String] {
        ShaderDescriptor::tags(self)
    }

    fn common(&self) -> Option<&str> {
        self.common_source()
    }

    fn buffers(&self) -> &[BufferPass] {
        self.auxiliary_buffers()
    }

    fn channels(&self) -> &[ChannelBinding] {
        self.input_channels()
    }

    fn fragment_precision(&self) -> Option<&str> {
        ShaderDescriptor::fragment_precision(self)
    }
}

/// Snapshots any sub into a plain descriptor the registry can store.
pub fn describe(sub: &dyn ShaderSub) -> ShaderDescriptor {
    let mut builder = ShaderDescriptor::builder(sub.key(), sub.name())
        .sort_opt(sub.sort())
        .webgl(sub.webgl())
        .fragment(sub.user_fragment());
    if let Some(common) = sub.common() {
        builder = builder.common(common);
    }
    if let Some(precision) = sub.fragment_precision() {
        builder = builder.precision(precision);
    }
    for tag in sub.tags() {
        builder = builder.tag(tag.clone());
    }
    for pass in sub.buffers() {
        builder = builder.buffer(pass.glsl_source.clone(), pass.channel_index);
    }
    for binding in sub.channels() {
        builder = builder.channel(binding.channel, binding.source.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ChannelSource;

    struct Minimal;

    impl ShaderSub for Minimal {
        fn key(&self) -> &str {
            "minimal"
        }

        fn name(&self) -> &str {
            "Minimal"
        }

        fn user_fragment(&self) -> &str {
            "void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0); }"
        }
    }

    #[test]
    fn optional_members_default_to_single_pass_webgl2() {
        let descriptor = describe(&Minimal);
        assert_eq!(descriptor.key(), "minimal");
        assert_eq!(descriptor.sort_index(), None);
        assert_eq!(descriptor.webgl(), WebGlVersion::WebGl2);
        assert!(descriptor.common_source().is_none());
        assert!(descriptor.auxiliary_buffers().is_empty());
        assert!(descriptor.input_channels().is_empty());
    }

    #[test]
    fn lifecycle_hooks_default_to_no_ops() {
        let sub = Minimal;
        sub.initial();
        sub.destroy();
        assert_eq!(describe(&sub).key(), "minimal");
    }

    #[test]
    fn describe_preserves_descriptor_fields() {
        let original = ShaderDescriptor::builder("noisy", "Noisy")
            .sort(42)
            .webgl(WebGlVersion::WebGl1)
            .common("float hash(float n) { return fract(sin(n) * 43758.5453); }")
            .fragment("void mainImage(out vec4 c, in vec2 p) { c = texture(iChannel0, p); }")
            .channel(0, ChannelSource::Noise { size: 64 })
            .precision("mediump")
            .tag("noise")
            .build();

        let copy = describe(&original);
        assert_eq!(copy, original);
    }
}
