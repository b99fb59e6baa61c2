//! Bundled subs that ship with every gallery. They are deliberately small and
//! cover the shapes a host has to handle: single pass, shared common source, a
//! feedback buffer and a noise texture input.
use crate::descriptor::{ChannelSource, ShaderDescriptor, WebGlVersion};

const GRADIENT: &str = r#"
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord / iResolution.xy;
    vec3 col = 0.5 + 0.5 * cos(iTime + uv.xyx + vec3(0.0, 2.0, 4.0));
    fragColor = vec4(col, 1.0);
}
"#;

const RINGS_COMMON: &str = r#"
float ring(vec2 p, float r, float w)
{
    return smoothstep(w, 0.0, abs(length(p) - r));
}
"#;

const RINGS: &str = r#"
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 p = (2.0 * fragCoord - iResolution.xy) / iResolution.y;
    float v = 0.0;
    for (int i = 0; i < 6; i++) {
        float r = fract(0.15 * float(i) + 0.1 * iTime);
        v += ring(p, r, 0.02) * (1.0 - r);
    }
    fragColor = vec4(vec3(v), 1.0);
}
"#;

const TRAIL_BUFFER: &str = r#"
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord / iResolution.xy;
    vec4 prev = texture(iChannel0, uv) * 0.96;
    vec2 m = iMouse.z > 0.0 ? iMouse.xy : 0.5 * iResolution.xy
        + 0.3 * iResolution.y * vec2(cos(iTime), sin(1.3 * iTime));
    float d = length(fragCoord - m);
    fragColor = max(prev, vec4(smoothstep(12.0, 0.0, d)));
}
"#;

const TRAIL_IMAGE: &str = r#"
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord / iResolution.xy;
    float t = texture(iChannel0, uv).r;
    fragColor = vec4(t * vec3(1.0, 0.6, 0.2), 1.0);
}
"#;

const PLASMA: &str = r#"
void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord / iResolution.xy;
    float n = texture(iChannel0, uv * 0.25 + 0.01 * iTime).r;
    float v = sin(10.0 * uv.x + iTime) + sin(10.0 * (uv.y + n) - iTime);
    fragColor = vec4(0.5 + 0.5 * sin(vec3(v, v + 2.0, v + 4.0)), 1.0);
}
"#;

pub fn descriptors() -> Vec<ShaderDescriptor> {
    vec![
        ShaderDescriptor::builder("gradient", "Cosine Gradient")
            .sort(10)
            .fragment(GRADIENT.trim_start())
            .tag("basic")
            .description("Time-varying cosine palette across the screen")
            .build(),
        ShaderDescriptor::builder("rings", "Expanding Rings")
            .sort(20)
            .common(RINGS_COMMON.trim_start())
            .fragment(RINGS.trim_start())
            .tag("basic")
            .tag("sdf")
            .build(),
        ShaderDescriptor::builder("trail", "Feedback Trail")
            .sort(250)
            .fragment(TRAIL_IMAGE.trim_start())
            .buffer(TRAIL_BUFFER.trim_start(), 0)
            .channel(0, ChannelSource::Buffer { pass: 0 })
            .tag("multipass")
            .build(),
        ShaderDescriptor::builder("plasma", "Noise Plasma")
            .sort(300)
            .webgl(WebGlVersion::WebGl1)
            .precision("mediump")
            .fragment(PLASMA.trim_start())
            .channel(0, ChannelSource::Noise { size: 256 })
            .tag("noise")
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_collection;

    #[test]
    fn builtins_are_valid_and_clean() {
        let builtins = descriptors();
        let report = validate_collection(&builtins);
        assert_eq!(report.checked, builtins.len());
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }
}
