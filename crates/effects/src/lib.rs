//! Distortion-effect descriptors for the warpview renderer.
//!
//! An effect is a GLSL fragment body defining `vec4 effect_color(vec2 uv)`
//! plus a typed declaration of which frame uniforms that body consumes. The
//! renderer wraps the body with its own uniform/sampler prelude, so bodies
//! stay small and only reference the names declared here. The declaration is
//! checked against the body text once, when the program is built, instead of
//! resolving uniform names frame by frame.
//!
//! Built-in effects cover the classic time-driven distortions (`wave`,
//! `pulse`) and a pointer-driven `ripple`; additional effects load from a
//! TOML manifest via [`EffectManifest`].

mod manifest;

use std::borrow::Cow;

pub use manifest::{EffectManifest, ManifestError, UniformName};

/// Uniform names an effect body may reference beyond `u_resolution`, which is
/// always available (the vertex stage needs it for the clip-space transform).
pub const OPTIONAL_UNIFORMS: [&str; 3] = ["u_time", "u_pointer", "u_pixel_ratio"];

/// Typed declaration of the optional frame uniforms an effect consumes.
///
/// Declaring a uniform the body never reads is fine (the value is simply
/// ignored); the renderer rejects the opposite case before drawing starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformUsage {
    pub time: bool,
    pub pointer: bool,
    pub pixel_ratio: bool,
}

impl UniformUsage {
    /// Usage declaring every optional uniform.
    pub const ALL: Self = Self {
        time: true,
        pointer: true,
        pixel_ratio: true,
    };

    /// Usage declaring only the elapsed-time uniform.
    pub const TIME_ONLY: Self = Self {
        time: true,
        pointer: false,
        pixel_ratio: false,
    };

    /// True when every uniform set in `other` is also set in `self`.
    pub fn covers(&self, other: &UniformUsage) -> bool {
        (self.time || !other.time)
            && (self.pointer || !other.pointer)
            && (self.pixel_ratio || !other.pixel_ratio)
    }

    fn declares(&self, name: &str) -> bool {
        match name {
            "u_time" => self.time,
            "u_pointer" => self.pointer,
            "u_pixel_ratio" => self.pixel_ratio,
            _ => false,
        }
    }
}

/// A named fragment body plus its declared uniform usage.
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    name: String,
    body: Cow<'static, str>,
    uniforms: UniformUsage,
}

impl EffectDescriptor {
    /// Builds a descriptor from owned parts (manifest-loaded effects).
    pub fn from_parts(name: impl Into<String>, body: String, uniforms: UniformUsage) -> Self {
        Self {
            name: name.into(),
            body: Cow::Owned(body),
            uniforms,
        }
    }

    /// Resolves a built-in effect by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let (body, uniforms) = match name {
            "wave" => (WAVE_BODY, UniformUsage::TIME_ONLY),
            "pulse" => (PULSE_BODY, UniformUsage::TIME_ONLY),
            "ripple" => (RIPPLE_BODY, UniformUsage::ALL),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            body: Cow::Borrowed(body),
            uniforms,
        })
    }

    /// Names of all built-in effects, in presentation order.
    pub fn builtin_names() -> &'static [&'static str] {
        &["wave", "pulse", "ripple"]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn uniforms(&self) -> UniformUsage {
        self.uniforms
    }

    /// Returns human-readable issues instead of panicking, so callers can
    /// surface misconfigured effects with context.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push("effect name must not be empty".to_string());
        }
        if !references_identifier(&self.body, "effect_color") {
            issues.push(format!(
                "effect '{}' must define vec4 effect_color(vec2 uv)",
                self.name
            ));
        }
        for name in OPTIONAL_UNIFORMS {
            if references_identifier(&self.body, name) && !self.uniforms.declares(name) {
                issues.push(format!(
                    "effect '{}' references {} but does not declare it",
                    self.name, name
                ));
            }
        }
        issues
    }

    /// The optional uniforms the body text actually references.
    pub fn referenced_uniforms(&self) -> UniformUsage {
        UniformUsage {
            time: references_identifier(&self.body, "u_time"),
            pointer: references_identifier(&self.body, "u_pointer"),
            pixel_ratio: references_identifier(&self.body, "u_pixel_ratio"),
        }
    }
}

/// Whole-word search: `u_time` must not match inside `u_time_delta`.
fn references_identifier(source: &str, identifier: &str) -> bool {
    let mut search_from = 0;
    while let Some(found) = source[search_from..].find(identifier) {
        let start = search_from + found;
        let end = start + identifier.len();
        let before_ok = start == 0
            || !source[..start]
                .chars()
                .next_back()
                .is_some_and(is_identifier_char);
        let after_ok = !source[end..].chars().next().is_some_and(is_identifier_char);
        if before_ok && after_ok {
            return true;
        }
        search_from = end;
    }
    false
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Sinusoidal texture-coordinate offset; the ripple frequency collapses as
/// time grows, settling the image.
const WAVE_BODY: &str = r"vec4 effect_color(vec2 uv) {
    float frequency = 400.0;
    float amplitude = 0.05;

    vec2 distortion = sin(uv * frequency / (u_time * 5.0)) * amplitude;

    return texture(u_image, uv + distortion);
}
";

/// Pulsating zoom about the image centre; samples that leave the unit square
/// render black rather than clamping to a smeared edge.
const PULSE_BODY: &str = r"vec4 effect_color(vec2 uv) {
    vec2 center = vec2(0.5, 0.5);

    vec2 delta = uv - center;
    float zoom = 1.0 + length(delta) * 0.5 * sin(u_time * 2.0);

    vec2 zoomed = center + delta / zoom;
    if (zoomed.x < 0.0 || zoomed.x > 1.0 || zoomed.y < 0.0 || zoomed.y > 1.0) {
        return vec4(0.0, 0.0, 0.0, 1.0);
    }

    return texture(u_image, zoomed);
}
";

/// Rings radiating from the pointer position, attenuated with distance. The
/// ring frequency is scaled by the pixel ratio so hi-dpi displays see the
/// same spatial wavelength.
const RIPPLE_BODY: &str = r"vec4 effect_color(vec2 uv) {
    vec2 pointer = u_pointer / u_resolution;

    vec2 delta = uv - pointer;
    float dist = length(delta);
    float falloff = exp(-dist * 4.0);
    float ring = sin(dist * 60.0 / u_pixel_ratio - u_time * 6.0);

    vec2 offset = dist > 0.0 ? (delta / dist) * ring * 0.02 * falloff : vec2(0.0);
    return texture(u_image, uv + offset);
}
";
