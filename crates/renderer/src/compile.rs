use std::borrow::Cow;

use effects::EffectDescriptor;
use wgpu::naga::ShaderStage as NagaStage;

use crate::error::{RenderError, ShaderStage};

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RenderError> {
    compile_stage(
        device,
        ShaderStage::Vertex,
        "quad vertex",
        Cow::Borrowed(VERTEX_SHADER_GLSL),
    )
}

/// Wraps the effect body with our prelude and compiles it as Vulkan GLSL.
///
/// The descriptor is checked against the body first, so a mismatch between
/// what the effect declares and what its text references surfaces as a
/// [`RenderError::BindingFault`] before the driver ever sees the source.
pub(crate) fn compile_effect_fragment(
    device: &wgpu::Device,
    effect: &EffectDescriptor,
) -> Result<wgpu::ShaderModule, RenderError> {
    check_descriptor(effect)?;
    let wrapped = wrap_effect_fragment(effect.body());
    compile_stage(
        device,
        ShaderStage::Fragment,
        "effect fragment",
        Cow::Owned(wrapped),
    )
}

/// Validates the effect's typed uniform declaration once, at build time.
pub(crate) fn check_descriptor(effect: &EffectDescriptor) -> Result<(), RenderError> {
    let issues = effect.validate();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(RenderError::BindingFault(issues.join("; ")))
    }
}

/// Compiles one stage under a validation error scope so the diagnostic text
/// can be attributed to the stage that produced it.
fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    label: &str,
    source: Cow<'_, str>,
) -> Result<wgpu::ShaderModule, RenderError> {
    let naga_stage = match stage {
        ShaderStage::Vertex => NagaStage::Vertex,
        ShaderStage::Fragment => NagaStage::Fragment,
    };

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: source,
            stage: naga_stage,
            defines: &[],
        },
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(RenderError::Compile {
            stage,
            log: error.to_string(),
        });
    }
    Ok(module)
}

/// Produces a self-contained GLSL fragment shader from an effect body.
///
/// Steps performed:
///
/// 1. Strip `#version`, `precision`, and reserved-uniform declarations so a
///    body pasted from a standalone shader does not clash with our prelude.
/// 2. Prepend [`FRAGMENT_HEADER`], which declares the uniform block, the image
///    sampler binding, and macro aliases.
/// 3. Append [`FRAGMENT_FOOTER`], which calls `effect_color` and writes the
///    final colour. The `#line` directive keeps diagnostics pointing into the
///    body text.
pub(crate) fn wrap_effect_fragment(body: &str) -> String {
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        if trimmed.starts_with("precision ") {
            continue;
        }
        let redeclares_reserved = trimmed.starts_with("uniform ")
            && RESERVED_UNIFORM_NAMES
                .iter()
                .any(|name| trimmed.contains(name));
        if redeclares_reserved {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{FRAGMENT_HEADER}\n#line 1\n{sanitized}{FRAGMENT_FOOTER}")
}

/// Declarations the prelude owns; bodies must not redeclare them.
const RESERVED_UNIFORM_NAMES: [&str; 5] = [
    "u_resolution",
    "u_pointer",
    "u_time",
    "u_pixel_ratio",
    "u_image",
];

/// GLSL prologue injected ahead of every effect body.
///
/// The uniform block layout must match `FrameUniforms` in `uniforms.rs`.
/// Block fields carry an underscore prefix and are aliased back to the public
/// names via macros to avoid clashes with body-local identifiers.
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_tex_coord;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _u_resolution;
    vec2 _u_pointer;
    float _u_time;
    float _u_pixel_ratio;
    vec2 _padding;
} frame;

#define u_resolution frame._u_resolution
#define u_pointer frame._u_pointer
#define u_time frame._u_time
#define u_pixel_ratio frame._u_pixel_ratio

layout(set = 1, binding = 0) uniform texture2D warpview_image_texture;
layout(set = 1, binding = 1) uniform sampler warpview_image_sampler;

#define u_image sampler2D(warpview_image_texture, warpview_image_sampler)
";

/// GLSL epilogue delegating to the effect entry point.
const FRAGMENT_FOOTER: &str = r"void main() {
    out_color = effect_color(v_tex_coord);
}
";

/// Full-viewport quad vertex shader: converts pixel-space positions to clip
/// space with a Y flip so (0,0) is the top-left corner, and passes texture
/// coordinates through.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec2 a_tex_coord;
layout(location = 0) out vec2 v_tex_coord;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _u_resolution;
    vec2 _u_pointer;
    float _u_time;
    float _u_pixel_ratio;
    vec2 _padding;
} frame;

void main() {
    vec2 clip = (a_position / frame._u_resolution) * 2.0 - 1.0;
    clip.y = -clip.y;
    gl_Position = vec4(clip, 0.0, 1.0);
    v_tex_coord = a_tex_coord;
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use effects::UniformUsage;

    #[test]
    fn wrap_surrounds_body_with_prelude_and_footer() {
        let body = "vec4 effect_color(vec2 uv) { return texture(u_image, uv); }";
        let wrapped = wrap_effect_fragment(body);
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("uniform FrameParams"));
        assert!(wrapped.contains(body));
        assert!(wrapped.contains("out_color = effect_color(v_tex_coord);"));
    }

    #[test]
    fn wrap_strips_version_precision_and_reserved_uniforms() {
        let body = r#"
            #version 300 es
            precision highp float;
            uniform float u_time;
            uniform vec2 u_resolution;
            vec4 effect_color(vec2 uv) {
                return texture(u_image, uv + sin(u_time));
            }
        "#;

        let wrapped = wrap_effect_fragment(body);
        assert!(!wrapped.contains("#version 300 es"));
        assert!(!wrapped.contains("precision highp float"));
        assert!(!wrapped.contains("uniform float u_time"));
        assert!(!wrapped.contains("uniform vec2 u_resolution"));
        assert!(wrapped.contains("effect_color"));
    }

    #[test]
    fn wrap_keeps_line_directive_for_diagnostics() {
        let wrapped = wrap_effect_fragment("vec4 effect_color(vec2 uv) { return vec4(uv, 0.0, 1.0); }");
        assert!(wrapped.contains("#line 1"));
    }

    #[test]
    fn descriptor_check_flags_undeclared_uniforms() {
        let effect = EffectDescriptor::from_parts(
            "drift",
            "vec4 effect_color(vec2 uv) { return texture(u_image, uv + u_pointer); }".to_string(),
            UniformUsage::TIME_ONLY,
        );
        let err = check_descriptor(&effect).unwrap_err();
        assert!(matches!(err, RenderError::BindingFault(_)));
        assert!(err.to_string().contains("u_pointer"));
    }

    #[test]
    fn descriptor_check_accepts_subset_consumption() {
        let effect = EffectDescriptor::from_parts(
            "still",
            "vec4 effect_color(vec2 uv) { return texture(u_image, uv); }".to_string(),
            UniformUsage::ALL,
        );
        assert!(check_descriptor(&effect).is_ok());
    }

    #[test]
    fn vertex_shader_declares_the_attribute_contract() {
        assert!(VERTEX_SHADER_GLSL.contains("in vec2 a_position"));
        assert!(VERTEX_SHADER_GLSL.contains("in vec2 a_tex_coord"));
        assert!(VERTEX_SHADER_GLSL.contains("_u_resolution"));
    }
}
