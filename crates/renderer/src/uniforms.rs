use std::time::Instant;

use bytemuck::{Pod, Zeroable};

/// Host-side snapshot of everything the uniform block needs for one frame.
///
/// Built fresh at bind time: resolution and pixel ratio come from the live
/// surface/window state, never from a cached copy, so a resize between
/// frames is reflected on the next bind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Current surface size in physical pixels.
    pub resolution: [f32; 2],
    /// Most recent pointer position in physical pixels, origin top-left.
    pub pointer: [f32; 2],
    /// Device scale factor.
    pub pixel_ratio: f32,
    /// Elapsed seconds since the first frame.
    pub time_seconds: f32,
}

/// CPU mirror of the `FrameParams` std140 block declared by the shader
/// prelude. Field order and padding must match the GLSL declaration.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct FrameUniforms {
    resolution: [f32; 2],
    pointer: [f32; 2],
    time: f32,
    pixel_ratio: f32,
    _padding: [f32; 2],
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub(crate) fn from_context(ctx: &FrameContext) -> Self {
        Self {
            resolution: ctx.resolution,
            pointer: ctx.pointer,
            time: ctx.time_seconds,
            pixel_ratio: ctx.pixel_ratio,
            _padding: [0.0; 2],
        }
    }
}

/// Produces the elapsed-time uniform value.
///
/// The origin latches on the first sample, so time starts at exactly 0 on
/// the first frame and counts wall-clock seconds from there. It is never
/// reset and never goes backwards.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameClock {
    origin: Option<Instant>,
}

impl FrameClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sample(&mut self) -> f32 {
        self.sample_at(Instant::now())
    }

    pub(crate) fn sample_at(&mut self, now: Instant) -> f32 {
        let origin = *self.origin.get_or_insert(now);
        now.saturating_duration_since(origin).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn uniform_block_is_32_bytes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 32);
    }

    #[test]
    fn field_offsets_match_the_std140_declaration() {
        assert_eq!(std::mem::offset_of!(FrameUniforms, resolution), 0);
        assert_eq!(std::mem::offset_of!(FrameUniforms, pointer), 8);
        assert_eq!(std::mem::offset_of!(FrameUniforms, time), 16);
        assert_eq!(std::mem::offset_of!(FrameUniforms, pixel_ratio), 20);
    }

    #[test]
    fn clock_starts_at_zero_on_first_sample() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.sample_at(Instant::now()), 0.0);
    }

    #[test]
    fn clock_is_monotonic_across_samples() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let mut previous = clock.sample_at(start);
        for tick in 1..=5u64 {
            let sample = clock.sample_at(start + Duration::from_millis(tick * 16));
            assert!(sample >= previous);
            previous = sample;
        }
        assert!((previous - 0.080).abs() < 1e-4);
    }

    #[test]
    fn clock_clamps_samples_before_the_origin() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.sample_at(start + Duration::from_secs(1));
        assert_eq!(clock.sample_at(start), 0.0);
    }

    #[test]
    fn context_round_trips_into_the_pod_mirror() {
        let ctx = FrameContext {
            resolution: [100.0, 100.0],
            pointer: [12.0, 34.0],
            pixel_ratio: 2.0,
            time_seconds: 0.0,
        };
        let uniforms = FrameUniforms::from_context(&ctx);
        assert_eq!(uniforms.resolution, [100.0, 100.0]);
        assert_eq!(uniforms.pointer, [12.0, 34.0]);
        assert_eq!(uniforms.pixel_ratio, 2.0);
        assert_eq!(uniforms.time, 0.0);
    }
}
