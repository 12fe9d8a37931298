//! GPU orchestration for the distortion pipeline.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` links the compiled vertex/fragment program into a render
//!   pipeline with the uniform and image bind group layouts.
//! - `state` glues everything together and exposes the per-frame `GpuState`
//!   API used by `window`.

mod context;
mod pipeline;
mod state;

pub(crate) use state::GpuState;
