//! Renderer crate for warpview.
//!
//! Glues the desktop window, the `wgpu` pipeline, and the effect wrapping
//! together. The overall flow is:
//!
//! ```text
//!   CLI / warpview
//!          │ RendererConfig + EffectDescriptor
//!          ▼
//!   Renderer::run ──▶ ImageLoader (worker thread)
//!          │                 │ DecodedImage
//!          ▼                 ▼
//!   window::run_window ──▶ GpuState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                      │
//!          │                                      └─▶ FrameUniforms ─▶ GPU UBO
//! ```
//!
//! `GpuState` owns all GPU resources (surface, device, pipeline, quad
//! buffers, texture, uniforms); `Renderer` is the thin entry point that
//! starts the image decode and hands control to the window loop, which
//! blocks on the decode before any drawable resource exists. The loop is
//! never armed before the decode resolves, so no draw call can observe an
//! unpopulated texture.

mod compile;
mod error;
mod geometry;
mod gpu;
mod pacing;
mod texture;
mod uniforms;
mod window;

use std::path::PathBuf;

use anyhow::{Context, Result};
use effects::EffectDescriptor;

pub use error::{RenderError, ShaderStage};
pub use texture::{DecodedImage, ImageLoader, PendingImage};
pub use uniforms::FrameContext;

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Path of the image to distort.
    pub image_path: PathBuf,
    /// Optional FPS cap; `None` renders every refresh callback.
    pub target_fps: Option<f32>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            image_path: PathBuf::new(),
            target_fps: None,
        }
    }
}

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Starts the source-image decode, builds the pipeline for `effect`, and
    /// runs the render loop until the window closes.
    ///
    /// The decode runs on a worker thread while the window and GPU come up;
    /// startup blocks on it before the texture bind group exists, so a
    /// decode failure aborts with the asset error: no placeholder texture,
    /// no loop.
    pub fn run(&self, effect: &EffectDescriptor) -> Result<()> {
        let pending = ImageLoader::spawn(self.config.image_path.clone());
        window::run_window(&self.config, effect, pending).context("render loop failed")
    }
}
