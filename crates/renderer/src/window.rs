use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use effects::EffectDescriptor;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::pacing::FrameScheduler;
use crate::texture::PendingImage;
use crate::RendererConfig;

/// Aggregates GPU state for the windowed presentation path.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    pointer: PointerState,
}

impl WindowState {
    fn new(
        window: Arc<Window>,
        effect: &EffectDescriptor,
        pending_image: PendingImage,
    ) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, effect, pending_image)?;
        Ok(Self {
            window,
            gpu,
            pointer: PointerState::default(),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Records and submits one frame. The pointer value and scale factor are
    /// read here, at bind time, never cached across frames.
    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let pointer = self.pointer.as_uniform();
        let pixel_ratio = self.window.scale_factor() as f32;
        self.gpu.render_frame(pointer, pixel_ratio)
    }
}

/// Opens the window and drives the event loop until the window closes, the
/// scheduler is cancelled, or the draw path fails fatally.
///
/// The scheduler is not armed until `WindowState::new` returns, which in
/// turn blocks on the image decode; a failed load means no loop at all.
pub(crate) fn run_window(
    config: &RendererConfig,
    effect: &EffectDescriptor,
    pending_image: PendingImage,
) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("Warpview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), effect, pending_image)?;
    let mut scheduler = FrameScheduler::new(config.target_fps);
    if scheduler.ready_for_frame(Instant::now()) {
        state.window().request_redraw();
    }

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            scheduler.cancel();
                            elwt.exit();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.pointer.handle_cursor_moved(position);
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current logical size when the scale factor changes.
                            let _ = inner_size_writer.request_inner_size(state.size());
                        }
                        WindowEvent::RedrawRequested => {
                            if scheduler.is_cancelled() {
                                return;
                            }
                            match state.render_frame() {
                                Ok(()) => scheduler.mark_rendered(Instant::now()),
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    state.resize(state.size());
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory; stopping render loop");
                                    scheduler.cancel();
                                    elwt.exit();
                                }
                                Err(wgpu::SurfaceError::Timeout) => {
                                    tracing::warn!("surface timeout; retrying next frame");
                                }
                                Err(other) => {
                                    tracing::error!(
                                        "surface error: {other:?}; stopping render loop"
                                    );
                                    scheduler.cancel();
                                    elwt.exit();
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Re-arm the next tick once winit is about to go idle.
                    let now = Instant::now();
                    if scheduler.ready_for_frame(now) {
                        state.window().request_redraw();
                        elwt.set_control_flow(ControlFlow::Wait);
                    } else if let Some(deadline) = scheduler.next_deadline() {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    } else {
                        elwt.set_control_flow(ControlFlow::Wait);
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Latest cursor position in physical window pixels, origin top-left.
#[derive(Default)]
struct PointerState {
    position: Option<PhysicalPosition<f64>>,
}

impl PointerState {
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
    }

    /// Two floats for `u_pointer`; the origin until the first move event.
    fn as_uniform(&self) -> [f32; 2] {
        match self.position {
            Some(position) => [position.x as f32, position.y as f32],
            None => [0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_defaults_to_origin() {
        let pointer = PointerState::default();
        assert_eq!(pointer.as_uniform(), [0.0, 0.0]);
    }

    #[test]
    fn pointer_tracks_the_latest_move() {
        let mut pointer = PointerState::default();
        pointer.handle_cursor_moved(PhysicalPosition::new(10.0, 20.0));
        pointer.handle_cursor_moved(PhysicalPosition::new(300.5, 40.25));
        assert_eq!(pointer.as_uniform(), [300.5, 40.25]);
    }
}
