use anyhow::Result;
use effects::EffectDescriptor;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::geometry::QuadGeometry;
use crate::texture::{ImageTexture, PendingImage};
use crate::uniforms::{FrameClock, FrameContext, FrameUniforms};

use super::context::GpuContext;
use super::pipeline::{EffectPipeline, PipelineLayouts, ShaderProgram};

/// Aggregates every GPU resource needed to present a frame.
///
/// Construction order is the startup sequence: context, program, layouts,
/// quad buffers, image texture, bind groups. All of it is created once;
/// only the uniform buffer contents change per frame.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: EffectPipeline,
    geometry: QuadGeometry,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    image_bind_group: wgpu::BindGroup,
    _image: ImageTexture,
    clock: FrameClock,
}

impl GpuState {
    /// Builds the full pipeline for `effect` over the source image.
    ///
    /// Program compilation and the quad upload proceed while the decode is
    /// still in flight; the wait sits right before texture creation. The
    /// bind group every draw call uses cannot exist until the decode has
    /// finished, which makes "no draw before the texture is populated"
    /// structural rather than a convention.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        effect: &EffectDescriptor,
        pending_image: PendingImage,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;

        let program = ShaderProgram::compile(&context.device, effect)?;
        let layouts = PipelineLayouts::new(&context.device);
        let pipeline = EffectPipeline::link(
            &context.device,
            &layouts,
            context.config.format,
            &program,
        )?;

        let geometry = QuadGeometry::upload(&context.device, context.size.width, context.size.height);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let image = pending_image.wait()?;
        let image_texture = ImageTexture::upload(&context.device, &context.queue, &image);
        let image_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("image bind group"),
                layout: &layouts.image_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&image_texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&image_texture.sampler),
                    },
                ],
            });

        tracing::info!(
            effect = effect.name(),
            width = context.size.width,
            height = context.size.height,
            "effect pipeline ready"
        );

        Ok(Self {
            context,
            pipeline,
            geometry,
            uniform_buffer,
            uniform_bind_group,
            image_bind_group,
            _image: image_texture,
            clock: FrameClock::new(),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Reconfigures the swapchain and re-uploads the quad for the new pixel
    /// rectangle. The old buffers are dropped; neither is ever mutated.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.geometry =
            QuadGeometry::upload(&self.context.device, new_size.width, new_size.height);
    }

    /// Records and submits one frame.
    ///
    /// The per-tick sequence mutates shared GPU binding state, so the order
    /// is fixed: clear pass, pipeline, vertex buffers, uniforms/bind groups,
    /// one six-vertex draw, submit, present.
    pub(crate) fn render_frame(
        &mut self,
        pointer: [f32; 2],
        pixel_ratio: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let ctx = FrameContext {
            resolution: [
                self.context.config.width as f32,
                self.context.config.height as f32,
            ],
            pointer,
            pixel_ratio,
            time_seconds: self.clock.sample(),
        };
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_context(&ctx)),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_vertex_buffer(0, self.geometry.position_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.geometry.tex_coord_buffer.slice(..));
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.image_bind_group, &[]);
            render_pass.draw(0..self.geometry.vertex_count, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        tracing::trace!(
            time = ctx.time_seconds,
            width = self.context.size.width,
            height = self.context.size.height,
            "presented frame"
        );
        Ok(())
    }
}
