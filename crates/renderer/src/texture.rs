use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::error::RenderError;

/// A fully decoded RGBA8 image ready for GPU upload.
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Handle to an in-flight image decode. Consuming it with [`wait`] is the
/// only way to observe the result, so the decode resolves exactly once.
///
/// [`wait`]: PendingImage::wait
pub struct PendingImage {
    path: PathBuf,
    receiver: Receiver<Result<DecodedImage, RenderError>>,
}

impl PendingImage {
    /// Blocks until the worker finishes decoding.
    pub fn wait(self) -> Result<DecodedImage, RenderError> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(RenderError::AssetLoad {
                path: self.path,
                reason: "image decode worker exited before returning a result".to_string(),
            }),
        }
    }
}

/// Spawns image decodes on a worker thread so GPU setup can proceed while
/// the asset loads.
pub struct ImageLoader;

impl ImageLoader {
    pub fn spawn(path: PathBuf) -> PendingImage {
        let (sender, receiver) = bounded(1);
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name("warpview-image-decode".into())
            .spawn(move || {
                let _ = sender.send(decode_image(&worker_path));
            });
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "failed to spawn image decode worker");
        }
        PendingImage { path, receiver }
    }
}

fn decode_image(path: &Path) -> Result<DecodedImage, RenderError> {
    let image = image::open(path).map_err(|err| RenderError::AssetLoad {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::AssetLoad {
            path: path.to_path_buf(),
            reason: format!("image has zero extent ({width}x{height})"),
        });
    }

    tracing::info!(path = %path.display(), width, height, "decoded source image");

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// The GPU-resident source image plus the sampler the pipeline binds.
pub(crate) struct ImageTexture {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ImageTexture {
    /// Uploads the decoded image in one step and builds its sampler.
    ///
    /// Clamp-to-edge wrap and linear min/mag filtering prevent seams and
    /// aliasing when the image stretches across the full frame.
    pub(crate) fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("source image"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &image.pixels,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_asset_load_error() {
        let pending = ImageLoader::spawn(PathBuf::from("/nonexistent/warpview-test.png"));
        let err = pending.wait().unwrap_err();
        match err {
            RenderError::AssetLoad { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/warpview-test.png"));
            }
            other => panic!("expected AssetLoad, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_yields_asset_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = ImageLoader::spawn(path).wait().unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }

    #[test]
    fn single_red_pixel_decodes_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let decoded = ImageLoader::spawn(path).wait().unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 1));
        assert_eq!(decoded.pixels, vec![255, 0, 0, 255]);
    }
}
