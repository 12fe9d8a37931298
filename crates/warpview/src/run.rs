use anyhow::{anyhow, Context, Result};
use effects::{EffectDescriptor, EffectManifest};
use renderer::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

const DEFAULT_SURFACE_SIZE: (u32, u32) = (1280, 720);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.list_effects {
        for name in EffectDescriptor::builtin_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let effect = resolve_effect(&cli)?;
    let image_path = cli
        .image
        .clone()
        .ok_or_else(|| anyhow!("an image path is required"))?;

    let config = RendererConfig {
        surface_size: cli.size.unwrap_or(DEFAULT_SURFACE_SIZE),
        image_path,
        target_fps: cli.fps.filter(|fps| *fps > 0.0),
    };

    tracing::info!(
        effect = effect.name(),
        image = %config.image_path.display(),
        width = config.surface_size.0,
        height = config.surface_size.1,
        fps = ?config.target_fps,
        "starting warpview"
    );

    Renderer::new(config).run(&effect)
}

fn resolve_effect(cli: &Cli) -> Result<EffectDescriptor> {
    if let Some(manifest_path) = &cli.manifest {
        return EffectManifest::load(manifest_path)
            .with_context(|| format!("failed to load effect manifest {}", manifest_path.display()));
    }

    EffectDescriptor::builtin(&cli.effect).ok_or_else(|| {
        anyhow!(
            "unknown effect '{}'; available: {}",
            cli.effect,
            EffectDescriptor::builtin_names().join(", ")
        )
    })
}
