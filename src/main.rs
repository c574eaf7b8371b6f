use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use csg_ray_tracer::scene::Scene;
use csg_ray_tracer::parallel::{ render, RenderConfig };
use csg_ray_tracer::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT, OUT_FILE };

/// Renders a CSG scene to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene file; `.json` files are read as JSON, anything else as SLD.
    scene: PathBuf,

    /// Where to write the image.
    #[clap(short, long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Image width, in pixels.
    #[clap(long, default_value_t = CANVAS_WIDTH)]
    width: usize,

    /// Image height, in pixels.
    #[clap(long, default_value_t = CANVAS_HEIGHT)]
    height: usize,

    /// Number of rendering threads. Defaults to one per core.
    #[clap(short = 'j', long)]
    threads: Option<usize>,

    /// Write a binary (P6) image instead of a plain (P3) one.
    #[clap(long)]
    binary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();

    let scene = Scene::load(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;

    let config = RenderConfig {
        width: args.width,
        height: args.height,
        threads: args.threads,
    };

    let canvas = render(scene, &config)
        .context("failed to start the rendering threads")?;

    canvas.save(&args.output, args.binary)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("Saved render to {}.", args.output.display());

    Ok(())
}
