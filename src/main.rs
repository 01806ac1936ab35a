mod camera;
mod config;
mod framebuffer;
mod light;
mod material;
mod primitives;
mod ray;
mod scene;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::framebuffer::Framebuffer;
use crate::light::Lamp;
use crate::material::Material;
use crate::primitives::{Cuboid, Cylinder, Disk, Geometry, GroundGrid, Sphere};
use crate::scene::Scene;
use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::{dvec3, dvec4};
use log::{debug, info, LevelFilter};
use std::f64::consts::PI;
use std::path::PathBuf;
use std::time::Instant;

pub type DefaultRng = rand_xoshiro::Xoshiro256Plus;

#[derive(Parser)]
#[command(name = "raytracer", about = "A Whitted-style ray tracer")]
struct Args {
    /// Path to a TOML render config; defaults apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Preset scene number (overrides the config)
    #[arg(long)]
    scene: Option<u32>,

    /// Output PNG path (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Supersampling factor, 1..=4 (overrides the config)
    #[arg(long)]
    aa: Option<u32>,

    /// Jitter subpixel samples
    #[arg(long)]
    jitter: bool,
}

/// Preset scene builders, in place of a scene-description file format.
fn build_scene(config: &RenderConfig) -> Result<Scene> {
    let mut camera = Camera::default();
    camera.ray_perspective(
        45.0,
        f64::from(config.width) / f64::from(config.height),
        1.0,
    );
    camera.ray_look_at(dvec3(4.0, -8.0, 4.0), dvec3(0.0, 0.0, 0.8), dvec3(0.0, 0.0, 1.0))?;

    let mut scene = Scene::new(camera);
    scene.set_sky_color(dvec4(0.3, 1.0, 1.0, 1.0));
    scene.add_lamp(
        Lamp::point(dvec3(3.0, -4.0, 8.0)).with_intensity(
            dvec3(0.3, 0.3, 0.3),
            dvec3(0.8, 0.8, 0.8),
            dvec3(0.8, 0.8, 0.8),
        ),
    );

    match config.scene {
        0 => {
            scene.add_lamp(Lamp::directional(dvec3(-2.0, 3.0, 4.0)).with_intensity(
                dvec3(0.1, 0.1, 0.1),
                dvec3(0.3, 0.3, 0.3),
                dvec3(0.2, 0.2, 0.2),
            ));

            scene.add_item(Geometry::new(GroundGrid::default(), Material::matte(dvec3(1.0, 1.0, 1.0))));

            let mut disk = Geometry::new(
                Disk {
                    line_color: dvec3(0.7, 0.3, 0.3),
                    gap_color: dvec3(0.3, 0.6, 0.7),
                    ..Disk::default()
                },
                Material::matte(dvec3(1.0, 1.0, 1.0)),
            );
            disk.ray_translate(1.0, 1.0, 1.3);
            disk.ray_rotate(0.25 * PI, dvec3(1.0, 0.0, 0.0))?;
            disk.ray_rotate(0.25 * PI, dvec3(0.0, 0.0, 1.0))?;
            scene.add_item(disk);

            let mut disk = Geometry::new(
                Disk {
                    line_color: dvec3(1.0, 1.0, 0.0),
                    gap_color: dvec3(0.0, 0.0, 1.0),
                    ..Disk::default()
                },
                Material::matte(dvec3(1.0, 1.0, 1.0)),
            );
            disk.ray_translate(-1.0, 1.0, 1.3);
            disk.ray_rotate(0.75 * PI, dvec3(1.0, 0.0, 0.0))?;
            disk.ray_rotate(PI / 3.0, dvec3(0.0, 0.0, 1.0))?;
            scene.add_item(disk);

            let mut ball = Geometry::new(
                Sphere,
                Material::shiny(dvec3(0.9, 0.1, 0.1)).with_reflectivity(0.4),
            );
            ball.ray_translate(1.2, -1.0, 1.0);
            scene.add_item(ball);

            let mut block = Geometry::new(Cuboid, Material::matte(dvec3(0.1, 0.8, 0.2)));
            block.ray_translate(2.0, 2.0, 2.0);
            block.ray_rotate(0.8 * PI, dvec3(1.0, 0.5, 0.0))?;
            scene.add_item(block);

            let mut tube = Geometry::new(Cylinder, Material::shiny(dvec3(0.2, 0.3, 0.9)));
            tube.ray_translate(-1.0, -1.0, 1.0);
            tube.ray_rotate(0.7 * PI, dvec3(0.0, 0.0, 1.0))?;
            scene.add_item(tube);
        }
        1 => {
            scene.add_item(Geometry::new(GroundGrid::default(), Material::matte(dvec3(1.0, 1.0, 1.0))));
        }
        other => bail!("unknown scene preset {other}"),
    }

    Ok(scene)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(scene) = args.scene {
        config.scene = scene;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(aa) = args.aa {
        config.aa_code = aa;
    }
    if args.jitter {
        config.jitter = true;
    }
    config.validate()?;
    debug!("render config: {config:?}");

    let mut scene = build_scene(&config)?;
    scene.set_antialias(config.aa_code, config.jitter)?;
    scene.set_depth_max(config.depth);
    scene.set_seed(config.seed);
    scene.set_image_size(config.width, config.height);

    let mut fb = Framebuffer::new(config.width, config.height);
    let start = Instant::now();
    scene.render(&mut fb)?;
    let elapsed = start.elapsed();
    debug!(
        "center pixel: {:?}",
        fb.pixel(config.width / 2, config.height / 2)
    );
    let rays = scene.rays_cast() as f64 / 1_000_000.0;
    info!(
        "traced {}x{} in {:.2?}: {:.2}M rays, {:.2}M rays/s",
        config.width,
        config.height,
        elapsed,
        rays,
        rays / elapsed.as_secs_f64(),
    );

    image::save_buffer(
        &config.output,
        fb.bytes(),
        config.width,
        config.height,
        image::ColorType::Rgb8,
    )
    .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!("wrote {}", config.output.display());

    Ok(())
}
