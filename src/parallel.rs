use rayon::prelude::*;
use rayon::{ ThreadPoolBuilder, ThreadPoolBuildError };

use crate::scene::Scene;
use crate::trace::{ Tracer, LineWindow, PixelState };
use crate::canvas::Canvas;
use crate::color::Color;
use crate::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT };

/// Settings of one render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,

    /// Number of worker threads; `None` lets rayon choose.
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            threads: None,
        }
    }
}

/// Prepares a scene and renders it.
pub fn render(scene: Scene, config: &RenderConfig) -> Result<Canvas, ThreadPoolBuildError> {
    let tracer = Tracer::new(scene, config.width, config.height);
    log::info!("Registered {} reflecting surfaces", tracer.reflections().len());

    render_tracer(&tracer, config.threads)
}

/// Renders a prepared scene on a dedicated thread pool.
///
/// Lines are pretraced in parallel, then every line is finalized once its
/// neighbors are known. Each worker keeps its own `TraceContext`, so the
/// image does not depend on the number of threads.
pub fn render_tracer(tracer: &Tracer, threads: Option<usize>)
    -> Result<Canvas, ThreadPoolBuildError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or(0))
        .build()?;

    let width = tracer.camera.width;
    let height = tracer.camera.height;

    log::info!("Rendering {}x{} using {} threads...",
        width, height, pool.current_num_threads());

    let rows: Vec<Vec<Color>> = pool.install(|| {
        let lines: Vec<Vec<PixelState>> = (0..height)
            .into_par_iter()
            .map_init(|| tracer.context(), |ctx, y| tracer.pretrace_line(ctx, y))
            .collect();

        log::debug!("Pretraced {} lines", lines.len());

        (0..height)
            .into_par_iter()
            .map_init(|| tracer.context(), |ctx, y| {
                let window = LineWindow {
                    prev: if y > 0 { Some(&lines[y - 1][..]) } else { None },
                    cur: &lines[y],
                    next: lines.get(y + 1).map(|l| &l[..]),
                };

                (0..width)
                    .map(|x| tracer.finalize_pixel(ctx, x, &window))
                    .collect()
            })
            .collect()
    });

    let mut canvas = Canvas::new(width, height);
    for (y, row) in rows.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            canvas.write_pixel(x, y, color);
        }
    }

    log::info!("...done.");

    Ok(canvas)
}

/* Tests */

#[cfg(test)]
fn small_room() -> Scene {
    use crate::vector::Vec3;
    use crate::object::{ Object, Texture, ReflectionKind };
    use crate::world::{ World, OrEntry };
    use crate::camera::Screen;
    use crate::light::Light;

    let mut ball = Object::sphere(Vec3::new(0.0, 0.0, 60.0), 30.0);
    ball.reflection = ReflectionKind::Mirror;
    ball.diffuse = 0.6;
    ball.highlight = 0.5;
    ball.color = Color::rgb(255.0, 120.0, 60.0);

    let mut floor = Object::half_space(Vec3::new(0.0, -30.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
    floor.texture = Texture::Checker;
    floor.diffuse = 0.9;

    let mut wall = Object::cuboid(Vec3::new(0.0, 0.0, 150.0), Vec3::new(100.0, 100.0, 5.0));
    wall.texture = Texture::Stripe;

    Scene {
        screen: Screen::from_angles(Vec3::zero(), 10.0, 5.0),
        light: Light::from_angles(40.0, 30.0, 255.0),
        world: World::new(
            vec![ball, floor, wall],
            vec![vec![0], vec![1], vec![2]],
            vec![OrEntry { range: None, groups: vec![0, 1, 2] }]
        ),
    }
}

#[test]
fn default_config_matches_canvas_size() {
    let config = RenderConfig::default();

    assert_eq!((config.width, config.height), (128, 128));
    assert_eq!(config.threads, None);
}

#[test]
fn thread_count_does_not_change_the_image() {
    let tracer = Tracer::new(small_room(), 24, 16);

    let single = render_tracer(&tracer, Some(1)).unwrap();
    let many = render_tracer(&tracer, Some(4)).unwrap();

    assert_eq!(single.width, 24);
    assert_eq!(single.height, 16);
    assert_eq!(single, many);
}

#[test]
fn render_draws_the_scene() {
    let config = RenderConfig { width: 16, height: 16, threads: Some(2) };
    let canvas = render(small_room(), &config).unwrap();

    // The mirror ball fills the middle of the image.
    let center = canvas.read_pixel(8, 8).unwrap();
    assert!(center != Color::black());
}
