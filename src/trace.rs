use crate::color::Color;
use crate::vector::Vec3;
use crate::dirvec::{ DirVec, StartTable };
use crate::solver::{ GeneralRay, FixedRay };
use crate::world::World;
use crate::light::{ Light, add_light };
use crate::camera::Camera;
use crate::pattern::texture_at;
use crate::reflection::{ Reflection, build_reflections };
use crate::sampling::DiffuseDirections;
use crate::scene::Scene;
use crate::consts::{ MAX_BOUNCES, ENERGY_CUTOFF, DIFFUSE_SAMPLING_MIN,
    DIFFUSE_GROUPS, DIFFUSE_GROUP_SIZE, DIFFUSE_DIVISOR, COLOR_SCALE };

/// What a pixel's ray found at one bounce.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounce {
    /// Surface id of the struck surface, or `None` when the ray escaped (or
    /// never got this far).
    pub surface: Option<usize>,

    pub point: Vec3,

    /// Whether diffuse light is sampled at this bounce.
    pub calc_diffuse: bool,

    /// Texture color scaled by the diffuse coefficient and ray energy, on a
    /// 0 to 1 scale. Multiplies the received diffuse light.
    pub weight: Color,

    /// Diffuse light received from the pixel's own direction group.
    pub received: Color,

    pub normal: Vec3,

    /// Ray energy arriving at this bounce.
    pub energy: f64,
}

/// Everything the first pass learns about a pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PixelState {
    /// Direct light, highlights and mirrored light.
    pub rgb: Color,

    /// The diffuse direction group this pixel samples itself.
    pub group: usize,

    pub bounces: [Bounce; MAX_BOUNCES],
}

/// Mutable scratch space of one rendering thread.
#[derive(Clone, Debug, Default)]
pub struct TraceContext {
    start: StartTable,
}

impl TraceContext {
    pub fn new(world: &World) -> TraceContext {
        TraceContext { start: StartTable::new(Vec3::zero(), &world.objects) }
    }
}

/// Three consecutive pretraced lines, for sharing diffuse estimates between
/// neighbors. `prev` and `next` are missing at the image's top and bottom.
#[derive(Copy, Clone, Debug)]
pub struct LineWindow<'a> {
    pub prev: Option<&'a [PixelState]>,
    pub cur: &'a [PixelState],
    pub next: Option<&'a [PixelState]>,
}

/// A scene prepared for tracing.
///
/// Holds the scene together with every table derived from it: the light
/// direction table, the reflection registry and the diffuse directions. All
/// of it is read-only while rendering, so one tracer serves every thread.
pub struct Tracer {
    pub world: World,
    pub light: Light,
    pub camera: Camera,

    light_table: DirVec,
    reflections: Vec<Reflection>,
    diffuse: DiffuseDirections,
}

impl Tracer {
    pub fn new(scene: Scene, width: usize, height: usize) -> Tracer {
        let Scene { screen, light, world } = scene;

        let light_table = DirVec::new(light.direction, &world.objects);
        let reflections = build_reflections(&world, &light.direction);
        let diffuse = DiffuseDirections::new(&world.objects);

        Tracer {
            world,
            light,
            camera: Camera::new(screen, width, height),
            light_table,
            reflections,
            diffuse,
        }
    }

    /// Creates scratch space for one thread.
    pub fn context(&self) -> TraceContext {
        TraceContext::new(&self.world)
    }

    pub fn reflections(&self) -> &[Reflection] {
        &self.reflections
    }

    /// Checks whether a point is cut off from the light.
    pub fn is_shadowed(&self, point: Vec3) -> bool {
        self.world.is_shadowed(&self.light_table, point)
    }

    /// Traces a pixel's primary ray and samples its own diffuse group.
    pub fn trace_pixel(&self, ctx: &mut TraceContext, px: usize, py: usize)
        -> PixelState {
        let mut state = PixelState {
            group: (px + 2 * py) % DIFFUSE_GROUPS,
            ..Default::default()
        };

        let dir = self.camera.ray_for_pixel(px, py);
        self.trace_ray(ctx, &mut state, self.camera.viewpoint(), dir);

        for depth in 0..MAX_BOUNCES {
            let b = state.bounces[depth];
            if b.surface.is_none() {
                break;
            }

            if b.calc_diffuse {
                state.bounces[depth].received
                    = self.trace_diffuse_rays(ctx, state.group, &b.normal, b.point);
            }
        }

        state
    }

    /// Follows a ray through its specular bounces.
    ///
    /// Each bounce records what was struck in `state` and adds the direct,
    /// highlight and mirrored light seen there to `state.rgb`. The ray keeps
    /// bouncing off glossy and mirror surfaces, losing the diffuse share of
    /// its energy each time, until it escapes, lands on a diffuse-only
    /// surface, runs out of energy or reaches the last bounce.
    pub fn trace_ray(&self, ctx: &mut TraceContext, state: &mut PixelState,
        origin: Vec3, direction: Vec3) {
        let light = self.light.direction;

        let mut origin = origin;
        let mut dir = direction;
        let mut energy = 1.0;

        for depth in 0..MAX_BOUNCES {
            let hit = match self.world.nearest_hit(&GeneralRay::new(origin, dir)) {
                Some(hit) => hit,
                None => {
                    state.bounces[depth].surface = None;

                    // Glare from a bounced ray escaping towards the light
                    if depth > 0 {
                        let hl = -dir.dot(&light);
                        if hl > 0.0 {
                            let ihl = hl.powi(3) * energy * self.light.beam;
                            state.rgb += Color::grey(ihl);
                        }
                    }

                    return;
                },
            };

            let obj = &self.world.objects[hit.object];
            let diffuse = obj.diffuse * energy;
            let normal = obj.normal_at(hit.point, dir, hit.face);
            let texture = texture_at(obj, hit.point);

            let bounce = &mut state.bounces[depth];
            bounce.surface = Some(hit.surface_id());
            bounce.point = hit.point;
            bounce.energy = energy;

            if obj.diffuse >= DIFFUSE_SAMPLING_MIN {
                bounce.calc_diffuse = true;
                bounce.weight = texture * (diffuse / COLOR_SCALE);
                bounce.normal = normal;
            }

            dir = dir.reflect(&normal);
            let hilight_scale = energy * obj.highlight;

            if !self.is_shadowed(hit.point) {
                let bright = -normal.dot(&light) * diffuse;
                let hilight = -dir.dot(&light);
                add_light(&mut state.rgb, &texture, bright, hilight, hilight_scale);
            }

            state.rgb += self.trace_reflections(ctx, hit.point, &normal, &dir,
                diffuse, hilight_scale, &texture);

            let bounces_on = obj.reflection.is_specular()
                && energy > ENERGY_CUTOFF
                && depth + 1 < MAX_BOUNCES;

            if !bounces_on {
                return;
            }

            energy *= 1.0 - obj.diffuse;
            origin = hit.point;
        }
    }

    /// Collects light mirrored towards a point by registered flat surfaces.
    ///
    /// `normal` is the surface normal at `point`, `view` the reflected
    /// viewing direction, `diffuse` the point's energy-scaled diffuse
    /// coefficient and `texture` its color. A registered surface contributes
    /// only when it is what a ray along its reflection direction actually
    /// meets, and the spot it meets is lit.
    pub fn trace_reflections(&self, ctx: &mut TraceContext, point: Vec3,
        normal: &Vec3, view: &Vec3, diffuse: f64, hilight_scale: f64,
        texture: &Color) -> Color {
        let mut rgb = Color::black();
        if self.reflections.is_empty() {
            return rgb;
        }

        ctx.start.reset(point, &self.world.objects);

        for r in self.reflections.iter().rev() {
            let dv = &r.dirvec.vec;
            let ray = FixedRay::new(&r.dirvec, &ctx.start);

            match self.world.nearest_hit(&ray) {
                Some(hit) if hit.surface_id() == r.surface_id => {
                    if !self.is_shadowed(hit.point) {
                        let bright = r.bright * diffuse * normal.dot(dv);
                        let hilight = r.bright * view.dot(dv);
                        add_light(&mut rgb, texture, bright, hilight, hilight_scale);
                    }
                },
                _ => {},
            }
        }

        rgb
    }

    /// Samples diffuse light arriving at a point from one direction group.
    ///
    /// Of each antipodal pair, the direction on the normal's side is traced.
    pub fn trace_diffuse_rays(&self, ctx: &mut TraceContext, group: usize,
        normal: &Vec3, point: Vec3) -> Color {
        ctx.start.reset(point, &self.world.objects);

        let dirs = self.diffuse.group(group);
        let mut rgb = Color::black();

        for i in (0..DIFFUSE_GROUP_SIZE).step_by(2).rev() {
            let p = dirs[i].vec.dot(normal);

            rgb += if p < 0.0 {
                self.trace_diffuse_ray(&ctx.start, &dirs[i + 1], p / -DIFFUSE_DIVISOR)
            } else {
                self.trace_diffuse_ray(&ctx.start, &dirs[i], p / DIFFUSE_DIVISOR)
            };
        }

        rgb
    }

    /// Light reflected towards the start point by whatever lies along
    /// `dirvec`.
    fn trace_diffuse_ray(&self, start: &StartTable, dirvec: &DirVec, energy: f64)
        -> Color {
        let hit = match self.world.nearest_hit(&FixedRay::new(dirvec, start)) {
            Some(hit) => hit,
            None => return Color::black(),
        };

        if self.is_shadowed(hit.point) {
            return Color::black();
        }

        let obj = &self.world.objects[hit.object];
        let normal = obj.normal_at(hit.point, dirvec.vec, hit.face);
        let bright = (-normal.dot(&self.light.direction)).max(0.0);

        texture_at(obj, hit.point) * (bright * energy * obj.diffuse)
    }

    /// Runs the first pass over one line of the image.
    pub fn pretrace_line(&self, ctx: &mut TraceContext, py: usize) -> Vec<PixelState> {
        (0..self.camera.width).map(|px| self.trace_pixel(ctx, px, py)).collect()
    }

    /// Computes a pixel's final color from its pretraced state.
    ///
    /// Where the four screen neighbors struck the same surface at a bounce,
    /// their diffuse estimates are borrowed; from the first bounce where that
    /// fails (or everywhere at the image's edge), the pixel samples the other
    /// four direction groups itself.
    pub fn finalize_pixel(&self, ctx: &mut TraceContext, px: usize,
        window: &LineWindow) -> Color {
        let pixel = &window.cur[px];
        let mut rgb = pixel.rgb;

        for depth in 0..MAX_BOUNCES {
            let b = &pixel.bounces[depth];
            let surface = match b.surface {
                Some(s) => s,
                None => break,
            };

            match shared_neighbors(window, px, depth, surface) {
                Some(neighbors) => {
                    if b.calc_diffuse {
                        let mut received = b.received;
                        for n in neighbors.iter() {
                            received += n.bounces[depth].received;
                        }

                        rgb += b.weight * received;
                    }
                },

                None => {
                    rgb += self.sample_without_neighbors(ctx, pixel, depth);
                    break;
                },
            }
        }

        rgb
    }

    /// Diffuse light of every bounce from `from` on, sampled by the pixel
    /// alone.
    fn sample_without_neighbors(&self, ctx: &mut TraceContext, pixel: &PixelState,
        from: usize) -> Color {
        let mut rgb = Color::black();

        for b in pixel.bounces[from..].iter() {
            if b.surface.is_none() {
                break;
            }

            if b.calc_diffuse {
                let mut received = b.received;
                for g in (0..DIFFUSE_GROUPS).filter(|&g| g != pixel.group) {
                    received += self.trace_diffuse_rays(ctx, g, &b.normal, b.point);
                }

                rgb += b.weight * received;
            }
        }

        rgb
    }
}

/// The four screen neighbors of a pixel, when all of them struck `surface`
/// at `depth`.
fn shared_neighbors<'a>(window: &LineWindow<'a>, px: usize, depth: usize,
    surface: usize) -> Option<[&'a PixelState; 4]> {
    let (prev, next) = match (window.prev, window.next) {
        (Some(prev), Some(next)) => (prev, next),
        _ => return None,
    };

    if px == 0 || px + 1 >= window.cur.len() {
        return None;
    }

    let neighbors = [&prev[px], &next[px], &window.cur[px - 1], &window.cur[px + 1]];
    let shared = neighbors.iter()
        .all(|n| n.bounces[depth].surface == Some(surface));

    if shared { Some(neighbors) } else { None }
}

/* Tests */

#[cfg(test)]
fn scene_of(objects: Vec<crate::object::Object>, light: Light) -> Scene {
    use crate::camera::Screen;
    use crate::world::OrEntry;

    let n = objects.len();
    Scene {
        screen: Screen::from_angles(Vec3::zero(), 0.0, 0.0),
        light,
        world: World::new(
            objects,
            (0..n).map(|i| vec![i]).collect(),
            vec![OrEntry { range: None, groups: (0..n).collect() }]
        ),
    }
}

#[test]
fn lit_box_shows_diffuse_color() {
    use crate::object::Object;

    let mut b = Object::cuboid(Vec3::new(0.0, 0.0, 100.0), Vec3::new(20.0, 20.0, 20.0));
    b.diffuse = 0.8;
    b.color = Color::rgb(200.0, 100.0, 50.0);

    let tracer = Tracer::new(
        scene_of(vec![b], Light::from_angles(0.0, 0.0, 255.0)), 128, 128
    );
    let mut ctx = tracer.context();

    let center = tracer.trace_pixel(&mut ctx, 64, 64);
    assert_eq!(center.rgb, Color::rgb(160.0, 80.0, 40.0));
    assert_eq!(center.bounces[0].surface, Some(3));
    assert_eq!(center.bounces[0].point, Vec3::new(0.0, 0.0, 80.01));
    assert!(center.bounces[0].calc_diffuse);
    assert_eq!(center.bounces[0].weight, Color::rgb(160.0, 80.0, 40.0) * (1.0 / 256.0));
    assert_eq!(center.bounces[1].surface, None);

    // Nothing else in the scene sends diffuse light back.
    assert_eq!(center.bounces[0].received, Color::black());

    let line = tracer.pretrace_line(&mut ctx, 0);
    let next = tracer.pretrace_line(&mut ctx, 1);
    let window = LineWindow { prev: None, cur: &line, next: Some(&next) };

    assert_eq!(line[0].bounces[0].surface, None);
    assert_eq!(tracer.finalize_pixel(&mut ctx, 0, &window), Color::black());
}

#[test]
fn mirror_room_energy_never_increases() {
    use crate::object::{ Object, ReflectionKind };

    let mut room = Object::cuboid(Vec3::zero(), Vec3::new(1000.0, 1000.0, 1000.0));
    room.invert = true;
    room.reflection = ReflectionKind::Mirror;
    room.diffuse = 0.3;

    let tracer = Tracer::new(
        scene_of(vec![room], Light::from_angles(30.0, 20.0, 255.0)), 128, 128
    );
    let mut ctx = tracer.context();

    for &(px, py) in [(64, 64), (10, 30), (120, 3)].iter() {
        let state = tracer.trace_pixel(&mut ctx, px, py);

        // Energies 1, 0.7, 0.49, 0.343 and 0.2401 all stay above the cutoff.
        assert!(state.bounces.iter().all(|b| b.surface.is_some()));
        assert_eq!(state.bounces[0].energy, 1.0);

        for pair in state.bounces.windows(2) {
            assert!(pair[1].energy <= pair[0].energy);
            assert!((pair[1].energy - 0.7 * pair[0].energy).abs() < 1e-12);
        }
    }
}

#[test]
fn escaping_bounce_sees_glare() {
    use crate::object::{ Object, ReflectionKind };

    let mut floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));
    floor.reflection = ReflectionKind::Mirror;
    floor.diffuse = 0.0;

    let light = Light::new(Vec3::new(0.0, -1.0, -1.0).normalize(), 100.0);
    let tracer = Tracer::new(scene_of(vec![floor], light), 16, 16);
    let mut ctx = tracer.context();

    let mut state = PixelState::default();
    let dir = Vec3::new(0.0, -1.0, 1.0).normalize();
    tracer.trace_ray(&mut ctx, &mut state, Vec3::new(0.0, 5.0, 0.0), dir);

    assert_eq!(state.bounces[0].surface, Some(1));
    assert!(!state.bounces[0].calc_diffuse);
    assert_eq!(state.bounces[1].surface, None);
    assert_eq!(state.rgb, Color::grey(100.0));
}

#[test]
fn mirror_floor_lights_only_faces_it_reflects_onto() {
    use crate::object::{ Object, ReflectionKind };

    let mut floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));
    floor.reflection = ReflectionKind::Mirror;
    floor.diffuse = 0.0;

    let block = Object::cuboid(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

    let tracer = Tracer::new(
        scene_of(vec![floor, block], Light::from_angles(45.0, 0.0, 255.0)), 16, 16
    );
    assert_eq!(tracer.reflections().len(), 1);

    let mut ctx = tracer.context();
    let texture = Color::grey(100.0);
    let down = Vec3::new(0.0, -1.0, 0.0);
    let up = Vec3::new(0.0, 1.0, 0.0);

    // The block's underside catches the mirrored light.
    let under = tracer.trace_reflections(&mut ctx, Vec3::new(0.0, 4.01, 0.0),
        &down, &down, 1.0, 1.0, &texture);
    let c = 0.5f64.sqrt();
    assert_eq!(under, Color::grey(100.0 * c + 0.25));

    // Its top faces away from the floor.
    let top = tracer.trace_reflections(&mut ctx, Vec3::new(0.0, 5.99, 0.0),
        &up, &up, 1.0, 1.0, &texture);
    assert_eq!(top, Color::black());

    // Above the block, the way back to the floor is blocked.
    let blocked = tracer.trace_reflections(&mut ctx, Vec3::new(0.0, 8.0, 2.0),
        &down, &down, 1.0, 1.0, &texture);
    assert_eq!(blocked, Color::black());
}

#[test]
fn finalize_borrows_matching_neighbors() {
    let tracer = Tracer::new(scene_of(Vec::new(), Light::default()), 3, 3);
    let mut ctx = tracer.context();

    let mut pixel = PixelState::default();
    pixel.rgb = Color::grey(10.0);
    pixel.bounces[0] = Bounce {
        surface: Some(7),
        calc_diffuse: true,
        weight: Color::rgb(0.5, 1.0, 0.0),
        received: Color::grey(2.0),
        ..Default::default()
    };

    let line = vec![pixel; 3];
    let window = LineWindow { prev: Some(&line), cur: &line, next: Some(&line) };

    // Five estimates of 2 each, weighted.
    assert_eq!(tracer.finalize_pixel(&mut ctx, 1, &window), Color::rgb(15.0, 20.0, 10.0));

    // Edge pixels and mismatched neighbors fall back to their own estimate;
    // this empty world adds nothing to it.
    assert_eq!(tracer.finalize_pixel(&mut ctx, 0, &window), Color::rgb(11.0, 12.0, 10.0));

    let mut other = line.clone();
    other[1].bounces[0].surface = Some(8);
    let window = LineWindow { prev: Some(&line), cur: &line, next: Some(&other) };
    assert_eq!(tracer.finalize_pixel(&mut ctx, 1, &window), Color::rgb(11.0, 12.0, 10.0));
}
