use crate::object::{ ShapeKind, FACE_YZ, FACE_ZX, FACE_XY, FACE_SURFACE };
use crate::dirvec::DirVec;
use crate::world::World;
use crate::vector::Vec3;
use crate::consts::MAX_REFLECTIONS;

/// A flat specular surface and the direction light leaves it in.
///
/// `dirvec` tabulates the reversed reflection of the light off the surface:
/// tracing along it from a shading point finds the surface exactly when the
/// point receives the mirrored light.
#[derive(Clone, Debug, PartialEq)]
pub struct Reflection {
    pub surface_id: usize,
    pub dirvec: DirVec,
    pub bright: f64,
}

/// Registers the specular faces of a world for a light direction.
///
/// Glossy and mirror objects that are not fully diffuse contribute: boxes one
/// entry per face family, planes a single entry. Curved surfaces never
/// register, since they have no single reflection direction.
pub fn build_reflections(world: &World, light: &Vec3) -> Vec<Reflection> {
    let mut reflections = Vec::new();

    for (i, obj) in world.objects.iter().enumerate() {
        if !obj.reflection.is_specular() || obj.diffuse >= 1.0 {
            continue;
        }

        let bright = 1.0 - obj.diffuse;
        let mut add = |face: u8, v: Vec3| reflections.push(Reflection {
            surface_id: i * 4 + face as usize,
            dirvec: DirVec::new(v, &world.objects),
            bright,
        });

        match obj.shape {
            ShapeKind::Box => {
                add(FACE_YZ, Vec3::new(light.x, -light.y, -light.z));
                add(FACE_ZX, Vec3::new(-light.x, light.y, -light.z));
                add(FACE_XY, Vec3::new(-light.x, -light.y, light.z));
            },

            ShapeKind::Plane => {
                let n = obj.params;
                add(FACE_SURFACE, n * (2.0 * n.dot(light)) - *light);
            },

            ShapeKind::Quadric | ShapeKind::Cone => {},
        }
    }

    if reflections.len() > MAX_REFLECTIONS {
        log::warn!("{} reflecting surfaces exceed the usual capacity of {}",
            reflections.len(), MAX_REFLECTIONS);
    }

    log::debug!("Registered {} reflecting surfaces", reflections.len());
    reflections
}

#[test]
fn only_specular_flat_objects_register() {
    use crate::object::{ Object, ReflectionKind };

    let mut mirror_box = Object::cuboid(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
    mirror_box.reflection = ReflectionKind::Mirror;
    mirror_box.diffuse = 0.25;

    let mut glossy_floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));
    glossy_floor.reflection = ReflectionKind::Glossy;
    glossy_floor.diffuse = 0.0;

    let mut matte_mirror = glossy_floor.clone();
    matte_mirror.diffuse = 1.0;

    let mut ball = Object::sphere(Vec3::zero(), 1.0);
    ball.reflection = ReflectionKind::Mirror;
    ball.diffuse = 0.0;

    let dull = Object::cuboid(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));

    let world = World::new(
        vec![dull, mirror_box, glossy_floor, matte_mirror, ball],
        Vec::new(),
        Vec::new()
    );
    let light = Vec3::new(0.0, -2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0);
    let r = build_reflections(&world, &light);

    let ids: Vec<usize> = r.iter().map(|e| e.surface_id).collect();
    assert_eq!(ids, vec![5, 6, 7, 9]);

    assert_eq!(r[0].bright, 0.75);
    assert_eq!(r[0].dirvec.vec, Vec3::new(0.0, light.y.abs(), -light.z));
    assert_eq!(r[2].dirvec.vec, Vec3::new(0.0, light.y.abs(), light.z));

    // The floor reverses the bounced light: down and back towards the source.
    assert_eq!(r[3].bright, 1.0);
    assert_eq!(r[3].dirvec.vec, Vec3::new(0.0, light.y, -light.z));
    assert_eq!(r[3].dirvec.len(), 5);
}
