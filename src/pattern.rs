use std::f64::consts::PI;

use crate::color::Color;
use crate::object::{ Object, Texture };
use crate::vector::Vec3;

/// Computes the surface color of an object at a world point.
///
/// Textures start from the object's base color and overwrite some of its
/// channels. They never affect geometry.
pub fn texture_at(obj: &Object, p: Vec3) -> Color {
    let mut c = obj.color;

    match obj.texture {
        Texture::Plain => {},
        Texture::Checker => c.g = checker_at(obj, p),
        Texture::Stripe => {
            let (r, g) = stripe_at(p);
            c.r = r;
            c.g = g;
        },
        Texture::Rings => {
            let (g, b) = rings_at(obj, p);
            c.g = g;
            c.b = b;
        },
        Texture::Speckle => c.b = speckle_at(obj, p),
    }

    c
}

/// A 20-unit checkerboard on the XZ plane around the object's center.
///
/// Yields the green channel: full where the X and Z cells agree, zero
/// elsewhere.
pub fn checker_at(obj: &Object, p: Vec3) -> f64 {
    let in_first_half = |w: f64| w - (w * 0.05).floor() * 20.0 < 10.0;

    let wx = p.x - obj.center.x;
    let wz = p.z - obj.center.z;

    if in_first_half(wx) == in_first_half(wz) {
        255.0
    } else {
        0.0
    }
}

/// Horizontal red and green stripes along Y.
///
/// Returns the red and green channels.
pub fn stripe_at(p: Vec3) -> (f64, f64) {
    let w = (p.y * 0.25).sin().powi(2);
    (255.0 * w, 255.0 * (1.0 - w))
}

/// Concentric green and blue rings around the object's Y axis, 10 units apart.
///
/// Returns the green and blue channels.
pub fn rings_at(obj: &Object, p: Vec3) -> (f64, f64) {
    let wx = p.x - obj.center.x;
    let wz = p.z - obj.center.z;

    let r = (wx * wx + wz * wz).sqrt() / 10.0;
    let cws = ((r - r.floor()) * PI).cos().powi(2);

    (255.0 * cws, 255.0 * (1.0 - cws))
}

/// Blue spots laid out on the angular grid of a quadric.
///
/// Coordinates are scaled by the square roots of the form's diagonal so the
/// spots follow the surface. Returns the blue channel.
pub fn speckle_at(obj: &Object, p: Vec3) -> f64 {
    // Angle to the axis, as a fraction of a 6-degree cell.
    fn cell(num: f64, den: f64) -> f64 {
        let a = if den.abs() < 1.0e-4 {
            15.0
        } else {
            (num / den).abs().atan() * 30.0 / PI
        };

        a - a.floor()
    }

    let k = obj.params;
    let wx = (p.x - obj.center.x) * k.x.abs().sqrt();
    let wy = (p.y - obj.center.y) * k.y.abs().sqrt();
    let wz = (p.z - obj.center.z) * k.z.abs().sqrt();

    let wxz = wx * wx + wz * wz;
    let u = cell(wz, wx);
    let v = cell(wy, wxz);

    let spot = (0.15 - (0.5 - u).powi(2) - (0.5 - v).powi(2)).max(0.0);
    255.0 * spot / 0.3
}

/* Tests */

#[test]
fn plain_texture_keeps_base_color() {
    let mut o = Object::sphere(Vec3::zero(), 1.0);
    o.color = Color::rgb(10.0, 20.0, 30.0);

    assert_eq!(texture_at(&o, Vec3::new(3.0, 4.0, 5.0)), Color::rgb(10.0, 20.0, 30.0));
}

#[test]
fn checker_alternates_every_ten_units() {
    let o = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));

    assert_eq!(checker_at(&o, Vec3::new(5.0, 0.0, 5.0)), 255.0);
    assert_eq!(checker_at(&o, Vec3::new(15.0, 0.0, 5.0)), 0.0);
    assert_eq!(checker_at(&o, Vec3::new(15.0, 0.0, 15.0)), 255.0);
    assert_eq!(checker_at(&o, Vec3::new(-5.0, 0.0, 5.0)), 0.0);
}

#[test]
fn checker_only_replaces_green() {
    let mut o = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));
    o.texture = Texture::Checker;
    o.color = Color::rgb(40.0, 50.0, 60.0);

    assert_eq!(texture_at(&o, Vec3::new(15.0, 0.0, 5.0)), Color::rgb(40.0, 0.0, 60.0));
}

#[test]
fn stripes_are_red_and_green() {
    let (r, g) = stripe_at(Vec3::zero());
    assert_eq!((r, g), (0.0, 255.0));

    let (r, g) = stripe_at(Vec3::new(0.0, 2.0 * PI, 0.0));
    assert!((r - 255.0).abs() < 1e-9);
    assert!(g.abs() < 1e-9);
}

#[test]
fn rings_repeat_with_radius() {
    let o = Object::sphere(Vec3::new(1.0, 0.0, 1.0), 1.0);

    let (g, b) = rings_at(&o, Vec3::new(1.0, 0.0, 1.0));
    assert!((g - 255.0).abs() < 1e-9 && b.abs() < 1e-9);

    let (g, b) = rings_at(&o, Vec3::new(6.0, 0.0, 1.0));
    assert!(g.abs() < 1e-9 && (b - 255.0).abs() < 1e-9);
}

#[test]
fn speckle_stays_in_range() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;

    let o = Object::sphere(Vec3::zero(), 20.0);
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..500 {
        let p = Vec3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0)
        );
        let b = speckle_at(&o, p);
        assert!((0.0..=127.5 + 1e-9).contains(&b), "{} at {:?}", b, p);
    }

    // On the axis both cells sit at their edge, away from any spot.
    assert_eq!(speckle_at(&o, Vec3::zero()), 0.0);
}
