use crate::color::Color;
use crate::vector::Vec3;

/// Converts degrees to radians with the precision scene files were authored
/// against.
pub fn rad(degrees: f64) -> f64 {
    degrees * 0.017453293
}

/// A directional light.
///
/// `direction` is a unit vector pointing from the light into the scene.
/// `beam` scales the glare seen when a bounced ray escapes towards the light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub direction: Vec3,
    pub beam: f64,
}

impl Default for Light {
    fn default() -> Light {
        Light { direction: Vec3::new(0.0, -1.0, 0.0), beam: 255.0 }
    }
}

impl Light {
    pub fn new(direction: Vec3, beam: f64) -> Light {
        Light { direction, beam }
    }

    /// Creates a light from its elevation and azimuth, in degrees.
    ///
    /// ```
    /// # use csg_ray_tracer::light::Light;
    /// # use csg_ray_tracer::vector::Vec3;
    /// let overhead = Light::from_angles(90.0, 0.0, 255.0);
    /// assert_eq!(overhead.direction, Vec3::new(0.0, -1.0, 0.0));
    /// ```
    pub fn from_angles(elevation: f64, azimuth: f64, beam: f64) -> Light {
        let (sin_e, cos_e) = rad(elevation).sin_cos();
        let (sin_a, cos_a) = rad(azimuth).sin_cos();

        Light {
            direction: Vec3::new(cos_e * sin_a, -sin_e, cos_e * cos_a),
            beam,
        }
    }
}

/// Adds diffuse and highlight light to a color.
///
/// `bright` scales the surface's texture color; `hilight` is the cosine
/// between the viewing direction and the light, raised to the fourth power
/// and scaled by `scale`. Non-positive terms add nothing.
pub fn add_light(rgb: &mut Color, texture: &Color, bright: f64, hilight: f64,
    scale: f64) {
    if bright > 0.0 {
        rgb.accum(bright, texture);
    }

    if hilight > 0.0 {
        let ihl = hilight.powi(4) * scale;
        *rgb += Color::grey(ihl);
    }
}

#[test]
fn light_from_zero_angles_points_forward() {
    let l = Light::from_angles(0.0, 0.0, 100.0);

    assert_eq!(l.direction, Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(l.beam, 100.0);
}

#[test]
fn light_direction_is_unit() {
    let l = Light::from_angles(-35.0, 120.0, 1.0);

    assert!((l.direction.magnitude() - 1.0).abs() < 1e-12);
}

#[test]
fn add_light_ignores_negative_terms() {
    let texture = Color::rgb(100.0, 50.0, 10.0);

    let mut rgb = Color::black();
    add_light(&mut rgb, &texture, -0.5, -0.2, 10.0);
    assert_eq!(rgb, Color::black());

    add_light(&mut rgb, &texture, 0.5, 0.5, 16.0);
    assert_eq!(rgb, Color::rgb(51.0, 26.0, 6.0));
}
