use crate::light::rad;
use crate::vector::Vec3;
use crate::consts::{ SCAN_WIDTH, SCREEN_DEPTH };

/// A screen in the world, with the viewpoint behind it.
///
/// `x` and `y` are unit vectors spanning the screen plane (rightwards and
/// downwards in the image); `z` points from the viewpoint to the screen's
/// center and has length `SCREEN_DEPTH`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Screen {
    pub center: Vec3,
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
    pub viewpoint: Vec3,
}

impl Screen {
    /// Places a screen at `center`, tilted by `pitch` and turned by `yaw`.
    ///
    /// Both angles are in degrees. With zero angles the screen looks along
    /// +Z, with image rows running down -Y.
    pub fn from_angles(center: Vec3, pitch: f64, yaw: f64) -> Screen {
        let (sin_p, cos_p) = rad(pitch).sin_cos();
        let (sin_y, cos_y) = rad(yaw).sin_cos();

        let z = Vec3::new(cos_p * sin_y, -sin_p, cos_p * cos_y) * SCREEN_DEPTH;
        let x = Vec3::new(cos_y, 0.0, -sin_y);
        let y = Vec3::new(-sin_p * sin_y, -cos_p, -sin_p * cos_y);

        Screen { center, x, y, z, viewpoint: center - z }
    }
}

/// A camera record for generating primary rays.
///
/// Pixels are spread over the screen so that the image spans the same
/// width of screen regardless of its resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub screen: Screen,

    /// The horizontal size of the resultant canvas.
    pub width: usize,

    /// The vertical size of the resultant canvas.
    pub height: usize,

    /// Screen distance between two neighboring pixels.
    pub scan_pitch: f64,
}

impl Camera {
    pub fn new(screen: Screen, width: usize, height: usize) -> Camera {
        Camera {
            screen,
            width,
            height,
            scan_pitch: SCAN_WIDTH / width as f64,
        }
    }

    /// Obtains the unit direction of the primary ray through a pixel.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Vec3 {
        let xdisp = self.scan_pitch * (px as f64 - (self.width / 2) as f64);
        let ydisp = self.scan_pitch * (py as f64 - (self.height / 2) as f64);

        let s = &self.screen;
        (s.x * xdisp + s.y * ydisp + s.z).normalize()
    }

    pub fn viewpoint(&self) -> Vec3 {
        self.screen.viewpoint
    }
}

#[test]
fn screen_without_rotation() {
    let s = Screen::from_angles(Vec3::new(0.0, 1.0, 0.0), 0.0, 0.0);

    assert_eq!(s.z, Vec3::new(0.0, 0.0, 200.0));
    assert_eq!(s.x, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(s.y, Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(s.viewpoint, Vec3::new(0.0, 1.0, -200.0));
}

#[test]
fn screen_basis_is_orthogonal() {
    let s = Screen::from_angles(Vec3::zero(), 23.0, -71.0);

    assert!(s.x.dot(&s.y).abs() < 1e-9);
    assert!(s.x.dot(&s.z).abs() < 1e-9);
    assert!(s.y.dot(&s.z).abs() < 1e-9);
    assert!((s.z.magnitude() - 200.0).abs() < 1e-9);
}

#[test]
fn ray_through_center() {
    let c = Camera::new(Screen::from_angles(Vec3::zero(), 0.0, 0.0), 128, 128);

    assert_eq!(c.ray_for_pixel(64, 64), Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(Screen::from_angles(Vec3::zero(), 0.0, 0.0), 64, 64);

    // Two screen units per pixel; the corner is 64 units off center.
    let l = (64.0f64 * 64.0 * 2.0 + 200.0 * 200.0).sqrt();
    assert_eq!(c.ray_for_pixel(0, 0), Vec3::new(-64.0 / l, 64.0 / l, 200.0 / l));
}
