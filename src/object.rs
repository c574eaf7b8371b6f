use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::vector::{ Vec3, sgn };

/// Face code of the box face perpendicular to X.
pub const FACE_YZ: u8 = 1;

/// Face code of the box face perpendicular to Y.
pub const FACE_ZX: u8 = 2;

/// Face code of the box face perpendicular to Z.
pub const FACE_XY: u8 = 3;

/// Face code reported by planes and curved surfaces.
pub const FACE_SURFACE: u8 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// An axis-aligned box; `params` holds the half-extents.
    Box,

    /// A half-space bounded by a plane; `params` holds the unit normal.
    Plane,

    /// A quadric `Q(p) = 1`; `params` holds the diagonal of `Q`.
    Quadric,

    /// A cone `Q(p) = 0`; `params` holds the diagonal of `Q`.
    Cone,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    Plain,
    Checker,
    Stripe,
    Rings,
    Speckle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionKind {
    /// Only diffuse light.
    Diffuse,

    /// Diffuse light plus an imperfect specular component.
    Glossy,

    /// Diffuse light plus perfect mirror reflection.
    Mirror,
}

impl Default for Texture {
    fn default() -> Texture {
        Texture::Plain
    }
}

impl Default for ReflectionKind {
    fn default() -> ReflectionKind {
        ReflectionKind::Diffuse
    }
}

impl ReflectionKind {
    /// Whether rays bounce off this surface and light is mirrored by it.
    pub fn is_specular(&self) -> bool {
        match self {
            ReflectionKind::Diffuse => false,
            ReflectionKind::Glossy | ReflectionKind::Mirror => true,
        }
    }
}

/// One CSG primitive.
///
/// Objects are stored in their normalized form: quadric sizes have already
/// been converted into quadratic form coefficients, plane normals are unit
/// length with a fixed polarity, and rotations are folded into `params` and
/// `rotation`. See `scene::ObjectDesc` for the conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub shape: ShapeKind,
    pub texture: Texture,
    pub reflection: ReflectionKind,

    /// Box half-extents, plane normal or quadratic form diagonal.
    pub params: Vec3,

    pub center: Vec3,

    /// Polarity. When set, the region outside of the boundary is the solid.
    pub invert: bool,

    /// Cross-term coefficients of the quadratic form, for the `yz`, `zx` and
    /// `xy` products respectively. Only present for rotated objects.
    pub rotation: Option<Vec3>,

    pub diffuse: f64,
    pub highlight: f64,
    pub color: Color,
}

impl Default for Object {
    fn default() -> Object {
        Object {
            shape: ShapeKind::Box,
            texture: Texture::Plain,
            reflection: ReflectionKind::Diffuse,
            params: Vec3::new(1.0, 1.0, 1.0),
            center: Vec3::zero(),
            invert: false,
            rotation: None,
            diffuse: 1.0,
            highlight: 0.0,
            color: Color::grey(255.0),
        }
    }
}

impl Object {
    /// Creates an axis-aligned box with half-extents `half`.
    pub fn cuboid(center: Vec3, half: Vec3) -> Object {
        Object {
            shape: ShapeKind::Box,
            params: half,
            center,
            ..Default::default()
        }
    }

    /// Creates a sphere of radius `radius`, already in quadratic form.
    pub fn sphere(center: Vec3, radius: f64) -> Object {
        let k = 1.0 / (radius * radius);
        Object {
            shape: ShapeKind::Quadric,
            params: Vec3::new(k, k, k),
            center,
            ..Default::default()
        }
    }

    /// Creates a half-space with an already normalized `normal`.
    ///
    /// The solid lies on the side the normal points to; `normal_at` reports
    /// the opposite direction, towards the empty side.
    pub fn half_space(point: Vec3, normal: Vec3) -> Object {
        Object {
            shape: ShapeKind::Plane,
            params: normal,
            center: point,
            invert: true,
            ..Default::default()
        }
    }

    /// Translates a world point into this object's frame.
    pub fn local(&self, p: Vec3) -> Vec3 {
        p - self.center
    }

    /// The value subtracted from `Q(p)` to place the boundary at zero.
    pub fn form_offset(&self) -> f64 {
        match self.shape {
            ShapeKind::Quadric => 1.0,
            _ => 0.0,
        }
    }

    /// Evaluates the quadratic form on `v`.
    pub fn quadratic(&self, v: &Vec3) -> f64 {
        let p = &self.params;
        let diag = v.x * v.x * p.x + v.y * v.y * p.y + v.z * v.z * p.z;

        match self.rotation {
            None => diag,
            Some(r) => diag + v.y * v.z * r.x + v.z * v.x * r.y + v.x * v.y * r.z,
        }
    }

    /// Evaluates the symmetric bilinear form of `v` and `w`.
    pub fn bilinear(&self, v: &Vec3, w: &Vec3) -> f64 {
        let p = &self.params;
        let diag = v.x * w.x * p.x + v.y * w.y * p.y + v.z * w.z * p.z;

        match self.rotation {
            None => diag,
            Some(r) => diag + 0.5 * (
                (v.z * w.y + v.y * w.z) * r.x
                + (v.x * w.z + v.z * w.x) * r.y
                + (v.x * w.y + v.y * w.x) * r.z
            ),
        }
    }

    /// The constant term of the surface equation at a local point.
    ///
    /// For planes this is the signed distance along the normal; for quadrics
    /// and cones it is the offset form value. Boxes have no such term.
    pub fn surface_constant(&self, local: &Vec3) -> f64 {
        match self.shape {
            ShapeKind::Box => 0.0,
            ShapeKind::Plane => self.params.dot(local),
            ShapeKind::Quadric | ShapeKind::Cone
                => self.quadratic(local) - self.form_offset(),
        }
    }

    /// Checks whether a world point lies outside of this object.
    pub fn is_outside(&self, p: Vec3) -> bool {
        let l = self.local(p);

        match self.shape {
            ShapeKind::Box => {
                let within = l.x.abs() < self.params.x
                    && l.y.abs() < self.params.y
                    && l.z.abs() < self.params.z;

                if within { self.invert } else { !self.invert }
            },

            ShapeKind::Plane | ShapeKind::Quadric | ShapeKind::Cone => {
                let w = self.surface_constant(&l);
                !(self.invert ^ (w < 0.0))
            },
        }
    }

    /// Obtains the surface normal at a hit point.
    ///
    /// `direction` is the direction of the ray that produced the hit and
    /// `face` the face code reported by the solver. Box normals face against
    /// the ray along the struck axis.
    ///
    /// Panics if a box reports a face code other than 1, 2 or 3.
    pub fn normal_at(&self, point: Vec3, direction: Vec3, face: u8) -> Vec3 {
        match self.shape {
            ShapeKind::Box => {
                let axis = match face {
                    FACE_YZ => 0,
                    FACE_ZX => 1,
                    FACE_XY => 2,
                    _ => panic!("Box reported unknown face code {}.", face),
                };

                let mut n = Vec3::zero();
                n[axis] = -sgn(direction[axis]);
                n
            },

            ShapeKind::Plane => -self.params,

            ShapeKind::Quadric | ShapeKind::Cone => {
                let p = self.local(point);
                let a = &self.params;
                let mut n = Vec3::new(p.x * a.x, p.y * a.y, p.z * a.z);

                // Off-diagonal entries of the form are half the cross terms.
                if let Some(r) = self.rotation {
                    n.x += 0.5 * (p.y * r.z + p.z * r.y);
                    n.y += 0.5 * (p.x * r.z + p.z * r.x);
                    n.z += 0.5 * (p.x * r.y + p.y * r.x);
                }

                n.normalize_signed(self.invert)
            },
        }
    }
}

/// Folds a rotation into the diagonal quadratic form `params`.
///
/// `angles` are the rotations about X, Y and Z in radians. The rotated form is
/// `Mᵀ diag(params) M` with `M = Rz Ry Rx`; its diagonal is returned together
/// with the cross-term coefficients (`yz`, `zx`, `xy`), which are twice the
/// off-diagonal entries.
pub fn rotate_quadratic_form(params: Vec3, angles: Vec3) -> (Vec3, Vec3) {
    let (sin_x, cos_x) = angles.x.sin_cos();
    let (sin_y, cos_y) = angles.y.sin_cos();
    let (sin_z, cos_z) = angles.z.sin_cos();

    let m00 = cos_y * cos_z;
    let m01 = sin_x * sin_y * cos_z - cos_x * sin_z;
    let m02 = cos_x * sin_y * cos_z + sin_x * sin_z;

    let m10 = cos_y * sin_z;
    let m11 = sin_x * sin_y * sin_z + cos_x * cos_z;
    let m12 = cos_x * sin_y * sin_z - sin_x * cos_z;

    let m20 = -sin_y;
    let m21 = sin_x * cos_y;
    let m22 = cos_x * cos_y;

    let (a, b, c) = (params.x, params.y, params.z);

    let diag = Vec3::new(
        a * m00 * m00 + b * m10 * m10 + c * m20 * m20,
        a * m01 * m01 + b * m11 * m11 + c * m21 * m21,
        a * m02 * m02 + b * m12 * m12 + c * m22 * m22,
    );

    let cross = Vec3::new(
        2.0 * (a * m01 * m02 + b * m11 * m12 + c * m21 * m22),
        2.0 * (a * m00 * m02 + b * m10 * m12 + c * m20 * m22),
        2.0 * (a * m00 * m01 + b * m10 * m11 + c * m20 * m21),
    );

    (diag, cross)
}

/* Tests */

#[test]
fn box_inside_test_respects_polarity() {
    let mut b = Object::cuboid(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));

    assert!(!b.is_outside(Vec3::new(1.5, 1.0, -2.0)));
    assert!(b.is_outside(Vec3::new(2.5, 0.0, 0.0)));

    b.invert = true;
    assert!(b.is_outside(Vec3::new(1.5, 1.0, -2.0)));
    assert!(!b.is_outside(Vec3::new(2.5, 0.0, 0.0)));
}

#[test]
fn sphere_inside_test() {
    let s = Object::sphere(Vec3::new(0.0, 0.0, 5.0), 2.0);

    assert!(!s.is_outside(Vec3::new(0.0, 1.9, 5.0)));
    assert!(s.is_outside(Vec3::new(0.0, 2.1, 5.0)));
}

#[test]
fn half_space_inside_test() {
    // Solid below y = 0; the stored normal points into the solid.
    let floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));

    assert!(floor.is_outside(Vec3::new(0.0, 1.0, 0.0)));
    assert!(!floor.is_outside(Vec3::new(3.0, -1.0, 7.0)));
    assert_eq!(
        floor.normal_at(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0), FACE_SURFACE),
        Vec3::new(0.0, 1.0, 0.0)
    );
}

#[test]
fn box_normal_faces_against_ray() {
    let b = Object::cuboid(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
    let d = Vec3::new(0.3, -0.5, 0.8);

    assert_eq!(b.normal_at(Vec3::zero(), d, FACE_YZ), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(b.normal_at(Vec3::zero(), d, FACE_ZX), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(b.normal_at(Vec3::zero(), d, FACE_XY), Vec3::new(0.0, 0.0, -1.0));
}

#[test]
#[should_panic]
fn box_normal_rejects_unknown_face() {
    let b = Object::cuboid(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
    b.normal_at(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), 4);
}

#[test]
fn sphere_normal_points_outwards() {
    let s = Object::sphere(Vec3::new(1.0, 1.0, 1.0), 2.0);
    let n = s.normal_at(Vec3::new(1.0, 3.0, 1.0), Vec3::zero(), FACE_SURFACE);

    assert_eq!(n, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn bilinear_of_vector_with_itself_is_quadratic() {
    let (diag, cross) = rotate_quadratic_form(
        Vec3::new(0.25, 1.0, 4.0),
        Vec3::new(0.3, -1.1, 0.7)
    );

    let o = Object {
        shape: ShapeKind::Quadric,
        params: diag,
        rotation: Some(cross),
        ..Default::default()
    };

    let v = Vec3::new(0.4, -2.0, 1.5);
    assert!((o.bilinear(&v, &v) - o.quadratic(&v)).abs() < 1e-12);
}

#[test]
fn rotation_by_zero_keeps_form() {
    let params = Vec3::new(0.25, 1.0, 4.0);
    let (diag, cross) = rotate_quadratic_form(params, Vec3::zero());

    assert_eq!(diag, params);
    assert_eq!(cross, Vec3::zero());
}

#[test]
fn rotated_quadric_normal_matches_rotated_gradient() {
    // M = Rz Ry Rx, built independently from elementary rotations.
    fn mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
        let mut m = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        m
    }

    let (ax, ay, az) = (0.4f64, -0.9f64, 1.3f64);
    let rx = [[1.0, 0.0, 0.0], [0.0, ax.cos(), -ax.sin()], [0.0, ax.sin(), ax.cos()]];
    let ry = [[ay.cos(), 0.0, ay.sin()], [0.0, 1.0, 0.0], [-ay.sin(), 0.0, ay.cos()]];
    let rz = [[az.cos(), -az.sin(), 0.0], [az.sin(), az.cos(), 0.0], [0.0, 0.0, 1.0]];
    let m = mul(&rz, &mul(&ry, &rx));

    let sizes = Vec3::new(1.0 / 4.0, 1.0, 1.0 / 9.0);
    let (diag, cross) = rotate_quadratic_form(sizes, Vec3::new(ax, ay, az));

    let center = Vec3::new(1.0, -2.0, 0.5);
    let ellipsoid = Object {
        shape: ShapeKind::Quadric,
        params: diag,
        center,
        rotation: Some(cross),
        ..Default::default()
    };

    let p = Vec3::new(0.7, 0.2, -1.1);

    // Un-rotated frame: u = M p, gradient D u, rotated back with Mᵀ.
    let u: Vec<f64> = (0..3).map(|i| (0..3).map(|k| m[i][k] * p[k]).sum()).collect();
    let g = [u[0] * sizes.x, u[1] * sizes.y, u[2] * sizes.z];
    let expected = Vec3::new(
        (0..3).map(|k| m[k][0] * g[k]).sum(),
        (0..3).map(|k| m[k][1] * g[k]).sum(),
        (0..3).map(|k| m[k][2] * g[k]).sum(),
    ).normalize();

    let n = ellipsoid.normal_at(p + center, Vec3::zero(), FACE_SURFACE);
    assert_eq!(n, expected);

    let mut inverted = ellipsoid.clone();
    inverted.invert = true;
    assert_eq!(inverted.normal_at(p + center, Vec3::zero(), FACE_SURFACE), -expected);
}
