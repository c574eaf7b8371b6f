use std::ops::{ Add, AddAssign, Sub, Neg, Mul, Index, IndexMut };

use crate::feq;

/// Sign of a float, with an exact zero.
///
/// Returns `0.0` only for an exact (positive or negative) zero; any other value
/// maps to `1.0` or `-1.0`.
pub fn sgn(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Returns `x` when `cond` holds, otherwise `-x`.
pub fn neg_unless(cond: bool, x: f64) -> f64 {
    if cond { x } else { -x }
}

/// A 3D vector.
///
/// Used for points, directions and normals alike; there is no `w` component
/// since every transformation in this tracer is folded into object
/// coefficients at load time.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Vec3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Vec3 {
        Vec3 { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> [f64; 3] {
        [v.x, v.y, v.z]
    }
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3 { x, y, z }
    }

    pub fn zero() -> Vec3 {
        Vec3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        f64::sqrt(self.x.powi(2) + self.y.powi(2) + self.z.powi(2))
    }

    /// Normalizes a vector without checking for zero length.
    pub fn normalize(&self) -> Vec3 {
        let il = 1.0 / self.magnitude();
        *self * il
    }

    /// Normalizes a vector, flipping it when `invert` is set.
    ///
    /// A zero-length vector is returned unchanged instead of producing NaNs.
    pub fn normalize_signed(&self, invert: bool) -> Vec3 {
        let l = self.magnitude();
        let il = if l == 0.0 {
            1.0
        } else if invert {
            -1.0 / l
        } else {
            1.0 / l
        };

        *self * il
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }


    /// Component-wise product.
    pub fn hadamard(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Vec3) -> Vec3 {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

/// Indexes the components of a vector by axis (`0` is X, `2` is Z).
///
/// Panics if the axis is greater than 2.
impl Index<usize> for Vec3 {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector axis {} out of range.", axis),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vector axis {} out of range.", axis),
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// use csg_ray_tracer::vector::Vec3;
///
/// let v = Vec3::new(1.0, 2.0, 3.0);
/// assert_eq!(v * 2.0, Vec3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Implements scalar left-multiplication for a vector.
///
/// ```
/// use csg_ray_tracer::vector::Vec3;
///
/// let v = Vec3::new(1.0, 2.0, 3.0);
/// assert_eq!(2.0 * v, Vec3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, other: Vec3) -> Vec3 {
        other * self
    }
}

/* Tests */

#[test]
fn sgn_keeps_exact_zero() {
    assert_eq!(sgn(0.0), 0.0);
    assert_eq!(sgn(-0.0), 0.0);
    assert_eq!(sgn(1e-300), 1.0);
    assert_eq!(sgn(-1e-300), -1.0);
}

#[test]
fn neg_unless_flips_on_false() {
    assert_eq!(neg_unless(true, 2.5), 2.5);
    assert_eq!(neg_unless(false, 2.5), -2.5);
}

#[test]
fn add_and_sub_vectors() {
    let a = Vec3::new(3.0, -2.0, 5.0);
    let b = Vec3::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vec3::new(1.0, 1.0, 6.0));
    assert_eq!(a - b, Vec3::new(5.0, -5.0, 4.0));
    assert_eq!(-a, Vec3::new(-3.0, 2.0, -5.0));
}

#[test]
fn normalize_dirty() {
    let v = Vec3::new(1.0, 2.0, 3.0);
    let e = Vec3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize(), e);
}

#[test]
fn normalize_signed_inverts_and_tolerates_zero() {
    let v = Vec3::new(0.0, 3.0, 4.0);

    assert_eq!(v.normalize_signed(false), Vec3::new(0.0, 0.6, 0.8));
    assert_eq!(v.normalize_signed(true), Vec3::new(0.0, -0.6, -0.8));
    assert_eq!(Vec3::zero().normalize_signed(true), Vec3::zero());
}

#[test]
fn dot_product() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
    assert_eq!(b.dot(&a), 20.0);
}

#[test]
fn index_by_axis() {
    let mut v = Vec3::new(1.0, 2.0, 3.0);
    v[1] = -5.0;

    assert_eq!(v[0], 1.0);
    assert_eq!(v[1], -5.0);
    assert_eq!(v[2], 3.0);
}

#[test]
fn reflect_45() {
    let v = Vec3::new(1.0, -1.0, 0.0);
    let n = Vec3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vec3::new(1.0, 1.0, 0.0));
}
