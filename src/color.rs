use std::ops::{ Add, AddAssign, Mul };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values on the 0.0 to 255.0 scale used
/// by textures and the output image. Values outside of that range are legal
/// while light accumulates; they are only clamped when a pixel is encoded.
///
/// # Examples
///
/// Scale a texture color by a brightness:
///
/// ```
/// # use csg_ray_tracer::color::Color;
/// let grey = Color::rgb(128.0, 128.0, 128.0);
/// assert_eq!(grey * 0.5, Color::rgb(64.0, 64.0, 64.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> [f64; 3] {
        [c.r, c.g, c.b]
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// A grey with all three components set to `v`.
    pub fn grey(v: f64) -> Color {
        Color { r: v, g: v, b: v }
    }

    /// Adds `scale * c` to this color.
    pub fn accum(&mut self, scale: f64, c: &Color) {
        self.r += scale * c.r;
        self.g += scale * c.g;
        self.b += scale * c.b;
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products.
    ///
    /// ```
    /// # use csg_ray_tracer::color::Color;
    /// let weight = Color::rgb(0.5, 0.25, 0.0);
    /// let light = Color::rgb(100.0, 100.0, 100.0);
    /// assert_eq!(Color::hadamard(&weight, &light), Color::rgb(50.0, 25.0, 0.0));
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Clamps each component to [0, 255] and truncates it to a byte.
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            self.r.clamp(0.0, 255.0) as u8,
            self.g.clamp(0.0, 255.0) as u8,
            self.b.clamp(0.0, 255.0) as u8,
        ]
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        self.r += other.r;
        self.g += other.g;
        self.b += other.b;
    }
}

/// Multiplies a color by a scalar.
///
/// Each component is multiplied by the scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn accumulate_scaled_color() {
    let mut c = Color::grey(10.0);
    c.accum(0.5, &Color::rgb(2.0, 4.0, 6.0));

    assert_eq!(c, Color::rgb(11.0, 12.0, 13.0));
}

#[test]
fn bytes_are_clamped_and_truncated() {
    let c = Color::rgb(-3.0, 127.9, 300.0);

    assert_eq!(c.to_bytes(), [0, 127, 255]);
}
