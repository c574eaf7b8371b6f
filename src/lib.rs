pub mod consts;
pub mod error;

pub mod vector;
pub mod color;

pub mod object;
pub mod dirvec;
pub mod solver;
pub mod world;
pub mod reflection;

pub mod pattern;
pub mod light;
pub mod camera;
pub mod sampling;
pub mod trace;

pub mod canvas;
pub mod parallel;

pub mod scene;
pub mod sld;

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
