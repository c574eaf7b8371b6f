use crate::object::{ Object, ShapeKind, FACE_SURFACE };
use crate::dirvec::{ DirVec, DirConst, StartTable };
use crate::vector::{ Vec3, neg_unless };

/// Axis triples of the box face families, in the order they are tested.
///
/// The first axis is perpendicular to the face; the other two must fall
/// within the box's extents at the crossing. Face codes are the position in
/// this list plus one.
const BOX_FACES: [(usize, usize, usize); 3] = [(0, 1, 2), (1, 2, 0), (2, 0, 1)];

/// A ray's crossing of a primitive's boundary.
///
/// `t` is the ray parameter of the crossing and `face` the face code that
/// identifies which bounding surface was crossed (1 for planes and curved
/// surfaces, 1 to 3 for boxes).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Crossing {
    pub t: f64,
    pub face: u8,
}

/// Intersection capability of a ray.
///
/// A ray knows its origin and direction, and how to find where it crosses
/// the boundary of an object. Implementors differ only in how much of that
/// work was done up front; all of them report the same crossings.
///
/// `solve` reports the boundary crossing of a single primitive, not
/// visibility. Whether a crossing is actually on a visible surface is decided
/// by the CSG network in `World`.
pub trait Intersect {
    fn origin(&self) -> Vec3;
    fn direction(&self) -> Vec3;

    /// Finds the crossing of the object at `index` in the world, `obj`.
    fn solve(&self, index: usize, obj: &Object) -> Option<Crossing>;
}

/// A ray without any precomputation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeneralRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl GeneralRay {
    pub fn new(origin: Vec3, direction: Vec3) -> GeneralRay {
        GeneralRay { origin, direction }
    }
}

impl Intersect for GeneralRay {
    fn origin(&self) -> Vec3 {
        self.origin
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn solve(&self, _index: usize, obj: &Object) -> Option<Crossing> {
        let b = obj.local(self.origin);
        let dir = &self.direction;

        match obj.shape {
            ShapeKind::Box => solve_box(obj, dir, &b),
            ShapeKind::Plane => solve_plane(obj, dir, &b),
            ShapeKind::Quadric | ShapeKind::Cone => solve_quadric(obj, dir, &b),
        }
    }
}

/// A ray along a tabulated direction, from any origin.
#[derive(Copy, Clone, Debug)]
pub struct TableRay<'a> {
    pub table: &'a DirVec,
    pub origin: Vec3,
}

impl<'a> TableRay<'a> {
    pub fn new(table: &'a DirVec, origin: Vec3) -> TableRay<'a> {
        TableRay { table, origin }
    }
}

impl<'a> Intersect for TableRay<'a> {
    fn origin(&self) -> Vec3 {
        self.origin
    }

    fn direction(&self) -> Vec3 {
        self.table.vec
    }

    fn solve(&self, index: usize, obj: &Object) -> Option<Crossing> {
        let b = obj.local(self.origin);

        match *self.table.get(index) {
            DirConst::Box { faces, recip } =>
                solve_box_table(obj, &self.table.vec, &faces, &recip, &b),

            DirConst::Plane { neg_recip, normal } => {
                if neg_recip < 0.0 {
                    Some(Crossing { t: normal.dot(&b), face: FACE_SURFACE })
                } else {
                    None
                }
            },

            DirConst::Quadric { aa, row, recip } => {
                let cc = obj.surface_constant(&b);
                solve_quadric_table(obj, aa, row.dot(&b), cc, recip)
            },
        }
    }
}

/// A ray along a tabulated direction, from the origin of a start table.
///
/// Plane and quadric queries reduce to a handful of scalar operations. Boxes
/// gain nothing from the fixed origin and use the direction table alone.
#[derive(Copy, Clone, Debug)]
pub struct FixedRay<'a> {
    pub table: &'a DirVec,
    pub start: &'a StartTable,
}

impl<'a> FixedRay<'a> {
    pub fn new(table: &'a DirVec, start: &'a StartTable) -> FixedRay<'a> {
        FixedRay { table, start }
    }
}

impl<'a> Intersect for FixedRay<'a> {
    fn origin(&self) -> Vec3 {
        self.start.origin()
    }

    fn direction(&self) -> Vec3 {
        self.table.vec
    }

    fn solve(&self, index: usize, obj: &Object) -> Option<Crossing> {
        let sc = self.start.get(index);

        match *self.table.get(index) {
            DirConst::Box { faces, recip } =>
                solve_box_table(obj, &self.table.vec, &faces, &recip, &sc.local),

            DirConst::Plane { neg_recip, .. } => {
                if neg_recip < 0.0 {
                    Some(Crossing { t: neg_recip * sc.constant, face: FACE_SURFACE })
                } else {
                    None
                }
            },

            DirConst::Quadric { aa, row, recip } =>
                solve_quadric_table(obj, aa, row.dot(&sc.local), sc.constant, recip),
        }
    }
}

/// Checks that the crossing at `t` lies strictly inside the extents of the
/// two axes parallel to the face.
fn within_face(obj: &Object, dir: &Vec3, b: &Vec3, t: f64, i1: usize, i2: usize)
    -> bool {
    (t * dir[i1] + b[i1]).abs() < obj.params[i1]
        && (t * dir[i2] + b[i2]).abs() < obj.params[i2]
}

fn solve_box(obj: &Object, dir: &Vec3, b: &Vec3) -> Option<Crossing> {
    for (code, &(i0, i1, i2)) in BOX_FACES.iter().enumerate() {
        if dir[i0] == 0.0 {
            continue;
        }

        let d = neg_unless(obj.invert ^ (dir[i0] < 0.0), obj.params[i0]);
        let t = (d - b[i0]) / dir[i0];

        if within_face(obj, dir, b, t, i1, i2) {
            return Some(Crossing { t, face: code as u8 + 1 });
        }
    }

    None
}

fn solve_box_table(obj: &Object, dir: &Vec3, faces: &Vec3, recip: &Vec3,
    b: &Vec3) -> Option<Crossing> {
    for (code, &(i0, i1, i2)) in BOX_FACES.iter().enumerate() {
        if recip[i0] == 0.0 {
            continue;
        }

        let t = (faces[i0] - b[i0]) * recip[i0];

        if within_face(obj, dir, b, t, i1, i2) {
            return Some(Crossing { t, face: code as u8 + 1 });
        }
    }

    None
}

fn solve_plane(obj: &Object, dir: &Vec3, b: &Vec3) -> Option<Crossing> {
    let den = obj.params.dot(dir);

    if den > 0.0 {
        Some(Crossing { t: -obj.params.dot(b) / den, face: FACE_SURFACE })
    } else {
        None
    }
}

fn solve_quadric(obj: &Object, dir: &Vec3, b: &Vec3) -> Option<Crossing> {
    let aa = obj.quadratic(dir);
    if aa == 0.0 {
        return None;
    }

    let bb = obj.bilinear(dir, b);
    let cc = obj.surface_constant(b);
    let d = bb * bb - aa * cc;

    if d > 0.0 {
        let sd = neg_unless(obj.invert, d.sqrt());
        Some(Crossing { t: (sd - bb) / aa, face: FACE_SURFACE })
    } else {
        None
    }
}

fn solve_quadric_table(obj: &Object, aa: f64, neg_bb: f64, cc: f64, recip: f64)
    -> Option<Crossing> {
    if aa == 0.0 {
        return None;
    }

    let d = neg_bb * neg_bb - aa * cc;

    if d > 0.0 {
        let sd = neg_unless(obj.invert, d.sqrt());
        Some(Crossing { t: (neg_bb + sd) * recip, face: FACE_SURFACE })
    } else {
        None
    }
}

/* Tests */

#[cfg(test)]
pub(crate) fn random_object(rng: &mut rand::rngs::StdRng) -> Object {
    use rand::Rng;
    use crate::object::rotate_quadratic_form;

    let mut v = |lo: f64, hi: f64| Vec3::new(
        rng.gen_range(lo..hi), rng.gen_range(lo..hi), rng.gen_range(lo..hi)
    );

    let center = v(-3.0, 3.0);
    let size = v(0.5, 3.0);
    let angles = v(-3.0, 3.0);

    let shape = match rng.gen_range(0..4) {
        0 => ShapeKind::Box,
        1 => ShapeKind::Plane,
        2 => ShapeKind::Quadric,
        _ => ShapeKind::Cone,
    };
    let invert = rng.gen_bool(0.5);
    let rotated = rng.gen_bool(0.5);

    let mut obj = Object { shape, center, invert, ..Default::default() };
    match shape {
        ShapeKind::Box => obj.params = size,
        ShapeKind::Plane => {
            obj.params = angles.normalize();
            obj.invert = true;
        },
        ShapeKind::Quadric | ShapeKind::Cone => {
            let mut diag = Vec3::new(
                1.0 / (size.x * size.x),
                1.0 / (size.y * size.y),
                1.0 / (size.z * size.z)
            );

            // Hyperboloids and cones need a negative coefficient.
            if shape == ShapeKind::Cone || rng.gen_bool(0.3) {
                diag.z = -diag.z;
            }

            if rotated {
                let (d, cross) = rotate_quadratic_form(diag, angles);
                obj.params = d;
                obj.rotation = Some(cross);
            } else {
                obj.params = diag;
            }
        },
    }

    obj
}

#[cfg(test)]
fn same_crossing(a: Option<Crossing>, b: Option<Crossing>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.face == b.face
            && (a.t - b.t).abs() <= 1e-6 + 1e-4 * a.t.abs(),
        _ => false,
    }
}

#[test]
fn box_faces_are_tested_in_order() {
    let b = Object::cuboid(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 1.0, 1.0));

    let r = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(r.solve(0, &b), Some(Crossing { t: 9.0, face: 3 }));

    let r = GeneralRay::new(Vec3::new(-5.0, 0.0, 10.0), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(r.solve(0, &b), Some(Crossing { t: 4.0, face: 1 }));

    let r = GeneralRay::new(Vec3::new(0.0, 5.0, 10.5), Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(r.solve(0, &b), Some(Crossing { t: 4.0, face: 2 }));

    let r = GeneralRay::new(Vec3::new(5.0, 5.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(r.solve(0, &b), None);
}

#[test]
fn inverted_box_is_crossed_at_far_face() {
    let mut b = Object::cuboid(Vec3::zero(), Vec3::new(2.0, 2.0, 2.0));
    b.invert = true;

    let r = GeneralRay::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(r.solve(0, &b), Some(Crossing { t: 2.0, face: 1 }));
}

#[test]
fn sphere_crossing_depends_on_polarity() {
    let mut s = Object::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0);
    let r = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));

    assert_eq!(r.solve(0, &s), Some(Crossing { t: 4.0, face: 1 }));

    s.invert = true;
    assert_eq!(r.solve(0, &s), Some(Crossing { t: 6.0, face: 1 }));

    let r = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(r.solve(0, &s), None);
}

#[test]
fn plane_crossed_only_when_facing() {
    let floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));

    let down = GeneralRay::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, -2.0, 0.0));
    assert_eq!(down.solve(0, &floor), Some(Crossing { t: 2.0, face: 1 }));

    let up = GeneralRay::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(up.solve(0, &floor), None);

    let flat = GeneralRay::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(flat.solve(0, &floor), None);
}

#[test]
fn degenerate_quadric_direction_misses() {
    // A cylinder along Z: Q(v) vanishes for v parallel to the axis.
    let cylinder = Object {
        shape: ShapeKind::Quadric,
        params: Vec3::new(1.0, 1.0, 0.0),
        ..Default::default()
    };

    let r = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(r.solve(0, &cylinder), None);

    let objects = vec![cylinder];
    let table = DirVec::new(Vec3::new(0.0, 0.0, 1.0), &objects);
    let start = StartTable::new(Vec3::zero(), &objects);
    assert_eq!(TableRay::new(&table, Vec3::zero()).solve(0, &objects[0]), None);
    assert_eq!(FixedRay::new(&table, &start).solve(0, &objects[0]), None);
}

#[test]
fn strategies_agree_on_random_rays() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let objects: Vec<Object> = (0..40).map(|_| random_object(&mut rng)).collect();

    let mut hits = 0;
    for _ in 0..200 {
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0)
        ).normalize();
        let origin = Vec3::new(
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0)
        );

        let table = DirVec::new(dir, &objects);
        let start = StartTable::new(origin, &objects);

        let general = GeneralRay::new(origin, dir);
        let fast = TableRay::new(&table, origin);
        let fixed = FixedRay::new(&table, &start);

        for (i, obj) in objects.iter().enumerate() {
            let g = general.solve(i, obj);
            let f = fast.solve(i, obj);
            let f2 = fixed.solve(i, obj);

            assert!(same_crossing(g, f), "object {}: {:?} vs {:?}", i, g, f);
            assert!(same_crossing(g, f2), "object {}: {:?} vs {:?}", i, g, f2);

            if g.is_some() {
                hits += 1;
            }
        }
    }

    // The sample must actually exercise crossings.
    assert!(hits > 1000);
}

#[test]
fn inside_outside_flips_at_crossing() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;

    let mut rng = StdRng::seed_from_u64(42);
    let eps = 1e-6;
    let mut checked = 0;

    for _ in 0..2000 {
        let obj = random_object(&mut rng);
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0)
        ).normalize();
        let origin = Vec3::new(
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0)
        );

        if let Some(c) = GeneralRay::new(origin, dir).solve(0, &obj) {
            let before = obj.is_outside(origin + dir * (c.t - eps));
            let after = obj.is_outside(origin + dir * (c.t + eps));
            assert_ne!(before, after, "{:?} at t = {}", obj, c.t);
            checked += 1;
        }
    }

    assert!(checked > 300);
}
