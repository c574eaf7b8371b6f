use crate::object::{ Object, ShapeKind };
use crate::vector::{ Vec3, neg_unless };

/// Per-object coefficients precomputed for one fixed direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DirConst {
    /// Face positions along each axis and the reciprocal direction
    /// components. A zero reciprocal means the face family is never hit.
    Box { faces: Vec3, recip: Vec3 },

    /// `-1 / (normal · v)` and `-normal / (normal · v)`. A zero `neg_recip`
    /// means the plane faces away from the direction.
    Plane { neg_recip: f64, normal: Vec3 },

    /// `Q(v)`, a row with `row · b = -B(v, b)`, and `1 / Q(v)` (zero when
    /// `Q(v)` is zero).
    Quadric { aa: f64, row: Vec3, recip: f64 },
}

impl DirConst {
    /// Precomputes the coefficients of `obj` for direction `v`.
    pub fn new(v: &Vec3, obj: &Object) -> DirConst {
        match obj.shape {
            ShapeKind::Box => {
                let mut faces = Vec3::zero();
                let mut recip = Vec3::zero();

                for axis in 0..3 {
                    if v[axis] != 0.0 {
                        faces[axis] = neg_unless(
                            obj.invert ^ (v[axis] < 0.0),
                            obj.params[axis]
                        );
                        recip[axis] = 1.0 / v[axis];
                    }
                }

                DirConst::Box { faces, recip }
            },

            ShapeKind::Plane => {
                let den = v.dot(&obj.params);
                if den > 0.0 {
                    DirConst::Plane {
                        neg_recip: -1.0 / den,
                        normal: obj.params * (-1.0 / den),
                    }
                } else {
                    DirConst::Plane { neg_recip: 0.0, normal: Vec3::zero() }
                }
            },

            ShapeKind::Quadric | ShapeKind::Cone => {
                let aa = obj.quadratic(v);
                let p = &obj.params;
                let mut row = Vec3::new(-v.x * p.x, -v.y * p.y, -v.z * p.z);

                if let Some(r) = obj.rotation {
                    row.x -= 0.5 * (v.z * r.y + v.y * r.z);
                    row.y -= 0.5 * (v.z * r.x + v.x * r.z);
                    row.z -= 0.5 * (v.y * r.x + v.x * r.y);
                }

                let recip = if aa == 0.0 { 0.0 } else { 1.0 / aa };
                DirConst::Quadric { aa, row, recip }
            },
        }
    }
}

/// A direction together with its per-object coefficient table.
///
/// Building a table costs one pass over the objects; every later query along
/// the same direction then skips rederiving the quadratic coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct DirVec {
    pub vec: Vec3,
    consts: Vec<DirConst>,
}

impl DirVec {
    pub fn new(vec: Vec3, objects: &[Object]) -> DirVec {
        let consts = objects.iter().map(|o| DirConst::new(&vec, o)).collect();
        DirVec { vec, consts }
    }

    /// The coefficients of the object at `index`.
    ///
    /// Panics if `index` is not an object of the world the table was built
    /// for.
    pub fn get(&self, index: usize) -> &DirConst {
        &self.consts[index]
    }

    pub fn len(&self) -> usize {
        self.consts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consts.is_empty()
    }
}

/// Origin-dependent terms of one object.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StartConst {
    /// The origin translated into the object's frame.
    pub local: Vec3,

    /// Plane: `normal · local`. Quadric: `Q(local) - 1`. Cone: `Q(local)`.
    /// Unused for boxes.
    pub constant: f64,
}

/// Per-object constants for one fixed ray origin.
///
/// A table is owned by whoever traces from the origin and is refreshed with
/// `reset` whenever the origin moves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartTable {
    origin: Vec3,
    consts: Vec<StartConst>,
}

impl StartTable {
    pub fn new(origin: Vec3, objects: &[Object]) -> StartTable {
        let mut table = StartTable {
            origin,
            consts: Vec::with_capacity(objects.len()),
        };

        table.reset(origin, objects);
        table
    }

    /// Recomputes every object's constants for a new origin.
    pub fn reset(&mut self, origin: Vec3, objects: &[Object]) {
        self.origin = origin;
        self.consts.clear();
        self.consts.extend(objects.iter().map(|o| {
            let local = o.local(origin);
            StartConst { local, constant: o.surface_constant(&local) }
        }));
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn get(&self, index: usize) -> &StartConst {
        &self.consts[index]
    }
}

#[test]
fn box_table_skips_zero_components() {
    let b = Object::cuboid(Vec3::zero(), Vec3::new(1.0, 2.0, 3.0));

    match DirConst::new(&Vec3::new(0.0, -0.5, 2.0), &b) {
        DirConst::Box { faces, recip } => {
            assert_eq!(recip, Vec3::new(0.0, -2.0, 0.5));
            assert_eq!(faces, Vec3::new(0.0, 2.0, -3.0));
        },
        c => panic!("Expected box coefficients, got {:?}.", c),
    }
}

#[test]
fn plane_table_marks_back_facing() {
    let floor = Object::half_space(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0));

    match DirConst::new(&Vec3::new(0.0, 1.0, 0.0), &floor) {
        DirConst::Plane { neg_recip, .. } => assert_eq!(neg_recip, 0.0),
        c => panic!("Expected plane coefficients, got {:?}.", c),
    }

    match DirConst::new(&Vec3::new(0.0, -0.5, 0.0), &floor) {
        DirConst::Plane { neg_recip, normal } => {
            assert_eq!(neg_recip, -2.0);
            assert_eq!(normal, Vec3::new(0.0, 2.0, 0.0));
        },
        c => panic!("Expected plane coefficients, got {:?}.", c),
    }
}

#[test]
fn quadric_row_negates_bilinear_form() {
    use crate::object::rotate_quadratic_form;

    let (params, cross) = rotate_quadratic_form(
        Vec3::new(1.0, 0.5, -0.25),
        Vec3::new(0.2, 0.9, -1.4)
    );
    let o = Object {
        shape: ShapeKind::Cone,
        params,
        rotation: Some(cross),
        ..Default::default()
    };

    let v = Vec3::new(0.3, -0.8, 0.5);
    let b = Vec3::new(-2.0, 1.0, 4.0);

    match DirConst::new(&v, &o) {
        DirConst::Quadric { aa, row, recip } => {
            assert!((aa - o.quadratic(&v)).abs() < 1e-12);
            assert!((row.dot(&b) + o.bilinear(&v, &b)).abs() < 1e-12);
            assert!((recip * aa - 1.0).abs() < 1e-12);
        },
        c => panic!("Expected quadric coefficients, got {:?}.", c),
    }
}

#[test]
fn start_table_tracks_origin() {
    let objects = vec![
        Object::sphere(Vec3::new(0.0, 0.0, 5.0), 2.0),
        Object::half_space(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
    ];

    let mut table = StartTable::new(Vec3::zero(), &objects);
    assert_eq!(table.get(0).local, Vec3::new(0.0, 0.0, -5.0));
    assert!((table.get(0).constant - (25.0 / 4.0 - 1.0)).abs() < 1e-12);
    assert!((table.get(1).constant + 1.0).abs() < 1e-12);

    table.reset(Vec3::new(0.0, 0.0, 5.0), &objects);
    assert_eq!(table.origin(), Vec3::new(0.0, 0.0, 5.0));
    assert!((table.get(0).constant + 1.0).abs() < 1e-12);
}
