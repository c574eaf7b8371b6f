use crate::object::Object;
use crate::dirvec::DirVec;
use crate::vector::Vec3;
use crate::consts::{ DIFFUSE_GROUPS, DIFFUSE_GROUP_SIZE };

/// Directions within a group are stored in three blocks of this size, one per
/// axis permutation.
const BLOCK: usize = DIFFUSE_GROUP_SIZE / 3;

/// Fixed sets of directions for sampling diffuse light.
///
/// Each group holds 60 antipodal pairs: even entries are directions `v`, odd
/// entries their negation `-v`. Together the groups cover the sphere roughly
/// evenly, and neighboring pixels sample different groups.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffuseDirections {
    groups: Vec<Vec<DirVec>>,
}

impl DiffuseDirections {
    /// Generates the directions and tabulates them for `objects`.
    pub fn new(objects: &[Object]) -> DiffuseDirections {
        let groups = generate_directions()
            .into_iter()
            .map(|g| g.into_iter().map(|v| DirVec::new(v, objects)).collect())
            .collect();

        DiffuseDirections { groups }
    }

    pub fn group(&self, id: usize) -> &[DirVec] {
        &self.groups[id]
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Spreads a grid coordinate so that grid points cover equal solid angles.
fn adjust(h: f64, r: f64) -> f64 {
    let l = (h * h + 0.1).sqrt();
    ((1.0 / l).atan() * r).tan() * l
}

/// Refines a grid point into a unit direction around +Z.
fn grid_direction(rx: f64, ry: f64) -> Vec3 {
    let mut x = 0.0;
    let mut y = 0.0;

    for _ in 0..5 {
        x = adjust(y, rx);
        y = adjust(x, ry);
    }

    let l = (x * x + y * y + 1.0).sqrt();
    Vec3::new(x / l, y / l, 1.0 / l)
}

/// Stores a direction, its two axis permutations and all three negations.
fn store(group: &mut [Vec3], index: usize, v: Vec3) {
    group[index] = v;
    group[index + BLOCK] = Vec3::new(v.x, v.z, -v.y);
    group[index + 2 * BLOCK] = Vec3::new(v.z, -v.x, -v.y);

    for offset in [0, BLOCK, 2 * BLOCK].iter() {
        group[index + offset + 1] = -group[index + offset];
    }
}

/// Builds the raw direction groups.
///
/// A 10 by 10 grid over `[-0.9, 0.9]` is walked row by row; each row fills
/// four slots in every group, and consecutive columns of a row go to
/// consecutive groups.
pub fn generate_directions() -> Vec<Vec<Vec3>> {
    let mut groups = vec![vec![Vec3::zero(); DIFFUSE_GROUP_SIZE]; DIFFUSE_GROUPS];

    let mut row_group = 0;
    let mut index = 0;

    for row in (0..10).rev() {
        let ry = row as f64 * 0.2 - 0.9;
        let mut group = row_group;

        for col in (0..5).rev() {
            let rx = col as f64 * 0.2 - 0.9;
            store(&mut groups[group], index, grid_direction(rx, ry));

            let rx = col as f64 * 0.2 + 0.1;
            store(&mut groups[group], index + 2, grid_direction(rx, ry));

            group = (group + 1) % DIFFUSE_GROUPS;
        }

        row_group = (row_group + 2) % DIFFUSE_GROUPS;
        index += 4;
    }

    log::debug!("Generated {} diffuse directions in {} groups",
        DIFFUSE_GROUPS * DIFFUSE_GROUP_SIZE, DIFFUSE_GROUPS);

    groups
}

#[test]
fn every_slot_is_a_unit_vector() {
    let groups = generate_directions();

    assert_eq!(groups.len(), 5);
    for g in groups.iter() {
        assert_eq!(g.len(), 120);
        for v in g.iter() {
            assert!((v.magnitude() - 1.0).abs() < 1e-9, "{:?}", v);
        }
    }
}

#[test]
fn odd_slots_negate_even_slots() {
    let groups = generate_directions();

    for g in groups.iter() {
        for pair in g.chunks(2) {
            assert_eq!(pair[1], -pair[0]);
        }
    }
}

#[test]
fn directions_are_distinct() {
    let all: Vec<Vec3> = generate_directions().into_iter().flatten().collect();

    for (i, a) in all.iter().enumerate() {
        for b in all[i + 1..].iter() {
            assert!((*a - *b).magnitude() > 1e-3, "{:?} repeated", a);
        }
    }
}

#[test]
fn grid_is_symmetric() {
    // Mirrored grid coordinates give mirrored directions.
    let a = grid_direction(0.3, -0.7);
    let b = grid_direction(-0.3, 0.7);

    assert_eq!(a, Vec3::new(-b.x, -b.y, b.z));
}

#[test]
fn directions_are_tabulated_per_object() {
    let objects = vec![Object::sphere(Vec3::zero(), 1.0)];
    let dirs = DiffuseDirections::new(&objects);

    assert_eq!(dirs.len(), 5);
    assert_eq!(dirs.group(3).len(), 120);
    assert_eq!(dirs.group(3)[0].len(), 1);
}
