use serde::{ Serialize, Deserialize };

use crate::object::Object;
use crate::dirvec::DirVec;
use crate::solver::{ Intersect, TableRay };
use crate::vector::Vec3;
use crate::consts::{ SEARCH_LIMIT, HIT_MIN, HIT_MAX, SURFACE_NUDGE,
    SHADOW_MIN_DISTANCE, SHADOW_RANGE_DISTANCE };

/// One term of the OR-network.
///
/// The AND-groups are only tested when the optional range primitive is
/// crossed first, which lets a cheap bounding object reject many groups at
/// once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrEntry {
    #[serde(default)]
    pub range: Option<usize>,
    pub groups: Vec<usize>,
}

/// The nearest visible surface along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// Ray parameter of `point`, already including the surface nudge.
    pub t: f64,

    /// The hit point, nudged just past the surface into the solid.
    pub point: Vec3,

    pub object: usize,
    pub face: u8,
}

impl Hit {
    /// Identifies the struck surface as `object * 4 + face`.
    pub fn surface_id(&self) -> usize {
        self.object * 4 + self.face as usize
    }
}

/// A world of CSG objects.
///
/// Objects are combined in two levels. An AND-group is the intersection of
/// its members: a point is in the group when no member reports it outside.
/// The OR-network is the union of AND-groups, and is what rays are traced
/// against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct World {
    pub objects: Vec<Object>,
    pub and_groups: Vec<Vec<usize>>,
    pub or_network: Vec<OrEntry>,
}

impl World {
    pub fn new(objects: Vec<Object>, and_groups: Vec<Vec<usize>>,
        or_network: Vec<OrEntry>) -> World {
        World { objects, and_groups, or_network }
    }

    /// Creates a world with no objects. Nothing is ever hit or shadowed.
    pub fn empty() -> World {
        Default::default()
    }

    /// Checks whether a point lies inside every member of a group.
    ///
    /// An empty group contains every point.
    pub fn all_inside(&self, group: &[usize], p: Vec3) -> bool {
        group.iter().all(|&i| !self.objects[i].is_outside(p))
    }

    /// Finds the nearest visible surface along a ray.
    ///
    /// Every OR entry is walked to exhaustion, since a later group can always
    /// hold a nearer surface; only a strictly nearer crossing replaces the
    /// current best. Crossings are compared after the surface nudge, the
    /// same way the best is kept. Within a group, a member that is not crossed at all ends
    /// the group unless it is inverted, because the ray can then never enter
    /// it.
    pub fn nearest_hit<R: Intersect>(&self, ray: &R) -> Option<Hit> {
        let origin = ray.origin();
        let dir = ray.direction();

        let mut tmin = SEARCH_LIMIT;
        let mut best: Option<Hit> = None;

        for entry in self.or_network.iter() {
            if let Some(range) = entry.range {
                match ray.solve(range, &self.objects[range]) {
                    Some(c) if c.t < tmin => {},
                    _ => continue,
                }
            }

            for &g in entry.groups.iter() {
                let group = &self.and_groups[g];

                for &i in group.iter() {
                    let obj = &self.objects[i];

                    match ray.solve(i, obj) {
                        Some(c) => {
                            let t = c.t + SURFACE_NUDGE;
                            if 0.0 < c.t && t < tmin {
                                let q = origin + dir * t;

                                if self.all_inside(group, q) {
                                    tmin = t;
                                    best = Some(Hit {
                                        t, point: q, object: i, face: c.face
                                    });
                                }
                            }
                        },

                        None if obj.invert => {},
                        None => break,
                    }
                }
            }
        }

        best.filter(|h| HIT_MIN < h.t && h.t < HIT_MAX)
    }

    /// Checks whether anything lies between a point and the light.
    ///
    /// `light` tabulates the light direction, which points from the light
    /// into the scene, so occluders sit at negative ray parameters. Any
    /// occluding group suffices; the nearest one is never searched for.
    pub fn is_shadowed(&self, light: &DirVec, point: Vec3) -> bool {
        let ray = TableRay::new(light, point);

        for entry in self.or_network.iter() {
            if let Some(range) = entry.range {
                match ray.solve(range, &self.objects[range]) {
                    Some(c) if c.t < SHADOW_RANGE_DISTANCE => {},
                    _ => continue,
                }
            }

            for &g in entry.groups.iter() {
                if self.group_shadows(&ray, &self.and_groups[g], point) {
                    return true;
                }
            }
        }

        false
    }

    fn group_shadows(&self, ray: &TableRay, group: &[usize], point: Vec3) -> bool {
        for &i in group.iter() {
            let obj = &self.objects[i];

            match ray.solve(i, obj) {
                Some(c) if c.t < SHADOW_MIN_DISTANCE => {
                    let q = point + ray.table.vec * (c.t + SURFACE_NUDGE);
                    if self.all_inside(group, q) {
                        return true;
                    }
                },

                _ if obj.invert => {},
                _ => return false,
            }
        }

        false
    }
}

/* Tests */

#[cfg(test)]
fn single_groups(objects: Vec<Object>) -> World {
    let n = objects.len();
    World::new(
        objects,
        (0..n).map(|i| vec![i]).collect(),
        vec![OrEntry { range: None, groups: (0..n).collect() }]
    )
}

#[test]
fn nearest_hit_picks_closest_group() {
    use crate::solver::GeneralRay;

    let w = single_groups(vec![
        Object::sphere(Vec3::new(0.0, 0.0, 10.0), 1.0),
        Object::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0),
        Object::sphere(Vec3::new(0.0, 0.0, 20.0), 1.0),
    ]);

    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    let hit = w.nearest_hit(&ray).unwrap();

    assert_eq!(hit.object, 1);
    assert_eq!(hit.face, 1);
    assert!((hit.t - 4.01).abs() < 1e-9);
    assert_eq!(hit.point, Vec3::new(0.0, 0.0, 4.01));
    assert_eq!(hit.surface_id(), 5);
}

#[test]
fn nothing_behind_the_origin_is_hit() {
    use crate::solver::GeneralRay;

    let w = single_groups(vec![Object::sphere(Vec3::new(0.0, 0.0, -10.0), 1.0)]);
    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));

    assert_eq!(w.nearest_hit(&ray), None);
}

#[test]
fn intersection_group_clips_member_surfaces() {
    use crate::solver::GeneralRay;

    // A sphere cut in half by the plane z = 10, keeping the far half.
    let objects = vec![
        Object::sphere(Vec3::new(0.0, 0.0, 10.0), 2.0),
        Object::half_space(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 1.0)),
    ];
    let w = World::new(objects, vec![vec![0, 1]],
        vec![OrEntry { range: None, groups: vec![0] }]);

    // Straight on, the ray first meets the flat cut face.
    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    let hit = w.nearest_hit(&ray).unwrap();
    assert_eq!(hit.object, 1);
    assert!((hit.t - 10.01).abs() < 1e-9);

    // From behind, the curved far half is met first.
    let ray = GeneralRay::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));
    let hit = w.nearest_hit(&ray).unwrap();
    assert_eq!(hit.object, 0);
    assert!((hit.t - 8.01).abs() < 1e-9);
}

#[test]
fn disjoint_intersection_is_never_visible() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;
    use crate::solver::GeneralRay;

    let objects = vec![
        Object::sphere(Vec3::new(-3.0, 0.0, 10.0), 1.0),
        Object::sphere(Vec3::new(3.0, 0.0, 10.0), 1.0),
    ];
    let w = World::new(objects, vec![vec![0, 1]],
        vec![OrEntry { range: None, groups: vec![0] }]);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let origin = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(0.0..20.0)
        );
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0)
        ).normalize();

        assert_eq!(w.nearest_hit(&GeneralRay::new(origin, dir)), None);
    }
}

#[test]
fn range_primitive_rejects_missed_entries() {
    use crate::solver::GeneralRay;

    let objects = vec![
        Object::sphere(Vec3::new(0.0, 0.0, 10.0), 1.0),
        Object::sphere(Vec3::new(0.0, 5.0, 10.0), 0.5),
    ];
    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));

    // Bounded by a sphere the ray misses, the first object disappears.
    let w = World::new(objects.clone(), vec![vec![0]],
        vec![OrEntry { range: Some(1), groups: vec![0] }]);
    assert_eq!(w.nearest_hit(&ray), None);

    let w = World::new(objects, vec![vec![0]],
        vec![OrEntry { range: Some(0), groups: vec![0] }]);
    assert_eq!(w.nearest_hit(&ray).map(|h| h.object), Some(0));
}

#[test]
fn removing_groups_never_brings_hits_closer() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;
    use crate::solver::GeneralRay;

    let mut rng = StdRng::seed_from_u64(11);
    let objects: Vec<Object> = (0..12).map(|_| {
        let c = Vec3::new(
            rng.gen_range(-6.0..6.0),
            rng.gen_range(-6.0..6.0),
            rng.gen_range(5.0..20.0)
        );
        Object::sphere(c, rng.gen_range(0.5..2.5))
    }).collect();

    let full = single_groups(objects);
    let mut partial = full.clone();
    partial.or_network[0].groups.retain(|g| g % 3 != 0);

    for _ in 0..500 {
        let dir = Vec3::new(
            rng.gen_range(-0.4..0.4),
            rng.gen_range(-0.4..0.4),
            1.0
        ).normalize();
        let ray = GeneralRay::new(Vec3::zero(), dir);

        match (full.nearest_hit(&ray), partial.nearest_hit(&ray)) {
            (_, None) => {},
            (Some(a), Some(b)) => assert!(b.t >= a.t),
            (None, Some(b)) => panic!("Partial world hit {:?} the full world missed.", b),
        }
    }
}

#[test]
fn nearly_touching_surfaces_keep_the_nearer() {
    use crate::solver::GeneralRay;

    // Entered at t = 5 and t = 5.005, closer together than the nudge.
    let near = Object::sphere(Vec3::new(0.0, 0.0, 6.0), 1.0);
    let far = Object::sphere(Vec3::new(0.0, 0.0, 6.005), 1.0);
    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));

    let w = single_groups(vec![near.clone(), far.clone()]);
    let hit = w.nearest_hit(&ray).unwrap();
    assert_eq!(hit.object, 0);
    assert!((hit.t - 5.01).abs() < 1e-9);

    let w = single_groups(vec![far, near]);
    let hit = w.nearest_hit(&ray).unwrap();
    assert_eq!(hit.object, 1);
    assert!((hit.t - 5.01).abs() < 1e-9);

    // Dropping the farther group leaves the hit where it was.
    let mut partial = w.clone();
    partial.or_network[0].groups = vec![1];
    assert_eq!(partial.nearest_hit(&ray).map(|h| h.t), Some(hit.t));
}

#[test]
fn uncrossed_inverted_member_does_not_end_group() {
    use crate::solver::GeneralRay;

    // A box carved by the outside of a sphere the rays never touch.
    let mut hollow = Object::sphere(Vec3::new(0.0, 10.0, 0.0), 1.0);
    hollow.invert = true;
    let block = Object::cuboid(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 1.0, 1.0));

    let w = World::new(vec![hollow.clone(), block.clone()], vec![vec![0, 1]],
        vec![OrEntry { range: None, groups: vec![0] }]);

    let ray = GeneralRay::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    let hit = w.nearest_hit(&ray).unwrap();
    assert_eq!(hit.object, 1);
    assert!((hit.t - 9.01).abs() < 1e-9);

    let light = DirVec::new(Vec3::new(0.0, -1.0, 0.0), &w.objects);
    assert!(w.is_shadowed(&light, Vec3::new(0.0, -5.0, 10.0)));
    assert!(!w.is_shadowed(&light, Vec3::new(5.0, -5.0, 10.0)));

    // A plain member that is never crossed empties the group instead.
    let mut solid = hollow;
    solid.invert = false;
    let w = World::new(vec![solid, block], vec![vec![0, 1]],
        vec![OrEntry { range: None, groups: vec![0] }]);

    assert_eq!(w.nearest_hit(&ray), None);
    assert!(!w.is_shadowed(&DirVec::new(Vec3::new(0.0, -1.0, 0.0), &w.objects),
        Vec3::new(0.0, -5.0, 10.0)));
}

#[test]
fn empty_world_is_never_shadowed() {
    let w = World::empty();
    let light = DirVec::new(Vec3::new(0.0, -1.0, 0.0), &w.objects);

    assert!(!w.is_shadowed(&light, Vec3::zero()));
    assert!(!w.is_shadowed(&light, Vec3::new(5.0, -3.0, 2.0)));
}

#[test]
fn sphere_between_point_and_light_shadows() {
    // Light shines straight down; the sphere hangs above the origin.
    let w = single_groups(vec![Object::sphere(Vec3::new(0.0, 5.0, 0.0), 1.0)]);
    let light = DirVec::new(Vec3::new(0.0, -1.0, 0.0), &w.objects);

    assert!(w.is_shadowed(&light, Vec3::zero()));
    assert!(!w.is_shadowed(&light, Vec3::new(3.0, 0.0, 0.0)));

    // Points above the occluder see the light.
    assert!(!w.is_shadowed(&light, Vec3::new(0.0, 10.0, 0.0)));
}

#[test]
fn points_of_occluded_segment_are_shadowed() {
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;

    let w = single_groups(vec![
        Object::cuboid(Vec3::new(0.0, 8.0, 0.0), Vec3::new(2.0, 0.5, 2.0)),
    ]);
    let dir = Vec3::new(0.3, -1.0, 0.2).normalize();
    let light = DirVec::new(dir, &w.objects);

    // Every point below the slab whose path to the light passes through it.
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let through = Vec3::new(
            rng.gen_range(-1.5..1.5),
            8.0,
            rng.gen_range(-1.5..1.5)
        );
        let p = through + dir * rng.gen_range(1.0..10.0);
        assert!(w.is_shadowed(&light, p), "{:?}", p);
    }
}
