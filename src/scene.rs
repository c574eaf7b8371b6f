use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::vector::{ Vec3, sgn };
use crate::object::{ Object, ShapeKind, Texture, ReflectionKind,
    rotate_quadratic_form };
use crate::world::{ World, OrEntry };
use crate::light::{ Light, rad };
use crate::camera::Screen;
use crate::error::{ SceneError, SceneResult };
use crate::sld;
use crate::consts::{ MAX_OBJECTS, MAX_AND_GROUPS };

/// A scene ready for tracing.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub screen: Screen,
    pub light: Light,
    pub world: World,
}

impl Scene {
    /// Loads a scene file.
    ///
    /// Files ending in `.json` are read as a JSON `SceneDesc`; anything else
    /// as an SLD token stream.
    pub fn load(path: &Path) -> SceneResult<Scene> {
        let text = fs::read_to_string(path)?;

        let is_json = path.extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("json"));

        let desc = if is_json {
            serde_json::from_str(&text)?
        } else {
            sld::parse_sld(&text)?
        };

        Scene::try_from(desc)
    }
}

/// A scene as it is described in a file.
///
/// Angles are in degrees. Objects are kept as described; they are normalized
/// when the description is converted into a `Scene`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    /// Center of the screen.
    pub screen: [f64; 3],

    /// Pitch and yaw of the screen.
    pub screen_rotation: [f64; 2],

    /// Elevation and azimuth of the light.
    pub light_rotation: [f64; 2],

    pub beam: f64,

    pub objects: Vec<ObjectDesc>,
    pub and_groups: Vec<Vec<usize>>,
    pub or_network: Vec<OrEntry>,
}

/// One object as described in a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(default)]
    pub texture: Texture,

    pub shape: ShapeKind,

    #[serde(default)]
    pub reflection: ReflectionKind,

    /// Box half-extents, plane normal, quadric semi-axes (a negative size
    /// flips the sign of that term) or raw cone coefficients.
    pub size: [f64; 3],

    pub center: [f64; 3],

    #[serde(default)]
    pub invert: bool,

    pub diffuse: f64,
    pub highlight: f64,
    pub color: [f64; 3],

    /// Rotations about X, Y and Z, in degrees.
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
}

/// Converts a quadric semi-axis into its quadratic form coefficient.
fn form_coefficient(s: f64) -> f64 {
    if s == 0.0 {
        0.0
    } else {
        sgn(s) / (s * s)
    }
}

impl From<&ObjectDesc> for Object {
    fn from(desc: &ObjectDesc) -> Object {
        let size = Vec3::from(desc.size);
        let mut invert = desc.invert;

        let mut params = match desc.shape {
            ShapeKind::Box | ShapeKind::Cone => size,
            ShapeKind::Quadric => Vec3::new(
                form_coefficient(size.x),
                form_coefficient(size.y),
                form_coefficient(size.z)
            ),
            ShapeKind::Plane => {
                // Planes always keep the solid on the side the stored
                // normal points to.
                let n = size.normalize_signed(!invert);
                invert = true;
                n
            },
        };

        let mut rotation = None;
        if let Some(angles) = desc.rotation {
            match desc.shape {
                ShapeKind::Quadric | ShapeKind::Cone => {
                    let angles = Vec3::new(rad(angles[0]), rad(angles[1]), rad(angles[2]));
                    let (diag, cross) = rotate_quadratic_form(params, angles);
                    params = diag;
                    rotation = Some(cross);
                },
                ShapeKind::Box | ShapeKind::Plane => {
                    log::warn!("Ignoring rotation of a {:?}", desc.shape);
                },
            }
        }

        Object {
            shape: desc.shape,
            texture: desc.texture,
            reflection: desc.reflection,
            params,
            center: Vec3::from(desc.center),
            invert,
            rotation,
            diffuse: desc.diffuse,
            highlight: desc.highlight,
            color: Color::from(desc.color),
        }
    }
}

impl TryFrom<SceneDesc> for Scene {
    type Error = SceneError;

    fn try_from(desc: SceneDesc) -> SceneResult<Scene> {
        let n_objects = desc.objects.len();
        let n_groups = desc.and_groups.len();

        let object_index = |i: usize| if i < n_objects {
            Ok(i)
        } else {
            Err(SceneError::ObjectIndex { index: i as i64, count: n_objects })
        };

        for group in desc.and_groups.iter() {
            for &i in group.iter() {
                object_index(i)?;
            }
        }

        for entry in desc.or_network.iter() {
            if let Some(range) = entry.range {
                object_index(range)?;
            }

            for &g in entry.groups.iter() {
                if g >= n_groups {
                    return Err(SceneError::GroupIndex { index: g as i64, count: n_groups });
                }
            }
        }

        if n_objects > MAX_OBJECTS {
            log::warn!("{} objects exceed the usual capacity of {}",
                n_objects, MAX_OBJECTS);
        }

        if n_groups > MAX_AND_GROUPS {
            log::warn!("{} AND-groups exceed the usual capacity of {}",
                n_groups, MAX_AND_GROUPS);
        }

        let objects = desc.objects.iter().map(Object::from).collect();

        log::info!("Loaded {} objects, {} AND-groups and {} OR entries",
            n_objects, n_groups, desc.or_network.len());

        Ok(Scene {
            screen: Screen::from_angles(
                Vec3::from(desc.screen),
                desc.screen_rotation[0],
                desc.screen_rotation[1]
            ),
            light: Light::from_angles(
                desc.light_rotation[0],
                desc.light_rotation[1],
                desc.beam
            ),
            world: World::new(objects, desc.and_groups, desc.or_network),
        })
    }
}

/* Tests */

#[cfg(test)]
fn desc_of(shape: ShapeKind, size: [f64; 3]) -> ObjectDesc {
    ObjectDesc {
        texture: Texture::Plain,
        shape,
        reflection: ReflectionKind::Diffuse,
        size,
        center: [0.0, 0.0, 0.0],
        invert: false,
        diffuse: 1.0,
        highlight: 0.0,
        color: [255.0, 255.0, 255.0],
        rotation: None,
    }
}

#[test]
fn quadric_sizes_become_coefficients() {
    let o = Object::from(&desc_of(ShapeKind::Quadric, [2.0, -4.0, 0.0]));

    assert_eq!(o.params, Vec3::new(0.25, -0.0625, 0.0));
    assert_eq!(o.rotation, None);
}

#[test]
fn cone_coefficients_are_kept() {
    let o = Object::from(&desc_of(ShapeKind::Cone, [1.0, -0.5, 1.0]));

    assert_eq!(o.params, Vec3::new(1.0, -0.5, 1.0));
}

#[test]
fn plane_polarity_is_normalized() {
    // A floor described with its normal pointing up and the solid below.
    let o = Object::from(&desc_of(ShapeKind::Plane, [0.0, 2.0, 0.0]));

    assert!(o.invert);
    assert_eq!(o.params, Vec3::new(0.0, -1.0, 0.0));
    assert!(!o.is_outside(Vec3::new(0.0, -1.0, 0.0)));
    assert!(o.is_outside(Vec3::new(0.0, 1.0, 0.0)));

    let mut d = desc_of(ShapeKind::Plane, [0.0, 2.0, 0.0]);
    d.invert = true;
    let o = Object::from(&d);

    assert!(o.invert);
    assert_eq!(o.params, Vec3::new(0.0, 1.0, 0.0));
    assert!(o.is_outside(Vec3::new(0.0, -1.0, 0.0)));
}

#[test]
fn rotated_quadric_matches_unrotated_shape() {
    // An ellipsoid turned a quarter turn about Z swaps its X and Y axes.
    let mut d = desc_of(ShapeKind::Quadric, [1.0, 3.0, 2.0]);
    d.rotation = Some([0.0, 0.0, 90.0]);
    let o = Object::from(&d);

    assert!(!o.is_outside(Vec3::new(0.0, 0.9, 0.0)));
    assert!(o.is_outside(Vec3::new(0.0, 1.1, 0.0)));
    assert!(!o.is_outside(Vec3::new(2.9, 0.0, 0.0)));
    assert!(o.is_outside(Vec3::new(3.1, 0.0, 0.0)));
    assert!(!o.is_outside(Vec3::new(0.0, 0.0, 1.9)));
}

#[test]
fn bad_indices_are_rejected() {
    let mut desc = SceneDesc {
        screen: [0.0, 0.0, 0.0],
        screen_rotation: [0.0, 0.0],
        light_rotation: [0.0, 0.0],
        beam: 255.0,
        objects: vec![desc_of(ShapeKind::Box, [1.0, 1.0, 1.0])],
        and_groups: vec![vec![0, 1]],
        or_network: vec![OrEntry { range: None, groups: vec![0] }],
    };

    match Scene::try_from(desc.clone()) {
        Err(SceneError::ObjectIndex { index: 1, count: 1 }) => {},
        r => panic!("Expected an object index error, got {:?}.", r),
    }

    desc.and_groups = vec![vec![0]];
    desc.or_network[0].groups = vec![0, 1];
    match Scene::try_from(desc.clone()) {
        Err(SceneError::GroupIndex { index: 1, count: 1 }) => {},
        r => panic!("Expected a group index error, got {:?}.", r),
    }

    desc.or_network[0].groups = vec![0];
    desc.or_network[0].range = Some(3);
    assert!(Scene::try_from(desc).is_err());
}

#[test]
fn json_scene_description() {
    let json = r#"{
        "screen": [0.0, 0.0, 0.0],
        "screen_rotation": [0.0, 0.0],
        "light_rotation": [90.0, 0.0],
        "beam": 200.0,
        "objects": [
            {
                "shape": "quadric",
                "reflection": "mirror",
                "size": [10.0, 10.0, 10.0],
                "center": [0.0, 0.0, 100.0],
                "diffuse": 0.5,
                "highlight": 0.2,
                "color": [255.0, 0.0, 0.0]
            },
            {
                "texture": "checker",
                "shape": "plane",
                "size": [0.0, 1.0, 0.0],
                "center": [0.0, -20.0, 0.0],
                "diffuse": 1.0,
                "highlight": 0.0,
                "color": [255.0, 255.0, 255.0]
            }
        ],
        "and_groups": [[0], [1]],
        "or_network": [{ "groups": [0, 1] }]
    }"#;

    let desc: SceneDesc = serde_json::from_str(json).unwrap();
    let scene = Scene::try_from(desc).unwrap();

    assert_eq!(scene.light.direction, Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(scene.light.beam, 200.0);
    assert_eq!(scene.screen.viewpoint, Vec3::new(0.0, 0.0, -200.0));

    let w = &scene.world;
    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.objects[0].reflection, ReflectionKind::Mirror);
    assert_eq!(w.objects[0].params, Vec3::new(0.01, 0.01, 0.01));
    assert_eq!(w.objects[1].texture, Texture::Checker);
    assert_eq!(w.objects[1].params, Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(w.or_network, vec![OrEntry { range: None, groups: vec![0, 1] }]);
}
