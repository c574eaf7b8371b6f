use std::str::SplitWhitespace;

use crate::object::{ ShapeKind, Texture, ReflectionKind };
use crate::world::OrEntry;
use crate::scene::{ SceneDesc, ObjectDesc };
use crate::error::{ SceneError, SceneResult };
use crate::consts::NO_RANGE_PRIMITIVE;

/// Terminates object lists, group lists and the networks themselves.
const TERMINATOR: i64 = -1;

/// A cursor over the whitespace-separated words of an SLD file.
struct Tokens<'a> {
    words: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Tokens<'a> {
        Tokens { words: text.split_whitespace(), position: 0 }
    }

    fn next_word(&mut self) -> SceneResult<&'a str> {
        let word = self.words.next()
            .ok_or(SceneError::UnexpectedEof(self.position))?;
        self.position += 1;

        Ok(word)
    }

    fn invalid(&self, word: &str, expected: &'static str) -> SceneError {
        SceneError::Token {
            position: self.position - 1,
            found: word.to_string(),
            expected,
        }
    }

    fn float(&mut self) -> SceneResult<f64> {
        let word = self.next_word()?;
        word.parse::<f64>().map_err(|_| self.invalid(word, "a number"))
    }

    fn int(&mut self) -> SceneResult<i64> {
        let word = self.next_word()?;
        word.parse::<i64>().map_err(|_| self.invalid(word, "an integer"))
    }

    fn vec3(&mut self) -> SceneResult<[f64; 3]> {
        Ok([self.float()?, self.float()?, self.float()?])
    }

    /// Reads a list of non-negative integers up to its terminator.
    fn index_list(&mut self) -> SceneResult<Vec<i64>> {
        let mut list = Vec::new();

        loop {
            match self.int()? {
                TERMINATOR => return Ok(list),
                i => list.push(i),
            }
        }
    }
}

fn texture_code(code: i64) -> SceneResult<Texture> {
    match code {
        0 => Ok(Texture::Plain),
        1 => Ok(Texture::Checker),
        2 => Ok(Texture::Stripe),
        3 => Ok(Texture::Rings),
        4 => Ok(Texture::Speckle),
        _ => Err(SceneError::UnknownTexture(code)),
    }
}

fn shape_code(code: i64) -> SceneResult<ShapeKind> {
    match code {
        1 => Ok(ShapeKind::Box),
        2 => Ok(ShapeKind::Plane),
        3 => Ok(ShapeKind::Quadric),
        4 => Ok(ShapeKind::Cone),
        _ => Err(SceneError::UnknownShape(code)),
    }
}

fn reflection_code(code: i64) -> SceneResult<ReflectionKind> {
    match code {
        0 => Ok(ReflectionKind::Diffuse),
        1 => Ok(ReflectionKind::Glossy),
        2 => Ok(ReflectionKind::Mirror),
        _ => Err(SceneError::UnknownReflection(code)),
    }
}

/// Reads the body of one object, after its texture code.
fn read_object(tokens: &mut Tokens, texture: Texture) -> SceneResult<ObjectDesc> {
    let shape = shape_code(tokens.int()?)?;
    let reflection = reflection_code(tokens.int()?)?;
    let rotated = tokens.int()? != 0;

    let size = tokens.vec3()?;
    let center = tokens.vec3()?;
    let invert = tokens.float()? < 0.0;
    let diffuse = tokens.float()?;
    let highlight = tokens.float()?;
    let color = tokens.vec3()?;

    let rotation = if rotated { Some(tokens.vec3()?) } else { None };

    Ok(ObjectDesc {
        texture,
        shape,
        reflection,
        size,
        center,
        invert,
        diffuse,
        highlight,
        color,
        rotation,
    })
}

fn object_index(index: i64, count: usize) -> SceneResult<usize> {
    if index >= 0 && (index as usize) < count {
        Ok(index as usize)
    } else {
        Err(SceneError::ObjectIndex { index, count })
    }
}

fn group_index(index: i64, count: usize) -> SceneResult<usize> {
    if index >= 0 && (index as usize) < count {
        Ok(index as usize)
    } else {
        Err(SceneError::GroupIndex { index, count })
    }
}

/// Parses an SLD scene.
///
/// The stream holds, in order: the environment (screen center, screen pitch
/// and yaw, an unused light count, light elevation and azimuth, beam), the
/// objects up to a texture code of `-1`, the AND-groups and finally the OR
/// entries. Each group and entry ends with `-1`, and each list ends with an
/// entry that is just `-1`. An OR entry starts with its range primitive, or
/// `99` when it has none.
///
/// Indices are checked against the objects and groups read so far; anything
/// after the OR network is ignored.
pub fn parse_sld(text: &str) -> SceneResult<SceneDesc> {
    let mut tokens = Tokens::new(text);

    let screen = tokens.vec3()?;
    let screen_rotation = [tokens.float()?, tokens.float()?];
    let n_lights = tokens.float()?;
    if n_lights != 1.0 {
        log::warn!("Scene asks for {} lights, only one is supported", n_lights);
    }
    let light_rotation = [tokens.float()?, tokens.float()?];
    let beam = tokens.float()?;

    let mut objects = Vec::new();
    loop {
        match tokens.int()? {
            TERMINATOR => break,
            code => {
                let texture = texture_code(code)?;
                objects.push(read_object(&mut tokens, texture)?);
            },
        }
    }

    let mut and_groups = Vec::new();
    loop {
        match tokens.int()? {
            TERMINATOR => break,
            first => {
                let mut group = vec![object_index(first, objects.len())?];
                for i in tokens.index_list()? {
                    group.push(object_index(i, objects.len())?);
                }
                and_groups.push(group);
            },
        }
    }

    let mut or_network = Vec::new();
    loop {
        let range = match tokens.int()? {
            TERMINATOR => break,
            NO_RANGE_PRIMITIVE => None,
            i => Some(object_index(i, objects.len())?),
        };

        let groups = tokens.index_list()?
            .into_iter()
            .map(|g| group_index(g, and_groups.len()))
            .collect::<SceneResult<Vec<usize>>>()?;

        or_network.push(OrEntry { range, groups });
    }

    log::debug!("Read {} SLD tokens", tokens.position);

    Ok(SceneDesc {
        screen,
        screen_rotation,
        light_rotation,
        beam,
        objects,
        and_groups,
        or_network,
    })
}

/* Tests */

#[cfg(test)]
const TWO_SPHERES: &str = "
    0.0 0.0 -50.0   -10.0 5.0   1.0   30.0 20.0   255.0

    0 3 2 0   10.0 10.0 10.0   0.0 0.0 100.0   1.0   0.5 0.8   255.0 0.0 0.0
    1 2 0 0   0.0 1.0 0.0   0.0 -20.0 0.0   -1.0   1.0 0.0   255.0 255.0 255.0
    4 3 0 1   5.0 -5.0 5.0   30.0 0.0 80.0   1.0   1.0 0.0   0.0 0.0 255.0
              0.0 45.0 0.0
    -1

    0 -1
    1 2 -1
    -1

    99 0 -1
    2 1 -1
    -1
";

#[test]
fn reads_environment_and_objects() {
    let desc = parse_sld(TWO_SPHERES).unwrap();

    assert_eq!(desc.screen, [0.0, 0.0, -50.0]);
    assert_eq!(desc.screen_rotation, [-10.0, 5.0]);
    assert_eq!(desc.light_rotation, [30.0, 20.0]);
    assert_eq!(desc.beam, 255.0);
    assert_eq!(desc.objects.len(), 3);

    let mirror = &desc.objects[0];
    assert_eq!(mirror.texture, Texture::Plain);
    assert_eq!(mirror.shape, ShapeKind::Quadric);
    assert_eq!(mirror.reflection, ReflectionKind::Mirror);
    assert_eq!(mirror.diffuse, 0.5);
    assert_eq!(mirror.highlight, 0.8);
    assert!(!mirror.invert);
    assert_eq!(mirror.rotation, None);

    let floor = &desc.objects[1];
    assert_eq!(floor.texture, Texture::Checker);
    assert_eq!(floor.shape, ShapeKind::Plane);
    assert!(floor.invert);

    let speckled = &desc.objects[2];
    assert_eq!(speckled.texture, Texture::Speckle);
    assert_eq!(speckled.rotation, Some([0.0, 45.0, 0.0]));
}

#[test]
fn reads_networks() {
    let desc = parse_sld(TWO_SPHERES).unwrap();

    assert_eq!(desc.and_groups, vec![vec![0], vec![1, 2]]);
    assert_eq!(desc.or_network, vec![
        OrEntry { range: None, groups: vec![0] },
        OrEntry { range: Some(2), groups: vec![1] },
    ]);
}

#[test]
fn truncated_stream_is_an_error() {
    let cut = &TWO_SPHERES[..TWO_SPHERES.find("99").unwrap()];

    match parse_sld(cut) {
        Err(SceneError::UnexpectedEof(_)) => {},
        r => panic!("Expected an early end of stream, got {:?}.", r),
    }
}

#[test]
fn bad_tokens_are_reported() {
    match parse_sld("0.0 0.0 x") {
        Err(SceneError::Token { position: 2, .. }) => {},
        r => panic!("Expected a token error, got {:?}.", r),
    }

    let bad_shape = "0 0 0  0 0  1  0 0  255   0 7 0 0";
    match parse_sld(bad_shape) {
        Err(SceneError::UnknownShape(7)) => {},
        r => panic!("Expected an unknown shape, got {:?}.", r),
    }

    let bad_index = "0 0 0  0 0  1  0 0  255  -1  3 -1 -1";
    match parse_sld(bad_index) {
        Err(SceneError::ObjectIndex { index: 3, count: 0 }) => {},
        r => panic!("Expected a bad object index, got {:?}.", r),
    }
}

#[test]
fn sld_scene_converts() {
    use std::convert::TryFrom;
    use crate::scene::Scene;

    let scene = Scene::try_from(parse_sld(TWO_SPHERES).unwrap()).unwrap();

    assert_eq!(scene.world.objects.len(), 3);
    assert!(scene.world.objects[2].rotation.is_some());
    assert_eq!(scene.world.objects[0].params.x, 0.01);
}
