//! OBJ subset parser.
//!
//! Supported directives:
//! - `v x y z`, `vn x y z`, `vt u v`
//! - `f` with exactly three references, all in `p/uv/n` form or all in `p//n` form
//!
//! Every other directive is ignored. Faces with a different vertex count or a
//! different reference form (`p`, `p/uv`) are skipped; `p/uv` has no fallback.
//! Faces are expanded into three standalone vertices each, so the result is an
//! unindexed triangle list.

use std::io::{self, BufRead};

use crate::math::{Vector2, Vector3};

use super::Vertex;

/// Result of parsing an OBJ stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjModel {
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub texcoords: Vec<Vector2>,

    /// Three vertices per accepted face, in file order.
    pub vertices: Vec<Vertex>,

    /// Faces dropped because of an unsupported shape or a bad reference.
    pub skipped_faces: usize,
}

impl ObjModel {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Parses an OBJ stream line by line.
///
/// Lines are read as bytes; invalid UTF-8 (e.g. Latin-1 comments) is replaced
/// rather than rejected.
pub fn parse_obj<R: BufRead>(mut reader: R) -> io::Result<ObjModel> {
    let mut model = ObjModel::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => model.positions.push(read_vec3(&mut tokens)),
            Some("vn") => model.normals.push(read_vec3(&mut tokens)),
            Some("vt") => model.texcoords.push(read_vec2(&mut tokens)),
            Some("f") => {
                let refs: Vec<&str> = tokens.collect();
                match expand_face(&model, &refs) {
                    Some(face) => model.vertices.extend_from_slice(&face),
                    None => {
                        model.skipped_faces += 1;
                        log::trace!("obj: skipped face `{line}`");
                    }
                }
            }
            _ => {}
        }
    }

    Ok(model)
}

/// Parses OBJ text held in memory.
pub fn parse_obj_str(source: &str) -> ObjModel {
    // Reading from a byte slice cannot fail.
    parse_obj(source.as_bytes()).unwrap_or_default()
}

// Missing or malformed components read as zero so later indices stay aligned.
fn read_component<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> f32 {
    tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0)
}

fn read_vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Vector3 {
    let x = read_component(tokens);
    let y = read_component(tokens);
    let z = read_component(tokens);
    Vector3::new(x, y, z)
}

fn read_vec2<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Vector2 {
    let u = read_component(tokens);
    let v = read_component(tokens);
    Vector2::new(u, v)
}

/// A face reference with 1-based indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct FaceRef {
    position: usize,
    texcoord: Option<usize>,
    normal: usize,
}

fn parse_index(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&i| i > 0)
}

/// `p/uv/n`
fn parse_full_ref(token: &str) -> Option<FaceRef> {
    let mut parts = token.split('/');
    let position = parse_index(parts.next()?)?;
    let texcoord = parse_index(parts.next()?)?;
    let normal = parse_index(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(FaceRef {
        position,
        texcoord: Some(texcoord),
        normal,
    })
}

/// `p//n`
fn parse_normal_ref(token: &str) -> Option<FaceRef> {
    let (position, normal) = token.split_once("//")?;
    Some(FaceRef {
        position: parse_index(position)?,
        texcoord: None,
        normal: parse_index(normal)?,
    })
}

fn parse_face_refs(refs: &[&str]) -> Option<[FaceRef; 3]> {
    let [a, b, c] = refs else { return None };

    let full = (|| Some([parse_full_ref(a)?, parse_full_ref(b)?, parse_full_ref(c)?]))();
    full.or_else(|| Some([parse_normal_ref(a)?, parse_normal_ref(b)?, parse_normal_ref(c)?]))
}

fn expand_face(model: &ObjModel, refs: &[&str]) -> Option<[Vertex; 3]> {
    let refs = parse_face_refs(refs)?;

    let expand = |r: FaceRef| -> Option<Vertex> {
        let texcoord = match r.texcoord {
            Some(t) => *model.texcoords.get(t - 1)?,
            None => Vector2::ZERO,
        };
        Some(Vertex {
            position: *model.positions.get(r.position - 1)?,
            normal: *model.normals.get(r.normal - 1)?,
            texcoord,
        })
    };

    Some([expand(refs[0])?, expand(refs[1])?, expand(refs[2])?])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE: &str = "\
# cube, position + normal only
v -1 -1  1
v  1 -1  1
v -1  1  1
v  1  1  1
v -1  1 -1
v  1  1 -1
v -1 -1 -1
v  1 -1 -1
vn 0 0 1
vn 0 1 0
vn 0 0 -1
vn 0 -1 0
vn 1 0 0
vn -1 0 0
s off
f 1//1 2//1 3//1
f 3//1 2//1 4//1
f 3//2 4//2 5//2
f 5//2 4//2 6//2
f 5//3 6//3 7//3
f 7//3 6//3 8//3
f 7//4 8//4 1//4
f 1//4 8//4 2//4
f 2//5 8//5 4//5
f 4//5 8//5 6//5
f 7//6 1//6 5//6
f 5//6 1//6 3//6
";

    #[test]
    fn cube_expands_to_36_vertices() {
        let model = parse_obj_str(CUBE);
        assert_eq!(model.positions.len(), 8);
        assert_eq!(model.vertices.len(), 36);
        assert_eq!(model.triangle_count(), 12);
        assert_eq!(model.skipped_faces, 0);
    }

    #[test]
    fn normal_only_faces_have_zero_texcoords() {
        let model = parse_obj_str(CUBE);
        assert!(model.vertices.iter().all(|v| v.texcoord == Vector2::ZERO));
    }

    #[test]
    fn full_refs_dereference_one_based() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
vn 0 0 -1
f 1/1/1 2/2/1 3/3/2
";
        let model = parse_obj_str(src);
        assert_eq!(model.vertices.len(), 3);

        let v = &model.vertices;
        assert_eq!(v[0].position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(v[1].position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(v[2].position, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(v[1].texcoord, Vector2::new(1.0, 0.0));
        assert_eq!(v[2].texcoord, Vector2::new(0.0, 1.0));
        assert_eq!(v[0].normal, Vector3::Z);
        assert_eq!(v[2].normal, Vector3::NEG_Z);
    }

    #[test]
    fn vertex_count_is_three_per_face() {
        let mut src = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n");
        for _ in 0..7 {
            src.push_str("f 1/1/1 2/1/1 3/1/1\n");
        }
        assert_eq!(parse_obj_str(&src).vertices.len(), 21);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let src = "\
mtllib scene.mtl
o Triangle
g group
usemtl steel
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
s 1
f 1//1 2//1 3//1
";
        let model = parse_obj_str(src);
        assert_eq!(model.vertices.len(), 3);
    }

    #[test]
    fn quads_are_skipped() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
f 1//1 2//1 3//1
";
        let model = parse_obj_str(src);
        assert_eq!(model.vertices.len(), 3);
        assert_eq!(model.skipped_faces, 1);
    }

    #[test]
    fn position_texcoord_form_has_no_fallback() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
f 1/1 2/1 3/1
";
        let model = parse_obj_str(src);
        assert!(model.vertices.is_empty());
        assert_eq!(model.skipped_faces, 1);
    }

    #[test]
    fn out_of_range_reference_skips_face() {
        let src = "v 0 0 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let model = parse_obj_str(src);
        assert!(model.vertices.is_empty());
        assert_eq!(model.skipped_faces, 1);
    }

    #[test]
    fn crlf_line_endings() {
        let src = "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nvn 0 0 1\r\nf 1//1 2//1 3//1\r\n";
        assert_eq!(parse_obj_str(src).vertices.len(), 3);
    }

    #[test]
    fn latin1_comment_does_not_abort_the_load() {
        let src: &[u8] = b"# cr\xe9\xe9 par moi\no \xc9toile\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let model = parse_obj(src).unwrap();
        assert_eq!(model.vertices.len(), 3);
        assert_eq!(model.vertices[1].position, Vector3::X);
    }
}
