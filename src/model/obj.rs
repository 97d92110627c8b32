use std::collections::HashMap;
use std::path::Path;

use log::debug;

use super::Mesh;
use crate::error::{Result, StitchError};

/// Load a Wavefront OBJ file.
///
/// Reads `v`, `vt`, `vn` and `f`; polygons are split into triangle fans and
/// negative (relative) indices are honoured. Other statements are ignored.
pub fn load_obj(path: &Path) -> Result<Mesh> {
    let text = std::fs::read_to_string(path).map_err(|e| StitchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mesh = parse_obj(path, &text)?;
    debug!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Indices of one face corner into the `v`/`vt`/`vn` lists
type Corner = (usize, Option<usize>, Option<usize>);

pub(crate) fn parse_obj(path: &Path, text: &str) -> Result<Mesh> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut mesh = Mesh::default();
    let mut corners: HashMap<Corner, u32> = HashMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        let mut fields = content.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };
        let err = |message: String| StitchError::format(path, line, message);
        let values: Vec<&str> = fields.collect();

        match keyword {
            "v" => positions.push(parse_floats::<3>(&values).ok_or_else(|| err("bad vertex".into()))?),
            "vt" => uvs.push(parse_floats::<2>(&values).ok_or_else(|| err("bad texture coordinate".into()))?),
            "vn" => normals.push(parse_floats::<3>(&values).ok_or_else(|| err("bad normal".into()))?),
            "f" => {
                if values.len() < 3 {
                    return Err(err(format!("face needs at least 3 corners, got {}", values.len())));
                }
                let mut face = Vec::with_capacity(values.len());
                for token in &values {
                    let corner = parse_corner(token, positions.len(), uvs.len(), normals.len())
                        .ok_or_else(|| err(format!("bad face corner '{}'", token)))?;
                    let next = u32::try_from(corners.len())
                        .map_err(|_e| err("too many vertices".to_string()))?;
                    let index = *corners.entry(corner).or_insert_with(|| {
                        mesh.positions.push(positions[corner.0]);
                        if let Some(t) = corner.1 {
                            mesh.uvs.push(uvs[t]);
                        }
                        if let Some(n) = corner.2 {
                            mesh.normals.push(normals[n]);
                        }
                        next
                    });
                    face.push(index);
                }
                for i in 1..face.len() - 1 {
                    mesh.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    // Attribute arrays only make sense when every vertex has one
    if mesh.uvs.len() != mesh.positions.len() {
        mesh.uvs.clear();
    }
    if mesh.normals.len() != mesh.positions.len() {
        mesh.normals.clear();
    }

    Ok(mesh)
}

fn parse_floats<const N: usize>(values: &[&str]) -> Option<[f32; N]> {
    if values.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.parse().ok()?;
    }
    Some(out)
}

/// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn` into zero-based indices
fn parse_corner(token: &str, v_len: usize, vt_len: usize, vn_len: usize) -> Option<Corner> {
    let mut parts = token.split('/');
    let v = resolve_index(parts.next()?, v_len)?;
    let vt = match parts.next() {
        None | Some("") => None,
        Some(s) => Some(resolve_index(s, vt_len)?),
    };
    let vn = match parts.next() {
        None | Some("") => None,
        Some(s) => Some(resolve_index(s, vn_len)?),
    };
    if parts.next().is_some() {
        return None;
    }
    Some((v, vt, vn))
}

/// OBJ indices are 1-based; negative ones count back from the end
fn resolve_index(s: &str, len: usize) -> Option<usize> {
    let i: i64 = s.parse().ok()?;
    let len = i64::try_from(len).ok()?;
    let resolved = if i > 0 { i - 1 } else { len + i };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl ignored
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_becomes_two_triangles() {
        let mesh = parse_obj(Path::new("quad.obj"), QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.uvs[2], [1.0, 1.0]);
        assert_eq!(mesh.normals.len(), 4);
    }

    #[test]
    fn test_shared_corners_are_deduplicated() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
        let mesh = parse_obj(Path::new("two.obj"), text).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
        assert!(mesh.uvs.is_empty());
        assert!(mesh.normals.is_empty());
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(Path::new("neg.obj"), text).unwrap();
        assert_eq!(mesh.positions[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_index_is_format_error() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj(Path::new("bad.obj"), text).unwrap_err();
        assert!(matches!(err, StitchError::Format { line: 3, .. }));
    }

    #[test]
    fn test_bad_vertex_is_format_error() {
        let err = parse_obj(Path::new("bad.obj"), "v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, StitchError::Format { line: 1, .. }));
    }
}
