use glam::Vec3;

use crate::vertex::VertexRef;

/// How a mesh recomputes its vertex normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalPath {
    /// One pass over every LOD0 and border triangle.
    Full,
    /// Indexed-mesh recompute over LOD0, then a border-only patch.
    Incremental,
}

/// Unit normal of triangle `(a, b, c)`, zero if degenerate.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Sum of the face normals touching each vertex of an indexed triangle list.
/// The result is not normalized.
pub fn accumulate_indexed(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let n = face_normal(positions[a], positions[b], positions[c]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
}

/// Add the contributions of border triangles onto their interior vertices.
pub fn accumulate_border(normals: &mut [Vec3], triangles: &[[VertexRef; 3]], interior: &[Vec3], border: &[Vec3]) {
    let position = |v: VertexRef| match v {
        VertexRef::Interior(i) => interior[i as usize],
        VertexRef::Border(i) => border[i as usize],
    };
    for tri in triangles {
        let n = face_normal(position(tri[0]), position(tri[1]), position(tri[2]));
        for v in tri.iter().filter_map(|v| v.interior()) {
            normals[v as usize] += n;
        }
    }
}

pub fn normalize_all(normals: &mut [Vec3]) {
    for n in normals.iter_mut() {
        *n = n.normalize_or_zero();
    }
}

/// Normals over LOD0 and border triangles in a single manual pass.
pub fn full_pass(
    interior: &[Vec3],
    border: &[Vec3],
    lod0: &[u32],
    border_triangles: &[[VertexRef; 3]],
) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; interior.len()];
    let triangles = lod0
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]].map(VertexRef::Interior))
        .chain(border_triangles.iter().copied());
    let position = |v: VertexRef| match v {
        VertexRef::Interior(i) => interior[i as usize],
        VertexRef::Border(i) => border[i as usize],
    };
    for tri in triangles {
        let n = face_normal(position(tri[0]), position(tri[1]), position(tri[2]));
        for v in tri.iter().filter_map(|v| v.interior()) {
            normals[v as usize] += n;
        }
    }
    normalize_all(&mut normals);
    normals
}

/// Indexed recompute over LOD0 followed by the border patch.
pub fn incremental_pass(
    interior: &[Vec3],
    border: &[Vec3],
    lod0: &[u32],
    border_triangles: &[[VertexRef; 3]],
) -> Vec<Vec3> {
    let mut normals = accumulate_indexed(interior, lod0);
    accumulate_border(&mut normals, border_triangles, interior, border);
    normalize_all(&mut normals);
    normals
}
