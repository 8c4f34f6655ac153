use crate::layout::MeshLayout;
use crate::vertex::VertexRef;

/// Level of detail of a layer mesh. Coarser levels reuse the same vertex
/// buffer and only index every 2nd or 4th vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lod {
    #[default]
    Lod0,
    Lod1,
    Lod2,
}

impl Lod {
    pub const ALL: [Lod; 3] = [Lod::Lod0, Lod::Lod1, Lod::Lod2];

    /// Vertex step between sampled grid points.
    pub fn stride(self) -> usize {
        match self {
            Lod::Lod0 => 1,
            Lod::Lod1 => 2,
            Lod::Lod2 => 4,
        }
    }
}

/// Precomputed triangle lists for every LOD plus the border triangles.
///
/// Built once per mesh and never modified afterwards.
#[derive(Debug, Clone)]
pub struct LodTriangles {
    lod0: Vec<u32>,
    lod1: Vec<u32>,
    lod2: Vec<u32>,
    border: Vec<[VertexRef; 3]>,
}

impl LodTriangles {
    pub fn build(layout: &MeshLayout) -> Self {
        let n = layout.chunk_size() as i32;
        let mut lod0 = Vec::with_capacity(layout.chunk_size().pow(2) * 6);
        let mut border = Vec::with_capacity((layout.border_len() + 4) * 2);

        for y in -1..=n {
            for x in -1..=n {
                let [a, b, c, d] = quad(layout, x, y, 1);
                match (a.interior(), b.interior(), c.interior(), d.interior()) {
                    (Some(a), Some(b), Some(c), Some(d)) => {
                        lod0.extend_from_slice(&[a, c, d, d, b, a]);
                    }
                    _ => {
                        border.push([a, c, d]);
                        border.push([d, b, a]);
                    }
                }
            }
        }

        Self {
            lod0,
            lod1: strided(layout, Lod::Lod1.stride()),
            lod2: strided(layout, Lod::Lod2.stride()),
            border,
        }
    }

    pub fn indices(&self, lod: Lod) -> &[u32] {
        match lod {
            Lod::Lod0 => &self.lod0,
            Lod::Lod1 => &self.lod1,
            Lod::Lod2 => &self.lod2,
        }
    }

    pub fn border(&self) -> &[[VertexRef; 3]] {
        &self.border
    }
}

/// Corners `[a, b, c, d]` of the quad at `(x, y)`: a=(x,y), b=(x+s,y),
/// c=(x,y+s), d=(x+s,y+s).
fn quad(layout: &MeshLayout, x: i32, y: i32, s: i32) -> [VertexRef; 4] {
    [
        layout.vertex_ref(x, y),
        layout.vertex_ref(x + s, y),
        layout.vertex_ref(x, y + s),
        layout.vertex_ref(x + s, y + s),
    ]
}

fn strided(layout: &MeshLayout, stride: usize) -> Vec<u32> {
    let n = layout.chunk_size();
    let mut indices = Vec::with_capacity((n / stride).pow(2) * 6);
    for y in (0..n).step_by(stride).filter(|y| y + stride <= n) {
        for x in (0..n).step_by(stride).filter(|x| x + stride <= n) {
            let a = layout.interior_index(x, y);
            let b = layout.interior_index(x + stride, y);
            let c = layout.interior_index(x, y + stride);
            let d = layout.interior_index(x + stride, y + stride);
            indices.extend_from_slice(&[a, c, d, d, b, a]);
        }
    }
    indices
}
