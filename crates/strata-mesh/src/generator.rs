use glam::Vec3;
use strata_core::math::Aabb;

use crate::layout::MeshLayout;
use crate::lod::{Lod, LodTriangles};
use crate::normals::{self, NormalPath};
use crate::vertex::{TerrainVertex, VertexRef};

/// Source of heights for a chunk, addressed in chunk-local coordinates.
///
/// Coordinates range over `-1..=chunk_size+1` so the border ring can be
/// sampled from neighboring chunks' cells.
pub trait HeightField {
    /// Raw height at `(x, y)`. May be NaN where no sample exists.
    fn height(&self, x: i32, y: i32) -> f32;

    /// Grid index backing `(x, y)`, `None` outside the grid.
    fn grid_index(&self, x: i32, y: i32) -> Option<usize>;
}

/// Renderable heightfield mesh for one chunk layer.
///
/// The vertex and color buffers always cover every interior vertex; only the
/// bound index list changes with the LOD.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    layout: MeshLayout,
    triangles: LodTriangles,
    world_scale: f32,
    height_scale: f32,
    positions: Vec<Vec3>,
    colors: Vec<[f32; 4]>,
    normals: Vec<Vec3>,
    border: Vec<Vec3>,
    border_grid: Vec<Option<usize>>,
    active: Lod,
}

/// Build the mesh for a `chunk_size` x `chunk_size` quad patch.
///
/// `world_scale` is the distance between adjacent vertices and `height_scale`
/// multiplies every sampled height. Normals are computed with the full path.
pub fn generate_terrain_mesh(
    field: &impl HeightField,
    chunk_size: usize,
    world_scale: f32,
    height_scale: f32,
) -> TerrainMesh {
    let layout = MeshLayout::new(chunk_size);
    let n = chunk_size as i32;
    let mut positions = vec![Vec3::ZERO; layout.interior_len()];
    let mut border = vec![Vec3::ZERO; layout.border_len()];
    let mut border_grid = vec![None; layout.border_len()];

    let mut previous = 0.0;
    for y in -1..=n + 1 {
        for x in -1..=n + 1 {
            let sample = field.height(x, y);
            let height = if sample.is_nan() { previous } else { sample };
            previous = height;

            let position = Vec3::new(x as f32 * world_scale, height * height_scale, y as f32 * world_scale);
            match layout.vertex_ref(x, y) {
                VertexRef::Interior(i) => positions[i as usize] = position,
                VertexRef::Border(i) => {
                    border[i as usize] = position;
                    border_grid[i as usize] = field.grid_index(x, y);
                }
            }
        }
    }

    let triangles = LodTriangles::build(&layout);
    let mut mesh = TerrainMesh {
        layout,
        triangles,
        world_scale,
        height_scale,
        colors: vec![[0.0; 4]; positions.len()],
        normals: Vec::new(),
        positions,
        border,
        border_grid,
        active: Lod::Lod0,
    };
    mesh.recalculate_normals(NormalPath::Full);

    log::debug!(
        "Generated {chunk_size}x{chunk_size} terrain mesh: {} vertices, {} border vertices, {} LOD0 triangles",
        mesh.positions.len(),
        mesh.border.len(),
        mesh.triangles.indices(Lod::Lod0).len() / 3
    );
    mesh
}

impl TerrainMesh {
    pub fn layout(&self) -> &MeshLayout {
        &self.layout
    }

    pub fn chunk_size(&self) -> usize {
        self.layout.chunk_size()
    }

    pub fn world_scale(&self) -> f32 {
        self.world_scale
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn border_positions(&self) -> &[Vec3] {
        &self.border
    }

    pub fn triangles(&self) -> &LodTriangles {
        &self.triangles
    }

    pub fn lod(&self) -> Lod {
        self.active
    }

    /// Index list of the active LOD.
    pub fn indices(&self) -> &[u32] {
        self.triangles.indices(self.active)
    }

    /// Returns `false` when `lod` is already active and nothing was rebound.
    pub fn switch_lod(&mut self, lod: Lod) -> bool {
        if self.active == lod {
            return false;
        }
        self.active = lod;
        true
    }

    /// Write the raw height and color of interior vertex `(x, y)`.
    pub fn set_vertex(&mut self, x: usize, y: usize, height: f32, color: [f32; 4]) {
        let i = self.layout.interior_index(x, y) as usize;
        self.positions[i].y = height * self.height_scale;
        self.colors[i] = color;
    }

    /// Re-sample the border ring from the grid. Entries outside the grid keep
    /// their last height.
    pub fn refresh_border(&mut self, height_of: impl Fn(usize) -> f32) {
        for (position, index) in self.border.iter_mut().zip(&self.border_grid) {
            if let Some(index) = *index {
                position.y = height_of(index) * self.height_scale;
            }
        }
    }

    pub fn recalculate_normals(&mut self, path: NormalPath) {
        let lod0 = self.triangles.indices(Lod::Lod0);
        let border_triangles = self.triangles.border();
        self.normals = match path {
            NormalPath::Full => normals::full_pass(&self.positions, &self.border, lod0, border_triangles),
            NormalPath::Incremental => {
                normals::incremental_pass(&self.positions, &self.border, lod0, border_triangles)
            }
        };
    }

    /// Chunk-local bounds of the renderable vertices.
    pub fn bounds(&self) -> Aabb {
        let (min, max) = self
            .positions
            .iter()
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        Aabb::new(min, max)
    }

    /// Interleaved copy of every interior vertex.
    pub fn vertices(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((&p, &n), &c)| TerrainVertex::new(p, n, c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Height function over chunk-local coordinates, backed by a `side` x
    /// `side` grid whose cell `(x + offset, y + offset)` holds local `(x, y)`.
    struct FnField<F: Fn(i32, i32) -> f32> {
        side: i32,
        offset: i32,
        height: F,
    }

    impl<F: Fn(i32, i32) -> f32> HeightField for FnField<F> {
        fn height(&self, x: i32, y: i32) -> f32 {
            match self.grid_index(x, y) {
                Some(_) => (self.height)(x, y),
                None => f32::NAN,
            }
        }

        fn grid_index(&self, x: i32, y: i32) -> Option<usize> {
            let (gx, gy) = (x + self.offset, y + self.offset);
            let inside = (0..self.side).contains(&gx) && (0..self.side).contains(&gy);
            inside.then(|| (gy * self.side + gx) as usize)
        }
    }

    fn assert_normals_close(a: &[Vec3], b: &[Vec3]) {
        assert_eq!(a.len(), b.len());
        for (i, (a, b)) in a.iter().zip(b).enumerate() {
            assert!((*a - *b).length() < 1e-5, "normal {i}: {a} vs {b}");
        }
    }

    #[test]
    fn test_flat_field_normals_point_up() {
        let field = FnField { side: 19, offset: 1, height: |_, _| 1.0 };
        let mesh = generate_terrain_mesh(&field, 16, 1.0, 1.0);
        assert_eq!(mesh.positions().len(), 17 * 17);
        assert_eq!(mesh.border_positions().len(), 4 * 16 + 8);
        for (i, n) in mesh.normals().iter().enumerate() {
            assert!((*n - Vec3::Y).length() < 1e-6, "vertex {i} normal {n}");
        }
    }

    #[test]
    fn test_full_and_incremental_paths_agree() {
        let field = FnField {
            side: 20,
            offset: 1,
            height: |x, y| ((x as f32) * 0.7).sin() * 2.0 + (y as f32 * 0.3).cos(),
        };
        let mut mesh = generate_terrain_mesh(&field, 8, 0.5, 3.0);
        let full = mesh.normals().to_vec();
        mesh.recalculate_normals(NormalPath::Incremental);
        assert_normals_close(&full, mesh.normals());
    }

    #[test]
    fn test_nan_reuses_previous_sample() {
        // Grid is exactly the interior; the ring falls back to the last sample.
        let field = FnField { side: 5, offset: 0, height: |x, _| x as f32 };
        let mesh = generate_terrain_mesh(&field, 4, 1.0, 1.0);
        let layout = mesh.layout();
        let VertexRef::Border(right) = layout.vertex_ref(5, 2) else {
            panic!("(5, 2) is on the ring");
        };
        assert_eq!(mesh.border_positions()[right as usize].y, 4.0, "carries the x=4 sample");
        let VertexRef::Border(first) = layout.vertex_ref(-1, -1) else {
            panic!("(-1, -1) is on the ring");
        };
        assert_eq!(mesh.border_positions()[first as usize].y, 0.0, "no previous sample yet");
    }

    #[test]
    fn test_border_affects_edge_normals() {
        // A raised ring tilts the edge normals away from straight up.
        let field = FnField {
            side: 7,
            offset: 1,
            height: |x, y| if (0..=4).contains(&x) && (0..=4).contains(&y) { 0.0 } else { 3.0 },
        };
        let mesh = generate_terrain_mesh(&field, 4, 1.0, 1.0);
        let corner = mesh.normals()[0];
        let center = mesh.normals()[mesh.layout().interior_index(2, 2) as usize];
        assert!((center - Vec3::Y).length() < 1e-6, "center is flat");
        assert!(corner.y < 0.99, "corner sees the raised ring, got {corner}");
    }

    #[test]
    fn test_switch_lod_is_idempotent() {
        let field = FnField { side: 9, offset: 0, height: |_, _| 0.0 };
        let mut mesh = generate_terrain_mesh(&field, 8, 1.0, 1.0);
        assert!(!mesh.switch_lod(Lod::Lod0), "LOD0 already active");
        assert!(mesh.switch_lod(Lod::Lod2));
        assert_eq!(mesh.indices().len(), 2 * 2 * 6);
        assert!(!mesh.switch_lod(Lod::Lod2));
        assert_eq!(mesh.positions().len(), 81, "vertex buffer is LOD independent");
    }

    #[test]
    fn test_refresh_border_and_set_vertex() {
        let field = FnField { side: 10, offset: 0, height: |_, _| 1.0 };
        let mut mesh = generate_terrain_mesh(&field, 4, 1.0, 2.0);
        mesh.set_vertex(1, 1, 3.0, [0.5, 0.0, 0.0, 1.0]);
        let i = mesh.layout().interior_index(1, 1) as usize;
        assert_eq!(mesh.positions()[i].y, 6.0);
        assert_eq!(mesh.colors()[i][0], 0.5);

        mesh.refresh_border(|_| 4.0);
        let VertexRef::Border(b) = mesh.layout().vertex_ref(5, 1) else {
            panic!("(5, 1) is on the ring");
        };
        assert_eq!(mesh.border_positions()[b as usize].y, 8.0, "in-grid ring vertex re-sampled");
        let VertexRef::Border(outside) = mesh.layout().vertex_ref(-1, 0) else {
            panic!("(-1, 0) is on the ring");
        };
        assert_eq!(mesh.border_positions()[outside as usize].y, 0.0, "out-of-grid ring vertex kept");
        assert_eq!(mesh.vertices().len(), 25);

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 6.0, 4.0));
    }
}
