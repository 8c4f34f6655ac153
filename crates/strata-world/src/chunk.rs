use glam::{IVec2, Vec3};
use strata_core::constants::VISIBLE_EPSILON;
use strata_core::math::{grid_index, Aabb};
use strata_core::Cell;
use strata_mesh::{generate_terrain_mesh, HeightField, Lod, NormalPath, TerrainMesh};
use strata_sim::RuntimeMap;

/// Rendered material layer of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Solid,
    Water,
    Lava,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Solid, LayerKind::Water, LayerKind::Lava];

    /// Surface height of this layer over a cell; zero for a thin fluid.
    pub fn height(self, cell: &Cell) -> f32 {
        let litho = cell.litho_height();
        match self {
            LayerKind::Solid => litho,
            LayerKind::Water if cell.water < VISIBLE_EPSILON => 0.0,
            LayerKind::Water => litho + cell.water,
            LayerKind::Lava if cell.lava < VISIBLE_EPSILON => 0.0,
            LayerKind::Lava => litho + cell.lava,
        }
    }

    /// Per-vertex auxiliary values: r is this layer's thickness, g the
    /// companion material.
    pub fn color(self, cell: &Cell) -> [f32; 4] {
        match self {
            LayerKind::Solid => [cell.sand, cell.stone, 0.0, 1.0],
            LayerKind::Water => [cell.water, cell.lava, 0.0, 1.0],
            LayerKind::Lava => [cell.lava, cell.water, 0.0, 1.0],
        }
    }

    /// Whether a cell carries visible mass of this layer.
    fn has_mass(self, cell: &Cell) -> bool {
        match self {
            LayerKind::Solid => true,
            LayerKind::Water => cell.water >= VISIBLE_EPSILON,
            LayerKind::Lava => cell.lava >= VISIBLE_EPSILON,
        }
    }
}

/// Mesh construction parameters shared by every chunk of a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSettings {
    /// Quads per chunk side.
    pub chunk_size: usize,
    /// World distance between adjacent vertices.
    pub world_scale: f32,
    /// Multiplier from cell height to world height.
    pub height_scale: f32,
    /// Ticks between solid-layer normal recomputes.
    pub normal_interval: u32,
}

/// One layer's mesh and whether it is shown.
#[derive(Debug, Clone)]
pub struct LayerMesh {
    pub kind: LayerKind,
    pub mesh: TerrainMesh,
    pub visible: bool,
}

/// A fixed window of the grid with one mesh per material layer.
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: IVec2,
    /// Grid coordinate of local vertex (0, 0).
    origin: IVec2,
    bounds: Aabb,
    layers: [LayerMesh; 3],
    lod: Lod,
    visible: bool,
    ticks: u64,
    normal_interval: u32,
}

/// Samples one layer of the grid in chunk-local coordinates. Coordinates past
/// the grid edge repeat the nearest edge cell.
struct LayerField<'a> {
    map: &'a dyn RuntimeMap,
    origin: IVec2,
    kind: LayerKind,
}

impl HeightField for LayerField<'_> {
    fn height(&self, x: i32, y: i32) -> f32 {
        self.grid_index(x, y).map_or(f32::NAN, |index| {
            self.kind.height(&self.map.cell_at_index(index).load())
        })
    }

    fn grid_index(&self, x: i32, y: i32) -> Option<usize> {
        let last = self.map.side() as i32 - 1;
        if last < 0 {
            return None;
        }
        let gx = (self.origin.x + x).clamp(0, last);
        let gy = (self.origin.y + y).clamp(0, last);
        Some(grid_index(gx as usize, gy as usize, self.map.side()))
    }
}

impl Chunk {
    /// Build the layer meshes for chunk `coord` from the current grid state.
    pub fn new(coord: IVec2, map: &dyn RuntimeMap, settings: &ChunkSettings) -> Self {
        let n = settings.chunk_size;
        let origin = coord * n as i32;
        let layers = LayerKind::ALL.map(|kind| {
            let field = LayerField { map, origin, kind };
            LayerMesh {
                kind,
                mesh: generate_terrain_mesh(&field, n, settings.world_scale, settings.height_scale),
                visible: kind == LayerKind::Solid,
            }
        });

        let mut chunk = Self {
            coord,
            origin,
            bounds: Aabb::new(Vec3::ZERO, Vec3::ZERO),
            layers,
            lod: Lod::Lod0,
            visible: true,
            ticks: 0,
            normal_interval: settings.normal_interval.max(1),
        };
        chunk.sample(map);
        for layer in &mut chunk.layers {
            layer.mesh.recalculate_normals(NormalPath::Full);
        }

        let local = chunk.layers[0].mesh.bounds();
        let offset = chunk.world_offset(settings.world_scale);
        chunk.bounds = Aabb::new(
            Vec3::new(local.min.x, local.min.y.min(0.0), local.min.z) + offset,
            local.max + offset,
        );
        chunk
    }

    pub fn coord(&self) -> IVec2 {
        self.coord
    }

    /// World-space translation of the chunk-local mesh.
    pub fn world_offset(&self, world_scale: f32) -> Vec3 {
        Vec3::new(self.origin.x as f32, 0.0, self.origin.y as f32) * world_scale
    }

    /// World-space box fixed at construction.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn lod(&self) -> Lod {
        self.lod
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn layers(&self) -> &[LayerMesh; 3] {
        &self.layers
    }

    pub fn layer(&self, kind: LayerKind) -> &LayerMesh {
        &self.layers[kind as usize]
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Bind `lod` on every layer. Returns `false` when it was already active.
    pub fn set_lod(&mut self, lod: Lod) -> bool {
        self.lod = lod;
        let mut changed = false;
        for layer in &mut self.layers {
            changed |= layer.mesh.switch_lod(lod);
        }
        changed
    }

    /// Mirror the grid into the layer meshes for one tick.
    pub fn update(&mut self, map: &dyn RuntimeMap) {
        self.sample(map);
        self.ticks += 1;

        let solid_due = self.ticks % self.normal_interval as u64 == 0;
        for layer in &mut self.layers {
            let due = match layer.kind {
                LayerKind::Solid => solid_due,
                LayerKind::Water | LayerKind::Lava => layer.visible,
            };
            if due {
                let kind = layer.kind;
                layer
                    .mesh
                    .refresh_border(|index| kind.height(&map.cell_at_index(index).load()));
                layer.mesh.recalculate_normals(NormalPath::Incremental);
            }
        }
    }

    /// Write heights and colors at the active stride and refresh fluid
    /// visibility.
    fn sample(&mut self, map: &dyn RuntimeMap) {
        let n = self.layers[0].mesh.chunk_size();
        let stride = self.lod.stride();
        let mut has_mass = [false; 3];

        for y in (0..=n).step_by(stride) {
            for x in (0..=n).step_by(stride) {
                let (gx, gy) = (self.origin.x + x as i32, self.origin.y + y as i32);
                if !map.valid_coord(gx, gy) {
                    continue;
                }
                let cell = map.cell_at(gx as usize, gy as usize).load();
                for (layer, seen) in self.layers.iter_mut().zip(&mut has_mass) {
                    layer.mesh.set_vertex(x, y, layer.kind.height(&cell), layer.kind.color(&cell));
                    *seen |= layer.kind.has_mass(&cell);
                }
            }
        }

        for (layer, seen) in self.layers.iter_mut().zip(has_mass) {
            layer.visible = seen;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::{Material, PhysicsConfig};
    use strata_sim::{build_map, InitialLayers, MapKind};

    fn settings(chunk_size: usize) -> ChunkSettings {
        ChunkSettings {
            chunk_size,
            world_scale: 1.0,
            height_scale: 1.0,
            normal_interval: 1,
        }
    }

    fn flat_map(side: usize) -> Arc<dyn RuntimeMap> {
        let stone = vec![1.0; side * side];
        build_map(MapKind::CellBased, side, PhysicsConfig::default(), InitialLayers::stone(&stone))
            .expect("valid layers")
    }

    #[test]
    fn test_flat_solid_normals_up() {
        let map = flat_map(17);
        let chunk = Chunk::new(IVec2::ZERO, map.as_ref(), &settings(16));
        let solid = chunk.layer(LayerKind::Solid);
        assert!(solid.visible);
        for n in solid.mesh.normals() {
            assert!((*n - Vec3::Y).length() < 1e-5, "solid normal {n}");
        }
        assert!(!chunk.layer(LayerKind::Water).visible, "no water anywhere");
        assert!(!chunk.layer(LayerKind::Lava).visible);
    }

    #[test]
    fn test_update_tracks_fluid_visibility() {
        let map = flat_map(9);
        let mut chunk = Chunk::new(IVec2::ZERO, map.as_ref(), &settings(8));
        map.add(4, 4, Material::Water, 2.0);
        chunk.update(map.as_ref());
        let water = chunk.layer(LayerKind::Water);
        assert!(water.visible, "water became visible");
        let i = water.mesh.layout().interior_index(4, 4) as usize;
        assert_eq!(water.mesh.positions()[i].y, 3.0, "litho + water");
        assert_eq!(water.mesh.colors()[i][0], 2.0, "r is water depth");

        map.add(4, 4, Material::Water, -2.0);
        chunk.update(map.as_ref());
        assert!(!chunk.layer(LayerKind::Water).visible, "hidden again once dry");
    }

    #[test]
    fn test_layer_heights_and_colors() {
        let cell = Cell::new(2.0, 0.5, 0.005, 1.0);
        assert_eq!(LayerKind::Solid.height(&cell), 2.5);
        assert_eq!(LayerKind::Water.height(&cell), 0.0, "water below epsilon");
        assert_eq!(LayerKind::Lava.height(&cell), 3.5);
        assert_eq!(LayerKind::Solid.color(&cell), [0.5, 2.0, 0.0, 1.0]);
        assert_eq!(LayerKind::Lava.color(&cell), [1.0, 0.005, 0.0, 1.0]);
    }

    #[test]
    fn test_coarse_lod_samples_stride_only() {
        let map = flat_map(17);
        let mut chunk = Chunk::new(IVec2::ZERO, map.as_ref(), &settings(16));
        assert!(chunk.set_lod(Lod::Lod2));
        assert!(!chunk.set_lod(Lod::Lod2), "same LOD rebinds nothing");
        map.add(5, 4, Material::Sand, 1.0);
        map.add(4, 4, Material::Sand, 1.0);
        chunk.update(map.as_ref());
        let solid = &chunk.layer(LayerKind::Solid).mesh;
        let at = |x, y| solid.positions()[solid.layout().interior_index(x, y) as usize].y;
        assert_eq!(at(4, 4), 2.0, "on-stride vertex refreshed");
        assert_eq!(at(5, 4), 1.0, "off-stride vertex left alone");
    }

    #[test]
    fn test_second_chunk_overlaps_first() {
        let map = flat_map(17);
        let chunk = Chunk::new(IVec2::new(1, 0), map.as_ref(), &settings(8));
        assert_eq!(chunk.world_offset(1.0), Vec3::new(8.0, 0.0, 0.0));
        let bounds = chunk.bounds();
        assert_eq!(bounds.min, Vec3::new(8.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(16.0, 1.0, 8.0));
    }
}
