use glam::IVec2;
use strata_sim::RuntimeMap;

use crate::chunk::{Chunk, ChunkSettings};

/// Dense square grid of chunks covering a map, stored row-major.
pub struct ChunkMap {
    chunks: Vec<Chunk>,
    chunks_per_side: usize,
}

impl ChunkMap {
    /// One chunk per `chunk_size` cells of the map size (`side - 1`). Cells
    /// past the last whole chunk are not meshed.
    pub fn build(map: &dyn RuntimeMap, settings: &ChunkSettings) -> Self {
        let map_size = map.side().saturating_sub(1);
        let chunks_per_side = map_size / settings.chunk_size.max(1);
        let mut chunks = Vec::with_capacity(chunks_per_side * chunks_per_side);
        for cy in 0..chunks_per_side as i32 {
            for cx in 0..chunks_per_side as i32 {
                chunks.push(Chunk::new(IVec2::new(cx, cy), map, settings));
            }
        }
        Self {
            chunks,
            chunks_per_side,
        }
    }

    pub fn chunks_per_side(&self) -> usize {
        self.chunks_per_side
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Check if a chunk coordinate is within the grid.
    pub fn in_bounds(&self, coord: IVec2) -> bool {
        let n = self.chunks_per_side as i32;
        coord.x >= 0 && coord.y >= 0 && coord.x < n && coord.y < n
    }

    pub fn get(&self, coord: IVec2) -> Option<&Chunk> {
        self.in_bounds(coord)
            .then(|| &self.chunks[coord.y as usize * self.chunks_per_side + coord.x as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// Get counts for debug display: (total, visible, hidden)
    pub fn chunk_counts(&self) -> (u32, u32, u32) {
        let visible = self.chunks.iter().filter(|c| c.is_visible()).count() as u32;
        let total = self.chunks.len() as u32;
        (total, visible, total - visible)
    }
}
