use crate::vertex::VertexRef;

/// Vertex numbering of a chunk mesh with `chunk_size` quads per side.
///
/// Interior vertices cover local coordinates `0..=n` on both axes, indexed
/// `y * (n + 1) + x`. The border ring covers the cells at `-1` and `n + 1`,
/// numbered in scan order (y outer, x inner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshLayout {
    chunk_size: usize,
}

impl MeshLayout {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Vertices per interior row.
    pub fn row_len(&self) -> usize {
        self.chunk_size + 1
    }

    pub fn interior_len(&self) -> usize {
        self.row_len() * self.row_len()
    }

    pub fn border_len(&self) -> usize {
        4 * self.chunk_size + 8
    }

    pub fn interior_index(&self, x: usize, y: usize) -> u32 {
        (y * self.row_len() + x) as u32
    }

    pub fn interior_coords(&self, index: u32) -> (usize, usize) {
        let i = index as usize;
        (i % self.row_len(), i / self.row_len())
    }

    /// Reference for any coordinate in `-1..=n+1`.
    pub fn vertex_ref(&self, x: i32, y: i32) -> VertexRef {
        let n = self.chunk_size as i32;
        debug_assert!((-1..=n + 1).contains(&x) && (-1..=n + 1).contains(&y));
        let top = n + 3;
        if y == -1 {
            VertexRef::Border((x + 1) as u32)
        } else if y == n + 1 {
            VertexRef::Border((top + 2 * (n + 1) + x + 1) as u32)
        } else if x == -1 {
            VertexRef::Border((top + 2 * y) as u32)
        } else if x == n + 1 {
            VertexRef::Border((top + 2 * y + 1) as u32)
        } else {
            VertexRef::Interior(self.interior_index(x as usize, y as usize))
        }
    }

    /// Border ring coordinates in border-index order.
    pub fn border_coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let n = self.chunk_size as i32;
        (-1..=n + 1).flat_map(move |y| {
            (-1..=n + 1)
                .filter(move |&x| y == -1 || y == n + 1 || x == -1 || x == n + 1)
                .map(move |x| (x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_numbering_matches_scan_order() {
        let layout = MeshLayout::new(5);
        let coords: Vec<_> = layout.border_coords().collect();
        assert_eq!(coords.len(), layout.border_len());
        for (i, &(x, y)) in coords.iter().enumerate() {
            assert_eq!(layout.vertex_ref(x, y), VertexRef::Border(i as u32), "at ({x}, {y})");
        }
    }

    #[test]
    fn test_interior_round_trip() {
        let layout = MeshLayout::new(4);
        assert_eq!(layout.interior_len(), 25);
        assert_eq!(layout.vertex_ref(3, 2), VertexRef::Interior(13));
        assert_eq!(layout.interior_coords(13), (3, 2));
    }
}
