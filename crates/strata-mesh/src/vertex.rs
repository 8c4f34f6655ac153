use glam::Vec3;

/// Reference to a mesh vertex: either a renderable interior vertex or a
/// virtual vertex from the border ring that only feeds normal accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexRef {
    Interior(u32),
    Border(u32),
}

impl VertexRef {
    pub fn interior(self) -> Option<u32> {
        match self {
            VertexRef::Interior(i) => Some(i),
            VertexRef::Border(_) => None,
        }
    }
}

/// Interleaved vertex layout handed to a GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_ref_interior() {
        assert_eq!(VertexRef::Interior(7).interior(), Some(7));
        assert_eq!(VertexRef::Border(7).interior(), None);
    }

    #[test]
    fn test_terrain_vertex_is_castable() {
        let verts = [TerrainVertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, [0.5, 0.25, 0.0, 1.0])];
        let floats: &[f32] = bytemuck::cast_slice(&verts);
        assert_eq!(floats.len(), 10, "3 position + 3 normal + 4 color");
        assert_eq!(&floats[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(floats[4], 1.0, "normal.y");
    }
}
