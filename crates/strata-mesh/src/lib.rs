//! Chunk mesh generation: vertex layout, LOD triangle lists and seam-correct
//! normals for heightfield patches.

pub mod generator;
pub mod layout;
pub mod lod;
pub mod normals;
pub mod vertex;

pub use generator::{generate_terrain_mesh, HeightField, TerrainMesh};
pub use layout::MeshLayout;
pub use lod::{Lod, LodTriangles};
pub use normals::NormalPath;
pub use vertex::{TerrainVertex, VertexRef};
