//! 3D meshes drawn through the mesh pipeline.

mod mesh;
mod vertex;

pub use mesh::{Mesh, MeshFlags};
pub use vertex::Vertex;
