//! Mesh data for the deformable water sheet
//!
//! Provides the shared vertex/normal channel buffers, the flat grid
//! generator the surface starts from, and normal recomputation for after a
//! displacement pass.

pub mod buffers;
pub mod grid;
pub mod normals;

pub use self::buffers::MeshBuffer;
pub use self::grid::{generate_water_grid, GridOrigin, WaterGridMesh};
pub use self::normals::recompute_vertex_normals;
