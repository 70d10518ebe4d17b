//! CPU water-surface deformation with batched parallel execution.
//!
//! swell3d displaces the vertices of a water sheet once per tick using 2D
//! simplex noise, fanning the per-vertex work out across a persistent worker
//! pool. The caller drives an explicit two-phase protocol: `dispatch` the
//! displacement kernel (non-blocking), then `wait` on the returned handle
//! before reading the mutated vertex buffer back for upload.

pub mod core;
pub mod error;
pub mod mesh;
pub mod surface;
pub mod wave;

pub use crate::core::executor::{
    BatchKernel, DispatchHandle, ExecutorConfig, ParallelBatchExecutor,
};
pub use error::{DeformError, DeformResult};
pub use mesh::buffers::MeshBuffer;
pub use mesh::grid::{generate_water_grid, GridOrigin, WaterGridMesh};
pub use mesh::normals::recompute_vertex_normals;
pub use surface::{WaterSurface, WaterSurfaceConfig};
pub use wave::noise::WaveNoise;
pub use wave::{WaveDisplacementKernel, WaveParams, WaveSettings};
