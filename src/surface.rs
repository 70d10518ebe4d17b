//! Water surface driver
//!
//! Owns the persistent position/normal buffers for one water sheet and
//! drives the two-phase tick protocol: `begin_tick` dispatches the
//! displacement kernel and returns immediately, `finish_tick` waits on the
//! handle, then recomputes lighting normals from the new positions. The
//! host calls the pair once per tick and uploads the byte views afterward.

use crate::core::executor::{DispatchHandle, ParallelBatchExecutor};
use crate::error::{DeformError, DeformResult};
use crate::mesh::buffers::MeshBuffer;
use crate::mesh::grid::{generate_water_grid, GridOrigin};
use crate::mesh::normals::recompute_vertex_normals;
use crate::wave::noise::WaveNoise;
use crate::wave::{WaveDisplacementKernel, WaveSettings};
use glam::{Vec2, Vec3};
use std::sync::Arc;

/// Water surface configuration parameters
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WaterSurfaceConfig {
    /// Vertex columns along x (>= 2)
    pub grid_columns: u32,
    /// Vertex rows along y (>= 2)
    pub grid_rows: u32,
    /// Distance between neighboring vertices
    pub spacing: f32,
    /// Where the sheet sits relative to the origin
    pub origin: GridOrigin,
    /// Indices per executor batch
    pub batch_size: usize,
    /// Seed for the displacement noise field
    pub noise_seed: u32,
    /// Wave tuning reused every tick
    pub waves: WaveSettings,
}

impl Default for WaterSurfaceConfig {
    fn default() -> Self {
        Self {
            grid_columns: 64,
            grid_rows: 64,
            spacing: 0.25,
            origin: GridOrigin::Center,
            batch_size: 64,
            noise_seed: 0,
            waves: WaveSettings::default(),
        }
    }
}

/// One deformable water sheet: persistent buffers plus the in-flight
/// dispatch handle, if any.
pub struct WaterSurface {
    vertices: Arc<MeshBuffer>,
    normals: Arc<MeshBuffer>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    noise: WaveNoise,
    settings: WaveSettings,
    batch_size: usize,
    in_flight: Option<DispatchHandle>,
}

impl WaterSurface {
    /// Build the flat sheet and allocate both channel buffers once.
    pub fn new(config: WaterSurfaceConfig) -> Self {
        let mesh = generate_water_grid(
            config.grid_columns,
            config.grid_rows,
            (config.spacing, config.spacing),
            config.origin,
        );

        log::info!(
            "water surface: {} vertices, {} triangles",
            mesh.positions.len(),
            mesh.indices.len() / 3
        );

        Self {
            vertices: Arc::new(MeshBuffer::from_slice(&mesh.positions)),
            normals: Arc::new(MeshBuffer::from_slice(&mesh.normals)),
            uvs: mesh.uvs,
            indices: mesh.indices,
            noise: WaveNoise::new(config.noise_seed),
            settings: config.waves,
            batch_size: config.batch_size,
            in_flight: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Dispatch this tick's displacement pass. Non-blocking; `time` is the
    /// tick's clock value, supplied by the caller (the kernel never reads a
    /// global clock). Rejects overlap: the previous tick's handle must have
    /// been resolved by `finish_tick` first.
    pub fn begin_tick(
        &mut self,
        executor: &ParallelBatchExecutor,
        time: f32,
    ) -> DeformResult<()> {
        if self.in_flight.is_some() {
            return Err(DeformError::DispatchInFlight);
        }

        let kernel = WaveDisplacementKernel::new(
            Arc::clone(&self.vertices),
            Arc::clone(&self.normals),
            self.settings.at_time(time),
            self.noise.clone(),
        )?;

        let handle = executor.dispatch(self.vertices.len(), self.batch_size, kernel)?;
        self.in_flight = Some(handle);
        Ok(())
    }

    /// Resolve this tick's dispatch: block until every batch finished, then
    /// recompute normals from the displaced positions. After an `Ok` the
    /// byte views hold a consistent frame.
    ///
    /// On `KernelFault` the normals are left untouched and the caller
    /// should skip this tick's upload; the next `begin_tick` is allowed.
    pub fn finish_tick(&mut self) -> DeformResult<()> {
        let Some(handle) = self.in_flight.take() else {
            log::debug!("finish_tick with no dispatch in flight");
            return Ok(());
        };

        if let Err(fault) = handle.wait() {
            log::warn!("skipping normal recompute after {fault}");
            return Err(fault);
        }

        let positions = self.vertices.snapshot();
        let normals = recompute_vertex_normals(&positions, &self.indices);
        self.normals.copy_from(&normals)
    }

    pub fn is_dispatch_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Current positions. Call only between completed cycles.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.snapshot()
    }

    /// Current normals. Call only between completed cycles.
    pub fn normals(&self) -> Vec<Vec3> {
        self.normals.snapshot()
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Position bytes for upload to a rendering target.
    pub fn position_bytes(&self) -> Vec<u8> {
        self.vertices.byte_snapshot()
    }

    /// Normal bytes for upload to a rendering target.
    pub fn normal_bytes(&self) -> Vec<u8> {
        self.normals.byte_snapshot()
    }
}
