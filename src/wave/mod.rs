//! Noise-based wave displacement
//!
//! The per-vertex kernel: sample 2D simplex noise in the vertex's XY
//! footprint, scrolled over time, and replace the vertex height with the
//! scaled sample. Vertices whose normal does not face up are left alone,
//! which excludes the base and sides of a closed water volume.

pub mod noise;

use crate::core::executor::BatchKernel;
use crate::error::{DeformError, DeformResult};
use crate::mesh::buffers::MeshBuffer;
use glam::Vec3;
use self::noise::WaveNoise;
use std::sync::Arc;

/// Constant lift applied on top of the noise displacement.
const HEIGHT_BIAS: f32 = 0.3;

/// Persistent wave tuning, set once and reused every tick.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaveSettings {
    /// Spatial frequency of the noise field
    pub scale: f32,
    /// How fast the noise field scrolls per unit time
    pub offset_speed: f32,
    /// Peak-to-trough displacement multiplier
    pub height: f32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_speed: 1.0,
            height: 1.0,
        }
    }
}

impl WaveSettings {
    /// Snapshot these settings together with the tick's time value.
    pub fn at_time(self, time: f32) -> WaveParams {
        WaveParams {
            scale: self.scale,
            offset_speed: self.offset_speed,
            height: self.height,
            time,
        }
    }
}

/// Immutable scalar snapshot supplied to a kernel at dispatch time.
///
/// `time` is always passed in by value; the kernel never reads a global
/// clock, so identical parameters replay to identical output.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaveParams {
    pub scale: f32,
    pub offset_speed: f32,
    pub height: f32,
    pub time: f32,
}

/// Per-vertex displacement kernel over a position/normal buffer pair.
///
/// Stateless transform: one invocation per index per dispatch cycle, no
/// mutable state beyond the position slot the index owns.
#[derive(Debug)]
pub struct WaveDisplacementKernel {
    vertices: Arc<MeshBuffer>,
    normals: Arc<MeshBuffer>,
    params: WaveParams,
    noise: WaveNoise,
}

impl WaveDisplacementKernel {
    /// Bind the kernel to its buffers. Fails with `ShapeMismatch` when the
    /// position and normal buffers disagree on length.
    pub fn new(
        vertices: Arc<MeshBuffer>,
        normals: Arc<MeshBuffer>,
        params: WaveParams,
        noise: WaveNoise,
    ) -> DeformResult<Self> {
        if vertices.len() != normals.len() {
            return Err(DeformError::shape_mismatch(vertices.len(), normals.len()));
        }
        Ok(Self {
            vertices,
            normals,
            params,
            noise,
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl BatchKernel for WaveDisplacementKernel {
    fn validate(&self, count: usize) -> DeformResult<()> {
        if self.vertices.len() != self.normals.len() {
            return Err(DeformError::shape_mismatch(
                self.vertices.len(),
                self.normals.len(),
            ));
        }
        if count > self.vertices.len() {
            return Err(DeformError::invalid_argument(format!(
                "dispatch count {count} exceeds buffer length {}",
                self.vertices.len()
            )));
        }
        Ok(())
    }

    fn execute(&self, index: usize) {
        // Only vertices facing up take the wave; this skips the base of a
        // closed water volume.
        if self.normals.get(index).z <= 0.0 {
            return;
        }

        let vertex = self.vertices.get(index);
        let offset = self.params.offset_speed * self.params.time;
        let sample = self.noise.sample(
            vertex.x * self.params.scale + offset,
            vertex.y * self.params.scale + offset,
        );

        // Height is replaced, not accumulated; x and y pass through.
        self.vertices.set(
            index,
            Vec3::new(vertex.x, vertex.y, sample * self.params.height + HEIGHT_BIAS),
        );
    }
}
