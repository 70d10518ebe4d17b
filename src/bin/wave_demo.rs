//! Runs a water surface through a few dispatch cycles and reports the
//! displacement range, standing in for the host that would upload the
//! buffers to a renderer each tick.

use anyhow::Result;
use swell3d::{ParallelBatchExecutor, WaterSurface, WaterSurfaceConfig};

const TICKS: u32 = 120;
const TICK_SECONDS: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::init();

    let executor = ParallelBatchExecutor::new();
    let mut surface = WaterSurface::new(WaterSurfaceConfig::default());

    log::info!(
        "driving {} vertices on {} worker threads",
        surface.vertex_count(),
        executor.thread_count()
    );

    for tick in 0..TICKS {
        let time = tick as f32 * TICK_SECONDS;
        surface.begin_tick(&executor, time)?;
        // The host would record rendering work here while batches run.
        surface.finish_tick()?;
    }

    let heights: Vec<f32> = surface.positions().iter().map(|p| p.z).collect();
    let min = heights.iter().copied().fold(f32::INFINITY, f32::min);
    let max = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    println!(
        "{} ticks complete; final height range [{min:.3}, {max:.3}], {} upload bytes per channel",
        TICKS,
        surface.position_bytes().len()
    );

    Ok(())
}
