//! Tests for the water surface driver and its mesh plumbing
//!
//! Covers grid generation, the two-phase tick protocol, normal
//! recomputation after displacement, and the upload byte views.

use glam::{Vec2, Vec3};
use swell3d::{
    generate_water_grid, recompute_vertex_normals, DeformError, GridOrigin,
    ParallelBatchExecutor, WaterSurface, WaterSurfaceConfig, WaveSettings,
};

fn small_config() -> WaterSurfaceConfig {
    WaterSurfaceConfig {
        grid_columns: 8,
        grid_rows: 8,
        spacing: 0.5,
        origin: GridOrigin::Center,
        batch_size: 16,
        noise_seed: 0,
        waves: WaveSettings {
            scale: 1.0,
            offset_speed: 1.0,
            height: 2.0,
        },
    }
}

#[test]
fn test_grid_shape_and_winding() {
    let mesh = generate_water_grid(4, 3, (1.0, 1.0), GridOrigin::MinCorner);

    assert_eq!(mesh.positions.len(), 12);
    assert_eq!(mesh.normals.len(), 12);
    assert_eq!(mesh.uvs.len(), 12);
    assert_eq!(mesh.indices.len(), 3 * 2 * 6);

    assert!(mesh.positions.iter().all(|p| p.z == 0.0));
    assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
    assert_eq!(mesh.uvs[0], Vec2::ZERO);
    assert_eq!(*mesh.uvs.last().unwrap(), Vec2::ONE);

    // CCW from +Z: the first triangle's winding normal points up.
    let [a, b, c] = [
        mesh.positions[mesh.indices[0] as usize],
        mesh.positions[mesh.indices[1] as usize],
        mesh.positions[mesh.indices[2] as usize],
    ];
    assert!((b - a).cross(c - a).z > 0.0);
}

#[test]
fn test_tick_cycle_displaces_heights_and_rebuilds_normals() {
    let executor = ParallelBatchExecutor::new();
    let mut surface = WaterSurface::new(small_config());
    let rest_positions = surface.positions();

    surface.begin_tick(&executor, 0.6).unwrap();
    surface.finish_tick().unwrap();

    let positions = surface.positions();
    for (displaced, rest) in positions.iter().zip(&rest_positions) {
        assert_eq!(displaced.x, rest.x);
        assert_eq!(displaced.y, rest.y);
    }
    // The noise field varies over the sheet, so the heights do too.
    let first = positions[0].z;
    assert!(positions.iter().any(|p| (p.z - first).abs() > 1e-4));

    let normals = surface.normals();
    assert!(normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-4));
    assert!(normals.iter().any(|n| (*n - Vec3::Z).length() > 1e-4));

    // finish_tick left exactly the recomputation of the new positions.
    let expected = recompute_vertex_normals(&positions, surface.indices());
    assert_eq!(normals, expected);
}

#[test]
fn test_overlapping_dispatch_is_rejected() {
    let executor = ParallelBatchExecutor::new();
    let mut surface = WaterSurface::new(small_config());

    surface.begin_tick(&executor, 0.0).unwrap();
    assert!(surface.is_dispatch_in_flight());

    let err = surface.begin_tick(&executor, 0.1).unwrap_err();
    assert!(matches!(err, DeformError::DispatchInFlight));

    surface.finish_tick().unwrap();
    assert!(!surface.is_dispatch_in_flight());
    surface.begin_tick(&executor, 0.1).unwrap();
    surface.finish_tick().unwrap();
}

#[test]
fn test_finish_without_begin_is_a_noop() {
    let mut surface = WaterSurface::new(small_config());
    surface.finish_tick().unwrap();
}

#[test]
fn test_byte_views_cover_every_vertex() {
    let executor = ParallelBatchExecutor::new();
    let mut surface = WaterSurface::new(small_config());
    surface.begin_tick(&executor, 1.0).unwrap();
    surface.finish_tick().unwrap();

    let stride = std::mem::size_of::<Vec3>();
    assert_eq!(surface.position_bytes().len(), surface.vertex_count() * stride);
    assert_eq!(surface.normal_bytes().len(), surface.vertex_count() * stride);
}

#[test]
fn test_ticks_advance_the_wave_field() {
    let executor = ParallelBatchExecutor::new();
    let mut surface = WaterSurface::new(small_config());

    surface.begin_tick(&executor, 0.0).unwrap();
    surface.finish_tick().unwrap();
    let first: Vec<f32> = surface.positions().iter().map(|p| p.z).collect();

    surface.begin_tick(&executor, 1.0).unwrap();
    surface.finish_tick().unwrap();
    let second: Vec<f32> = surface.positions().iter().map(|p| p.z).collect();

    assert!(first
        .iter()
        .zip(&second)
        .any(|(a, b)| (a - b).abs() > 1e-4));
}
