//! Grid mesh generator for the XY plane (z=0). Deterministic CCW winding
//! (viewed from +Z). Provides CPU-side generation of positions, +Z normals,
//! UVs, and triangle indices for the flat water sheet the kernel displaces.

use glam::{Vec2, Vec3};

#[derive(Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum GridOrigin {
    Center,    // grid spans [-W/2, +W/2] x [-D/2, +D/2]
    MinCorner, // grid spans [0, W] x [0, D]
}

/// CPU-side water sheet mesh. Vertex order is row-major: index `j*nx + i`
/// for column `i`, row `j`.
pub struct WaterGridMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>, // triangle-list, CCW
}

/// Generate a regular grid of `nx` by `ny` vertices (columns x rows).
/// spacing = (dx, dy). nx>=2, ny>=2 enforced by caller.
/// Winding: CCW when looking from +Z toward the plane.
/// UVs: u in [0,1] along x, v in [0,1] along y.
pub fn generate_water_grid(
    nx: u32,
    ny: u32,
    spacing: (f32, f32),
    origin: GridOrigin,
) -> WaterGridMesh {
    assert!(nx >= 2 && ny >= 2, "nx, ny must be >= 2");
    let (dx, dy) = spacing;
    assert!(dx > 0.0 && dy > 0.0, "spacing must be > 0");

    let w = (nx - 1) as f32 * dx;
    let d = (ny - 1) as f32 * dy;

    let (x0, y0) = match origin {
        GridOrigin::Center => (-0.5 * w, -0.5 * d),
        GridOrigin::MinCorner => (0.0, 0.0),
    };

    let count = (nx * ny) as usize;
    let mut positions = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for j in 0..ny {
        let y = y0 + j as f32 * dy;
        let v = j as f32 / (ny - 1) as f32;
        for i in 0..nx {
            let x = x0 + i as f32 * dx;
            let u = i as f32 / (nx - 1) as f32;
            positions.push(Vec3::new(x, y, 0.0));
            uvs.push(Vec2::new(u, v));
        }
    }

    // Indices (CCW, +Z normal):
    // tri1: (i,j) -> (i+1,j) -> (i,j+1)
    // tri2: (i+1,j) -> (i+1,j+1) -> (i,j+1)
    let mut indices = Vec::with_capacity(((nx - 1) * (ny - 1) * 6) as usize);
    for j in 0..(ny - 1) {
        for i in 0..(nx - 1) {
            let i0 = j * nx + i;
            let i1 = i0 + 1;
            let i2 = i0 + nx;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[
                i0, i1, i2, // tri1 (CCW, +Z)
                i1, i3, i2, // tri2 (CCW, +Z)
            ]);
        }
    }

    WaterGridMesh {
        positions,
        normals: vec![Vec3::Z; count],
        uvs,
        indices,
    }
}
