//! Vertex normal recomputation for indexed triangle meshes
//!
//! After a displacement pass rewrites vertex heights, lighting needs
//! normals derived from the new positions. Accumulates area-weighted face
//! normals per vertex and normalizes at the end.

use glam::Vec3;

/// Recompute per-vertex normals from positions and a CCW triangle list.
///
/// The unnormalized cross product of each triangle's edges weights that
/// face's contribution by its area. Vertices referenced by no triangle, or
/// whose accumulated normal is degenerate, fall back to +Z.
pub fn recompute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_quad_normals_point_up() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let indices = [0, 1, 2, 1, 3, 2];
        let normals = recompute_vertex_normals(&positions, &indices);
        assert!(normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn test_unreferenced_vertex_falls_back_to_up() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(5.0, 5.0, 5.0)];
        let indices = [0, 1, 2];
        let normals = recompute_vertex_normals(&positions, &indices);
        assert_eq!(normals[3], Vec3::Z);
    }
}
