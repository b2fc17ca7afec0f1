//! Static geometry generators.
//!
//! The backdrop needs exactly two shapes: a subdivided icosahedron (solid core
//! and wireframe overlay, at different radii/detail) and a flat ring (halo).
//! Both are generated once at startup; nothing here runs per frame.
//!
//! Conventions:
//! - Counter-clockwise winding, right-handed coordinates.
//! - Icosahedron normals are radial (every vertex sits on the sphere).
//! - The ring lies in the XY plane with +Z normals; the scene tilts it via the
//!   node rotation.

use std::collections::BTreeMap;

use super::Mesh3D;

/// Golden ratio, used to place the 12 base icosahedron vertices.
const PHI: f32 = 1.618_034;

const BASE_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

const BASE_FACES: [[u16; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Build an icosphere: an icosahedron subdivided `detail` times, with every
/// vertex projected onto a sphere of the given radius.
///
/// Each subdivision step splits every triangle into four, sharing midpoint
/// vertices between neighbors, so the mesh stays watertight and indexed.
pub fn icosahedron(radius: f32, detail: u32) -> Mesh3D {
    // Unit-sphere vertex directions; scaled to `radius` at the end.
    let mut dirs: Vec<glam::Vec3> = BASE_VERTICES
        .iter()
        .map(|v| glam::Vec3::from_array(*v).normalize())
        .collect();
    let mut faces: Vec<[u16; 3]> = BASE_FACES.to_vec();

    for _ in 0..detail {
        let mut midpoints: BTreeMap<(u16, u16), u16> = BTreeMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        for [a, b, c] in faces {
            let ab = midpoint(&mut dirs, &mut midpoints, a, b);
            let bc = midpoint(&mut dirs, &mut midpoints, b, c);
            let ca = midpoint(&mut dirs, &mut midpoints, c, a);

            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }

        faces = next;
    }

    let positions = dirs.iter().map(|d| (*d * radius).to_array()).collect();
    let normals = dirs.iter().map(|d| d.to_array()).collect();
    let indices = faces.iter().flatten().copied().collect();

    Mesh3D {
        positions,
        normals,
        indices,
    }
}

/// Midpoint of edge (a, b) on the unit sphere, deduplicated across faces.
fn midpoint(
    dirs: &mut Vec<glam::Vec3>,
    cache: &mut BTreeMap<(u16, u16), u16>,
    a: u16,
    b: u16,
) -> u16 {
    let key = (a.min(b), a.max(b));
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let m = ((dirs[a as usize] + dirs[b as usize]) * 0.5).normalize();
    let idx = dirs.len() as u16;
    dirs.push(m);
    cache.insert(key, idx);
    idx
}

/// Build a flat annulus in the XY plane.
///
/// - `inner_radius` / `outer_radius`: the ring's hole and rim.
/// - `segments`: angular resolution; 80 gives a visually smooth circle.
pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Mesh3D {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity(segments as usize * 2);
    let mut normals = Vec::with_capacity(segments as usize * 2);
    let mut indices = Vec::with_capacity(segments as usize * 6);

    for s in 0..segments {
        let angle = s as f32 / segments as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        positions.push([inner_radius * cos, inner_radius * sin, 0.0]);
        positions.push([outer_radius * cos, outer_radius * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        normals.push([0.0, 0.0, 1.0]);
    }

    for s in 0..segments {
        let i0 = (s * 2) as u16;
        let o0 = i0 + 1;
        let i1 = ((s + 1) % segments * 2) as u16;
        let o1 = i1 + 1;

        indices.extend_from_slice(&[i0, o0, o1, i0, o1, i1]);
    }

    Mesh3D {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosahedron_vertex_and_face_counts() {
        // Closed icosphere: V = 10 * 4^d + 2, F = 20 * 4^d.
        for (detail, verts, faces) in [(0u32, 12, 20), (1, 42, 80), (2, 162, 320)] {
            let mesh = icosahedron(1.0, detail);
            assert_eq!(mesh.positions.len(), verts, "detail {detail}");
            assert_eq!(mesh.normals.len(), verts, "detail {detail}");
            assert_eq!(mesh.indices.len(), faces * 3, "detail {detail}");
        }
    }

    #[test]
    fn icosahedron_vertices_sit_on_sphere() {
        let radius = 1.6;
        let mesh = icosahedron(radius, 1);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let p = glam::Vec3::from_array(*p);
            let n = glam::Vec3::from_array(*n);
            assert!((p.length() - radius).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-5);
            // Radial normals point the same way as the position.
            assert!(p.normalize().dot(n) > 0.999);
        }
    }

    #[test]
    fn ring_lies_flat_between_radii() {
        let mesh = ring(3.1, 3.6, 80);
        assert_eq!(mesh.positions.len(), 160);
        assert_eq!(mesh.indices.len(), 80 * 6);

        for p in &mesh.positions {
            assert_eq!(p[2], 0.0);
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            assert!((3.1..=3.6001).contains(&r), "radius {r} out of band");
        }
    }

    #[test]
    fn ring_indices_in_bounds() {
        let mesh = ring(3.1, 3.6, 7);
        let n = mesh.positions.len() as u16;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }
}
