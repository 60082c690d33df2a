use glam::Vec3;

use super::MeshData;

/// Highest tessellation level exposed to the viewer.
pub const MAX_TESS_LEVEL: u32 = 5;

/// Blend between the flat triangle (0.0) and the full Phong surface (1.0).
pub const PHONG_SHAPE_FACTOR: f32 = 0.75;

/// Refines every triangle of `mesh` into `level²` sub-triangles.
///
/// Sub-vertices sit on a uniform barycentric grid and are displaced onto the
/// Phong tessellation surface defined by the corner normals. Points on an edge
/// depend only on that edge's two corners, so neighbouring triangles agree and
/// the result has no cracks.
///
/// `level` is clamped to `1..=MAX_TESS_LEVEL`; level 1 returns a copy.
pub fn tessellate(mesh: &MeshData, level: u32) -> MeshData {
    let n = level.clamp(1, MAX_TESS_LEVEL);
    if n == 1 {
        return mesh.clone();
    }

    let verts_per_tri = ((n + 1) * (n + 2) / 2) as usize;
    let tris_per_tri = (n * n) as usize;
    let tri_count = mesh.triangle_count();

    let mut out = MeshData {
        positions: Vec::with_capacity(tri_count * verts_per_tri),
        normals: Vec::with_capacity(tri_count * verts_per_tri),
        indices: Vec::with_capacity(tri_count * tris_per_tri * 3),
    };

    for [a, b, c] in mesh.triangles() {
        let corner = |i: u32| {
            let i = i as usize;
            (
                Vec3::from_array(mesh.positions[i]),
                Vec3::from_array(mesh.normals[i]),
            )
        };
        let patch = [corner(a), corner(b), corner(c)];
        let base = out.positions.len() as u32;

        // Row i holds n - i + 1 points (j = 0..=n-i).
        for i in 0..=n {
            for j in 0..=(n - i) {
                let v = i as f32 / n as f32;
                let w = j as f32 / n as f32;
                let u = (n - i - j) as f32 / n as f32;
                let (p, nrm) = phong_point(&patch, u, v, w);
                out.positions.push(p.to_array());
                out.normals.push(nrm.to_array());
            }
        }

        let index = |i: u32, j: u32| base + grid_index(n, i, j);
        for i in 0..n {
            for j in 0..(n - i) {
                // Upward triangle, same winding as the source.
                out.indices
                    .extend_from_slice(&[index(i, j), index(i + 1, j), index(i, j + 1)]);
                if j + 1 < n - i {
                    // Downward triangle filling the gap to the next column.
                    out.indices.extend_from_slice(&[
                        index(i + 1, j),
                        index(i + 1, j + 1),
                        index(i, j + 1),
                    ]);
                }
            }
        }
    }

    out
}

/// Offset of grid point `(i, j)` within one refined triangle.
fn grid_index(n: u32, i: u32, j: u32) -> u32 {
    // Rows before i contain (n + 1) + n + ... + (n - i + 2) points.
    i * (n + 1) - i * i.saturating_sub(1) / 2 + j
}

fn phong_point(patch: &[(Vec3, Vec3); 3], u: f32, v: f32, w: f32) -> (Vec3, Vec3) {
    let [(p0, n0), (p1, n1), (p2, n2)] = *patch;
    let flat = p0 * u + p1 * v + p2 * w;

    let project = |p: Vec3, n: Vec3| flat - n * (flat - p).dot(n);
    let curved = project(p0, n0) * u + project(p1, n1) * v + project(p2, n2) * w;

    let position = flat.lerp(curved, PHONG_SHAPE_FACTOR);
    let normal = (n0 * u + n1 * v + n2 * w).try_normalize().unwrap_or(Vec3::Y);
    (position, normal)
}

/// Tessellated variants of one base mesh, built on first use per level.
#[derive(Debug, Default)]
pub struct TessCache {
    levels: Vec<Option<MeshData>>,
}

impl TessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `base` tessellated at `level` (clamped), building it if needed.
    pub fn get(&mut self, base: &MeshData, level: u32) -> &MeshData {
        let level = level.clamp(1, MAX_TESS_LEVEL);
        let slot = (level - 1) as usize;
        if self.levels.len() <= slot {
            self.levels.resize_with(slot + 1, || None);
        }

        self.levels[slot].get_or_insert_with(|| {
            let mesh = tessellate(base, level);
            log::debug!(
                "tessellated level {level}: {} triangles",
                mesh.triangle_count()
            );
            mesh
        })
    }

    pub fn is_built(&self, level: u32) -> bool {
        let slot = level.clamp(1, MAX_TESS_LEVEL) as usize - 1;
        self.levels.get(slot).is_some_and(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
