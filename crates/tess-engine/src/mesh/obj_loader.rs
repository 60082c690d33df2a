use std::collections::HashMap;
use std::path::Path;

use obj::{IndexTuple, ObjData};

use super::{MeshData, MeshError};

/// Loads every polygon of an OBJ file into one triangle mesh.
///
/// The file is read into an owned buffer and parsed from memory.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, MeshError> {
    let path = path.as_ref();
    log::info!("loading mesh: {}", path.display());

    let bytes = std::fs::read(path)?;
    let mesh = parse_obj(&bytes)?;

    log::info!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parses OBJ text into a triangle mesh.
///
/// - polygons are fan-triangulated
/// - corners sharing a position and normal index become one vertex
/// - if any corner lacks a normal, smooth normals are generated for the whole mesh
pub fn parse_obj(bytes: &[u8]) -> Result<MeshData, MeshError> {
    let data = ObjData::load_buf(bytes).map_err(|e| MeshError::Parse(e.to_string()))?;

    let polys: Vec<&[IndexTuple]> = data
        .objects
        .iter()
        .flat_map(|o| o.groups.iter())
        .flat_map(|g| g.polys.iter())
        .map(|p| p.0.as_slice())
        .collect();

    let use_file_normals = !data.normal.is_empty()
        && polys.iter().all(|p| p.iter().all(|c| c.2.is_some()));

    let mut mesh = MeshData::default();
    let mut remap: HashMap<(usize, Option<usize>), u32> = HashMap::new();

    for poly in polys {
        if poly.len() < 3 {
            continue;
        }

        let mut corners = Vec::with_capacity(poly.len());
        for &IndexTuple(pos, _, normal) in poly {
            check_index("position", pos, data.position.len())?;
            let normal = if use_file_normals { normal } else { None };
            if let Some(n) = normal {
                check_index("normal", n, data.normal.len())?;
            }

            let key = (pos, normal);
            let index = match remap.get(&key) {
                Some(&i) => i,
                None => {
                    let i = mesh.positions.len() as u32;
                    mesh.positions.push(data.position[pos]);
                    mesh.normals.push(normal.map_or([0.0; 3], |n| data.normal[n]));
                    remap.insert(key, i);
                    i
                }
            };
            corners.push(index);
        }

        for k in 1..corners.len() - 1 {
            mesh.indices.extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
        }
    }

    if mesh.is_empty() {
        return Err(MeshError::Empty);
    }

    if !use_file_normals {
        log::debug!("mesh has no complete normals; generating smooth normals");
        mesh.compute_normals();
    }

    Ok(mesh)
}

fn check_index(kind: &'static str, index: usize, len: usize) -> Result<(), MeshError> {
    if index < len {
        Ok(())
    } else {
        Err(MeshError::IndexOutOfRange { kind, index, len })
    }
}
