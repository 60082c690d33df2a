use thiserror::Error;

/// Errors raised while loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("failed to read mesh file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse OBJ data: {0}")]
    Parse(String),

    #[error("mesh contains no triangles")]
    Empty,

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}
