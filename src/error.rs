use thiserror::Error;

/// Everything the rasterizer core can fail with.
///
/// Degenerate triangles (zero area, non-positive w) are not errors, they are skipped and
/// counted in `DrawStats`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("failed to allocate a {width}x{height} buffer")]
    AllocationError { width: u32, height: u32 },
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
    #[error("coordinate ({x}, {y}) is outside of a {width}x{height} buffer")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    #[error("index {index} is out of range for a buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("vertex count {0} is not a multiple of 3")]
    InvalidTopology(usize),
    #[error("rasterizer is not ready: {0} is not bound")]
    NotReady(&'static str),
}

/// Errors of the frame controller: loading a model, rendering it and saving the result.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load model: {0}")]
    Obj(#[from] ::obj::ObjError),
    #[error("failed to save image: {0}")]
    Image(#[from] ::image::ImageError),
    #[error("invalid arguments: {0}")]
    Args(String),
}
