//! Software rasterizer: vertex and pixel shaders as closures, barycentric scan conversion,
//! perspective-correct attributes and a depth buffer, with no GPU involved.

pub mod app;
pub mod error;
pub mod image;
pub mod logging;
pub mod rasterizer;
pub mod resource;
pub mod scene;

pub use error::{AppError, RasterError};
pub use rasterizer::{CullMode, DrawStats, Interpolate, Rasterizer, Vertex};
pub use resource::{Buffer2D, Color};
