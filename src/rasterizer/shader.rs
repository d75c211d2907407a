use nalgebra::{SVector, Vector3, Vector4};

/// Vertex record, stored in a vertex buffer and carried through the pipeline.
pub trait Vertex: Clone {
    /// Homogeneous position handed to the vertex shader.
    fn position(&self) -> Vector4<f32>;
}

/// Attributes, which can be blended across a triangle with barycentric weights.
/// Weights always sum up to 1.
pub trait Interpolate: Sized {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: &Vector3<f32>) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: &Vector3<f32>) -> Self {
        return a * weights.x + b * weights.y + c * weights.z;
    }
}

impl<const D: usize> Interpolate for SVector<f32, D> {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: &Vector3<f32>) -> Self {
        return a * weights.x + b * weights.y + c * weights.z;
    }
}

/// Type representing vertex shader.
pub type VertexShader<'a, V> = dyn Fn(
    Vector4<f32>, // Homogeneous position of the vertex.
    &V,           // Vertex as stored in the vertex buffer.
) -> (Vector4<f32>, V) // Clip-space position and attributes carried to the pixel shader.
    + 'a;

/// Type representing pixel shader.
pub type PixelShader<'a, V, C> = dyn Fn(
    &V,  // Perspective-correct interpolated attributes.
    f32, // Depth of the fragment.
) -> C
    + 'a;
