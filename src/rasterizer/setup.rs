//! Triangle setup: projection to the screen, bounding boxes, edge functions and weights.

use nalgebra::{vector, Vector2, Vector3, Vector4};

/// Clip-space w below this value is treated as degenerate and the triangle is dropped.
pub const W_EPSILON: f32 = 1e-6;

/// Pixel dimensions of the screen the normalized device coordinates are mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// x: [-1, 1] -> [0, width], y: [-1, 1] -> [height, 0].
    /// NDC +y points up, screen rows grow downwards from the top-left corner.
    pub fn to_screen(&self, ndc_x: f32, ndc_y: f32) -> Vector2<f32> {
        return vector![
            (ndc_x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc_y) * 0.5 * self.height as f32
        ];
    }

    /// Perspective divide followed by the viewport transform.
    /// Returns None for w that is non-positive, close to zero or non-finite.
    pub fn project(&self, clip: &Vector4<f32>) -> Option<ScreenVertex> {
        if !(clip.w > W_EPSILON) || !clip.iter().all(|v| v.is_finite()) {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let position = self.to_screen(clip.x * inv_w, clip.y * inv_w);
        let z = clip.z * inv_w;
        if !position.iter().all(|v| v.is_finite()) || !z.is_finite() {
            return None;
        }
        return Some(ScreenVertex { position, z, inv_w });
    }
}

/// Vertex after the viewport transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Vector2<f32>, // Pixel coordinates, not rounded.
    pub z: f32,                 // NDC depth.
    pub inv_w: f32,             // 1 / clip w, used for perspective-correct weights.
}

/// Signed doubled area of the triangle (a, b, p).
/// Zero if p is on the line through a and b, sign tells the side.
#[inline]
pub fn edge_function(a: &Vector2<f32>, b: &Vector2<f32>, p: &Vector2<f32>) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

/// Screen space weights to perspective-correct ones: each weight is divided by its vertex w,
/// and the result is renormalized by the interpolated 1/w.
pub fn perspective_weights(barycentric: &Vector3<f32>, inv_w: &Vector3<f32>) -> Vector3<f32> {
    let weighted = barycentric.component_mul(inv_w);
    let interpolated_inv_w = weighted.sum();
    return weighted / interpolated_inv_w;
}

/// Half-open pixel rectangle, [min_x, max_x) x [min_y, max_y).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        return self.min_x >= self.max_x || self.min_y >= self.max_y;
    }
}

/// Triangle, ready for scan conversion.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [ScreenVertex; 3],
    area: f32,
}

impl Triangle {
    /// Returns None for triangles with (numerically) zero area.
    pub fn new(vertices: [ScreenVertex; 3]) -> Option<Self> {
        let area = edge_function(&vertices[0].position, &vertices[1].position, &vertices[2].position);
        if !(area.abs() > f32::EPSILON) {
            return None;
        }
        return Some(Self { vertices, area });
    }

    /// Signed doubled area in screen space.
    /// Negative for triangles, which are counter-clockwise in NDC, since the y axis is flipped.
    pub fn area(&self) -> f32 {
        return self.area;
    }

    /// Bounding box of the triangle clamped to the viewport.
    pub fn bounding_box(&self, viewport: &Viewport) -> BoundingBox {
        let [a, b, c] = self.vertices.map(|v| v.position);
        let clamp = |value: f32, limit: u32| value.max(0.0).min(limit as f32) as u32;
        return BoundingBox {
            min_x: clamp(a.x.min(b.x).min(c.x).floor(), viewport.width),
            min_y: clamp(a.y.min(b.y).min(c.y).floor(), viewport.height),
            max_x: clamp(a.x.max(b.x).max(c.x).ceil(), viewport.width),
            max_y: clamp(a.y.max(b.y).max(c.y).ceil(), viewport.height),
        };
    }

    /// Barycentric coordinates of p, if p is inside the triangle or on one of its edges.
    pub fn barycentric(&self, p: &Vector2<f32>) -> Option<Vector3<f32>> {
        let [a, b, c] = self.vertices.map(|v| v.position);
        let w0 = edge_function(&b, &c, p);
        let w1 = edge_function(&c, &a, p);
        let w2 = edge_function(&a, &b, p);
        let all_positive = w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0;
        let all_negative = w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0;
        if !(all_positive || all_negative) {
            return None;
        }
        return Some(vector![w0, w1, w2] / self.area);
    }

    /// Depth, interpolated linearly in screen space.
    /// Written relative to the first vertex, so constant depth stays exact.
    pub fn depth(&self, barycentric: &Vector3<f32>) -> f32 {
        let [a, b, c] = self.vertices.map(|v| v.z);
        return a + barycentric.y * (b - a) + barycentric.z * (c - a);
    }

    pub fn inv_w(&self) -> Vector3<f32> {
        let [a, b, c] = self.vertices.map(|v| v.inv_w);
        return vector![a, b, c];
    }
}
