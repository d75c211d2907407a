//! Rasterizer engine: binds render targets, geometry and shaders and scan converts triangle lists.
//!
//! Conventions used throughout:
//! - NDC x and y map to the viewport with +y pointing up, screen row 0 is the top row.
//! - Depth is NDC z interpolated linearly in screen space. A fragment passes the depth test
//!   iff its depth is strictly less than the stored one (nearer wins), so the depth buffer is
//!   usually cleared to 1.0 or +inf.
//! - Triangles counter-clockwise in NDC are front-facing. Nothing is culled unless a cull mode
//!   is set.

mod setup;
mod shader;

use std::ops::AddAssign;

use log::{debug, trace};
use nalgebra::{vector, Vector4};

use crate::error::RasterError;
use crate::resource::Buffer2D;

pub use setup::{edge_function, perspective_weights, BoundingBox, ScreenVertex, Triangle, Viewport, W_EPSILON};
pub use shader::{Interpolate, PixelShader, Vertex, VertexShader};

/// Which facing of triangles is dropped before scan conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    #[default]
    None,
    Back,
    Front,
}

impl CullMode {
    /// Takes signed screen space area of a triangle.
    fn culls(self, area: f32) -> bool {
        // y is flipped by the viewport, so front faces have negative screen area.
        let front_facing = area < 0.0;
        return match self {
            CullMode::None => false,
            CullMode::Back => !front_facing,
            CullMode::Front => front_facing,
        };
    }
}

/// Counters collected over a single draw call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: usize,          // Triangles fetched from the index buffer.
    pub clipped: usize,            // Dropped because of non-positive or degenerate w.
    pub degenerate: usize,         // Dropped because of zero screen area.
    pub culled: usize,             // Dropped by the cull mode.
    pub fragments_written: usize,  // Passed the depth test and got shaded.
    pub fragments_rejected: usize, // Failed the depth test.
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, other: Self) {
        self.triangles += other.triangles;
        self.clipped += other.clipped;
        self.degenerate += other.degenerate;
        self.culled += other.culled;
        self.fragments_written += other.fragments_written;
        self.fragments_rejected += other.fragments_rejected;
    }
}

/// Software rasterizer over vertices of type `V`, producing pixels of type `C`.
///
/// Render target, depth buffer and geometry are borrowed for `'a`, they have to outlive
/// the rasterizer. Shaders may borrow frame data for the same lifetime.
pub struct Rasterizer<'a, V, C> {
    viewport: Option<Viewport>,
    render_target: Option<&'a mut Buffer2D<C>>,
    depth_buffer: Option<&'a mut Buffer2D<f32>>,
    vertex_buffer: Option<&'a [V]>,
    index_buffer: Option<&'a [u32]>,
    vertex_shader: Option<Box<VertexShader<'a, V>>>,
    pixel_shader: Option<Box<PixelShader<'a, V, C>>>,
    cull_mode: CullMode,
}

impl<'a, V, C> Default for Rasterizer<'a, V, C> {
    fn default() -> Self {
        return Self {
            viewport: None,
            render_target: None,
            depth_buffer: None,
            vertex_buffer: None,
            index_buffer: None,
            vertex_shader: None,
            pixel_shader: None,
            cull_mode: CullMode::None,
        };
    }
}

impl<'a, V, C> Rasterizer<'a, V, C>
where
    V: Vertex + Interpolate,
    C: Copy,
{
    pub fn new() -> Self {
        return Self::default();
    }

    /// Sets the size of the screen NDC are mapped to. Bound buffers are checked against it on
    /// every draw call.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::DimensionMismatch { expected: (1, 1), actual: (width, height) });
        }
        self.viewport = Some(Viewport { width, height });
        return Ok(());
    }

    pub fn viewport(&self) -> Option<Viewport> {
        return self.viewport;
    }

    /// Binds color and depth buffers, both have to match the viewport.
    pub fn set_render_target(
        &mut self,
        render_target: &'a mut Buffer2D<C>,
        depth_buffer: &'a mut Buffer2D<f32>,
    ) -> Result<(), RasterError> {
        let viewport = self.viewport.ok_or(RasterError::NotReady("viewport"))?;
        check_dimensions(&viewport, render_target.dimensions())?;
        check_dimensions(&viewport, depth_buffer.dimensions())?;
        self.render_target = Some(render_target);
        self.depth_buffer = Some(depth_buffer);
        return Ok(());
    }

    pub fn set_vertex_buffer(&mut self, vertex_buffer: &'a [V]) {
        self.vertex_buffer = Some(vertex_buffer);
    }

    pub fn set_index_buffer(&mut self, index_buffer: &'a [u32]) {
        self.index_buffer = Some(index_buffer);
    }

    pub fn set_vertex_shader<F>(&mut self, shader: F)
    where
        F: Fn(Vector4<f32>, &V) -> (Vector4<f32>, V) + 'a,
    {
        self.vertex_shader = Some(Box::new(shader));
    }

    pub fn set_pixel_shader<F>(&mut self, shader: F)
    where
        F: Fn(&V, f32) -> C + 'a,
    {
        self.pixel_shader = Some(Box::new(shader));
    }

    pub fn set_cull_mode(&mut self, cull_mode: CullMode) {
        self.cull_mode = cull_mode;
    }

    /// Fills the color buffer, depth buffer is left untouched.
    pub fn clear_render_target(&mut self, color: C) -> Result<(), RasterError> {
        let render_target = self.render_target.as_deref_mut().ok_or(RasterError::NotReady("render target"))?;
        render_target.clear(color);
        return Ok(());
    }

    /// Fills the depth buffer, 1.0 or f32::INFINITY lets everything through the first time.
    pub fn clear_depth_buffer(&mut self, depth: f32) -> Result<(), RasterError> {
        let depth_buffer = self.depth_buffer.as_deref_mut().ok_or(RasterError::NotReady("depth buffer"))?;
        depth_buffer.clear(depth);
        return Ok(());
    }

    /// Read-only view of the bound color buffer.
    pub fn render_target(&self) -> Option<&Buffer2D<C>> {
        return self.render_target.as_deref();
    }

    pub fn depth_buffer(&self) -> Option<&Buffer2D<f32>> {
        return self.depth_buffer.as_deref();
    }

    /// Draws `vertex_count` indices of the bound index buffer, starting at `start_vertex`,
    /// as a triangle list.
    ///
    /// Triangles with non-positive w or zero area are skipped. An invalid vertex index aborts
    /// the call, triangles drawn before it stay in the buffers.
    pub fn draw(&mut self, vertex_count: usize, start_vertex: usize) -> Result<DrawStats, RasterError> {
        let Self {
            viewport,
            render_target,
            depth_buffer,
            vertex_buffer,
            index_buffer,
            vertex_shader,
            pixel_shader,
            cull_mode,
        } = self;
        let viewport = viewport.ok_or(RasterError::NotReady("viewport"))?;
        let render_target = render_target.as_deref_mut().ok_or(RasterError::NotReady("render target"))?;
        let depth_buffer = depth_buffer.as_deref_mut().ok_or(RasterError::NotReady("depth buffer"))?;
        let vertex_buffer = vertex_buffer.ok_or(RasterError::NotReady("vertex buffer"))?;
        let index_buffer = index_buffer.ok_or(RasterError::NotReady("index buffer"))?;
        let vertex_shader = vertex_shader.as_deref().ok_or(RasterError::NotReady("vertex shader"))?;
        let pixel_shader = pixel_shader.as_deref().ok_or(RasterError::NotReady("pixel shader"))?;

        if vertex_count % 3 != 0 {
            return Err(RasterError::InvalidTopology(vertex_count));
        }
        let end = start_vertex
            .checked_add(vertex_count)
            .filter(|&end| end <= index_buffer.len())
            .ok_or(RasterError::IndexOutOfRange {
                index: start_vertex.saturating_add(vertex_count),
                len: index_buffer.len(),
            })?;
        check_dimensions(&viewport, render_target.dimensions())?;
        check_dimensions(&viewport, depth_buffer.dimensions())?;

        let mut stats = DrawStats::default();
        for triangle_indices in index_buffer[start_vertex..end].chunks_exact(3) {
            stats.triangles += 1;
            let fetch = |index: u32| {
                vertex_buffer.get(index as usize).ok_or(RasterError::IndexOutOfRange {
                    index: index as usize,
                    len: vertex_buffer.len(),
                })
            };
            let vertices = [fetch(triangle_indices[0])?, fetch(triangle_indices[1])?, fetch(triangle_indices[2])?];

            let processed = vertices.map(|vertex| vertex_shader(vertex.position(), vertex));
            let targets = Targets { viewport, render_target: &mut *render_target, depth_buffer: &mut *depth_buffer };
            rasterize_triangle(&processed, targets, pixel_shader, *cull_mode, &mut stats)?;
        }

        debug!("draw({}, {}): {:?}", vertex_count, start_vertex, stats);
        return Ok(stats);
    }
}

fn check_dimensions(viewport: &Viewport, actual: (u32, u32)) -> Result<(), RasterError> {
    let expected = (viewport.width, viewport.height);
    if expected != actual {
        return Err(RasterError::DimensionMismatch { expected, actual });
    }
    return Ok(());
}

/// Buffers written by a single triangle.
struct Targets<'t, C> {
    viewport: Viewport,
    render_target: &'t mut Buffer2D<C>,
    depth_buffer: &'t mut Buffer2D<f32>,
}

/// Setup, scan conversion, depth test and shading of one triangle after the vertex stage.
fn rasterize_triangle<V, C>(
    processed: &[(Vector4<f32>, V); 3],
    targets: Targets<'_, C>,
    pixel_shader: &PixelShader<'_, V, C>,
    cull_mode: CullMode,
    stats: &mut DrawStats,
) -> Result<(), RasterError>
where
    V: Interpolate,
{
    let Targets { viewport, render_target, depth_buffer } = targets;

    let mut screen_vertices = [ScreenVertex { position: vector![0.0, 0.0], z: 0.0, inv_w: 0.0 }; 3];
    for (screen_vertex, (clip, _)) in screen_vertices.iter_mut().zip(processed) {
        match viewport.project(clip) {
            Some(projected) => *screen_vertex = projected,
            None => {
                trace!("skipping triangle with clip w = {}", clip.w);
                stats.clipped += 1;
                return Ok(());
            }
        }
    }

    let Some(triangle) = Triangle::new(screen_vertices) else {
        trace!("skipping zero area triangle");
        stats.degenerate += 1;
        return Ok(());
    };
    if cull_mode.culls(triangle.area()) {
        stats.culled += 1;
        return Ok(());
    }

    let inv_w = triangle.inv_w();
    let bbox = triangle.bounding_box(&viewport);
    for y in bbox.min_y..bbox.max_y {
        for x in bbox.min_x..bbox.max_x {
            // Sampling at pixel centers.
            let point = vector![x as f32 + 0.5, y as f32 + 0.5];
            let Some(barycentric) = triangle.barycentric(&point) else {
                continue;
            };
            let z = triangle.depth(&barycentric);
            let stored_depth = depth_buffer.item_mut(x, y)?;
            let pixel = render_target.item_mut(x, y)?;
            if !(z < *stored_depth) {
                stats.fragments_rejected += 1;
                continue;
            }

            let weights = perspective_weights(&barycentric, &inv_w);
            let attributes = V::interpolate(&processed[0].1, &processed[1].1, &processed[2].1, &weights);
            *pixel = pixel_shader(&attributes, z);
            *stored_depth = z;
            stats.fragments_written += 1;
        }
    }
    return Ok(());
}
