use nalgebra::{vector, Vector3};

use crate::error::RasterError;

/// Struct, representing raw rgb8 pixel data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0,   g: 0,   b: 0,   };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, };
    pub const RED:   Color = Color { r: 255, g: 0,   b: 0,   };
    pub const GREEN: Color = Color { r: 0,   g: 255, b: 0,   };
    pub const BLUE:  Color = Color { r: 0,   g: 0,   b: 255, };

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b };
    }

    /// Converts float channels in [0.0, 1.0] to rgb8, values outside of the range are clamped.
    pub fn from_float3(v: Vector3<f32>) -> Color {
        fn to_channel(value: f32) -> u8 {
            if value.is_nan() {
                return 0;
            }
            return (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        return Color {
            r: to_channel(v.x),
            g: to_channel(v.y),
            b: to_channel(v.z),
        };
    }

    pub fn to_float3(self) -> Vector3<f32> {
        return vector![self.r as f32, self.g as f32, self.b as f32] / 255.0;
    }

    /// Get convex combination of two colors: t * c_1 + (1 - t) * c_2.
    /// t is clamped to [0.0, 1.0].
    pub fn blend(color_1: Color, color_2: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        return Color::from_float3(t * color_1.to_float3() + (1.0 - t) * color_2.to_float3());
    }
}

/// Generic 2D resource with a flat row-major storage. Row 0 is the top row of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer2D<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> Buffer2D<T> {
    /// Allocates a buffer filled with `T::default()`.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError>
    where
        T: Default,
    {
        return Self::filled(width, height, T::default());
    }

    /// Allocates a buffer with every element set to `value`.
    /// Fails on zero dimensions or when the allocation can't be made.
    pub fn filled(width: u32, height: u32, value: T) -> Result<Self, RasterError> {
        let allocation_error = || RasterError::AllocationError { width, height };
        if width == 0 || height == 0 {
            return Err(allocation_error());
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(allocation_error)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| allocation_error())?;
        data.resize(len, value);
        return Ok(Self { width, height, data });
    }

    /// Overwrites every element.
    pub fn clear(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Buffer2D<T> {
    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn dimensions(&self) -> (u32, u32) {
        return (self.width, self.height);
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, RasterError> {
        if x >= self.width || y >= self.height {
            return Err(RasterError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        return Ok(x as usize + y as usize * self.width as usize);
    }

    pub fn item(&self, x: u32, y: u32) -> Result<&T, RasterError> {
        let index = self.index(x, y)?;
        return Ok(&self.data[index]);
    }

    pub fn item_mut(&mut self, x: u32, y: u32) -> Result<&mut T, RasterError> {
        let index = self.index(x, y)?;
        return Ok(&mut self.data[index]);
    }

    pub fn as_slice(&self) -> &[T] {
        return &self.data[..];
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        return self.data.chunks_exact(self.width as usize);
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        return self.data.chunks_exact_mut(self.width as usize);
    }
}
