use std::path::PathBuf;
use std::time;

use log::info;

use crate::error::AppError;
use crate::image::{save_color_buffer, save_depth_buffer};
use crate::rasterizer::{CullMode, DrawStats, Rasterizer};
use crate::resource::{Buffer2D, Color};
use crate::scene::{cube, Camera, Model, SceneVertex};

/// What the color buffer holds before any geometry is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Color),
    Gradient { top: Color, bottom: Color },
}

/// Struct, defining execution context.
#[derive(Debug, Clone)]
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub print_frame_time: bool,
    pub model_path: Option<PathBuf>, // Built-in cube is drawn without a model.
    pub output_path: PathBuf,
    pub depth_output_path: Option<PathBuf>,
    pub background: Background,
    pub cull_mode: CullMode,
}

impl Default for Params {
    fn default() -> Self {
        return Self {
            width: 800,
            height: 800,
            print_frame_time: false,
            model_path: None,
            output_path: PathBuf::from("result.png"),
            depth_output_path: None,
            background: Background::Gradient {
                top: Color::new(25, 25, 60),
                bottom: Color::new(110, 70, 130),
            },
            cull_mode: CullMode::None,
        };
    }
}

/// Result of a rendered frame.
pub struct Frame {
    pub color: Buffer2D<Color>,
    pub depth: Buffer2D<f32>,
    pub stats: DrawStats,
}

/// Vertical blend from the top color in row 0 to the bottom color.
pub fn fill_gradient(buffer: &mut Buffer2D<Color>, top: Color, bottom: Color) {
    let height = buffer.height() as f32;
    for (y, row) in buffer.rows_mut().enumerate() {
        let t = y as f32 / height;
        row.fill(Color::blend(bottom, top, t));
    }
}

/// Draws every shape of the model as seen from the camera.
/// Vertices are colored with their ambient color, no lighting is applied.
pub fn render(model: &Model, camera: &Camera, params: &Params) -> Result<Frame, AppError> {
    let mut color = Buffer2D::filled(params.width, params.height, Color::BLACK)?;
    let mut depth = Buffer2D::filled(params.width, params.height, 1.0)?;
    if let Background::Gradient { top, bottom } = params.background {
        fill_gradient(&mut color, top, bottom);
    }

    let matrix = camera.view_projection_matrix() * model.world_matrix();
    let mut stats = DrawStats::default();
    {
        let mut rasterizer = Rasterizer::new();
        rasterizer.set_viewport(params.width, params.height)?;
        rasterizer.set_render_target(&mut color, &mut depth)?;
        rasterizer.set_cull_mode(params.cull_mode);
        rasterizer.set_vertex_shader(move |position, vertex: &SceneVertex| (matrix * position, vertex.clone()));
        rasterizer.set_pixel_shader(|vertex: &SceneVertex, _| Color::from_float3(vertex.ambient));

        if let Background::Solid(background) = params.background {
            rasterizer.clear_render_target(background)?;
        }
        rasterizer.clear_depth_buffer(1.0)?;

        for shape in model.shapes() {
            rasterizer.set_vertex_buffer(&shape.vertices);
            rasterizer.set_index_buffer(&shape.indices);
            stats += rasterizer.draw(shape.indices.len(), 0)?;
        }
    }

    return Ok(Frame { color, depth, stats });
}

/// Loads the model, renders a single frame and saves it.
pub fn run(params: &Params) -> Result<DrawStats, AppError> {
    let model = match &params.model_path {
        Some(path) => Model::load_obj_file(path)?,
        None => Model::new(vec![cube()]),
    };
    let bounds = model.bounds().ok_or_else(|| AppError::Args(String::from("model has no vertices")))?;
    let camera = Camera::framing(bounds, params.width as f32 / params.height as f32);

    let time_begin = time::Instant::now();
    let frame = render(&model, &camera, params)?;
    let frame_time = time_begin.elapsed();

    info!(
        "Drew {} triangles, {} fragments written, {} rejected by depth test",
        frame.stats.triangles, frame.stats.fragments_written, frame.stats.fragments_rejected
    );
    if params.print_frame_time {
        println!("Frame time --- {:.2} ms", frame_time.as_secs_f64() * 1000.0);
    }

    save_color_buffer(&frame.color, &params.output_path)?;
    if let Some(path) = &params.depth_output_path {
        save_depth_buffer(&frame.depth, path)?;
    }
    return Ok(frame.stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn small_params() -> Params {
        return Params { width: 64, height: 48, ..Default::default() };
    }

    fn render_cube(params: &Params) -> Frame {
        let model = Model::new(vec![cube()]);
        let camera = Camera::framing(model.bounds().unwrap(), params.width as f32 / params.height as f32);
        return render(&model, &camera, params).unwrap();
    }

    #[test]
    fn gradient_goes_from_top_to_bottom() {
        let mut buffer = Buffer2D::filled(3, 4, Color::BLACK).unwrap();
        fill_gradient(&mut buffer, Color::WHITE, Color::BLACK);
        assert_eq!(*buffer.item(0, 0).unwrap(), Color::WHITE);
        let rows: Vec<Color> = buffer.rows().map(|row| row[0]).collect();
        assert!(rows.windows(2).all(|pair| pair[0].r > pair[1].r));
        assert!(buffer.rows().all(|row| row.iter().all(|&c| c == row[0])));
    }

    #[test]
    fn cube_covers_the_center() {
        let params = small_params();
        let frame = render_cube(&params);
        assert_eq!(frame.stats.triangles, 12);
        assert!(frame.stats.fragments_written > 0);

        // The camera looks at the +z face.
        let center = *frame.color.item(32, 24).unwrap();
        assert!((center.r as i32 - 128).abs() <= 1);
        assert!((center.g as i32 - 128).abs() <= 1);
        assert_eq!(center.b, 255);
        assert!(*frame.depth.item(32, 24).unwrap() < 1.0);

        // Corners keep the background.
        if let Background::Gradient { top, .. } = params.background {
            assert_eq!(*frame.color.item(0, 0).unwrap(), top);
        }
        assert_eq!(*frame.depth.item(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn back_face_culling_keeps_the_picture() {
        let frame = render_cube(&small_params());
        let culled = render_cube(&Params { cull_mode: CullMode::Back, ..small_params() });
        assert_eq!(culled.stats.culled, 6);
        assert!(culled.stats.fragments_rejected < frame.stats.fragments_rejected);
        assert_eq!(culled.color.item(32, 24).unwrap(), frame.color.item(32, 24).unwrap());
    }

    #[test]
    fn solid_background_clears_the_target() {
        let params = Params { background: Background::Solid(Color::GREEN), ..small_params() };
        let camera = Camera::new(Point3::origin(), Point3::new(0.0, 0.0, -1.0), 1.0);
        let frame = render(&Model::new(vec![]), &camera, &params).unwrap();
        assert!(frame.color.as_slice().iter().all(|&c| c == Color::GREEN));
        assert_eq!(frame.stats, DrawStats::default());
    }
}
