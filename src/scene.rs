//! Geometry side of the frame: models loaded into per-shape vertex and index buffers.

pub mod camera;
pub mod util;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use nalgebra::{point, vector, Matrix4, Point3, Vector2, Vector3, Vector4};
use obj::raw::material::{Material, MtlColor};
use obj::raw::object::{Group, Polygon};
use obj::raw::{parse_mtl, parse_obj, RawObj};

use crate::error::AppError;
use crate::rasterizer::{Interpolate, Vertex};
use self::util::to_hom_point;

pub use self::camera::Camera;

/// Vertex of a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneVertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub ambient: Vector3<f32>, // Color in [0, 1] used when there is no lighting.
    pub uv: Vector2<f32>,      // Zero when the model has no texture coordinates.
}

impl SceneVertex {
    /// Vertex with ambient color derived from the normal direction.
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>) -> Self {
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
        return Self {
            position,
            normal,
            ambient: normal.map(|n| 0.5 * n + 0.5),
            uv: Vector2::zeros(),
        };
    }
}

impl Vertex for SceneVertex {
    fn position(&self) -> Vector4<f32> {
        return to_hom_point(self.position);
    }
}

impl Interpolate for SceneVertex {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: &Vector3<f32>) -> Self {
        return Self {
            position: Vector3::interpolate(&a.position, &b.position, &c.position, weights),
            normal: Vector3::interpolate(&a.normal, &b.normal, &c.normal, weights),
            ambient: Vector3::interpolate(&a.ambient, &b.ambient, &c.ambient, weights),
            uv: Vector2::interpolate(&a.uv, &b.uv, &c.uv, weights),
        };
    }
}

/// One independently drawable piece of a model.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
}

/// Collection of shapes sharing a world transform.
#[derive(Debug, Clone)]
pub struct Model {
    shapes: Vec<Shape>,
    world_matrix: Matrix4<f32>,
}

impl Model {
    pub fn new(shapes: Vec<Shape>) -> Self {
        return Self { shapes, world_matrix: Matrix4::identity() };
    }

    /// Loads Wavefront OBJ file together with the material libraries it references.
    /// Every object (`o`) and group (`g`) becomes its own shape.
    pub fn load_obj_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = parse_objects(BufReader::new(File::open(path)?))?;

        let mut materials = Materials::new();
        let directory = path.parent().unwrap_or_else(|| Path::new(""));
        for library in &raw.material_libraries {
            let library_path = directory.join(library);
            match File::open(&library_path) {
                Ok(file) => materials.extend(load_mtl(BufReader::new(file))?),
                Err(err) => warn!("Skipping material library {} - {}", library_path.display(), err),
            }
        }

        let model = Self::from_raw(&raw, &materials);
        info!(
            "Loaded {} - {} shapes, {} vertices, {} indices",
            path.display(),
            model.shapes.len(),
            model.vertex_count(),
            model.index_count()
        );
        return Ok(model);
    }

    pub fn load_obj<R: BufRead>(reader: R) -> Result<Self, AppError> {
        return Self::load_obj_with_materials(reader, &Materials::new());
    }

    pub fn load_obj_with_materials<R: BufRead>(reader: R, materials: &Materials) -> Result<Self, AppError> {
        return Ok(Self::from_raw(&parse_objects(reader)?, materials));
    }

    fn from_raw(raw: &RawObj, materials: &Materials) -> Self {
        let polygon_count = raw.polygons.len();
        let mut polygon_materials: Vec<Option<&str>> = vec![None; polygon_count];
        for (name, mesh) in &raw.meshes {
            for range in &mesh.polygons {
                for slot in &mut polygon_materials[range.start..range.end.min(polygon_count)] {
                    *slot = Some(name.as_str());
                }
            }
        }

        let mut groups: Vec<&Group> = raw.groups.values().filter(|group| !group.polygons.is_empty()).collect();
        groups.sort_by_key(|group| group.polygons[0].start);

        let mut shapes = Vec::with_capacity(groups.len());
        for group in groups {
            let mut builder = ShapeBuilder::new(raw, materials);
            for range in &group.polygons {
                for id in range.start..range.end.min(polygon_count) {
                    builder.add_polygon(&raw.polygons[id], polygon_materials[id]);
                }
            }
            if !builder.shape.indices.is_empty() {
                shapes.push(builder.shape);
            }
        }
        return Self::new(shapes);
    }

    pub fn shapes(&self) -> &[Shape] {
        return &self.shapes[..];
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        return self.world_matrix;
    }

    pub fn set_world_matrix(&mut self, world_matrix: Matrix4<f32>) {
        self.world_matrix = world_matrix;
    }

    pub fn vertex_count(&self) -> usize {
        return self.shapes.iter().map(|shape| shape.vertices.len()).sum();
    }

    pub fn index_count(&self) -> usize {
        return self.shapes.iter().map(|shape| shape.indices.len()).sum();
    }

    /// Axis aligned bounds of all vertices in model space, None for an empty model.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut positions = self.shapes.iter().flat_map(|shape| shape.vertices.iter().map(|v| v.position));
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        return Some((point![min.x, min.y, min.z], point![max.x, max.y, max.z]));
    }
}

/// Materials of a model by name, as read from `.mtl` libraries.
pub type Materials = HashMap<String, Material>;

pub fn load_mtl<R: BufRead>(reader: R) -> Result<Materials, AppError> {
    return Ok(parse_mtl(reader)?.materials);
}

/// Parses OBJ with object statements turned into group statements.
fn parse_objects<R: BufRead>(reader: R) -> Result<RawObj, AppError> {
    let mut text = String::new();
    for line in reader.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("o") {
            let name = tokens.collect::<Vec<_>>().join("_");
            text.push_str("g ");
            text.push_str(if name.is_empty() { "object" } else { &name });
        } else {
            text.push_str(&line);
        }
        text.push('\n');
    }
    return Ok(parse_obj(text.as_bytes())?);
}

/// Corner of an OBJ face: position, texture coordinate and normal indices.
type Corner = (usize, Option<usize>, Option<usize>);

/// Collects triangles of one shape, sharing vertices between faces where the corner and the
/// material are the same.
struct ShapeBuilder<'a> {
    raw: &'a RawObj,
    materials: &'a Materials,
    shape: Shape,
    known: HashMap<(Corner, Option<&'a str>), u32>,
}

impl<'a> ShapeBuilder<'a> {
    fn new(raw: &'a RawObj, materials: &'a Materials) -> Self {
        return Self { raw, materials, shape: Shape::default(), known: HashMap::new() };
    }

    fn add_polygon(&mut self, polygon: &Polygon, material: Option<&'a str>) {
        let corners: Vec<Corner> = match polygon {
            Polygon::P(ids) => ids.iter().map(|&p| (p, None, None)).collect(),
            Polygon::PT(ids) => ids.iter().map(|&(p, t)| (p, Some(t), None)).collect(),
            Polygon::PN(ids) => ids.iter().map(|&(p, n)| (p, None, Some(n))).collect(),
            Polygon::PTN(ids) => ids.iter().map(|&(p, t, n)| (p, Some(t), Some(n))).collect(),
        };
        if corners.len() < 3 {
            return;
        }

        // Faces without normals get the flat normal of the face.
        let face_normal = {
            let [a, b, c] = [0, 1, 2].map(|i| self.position(corners[i].0));
            (b - a).cross(&(c - a))
        };
        let ids: Vec<u32> = corners.iter().map(|&corner| self.vertex(corner, material, face_normal)).collect();
        for i in 1..ids.len() - 1 {
            self.shape.indices.extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
        }
    }

    fn position(&self, id: usize) -> Vector3<f32> {
        let (x, y, z, _) = self.raw.positions[id];
        return vector![x, y, z];
    }

    fn vertex(&mut self, corner: Corner, material: Option<&'a str>, face_normal: Vector3<f32>) -> u32 {
        let (p, t, n) = corner;
        if n.is_some() {
            if let Some(&id) = self.known.get(&(corner, material)) {
                return id;
            }
        }

        let normal = match n {
            Some(n) => {
                let (x, y, z) = self.raw.normals[n];
                vector![x, y, z]
            }
            None => face_normal,
        };
        let mut vertex = SceneVertex::new(self.position(p), normal);
        if let Some(t) = t {
            let (u, v, _) = self.raw.tex_coords[t];
            vertex.uv = vector![u, v];
        }
        let ambient = material
            .and_then(|name| self.materials.get(name))
            .and_then(|material| material.ambient.as_ref());
        if let Some(MtlColor::Rgb(r, g, b)) = ambient {
            vertex.ambient = vector![*r, *g, *b];
        }

        let id = self.shape.vertices.len() as u32;
        self.shape.vertices.push(vertex);
        if n.is_some() {
            self.known.insert((corner, material), id);
        }
        return id;
    }
}

/// Unit cube centered at the origin, 12 triangles with per-face normals.
pub fn cube() -> Shape {
    let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
        // normal, u axis, v axis; u x v == normal so faces are counter-clockwise from outside.
        (vector![1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0], vector![0.0, 0.0, 1.0]),
        (vector![-1.0, 0.0, 0.0], vector![0.0, 0.0, 1.0], vector![0.0, 1.0, 0.0]),
        (vector![0.0, 1.0, 0.0], vector![0.0, 0.0, 1.0], vector![1.0, 0.0, 0.0]),
        (vector![0.0, -1.0, 0.0], vector![1.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]),
        (vector![0.0, 0.0, 1.0], vector![1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0]),
        (vector![0.0, 0.0, -1.0], vector![0.0, 1.0, 0.0], vector![1.0, 0.0, 0.0]),
    ];
    let mut shape = Shape::default();
    for (normal, u, v) in faces.iter() {
        let base = shape.vertices.len() as u32;
        let center = normal * 0.5;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            shape.vertices.push(SceneVertex::new(center + u * su + v * sv, *normal));
        }
        shape.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    return shape;
}
