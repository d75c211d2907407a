use nalgebra::{matrix, point, vector, Matrix4, Point3, Vector3};

/// Perspective camera. Right-handed, looks along -z in view space, NDC depth is in [-1, 1]
/// with -1 on the near plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov_y: f32, // Vertical field of view in radians.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>, aspect: f32) -> Self {
        return Self {
            position,
            target,
            up: Vector3::y(),
            fov_y: 60.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        };
    }

    /// Camera looking at the center of the bounds from above and to the right, with the whole
    /// bounding sphere in view.
    pub fn framing(bounds: (Point3<f32>, Point3<f32>), aspect: f32) -> Self {
        let (min, max) = bounds;
        let center = point![(min.x + max.x) / 2.0, (min.y + max.y) / 2.0, (min.z + max.z) / 2.0];
        let radius = ((max - min).norm() / 2.0).max(1e-3);
        let mut camera = Self::new(center, center, aspect);
        let fov = camera.fov_y.min(camera.fov_y * aspect);
        let distance = 1.1 * radius / (fov / 2.0).sin();
        camera.position = center + vector![0.5, 0.5, 1.0].normalize() * distance;
        camera.near = (distance - radius * 1.5).max(distance * 0.01);
        camera.far = distance + radius * 1.5;
        return camera;
    }

    /// World to view transform.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        // New coordinate system x, y, z around camera position.
        let new_z = (self.position - self.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);
        let new_y = (self.up - new_z.dot(&self.up) * new_z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| new_z.cross(&Vector3::x()).normalize());
        let new_x = new_y.cross(&new_z).normalize();
        let rotation = matrix![new_x.x, new_x.y, new_x.z, 0.0;
                               new_y.x, new_y.y, new_y.z, 0.0;
                               new_z.x, new_z.y, new_z.z, 0.0;
                               0.0,     0.0,     0.0,     1.0];
        let p = self.position;
        let translation = matrix![1.0, 0.0, 0.0, -p.x;
                                  0.0, 1.0, 0.0, -p.y;
                                  0.0, 0.0, 1.0, -p.z;
                                  0.0, 0.0, 0.0, 1.0];
        return rotation * translation;
    }

    /// View to clip space transform.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let f = 1.0 / (self.fov_y / 2.0).tan();
        let (n, far) = (self.near, self.far);
        return matrix![f / self.aspect, 0.0, 0.0,                    0.0;
                       0.0,             f,   0.0,                    0.0;
                       0.0,             0.0, (far + n) / (n - far),  2.0 * far * n / (n - far);
                       0.0,             0.0, -1.0,                   0.0];
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        return self.projection_matrix() * self.view_matrix();
    }
}
