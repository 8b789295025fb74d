use glam::{Mat4, Vec3};

/// Pinhole camera. The rasterizer consumes the view/projection matrices,
/// the ray tracer the position and forward/right/up basis.
#[derive(Debug, Clone)]
pub struct Camera {
    width: f32,
    height: f32,
    position: Vec3,
    /// Azimuth, radians.
    phi: f32,
    /// Elevation, radians.
    theta: f32,
    /// Vertical field of view, radians.
    angle_of_view: f32,
    z_near: f32,
    z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            position: Vec3::ZERO,
            phi: 0.0,
            theta: 0.0,
            angle_of_view: std::f32::consts::FRAC_PI_3,
            z_near: 0.001,
            z_far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Azimuth in degrees.
    pub fn set_phi(&mut self, degrees: f32) {
        self.phi = degrees.to_radians();
    }

    /// Elevation in degrees.
    pub fn set_theta(&mut self, degrees: f32) {
        self.theta = degrees.to_radians();
    }

    /// Vertical field of view in degrees.
    pub fn set_angle_of_view(&mut self, degrees: f32) {
        self.angle_of_view = degrees.to_radians();
    }

    pub fn set_z_near(&mut self, z_near: f32) {
        self.z_near = z_near;
    }

    pub fn set_z_far(&mut self, z_far: f32) {
        self.z_far = z_far;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.phi.sin() * self.theta.cos(),
            self.theta.sin(),
            -self.phi.cos() * self.theta.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction()).normalize()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    pub fn angle_of_view(&self) -> f32 {
        self.angle_of_view
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.angle_of_view,
            self.aspect_ratio(),
            self.z_near,
            self.z_far,
        )
    }
}
