use glam::{Mat4, Quat, Vec3};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

const FIELD_OF_VIEW_DEGREES: f32 = 50.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 40.0;
/// Stop short of looking straight down or up.
const MAX_GAZE_DOT_UP: f32 = 0.98;
/// Degrees per pixel horizontally and vertically, distance per scroll pixel.
const SPEED: Vec3 = Vec3::new(0.5, 0.4, 0.01);
const LINE_SCROLL_PIXELS: f32 = 40.0;

pub const START_POSITION: Vec3 = Vec3::new(0.0, 1.0, 10.0);

/// A half-line from a point, used to find what the cursor is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Distance along the ray to an axis-aligned box, if it is hit in front
    /// of the origin.
    pub fn hit_box(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let inverse = self.direction.recip();
        let near = (min - self.origin) * inverse;
        let far = (max - self.origin) * inverse;
        let enter = near.min(far).max_element();
        let exit = near.max(far).min_element();
        (exit >= enter.max(0.0)).then_some(enter.max(0.0))
    }
}

pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    width: f32,
    height: f32,
    moving_mouse: PhysicalPosition<f64>,
    pressed_mouse: Option<PhysicalPosition<f64>>,
}

impl Camera {
    pub fn new(position: Vec3, width: f32, height: f32) -> Self {
        Self {
            position,
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            width: width.max(1.0),
            height: height.max(1.0),
            moving_mouse: PhysicalPosition::new(0.0, 0.0),
            pressed_mouse: None,
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn cursor(&self) -> PhysicalPosition<f64> {
        self.moving_mouse
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        self.pressed_mouse = match state {
            ElementState::Pressed => Some(self.moving_mouse),
            ElementState::Released => None,
        };
    }

    /// Orbits while the left button is held.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.moving_mouse = position;
        let Some(pressed) = self.pressed_mouse else {
            return;
        };
        let dx = (pressed.x - position.x) as f32 * SPEED.x;
        let dy = (position.y - pressed.y) as f32 * SPEED.y;
        self.orbit(dx.to_radians(), dy.to_radians());
        self.pressed_mouse = Some(position);
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, y) => y * LINE_SCROLL_PIXELS,
            MouseScrollDelta::PixelDelta(position) => position.y as f32,
        };
        self.zoom(pixels * SPEED.z);
    }

    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let arm = self.position - self.look_at;
        let arm = Quat::from_axis_angle(self.up, yaw) * arm;
        let right = self.up.cross(-arm).normalize_or_zero();
        let pitched = Quat::from_axis_angle(right, pitch) * arm;
        let arm = if pitched.normalize_or_zero().dot(self.up).abs() < MAX_GAZE_DOT_UP {
            pitched
        } else {
            arm
        };
        self.position = self.look_at + arm;
    }

    /// Moves toward the target by `amount`, within fixed limits.
    pub fn zoom(&mut self, amount: f32) {
        let arm = self.position - self.look_at;
        let distance = (arm.length() - amount).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.position = self.look_at + arm.normalize_or_zero() * distance;
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }

    pub fn mvp_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            FIELD_OF_VIEW_DEGREES.to_radians(),
            self.width / self.height,
            NEAR,
            FAR,
        )
    }

    /// The ray under a window position.
    pub fn pick_ray(&self, position: PhysicalPosition<f64>) -> Ray {
        let x = 2.0 * position.x as f32 / self.width - 1.0;
        let y = 1.0 - 2.0 * position.y as f32 / self.height;
        let inverse = self.mvp_matrix().inverse();
        let near = inverse.project_point3(Vec3::new(x, y, 0.0));
        let far = inverse.project_point3(Vec3::new(x, y, 1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Window position of a world point, `None` when behind the camera.
    pub fn screen_position(&self, point: Vec3) -> Option<[f32; 2]> {
        let clip = self.mvp_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some([
            (ndc.x * 0.5 + 0.5) * self.width,
            (-ndc.y * 0.5 + 0.5) * self.height,
        ])
    }
}
