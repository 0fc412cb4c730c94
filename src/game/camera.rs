use super::state::{Camera, Position};

/// Integer grid bounds of what is visible, padded by one cell on each side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub width: i32,
    pub height: i32,
}

/// Follows the head with frame-rate independent exponential smoothing
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    viewport_width: f32,
    viewport_height: f32,
    smoothing: f32,
    reference_fps: f32,
    target: Camera,
}

impl CameraController {
    pub const MIN_SMOOTHING: f32 = 0.05;
    pub const MAX_SMOOTHING: f32 = 0.5;

    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        smoothing: f32,
        reference_fps: f32,
    ) -> Self {
        Self {
            viewport_width: viewport_width as f32,
            viewport_height: viewport_height as f32,
            smoothing,
            reference_fps,
            target: Camera::default(),
        }
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_width = width.max(1) as f32;
        self.viewport_height = height.max(1) as f32;
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Adjust responsiveness, clamped to a playable range
    pub fn set_smoothing(&mut self, factor: f32) {
        self.smoothing = factor.clamp(Self::MIN_SMOOTHING, Self::MAX_SMOOTHING);
    }

    pub fn target(&self) -> Camera {
        self.target
    }

    /// Largest camera coordinate that keeps the viewport inside the world
    fn max_offset(&self, world_width: u32, world_height: u32) -> (f32, f32) {
        (
            (world_width as f32 - self.viewport_width).max(0.0),
            (world_height as f32 - self.viewport_height).max(0.0),
        )
    }

    /// Pull a camera back inside the world
    pub fn clamp_to_world(&self, camera: Camera, world_width: u32, world_height: u32) -> Camera {
        let (max_x, max_y) = self.max_offset(world_width, world_height);
        Camera {
            x: camera.x.clamp(0.0, max_x),
            y: camera.y.clamp(0.0, max_y),
        }
    }

    /// Camera that centers `head`, clamped to the world
    pub fn target_for(&self, head: Position, world_width: u32, world_height: u32) -> Camera {
        self.clamp_to_world(
            Camera {
                x: head.x - self.viewport_width / 2.0,
                y: head.y - self.viewport_height / 2.0,
            },
            world_width,
            world_height,
        )
    }

    /// Per-tick interpolation fraction for a tick of `delta_ms`
    pub fn blend_fraction(&self, delta_ms: f32) -> f32 {
        let fps = 1000.0 / delta_ms.max(1.0);
        1.0 - (1.0 - self.smoothing).powf(self.reference_fps / fps)
    }

    /// Jump straight to the target, used when a game starts
    pub fn snap(&mut self, head: Position, world_width: u32, world_height: u32) -> Camera {
        self.target = self.target_for(head, world_width, world_height);
        self.target
    }

    /// Move `current` toward the head by one smoothed step
    pub fn follow(
        &mut self,
        current: Camera,
        head: Position,
        delta_ms: f32,
        world_width: u32,
        world_height: u32,
    ) -> Camera {
        self.target = self.target_for(head, world_width, world_height);
        let t = self.blend_fraction(delta_ms);
        let next = Camera {
            x: current.x + (self.target.x - current.x) * t,
            y: current.y + (self.target.y - current.y) * t,
        };
        self.clamp_to_world(next, world_width, world_height)
    }

    /// Render bounds for the given camera
    pub fn bounds(&self, camera: Camera, world_width: u32, world_height: u32) -> ViewportBounds {
        let left = (camera.x.floor() as i32 - 1).max(0);
        let top = (camera.y.floor() as i32 - 1).max(0);
        let right = ((camera.x + self.viewport_width).ceil() as i32 + 1).min(world_width as i32);
        let bottom = ((camera.y + self.viewport_height).ceil() as i32 + 1).min(world_height as i32);
        ViewportBounds {
            left,
            top,
            right,
            bottom,
            width: right - left,
            height: bottom - top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(20, 30, 0.1, 60.0)
    }

    #[test]
    fn test_target_centers_head() {
        let camera = controller();
        let target = camera.target_for(Position::new(40.0, 60.0), 80, 120);
        assert_eq!(target, Camera { x: 30.0, y: 45.0 });
    }

    #[test]
    fn test_target_is_clamped() {
        let camera = controller();
        assert_eq!(
            camera.target_for(Position::new(1.0, 1.0), 80, 120),
            Camera { x: 0.0, y: 0.0 }
        );
        assert_eq!(
            camera.target_for(Position::new(79.0, 119.0), 80, 120),
            Camera { x: 60.0, y: 90.0 }
        );
    }

    #[test]
    fn test_world_smaller_than_viewport_pins_to_origin() {
        let camera = controller();
        let target = camera.target_for(Position::new(5.0, 5.0), 10, 10);
        assert_eq!(target, Camera { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_blend_fraction_matches_reference_rate() {
        let camera = controller();
        let at_reference = camera.blend_fraction(1000.0 / 60.0);
        assert!((at_reference - 0.1).abs() < 1e-4);

        // Two half-length ticks must cover the same ground as one full tick
        let half = camera.blend_fraction(1000.0 / 120.0);
        let combined = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((combined - at_reference).abs() < 1e-4);
    }

    #[test]
    fn test_follow_moves_toward_target() {
        let mut camera = controller();
        let start = Camera { x: 0.0, y: 0.0 };
        let next = camera.follow(start, Position::new(40.0, 60.0), 1000.0 / 60.0, 80, 120);
        assert!((next.x - 3.0).abs() < 1e-3);
        assert!((next.y - 4.5).abs() < 1e-3);
        assert_eq!(camera.target(), Camera { x: 30.0, y: 45.0 });
    }

    #[test]
    fn test_follow_clamps_out_of_range_camera() {
        let mut camera = controller();
        let start = Camera { x: 500.0, y: -4.0 };
        let next = camera.follow(start, Position::new(40.0, 60.0), 16.0, 80, 120);
        assert!(next.x <= 60.0 && next.x >= 0.0);
        assert!(next.y <= 90.0 && next.y >= 0.0);
    }

    #[test]
    fn test_smoothing_is_clamped() {
        let mut camera = controller();
        camera.set_smoothing(0.9);
        assert_eq!(camera.smoothing(), CameraController::MAX_SMOOTHING);
        camera.set_smoothing(0.0);
        assert_eq!(camera.smoothing(), CameraController::MIN_SMOOTHING);
    }

    #[test]
    fn test_bounds_are_padded_and_clamped() {
        let camera = controller();
        let bounds = camera.bounds(Camera { x: 10.5, y: 0.0 }, 80, 120);
        assert_eq!(bounds.left, 9);
        assert_eq!(bounds.top, 0);
        assert_eq!(bounds.right, 32);
        assert_eq!(bounds.bottom, 31);
        assert_eq!(bounds.width, 23);

        let edge = camera.bounds(Camera { x: 60.0, y: 90.0 }, 80, 120);
        assert_eq!(edge.right, 80);
        assert_eq!(edge.bottom, 120);
    }
}
