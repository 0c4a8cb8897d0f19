use super::director::{CameraDirector, CameraPose};
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::camera_presets::{
    DEFAULT_VIEW, ORBIT_MAX_DISTANCE, ORBIT_MAX_POLAR, ORBIT_MIN_DISTANCE,
};

/// Pointer travel (in pixels) below which a press-release counts as a click.
pub const CLICK_DRAG_TOLERANCE: f32 = 4.0;

// Keeps `looking_at` away from the degenerate straight-down view.
const MIN_POLAR: f32 = 0.01;

/// User-driven orbit camera around a target point.
///
/// Suspended while the [`CameraDirector`] animates; re-derived from the final pose
/// when a flight completes.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    /// Angle from the +Y axis, kept below `ORBIT_MAX_POLAR`.
    pub polar: f32,
    pub distance: f32,
    pub rotate_sensitivity: f32,
    pub damping: f32,
    /// Pointer travel since the left button went down.
    pub press_travel: f32,
}

impl OrbitCamera {
    pub fn from_pose(pose: CameraPose) -> Self {
        let mut orbit = Self {
            target: pose.target,
            yaw: 0.0,
            polar: 0.0,
            distance: ORBIT_MIN_DISTANCE,
            rotate_sensitivity: 0.005,
            damping: 12.0,
            press_travel: 0.0,
        };
        orbit.sync_to_pose(pose);
        orbit
    }

    /// Re-derive spherical coordinates from an externally set pose.
    pub fn sync_to_pose(&mut self, pose: CameraPose) {
        let offset = pose.position - pose.target;
        let length = offset.length();
        self.target = pose.target;
        if length <= f32::EPSILON {
            return;
        }
        self.distance = length.clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        self.polar = (offset.y / length).clamp(-1.0, 1.0).acos().clamp(MIN_POLAR, ORBIT_MAX_POLAR);
        self.yaw = offset.x.atan2(offset.z);
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target
            + Vec3::new(sin_polar * sin_yaw, cos_polar, sin_polar * cos_yaw) * self.distance
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position(),
            target: self.target,
        }
    }

    fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.rotate_sensitivity;
        self.polar =
            (self.polar - delta.y * self.rotate_sensitivity).clamp(MIN_POLAR, ORBIT_MAX_POLAR);
    }

    fn pan(&mut self, delta: Vec2, rotation: Quat) {
        let speed = self.distance * 0.0015;
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        self.target += (-right * delta.x + up * delta.y) * speed;
    }

    fn zoom(&mut self, amount: f32) {
        self.distance =
            (self.distance * (1.0 - amount * 0.1)).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_pose(CameraPose {
            position: DEFAULT_VIEW.position,
            target: DEFAULT_VIEW.target,
        })
    }
}

pub fn orbit_camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    director: Res<CameraDirector>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        orbit.press_travel = 0.0;
    }
    if mouse_button.pressed(MouseButton::Left) {
        orbit.press_travel += mouse_delta.length();
    }

    // The director owns the camera during a flight.
    if !director.input_enabled() {
        return;
    }
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        orbit.rotate(mouse_delta);
    }
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let rotation = camera_transform.rotation;
        orbit.pan(mouse_delta, rotation);
    }
    if scroll_accum.abs() > f32::EPSILON {
        orbit.zoom(scroll_accum);
    }

    let target_pos = orbit.position();
    let target_rot = Transform::from_translation(target_pos)
        .looking_at(orbit.target, Vec3::Y)
        .rotation;

    let lerp_speed = (orbit.damping * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target_pos, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target_rot, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_round_trips_through_spherical_coordinates() {
        let pose = CameraPose {
            position: Vec3::new(18.31, 41.48, 32.01),
            target: Vec3::new(17.38, -3.54, 1.71),
        };
        let orbit = OrbitCamera::from_pose(pose);
        assert!(orbit.position().distance(pose.position) < 1e-3);
    }

    #[test]
    fn distance_and_polar_are_clamped() {
        let mut orbit = OrbitCamera::from_pose(CameraPose {
            position: Vec3::new(0.0, 500.0, 0.0),
            target: Vec3::ZERO,
        });
        assert_eq!(orbit.distance, ORBIT_MAX_DISTANCE);

        orbit.rotate(Vec2::new(0.0, -10_000.0));
        assert!(orbit.polar <= ORBIT_MAX_POLAR);
        orbit.zoom(100.0);
        assert_eq!(orbit.distance, ORBIT_MIN_DISTANCE);
    }
}
