use bevy::math::Vec3;

/// Camera position and orbit target pair used when entering a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPreset {
    pub position: Vec3,
    pub target: Vec3,
}

pub const DEFAULT_VIEW: CameraPreset = CameraPreset {
    position: Vec3::new(68.0, 27.0, 47.0),
    target: Vec3::new(-9.94, 1.36, 3.18),
};

pub const WATER_VIEW: CameraPreset = CameraPreset {
    position: Vec3::new(5.14, 6.98, 1.84),
    target: Vec3::new(11.71, -0.78, 12.35),
};

pub const ELECTRIC_VIEW: CameraPreset = CameraPreset {
    position: Vec3::new(17.05, 5.51, 19.18),
    target: Vec3::new(5.68, 1.39, 4.69),
};

pub const FLOOR_VIEW: CameraPreset = CameraPreset {
    position: Vec3::new(18.31, 41.48, 32.01),
    target: Vec3::new(17.38, -3.54, 1.71),
};

/// Offset from a building's world position when it gets selected.
pub const BUILDING_SHOT_OFFSET: Vec3 = Vec3::new(10.0, 20.0, 10.0);
/// Offset from a building's world position for the whole-building layer.
pub const WHOLE_BUILDING_SHOT_OFFSET: Vec3 = Vec3::new(40.0, 50.0, 40.0);
/// Offset from the selected floor's world position.
pub const FLOOR_SHOT_OFFSET: Vec3 = Vec3::new(25.0, 15.0, 25.0);

pub const DEFAULT_FLIGHT_SECS: f32 = 1.5;
pub const FLOOR_FLIGHT_SECS: f32 = 1.2;
pub const FLOOR_MOVE_SECS: f32 = 0.8;
pub const SETTLE_MOVE_SECS: f32 = 0.5;

/// Vertical lift applied to monitor labels above the mesh centre.
pub const MONITOR_LABEL_LIFT: f32 = 0.5;

pub const FLAT_FLOOR_OFFSET_UNIT: f32 = 25.0;
pub const STEPPED_FLOOR_OFFSET_UNIT: f32 = 30.0;

pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 100.0;
pub const ORBIT_MAX_POLAR: f32 = std::f32::consts::FRAC_PI_2;
