//! Camera control for the community scene.
//!
//! A fly-to director animates between framed shots; an orbit controller handles user
//! input whenever no flight is running.

/// Generation-counted fly-to state machine.
pub mod director;

/// Mouse-driven orbit controller with distance and polar limits.
pub mod orbit_camera;

use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use director::CameraDirector;
use orbit_camera::OrbitCamera;

/// Drive the active flight onto the camera; hand control back to the orbit on completion,
/// then run the flight's callback.
pub fn drive_camera_flight(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut director: ResMut<CameraDirector>,
    mut orbit: ResMut<OrbitCamera>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    time: Res<Time>,
) {
    let Some(step) = director.advance(time.delta_secs()) else {
        return;
    };
    if let Ok(mut camera_transform) = camera_query.single_mut() {
        *camera_transform =
            Transform::from_translation(step.pose.position).looking_at(step.pose.target, Vec3::Y);
    }
    orbit.target = step.pose.target;

    if step.finished {
        orbit.sync_to_pose(step.pose);
        rpc_interface.send_notification(
            "camera_flight_completed",
            serde_json::json!({
                "generation": step.generation,
                "position": step.pose.position.to_array(),
                "target": step.pose.target.to_array(),
            }),
        );
        step.complete();
    }
}
