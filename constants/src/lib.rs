//! Fixed tuning values shared by the community viewer.
//!
//! Camera framing per mode, animation timings, the naming convention of the
//! community model asset and the override material palette.

pub mod camera_presets;
pub mod palette;
pub mod scene_naming;
