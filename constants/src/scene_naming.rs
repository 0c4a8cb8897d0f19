//! Node naming convention of the community model.
//!
//! Hierarchy is building → floor (`<digits>F` or a roof marker) → meshes. Names that
//! match nothing are treated as ordinary scenery.

/// Layer sentinel meaning "show the whole building".
pub const WHOLE_BUILDING: &str = "全楼";

pub const ROOF_MARKERS: &[&str] = &["楼顶", "roof"];
pub const WATER_PIPE_MARKERS: &[&str] = &["水管", "pipe"];
pub const ELECTRIC_METER_MARKERS: &[&str] = &["电表", "meter"];
pub const VEHICLE_MARKERS: &[&str] = &["车", "Car"];

/// Pillars, floor slabs, windows and streetlight faces rendered on the glow layer.
pub const GLOW_MARKERS: &[&str] = &[
    "承重柱",
    "楼底面",
    "窗户",
    "楼片面",
    "路灯2灯面",
    "路灯灯面",
];

pub const GLOW_RENDER_LAYER: usize = 1;

pub const WATER_LABEL: &str = "水";
pub const ELECTRIC_LABEL: &str = "电";
