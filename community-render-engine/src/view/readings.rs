//! Mocked telemetry for monitor points and floors.

use crate::engine::scene::naming::MonitorKind;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const WATER_FLOW_READING: f32 = 20.0;
pub const ELECTRIC_POWER_READING: f32 = 480.0;
/// Readings strictly above these are flagged abnormal.
pub const WATER_FLOW_ALARM: f32 = 15.0;
pub const ELECTRIC_POWER_ALARM: f32 = 400.0;
pub const FLOOR_STATUS_NORMAL: &str = "正常";

/// Random source for mocked readings; seeded in tests.
#[derive(Resource)]
pub struct ReadingSource(pub StdRng);

impl Default for ReadingSource {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl ReadingSource {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Instantaneous reading shown in the tooltip for a clicked monitor point.
pub fn monitor_reading(kind: MonitorKind) -> f32 {
    match kind {
        MonitorKind::Water => WATER_FLOW_READING,
        MonitorKind::Electric => ELECTRIC_POWER_READING,
    }
}

pub fn is_abnormal(kind: MonitorKind, value: f32) -> bool {
    let threshold = match kind {
        MonitorKind::Water => WATER_FLOW_ALARM,
        MonitorKind::Electric => ELECTRIC_POWER_ALARM,
    };
    value > threshold
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorDetail {
    pub occupancy_percent: u32,
    pub temperature_c: f32,
    pub status: String,
}

impl FloorDetail {
    pub fn sample(rng: &mut impl Rng) -> Self {
        let tenths: u32 = rng.gen_range(200..=250);
        Self {
            occupancy_percent: rng.gen_range(60..100),
            temperature_c: tenths as f32 / 10.0,
            status: FLOOR_STATUS_NORMAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub hour: String,
    pub value: u32,
}

/// Twenty-four hourly points for the monitor panel's trend chart.
pub fn daily_trend(kind: MonitorKind, rng: &mut impl Rng) -> Vec<TrendPoint> {
    let range = match kind {
        MonitorKind::Water => 5..35,
        MonitorKind::Electric => 100..600,
    };
    (0..24)
        .map(|hour| TrendPoint {
            hour: format!("{hour}:00"),
            value: rng.gen_range(range.clone()),
        })
        .collect()
}
