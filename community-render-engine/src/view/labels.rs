//! On-canvas annotations derived by the reconciler.

use super::readings::FloorDetail;
use crate::engine::scene::naming::MonitorKind;
use bevy::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorLabel {
    pub name: String,
    pub position: [f32; 3],
    #[serde(rename = "type")]
    pub kind: MonitorKind,
}

/// Clickable building marker shown at its roof in floor mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingLabel {
    pub name: String,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorLabel {
    pub name: String,
    pub position: [f32; 3],
    pub detail: FloorDetail,
}

/// Replacement instructions for each label group; `None` leaves a group untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelUpdate {
    pub monitors: Option<Vec<MonitorLabel>>,
    pub buildings: Option<Vec<BuildingLabel>>,
    pub floors: Option<Vec<FloorLabel>>,
}

impl LabelUpdate {
    /// Replace every group, clearing the ones not given.
    pub fn reset() -> Self {
        Self {
            monitors: Some(Vec::new()),
            buildings: Some(Vec::new()),
            floors: Some(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_none() && self.buildings.is_none() && self.floors.is_none()
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct SceneLabels {
    pub monitors: Vec<MonitorLabel>,
    pub buildings: Vec<BuildingLabel>,
    pub floors: Vec<FloorLabel>,
}

impl SceneLabels {
    pub fn apply(&mut self, update: LabelUpdate) {
        if let Some(monitors) = update.monitors {
            self.monitors = monitors;
        }
        if let Some(buildings) = update.buildings {
            self.buildings = buildings;
        }
        if let Some(floors) = update.floors {
            self.floors = floors;
        }
    }

    /// Every label with its world anchor, in draw order.
    pub fn anchors(&self) -> Vec<LabelAnchor> {
        let monitors = self.monitors.iter().map(|l| LabelAnchor {
            text: l.name.clone(),
            position: Vec3::from_array(l.position),
            target: LabelTarget::Monitor,
        });
        let buildings = self.buildings.iter().map(|l| LabelAnchor {
            text: l.name.clone(),
            position: Vec3::from_array(l.position),
            target: LabelTarget::Building(l.name.clone()),
        });
        let floors = self.floors.iter().map(|l| LabelAnchor {
            text: format!(
                "{}  {}%  {:.1}°C  {}",
                l.name, l.detail.occupancy_percent, l.detail.temperature_c, l.detail.status
            ),
            position: Vec3::from_array(l.position),
            target: LabelTarget::Floor(l.name.clone()),
        });
        monitors.chain(buildings).chain(floors).collect()
    }
}

/// What clicking a label selects.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelTarget {
    Monitor,
    Building(String),
    Floor(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    pub text: String,
    pub position: Vec3,
    pub target: LabelTarget,
}
