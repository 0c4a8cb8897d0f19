//! Mode and selection state for the viewer.
//!
//! All mutation goes through [`ViewStore::reduce`]: old state plus an action gives the
//! new state. Cross-field resets live here and nowhere else.

use crate::engine::scene::naming::MonitorKind;
use bevy::prelude::*;
use constants::scene_naming::WHOLE_BUILDING;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Default,
    Water,
    Electric,
    Floor,
}

impl ViewMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "water" => Some(Self::Water),
            "electric" => Some(Self::Electric),
            "floor" => Some(Self::Floor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Floor => "floor",
        }
    }

    /// Monitoring domain highlighted by this mode, if any.
    pub fn monitor_kind(self) -> Option<MonitorKind> {
        match self {
            Self::Water => Some(MonitorKind::Water),
            Self::Electric => Some(MonitorKind::Electric),
            Self::Default | Self::Floor => None,
        }
    }
}

/// Floor selection inside a building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    #[default]
    WholeBuilding,
    Floor(String),
}

impl Layer {
    pub fn parse(name: &str) -> Self {
        if name == WHOLE_BUILDING {
            Self::WholeBuilding
        } else {
            Self::Floor(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::WholeBuilding => WHOLE_BUILDING,
            Self::Floor(name) => name,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Layer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Layer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Monitor-point details shown next to the pointer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TooltipData {
    pub show: bool,
    /// Building name (grandparent of the clicked mesh).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    /// `value` is above the alarm threshold for its kind.
    pub abnormal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
}

impl TooltipData {
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Monitor point opened in the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveMonitor {
    pub id: String,
    pub name: String,
    pub kind: MonitorKind,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetMode(ViewMode),
    SetCurrentBuilding(Option<String>),
    SetCurrentLayer(Layer),
    SetBuildingLayers(Vec<String>),
    SetTooltip(TooltipData),
    SetActiveMonitor(Option<ActiveMonitor>),
    AddSelectedObject(Entity),
    ClearSelectedObjects,
}

#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct ViewStore {
    mode: ViewMode,
    current_building: Option<String>,
    current_layer: Layer,
    building_layers: Vec<String>,
    tooltip: TooltipData,
    active_monitor: Option<ActiveMonitor>,
    selected_objects: Vec<Entity>,
}

impl ViewStore {
    pub fn reduce(mut self, action: StoreAction) -> Self {
        match action {
            StoreAction::SetMode(mode) => {
                self.mode = mode;
                self.current_building = None;
                self.current_layer = Layer::WholeBuilding;
                self.building_layers.clear();
                self.tooltip = TooltipData::hidden();
                self.active_monitor = None;
                self.selected_objects.clear();
            }
            StoreAction::SetCurrentBuilding(name) => {
                if name.is_none() {
                    self.building_layers.clear();
                    self.current_layer = Layer::WholeBuilding;
                }
                self.current_building = name;
            }
            StoreAction::SetCurrentLayer(layer) => self.current_layer = layer,
            StoreAction::SetBuildingLayers(layers) => self.building_layers = layers,
            StoreAction::SetTooltip(tooltip) => self.tooltip = tooltip,
            StoreAction::SetActiveMonitor(monitor) => self.active_monitor = monitor,
            StoreAction::AddSelectedObject(entity) => {
                if !self.selected_objects.contains(&entity) {
                    self.selected_objects.push(entity);
                }
            }
            StoreAction::ClearSelectedObjects => self.selected_objects.clear(),
        }
        self
    }

    /// Apply an action in place.
    pub fn dispatch(&mut self, action: StoreAction) {
        *self = std::mem::take(self).reduce(action);
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn current_building(&self) -> Option<&str> {
        self.current_building.as_deref()
    }

    pub fn current_layer(&self) -> &Layer {
        &self.current_layer
    }

    pub fn building_layers(&self) -> &[String] {
        &self.building_layers
    }

    pub fn tooltip(&self) -> &TooltipData {
        &self.tooltip
    }

    pub fn active_monitor(&self) -> Option<&ActiveMonitor> {
        self.active_monitor.as_ref()
    }

    pub fn selected_objects(&self) -> &[Entity] {
        &self.selected_objects
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            mode: self.mode,
            current_building: self.current_building.clone(),
            current_layer: self.current_layer.clone(),
            building_layers: self.building_layers.clone(),
            tooltip: self.tooltip.clone(),
            active_monitor: self.active_monitor.clone(),
            selected_objects: self.selected_objects.iter().map(|e| e.to_bits()).collect(),
        }
    }
}

/// Serializable view of the store for the front-end.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub mode: ViewMode,
    pub current_building: Option<String>,
    pub current_layer: Layer,
    pub building_layers: Vec<String>,
    pub tooltip: TooltipData,
    pub active_monitor: Option<ActiveMonitor>,
    pub selected_objects: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> ViewStore {
        ViewStore::default()
            .reduce(StoreAction::SetMode(ViewMode::Floor))
            .reduce(StoreAction::SetCurrentBuilding(Some("1号楼".into())))
            .reduce(StoreAction::SetBuildingLayers(vec![
                WHOLE_BUILDING.into(),
                "1F".into(),
            ]))
            .reduce(StoreAction::SetCurrentLayer(Layer::parse("1F")))
            .reduce(StoreAction::AddSelectedObject(Entity::from_raw(3)))
            .reduce(StoreAction::SetActiveMonitor(Some(ActiveMonitor {
                id: "3".into(),
                name: "水管".into(),
                kind: MonitorKind::Water,
                value: 20.0,
            })))
    }

    #[test]
    fn entering_a_mode_resets_dependent_fields() {
        let store = populated().reduce(StoreAction::SetMode(ViewMode::Water));
        assert_eq!(store.mode(), ViewMode::Water);
        assert_eq!(store.current_building(), None);
        assert_eq!(store.current_layer(), &Layer::WholeBuilding);
        assert!(store.building_layers().is_empty());
        assert!(store.active_monitor().is_none());
        assert!(store.selected_objects().is_empty());
        assert!(!store.tooltip().show);
    }

    #[test]
    fn deselecting_building_clears_layers() {
        let store = populated().reduce(StoreAction::SetCurrentBuilding(None));
        assert!(store.building_layers().is_empty());
        assert_eq!(store.current_layer(), &Layer::WholeBuilding);
        assert_eq!(store.mode(), ViewMode::Floor);
    }

    #[test]
    fn selected_objects_have_set_semantics() {
        let mut store = ViewStore::default();
        store.dispatch(StoreAction::AddSelectedObject(Entity::from_raw(1)));
        store.dispatch(StoreAction::AddSelectedObject(Entity::from_raw(1)));
        store.dispatch(StoreAction::AddSelectedObject(Entity::from_raw(2)));
        assert_eq!(store.selected_objects().len(), 2);
        store.dispatch(StoreAction::ClearSelectedObjects);
        assert!(store.selected_objects().is_empty());
    }

    #[test]
    fn layer_sentinel_parses_and_serializes() {
        assert_eq!(Layer::parse("全楼"), Layer::WholeBuilding);
        assert_eq!(Layer::parse("3F"), Layer::Floor("3F".into()));
        assert_eq!(
            serde_json::to_value(Layer::WholeBuilding).unwrap(),
            serde_json::json!("全楼")
        );
    }
}
