//! Derives materials, floor positions, labels and camera shots from view state.
//!
//! Planners are pure over the [`SceneGraph`]; the returned [`ScenePlan`] is applied to
//! entities by `view::commands::apply_scene_plan`.

use super::labels::{BuildingLabel, FloorLabel, LabelUpdate, MonitorLabel};
use super::readings::FloorDetail;
use super::store::{Layer, ViewMode};
use crate::engine::camera::director::CameraShot;
use crate::engine::config::{FloorOffset, ViewerConfig};
use crate::engine::scene::graph::{NodeId, SceneGraph};
use crate::engine::scene::materials::{MaterialLedger, MaterialSlot};
use crate::engine::scene::naming::{MonitorKind, floor_number, is_roof};
use bevy::prelude::*;
use constants::camera_presets::*;
use constants::scene_naming::WHOLE_BUILDING;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionTarget {
    pub node: NodeId,
    pub target: Vec3,
    pub duration: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePlan {
    /// Reset every overridden mesh before applying `materials`.
    pub restore_all: bool,
    pub materials: Vec<(NodeId, MaterialSlot)>,
    pub moves: Vec<PositionTarget>,
    pub labels: LabelUpdate,
    pub camera: Option<CameraShot>,
    pub building_layers: Option<Vec<String>>,
}

impl ScenePlan {
    /// Record planned positions in the arena so later world-space queries see them.
    pub fn commit_positions(&self, graph: &mut SceneGraph) {
        for movement in &self.moves {
            graph.set_position(movement.node, movement.target);
        }
    }

    /// Update the ledger and return every (node, slot) that must be pushed to entities.
    pub fn commit_materials<M>(&self, ledger: &mut MaterialLedger<M>) -> Vec<(NodeId, MaterialSlot)> {
        let mut changes = Vec::new();
        if self.restore_all {
            changes.extend(
                ledger
                    .restore_all()
                    .into_iter()
                    .map(|node| (node, MaterialSlot::Original)),
            );
        }
        for &(node, slot) in &self.materials {
            ledger.assign(node, slot);
            changes.push((node, slot));
        }
        changes
    }

    fn merge(&mut self, other: ScenePlan) {
        self.restore_all |= other.restore_all;
        self.materials.extend(other.materials);
        self.moves.extend(other.moves);
        if other.labels.monitors.is_some() {
            self.labels.monitors = other.labels.monitors;
        }
        if other.labels.buildings.is_some() {
            self.labels.buildings = other.labels.buildings;
        }
        if other.labels.floors.is_some() {
            self.labels.floors = other.labels.floors;
        }
        if other.camera.is_some() {
            self.camera = other.camera;
        }
        if other.building_layers.is_some() {
            self.building_layers = other.building_layers;
        }
    }
}

/// Tunables the planners read from the viewer config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileSettings {
    pub floor_offset: FloorOffset,
    pub flight_seconds: f32,
    pub settle_seconds: f32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for ReconcileSettings {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            floor_offset: config.floor_offset,
            flight_seconds: config.flight_seconds,
            settle_seconds: config.settle_seconds,
        }
    }
}

/// Plan for entering `mode`: materials, labels, settled positions and the mode's framing.
pub fn plan_mode_entry(graph: &SceneGraph, mode: ViewMode, settings: &ReconcileSettings) -> ScenePlan {
    let preset = match mode {
        ViewMode::Default => DEFAULT_VIEW,
        ViewMode::Water => WATER_VIEW,
        ViewMode::Electric => ELECTRIC_VIEW,
        ViewMode::Floor => FLOOR_VIEW,
    };

    let mut plan = ScenePlan {
        moves: settle_displaced(graph, settings.settle_seconds),
        labels: LabelUpdate::reset(),
        camera: Some(CameraShot::new(
            preset.position,
            preset.target,
            settings.flight_seconds,
        )),
        ..default()
    };

    match mode.monitor_kind() {
        Some(kind) => {
            let (materials, labels) = plan_monitors(graph, kind);
            plan.materials = materials;
            plan.labels.monitors = Some(labels);
        }
        None => {
            plan.restore_all = true;
            if mode == ViewMode::Floor {
                plan.labels.buildings = Some(building_labels(graph));
            }
        }
    }
    plan
}

/// Highlight every mesh of `kind`, make the rest translucent, and label each target.
fn plan_monitors(
    graph: &SceneGraph,
    kind: MonitorKind,
) -> (Vec<(NodeId, MaterialSlot)>, Vec<MonitorLabel>) {
    let mut materials = Vec::new();
    let mut labels = Vec::new();

    for (id, node) in graph.meshes() {
        if !kind.matches(&node.name) {
            materials.push((id, MaterialSlot::Translucent));
            continue;
        }
        materials.push((id, MaterialSlot::Highlight(kind)));

        let center = graph
            .world_bounds_center(id)
            .unwrap_or_else(|| graph.world_position(id));
        labels.push(MonitorLabel {
            name: node.name.clone(),
            position: (center + Vec3::Y * MONITOR_LABEL_LIFT).to_array(),
            kind,
        });
    }
    (materials, labels)
}

/// One label per roof-marked node, named after the roof's parent.
pub fn building_labels(graph: &SceneGraph) -> Vec<BuildingLabel> {
    graph
        .nodes()
        .filter(|(_, node)| is_roof(&node.name))
        .filter_map(|(id, _)| {
            let parent = graph.parent(id)?;
            Some(BuildingLabel {
                name: graph.node(parent).name.clone(),
                position: graph.world_position(id).to_array(),
            })
        })
        .collect()
}

/// Return every displaced node to its initial position.
pub fn settle_displaced(graph: &SceneGraph, duration: f32) -> Vec<PositionTarget> {
    graph
        .nodes()
        .filter(|(_, node)| node.is_displaced())
        .map(|(id, node)| PositionTarget {
            node: id,
            target: node.initial_position,
            duration,
        })
        .collect()
}

/// Floor names of a building's direct children, numerically sorted, sentinel first.
pub fn building_layers(graph: &SceneGraph, building: NodeId) -> Vec<String> {
    let mut floors: Vec<(u32, String)> = graph
        .children(building)
        .iter()
        .filter_map(|&child| {
            let name = &graph.node(child).name;
            floor_number(name).map(|number| (number, name.clone()))
        })
        .collect();
    floors.sort_by_key(|(number, _)| *number);

    std::iter::once(WHOLE_BUILDING.to_string())
        .chain(floors.into_iter().map(|(_, name)| name))
        .collect()
}

/// Focus one building: everything else goes translucent and its floors reassemble.
///
/// Returns `None` when no node carries `name`; nothing should change in that case.
pub fn plan_building_selection(
    graph: &SceneGraph,
    name: &str,
    settings: &ReconcileSettings,
    rng: &mut impl Rng,
) -> Option<ScenePlan> {
    let building = graph.find_by_name(name)?;

    let materials = graph
        .meshes()
        .map(|(id, _)| {
            let slot = if graph.belongs_to(id, building) {
                MaterialSlot::Original
            } else {
                MaterialSlot::Translucent
            };
            (id, slot)
        })
        .collect();

    // Floors of a previously selected building go home; the layout below wins for this one.
    let mut plan = ScenePlan {
        materials,
        moves: settle_displaced(graph, settings.settle_seconds),
        building_layers: Some(building_layers(graph, building)),
        labels: LabelUpdate {
            buildings: Some(Vec::new()),
            ..default()
        },
        ..default()
    };

    // The building shot frames the selection; the layout's own shot is not used.
    let mut layout = plan_floor_layout(graph, building, &Layer::WholeBuilding, settings, rng);
    layout.camera = None;
    plan.merge(layout);

    plan.camera = Some(CameraShot::offset_from(
        graph.world_position(building),
        BUILDING_SHOT_OFFSET,
        settings.flight_seconds,
    ));
    Some(plan)
}

/// Leave the selected building and return to the floor-mode overview.
pub fn plan_building_release(graph: &SceneGraph, settings: &ReconcileSettings) -> ScenePlan {
    ScenePlan {
        restore_all: true,
        moves: settle_displaced(graph, settings.settle_seconds),
        labels: LabelUpdate {
            buildings: Some(building_labels(graph)),
            floors: Some(Vec::new()),
            ..default()
        },
        camera: Some(CameraShot::new(
            FLOOR_VIEW.position,
            FLOOR_VIEW.target,
            settings.flight_seconds,
        )),
        ..default()
    }
}

/// Explode view for `layer` inside `building`.
///
/// Floors above the selected one are lifted, the selected floor keeps its original
/// material and gets a detail label, and every other floor is dimmed. A layer name
/// without a floor number lifts nothing and labels nothing.
pub fn plan_floor_layout(
    graph: &SceneGraph,
    building: NodeId,
    layer: &Layer,
    settings: &ReconcileSettings,
    rng: &mut impl Rng,
) -> ScenePlan {
    let children = graph.children(building);
    let building_matrix = graph.world_matrix(building);
    let mut plan = ScenePlan::default();
    let mut labels = Vec::new();

    let target = match layer {
        Layer::WholeBuilding => None,
        Layer::Floor(name) => floor_number(name),
    };
    let max_floor = children
        .iter()
        .filter_map(|&child| graph.node(child).floor_number())
        .max()
        .unwrap_or(0);

    for &child in children {
        let node = graph.node(child);
        if !node.is_mesh() {
            continue;
        }
        let initial = node.initial_position;
        let floor = node.floor_number();

        if *layer == Layer::WholeBuilding {
            plan.materials.push((child, MaterialSlot::Original));
            plan.moves.push(PositionTarget {
                node: child,
                target: initial,
                duration: FLOOR_MOVE_SECS,
            });
            continue;
        }

        let level = if is_roof(&node.name) {
            Some(max_floor + 1)
        } else {
            floor
        };
        let floors_above = match (level, target) {
            (Some(level), Some(target)) => level.saturating_sub(target),
            _ => 0,
        };
        let target_y = settings.floor_offset.lifted(initial.y, floors_above);
        plan.moves.push(PositionTarget {
            node: child,
            target: Vec3::new(initial.x, target_y, initial.z),
            duration: FLOOR_MOVE_SECS,
        });

        let selected = floor.is_some() && floor == target;
        if selected {
            plan.materials.push((child, MaterialSlot::Original));
            labels.push(FloorLabel {
                name: node.name.clone(),
                position: building_matrix
                    .transform_point3(Vec3::new(initial.x, target_y, initial.z))
                    .to_array(),
                detail: FloorDetail::sample(rng),
            });
        } else {
            plan.materials.push((child, MaterialSlot::Dimmed));
        }
    }
    plan.labels.floors = Some(labels);

    plan.camera = match layer {
        Layer::WholeBuilding => Some(CameraShot::offset_from(
            graph.world_position(building),
            WHOLE_BUILDING_SHOT_OFFSET,
            settings.flight_seconds,
        )),
        Layer::Floor(name) => children
            .iter()
            .find(|&&child| graph.node(child).name == *name)
            .map(|&child| {
                let focus = building_matrix.transform_point3(graph.node(child).initial_position);
                CameraShot::offset_from(focus, FLOOR_SHOT_OFFSET, FLOOR_FLIGHT_SECS)
            }),
    };
    plan
}
