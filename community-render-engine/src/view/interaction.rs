//! Canvas clicks: ray-cast the model and turn the hit into a view command.

use super::commands::{ViewCommand, ViewCommandEvent, ViewCommandSource};
use super::readings::{is_abnormal, monitor_reading};
use super::store::{ActiveMonitor, Layer, TooltipData, ViewMode, ViewStore};
use crate::engine::camera::orbit_camera::{CLICK_DRAG_TOLERANCE, OrbitCamera};
use crate::engine::scene::graph::{NodeId, SceneGraph};
use crate::engine::scene::naming::{floor_number, prefix_chars};
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// A ray-cast hit resolved to its scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickHit {
    pub node: NodeId,
    pub point: Vec3,
    pub screen: Vec2,
}

/// Decide what a click means in the current view.
///
/// Returns `None` when the click should leave everything as it is.
pub fn resolve_click(
    graph: &SceneGraph,
    store: &ViewStore,
    hit: Option<ClickHit>,
) -> Option<ViewCommand> {
    let Some(hit) = hit else {
        // Empty space never disturbs floor navigation.
        return (store.mode() != ViewMode::Floor).then_some(ViewCommand::ClearSelection);
    };

    match store.mode() {
        ViewMode::Water | ViewMode::Electric => inspect_monitor(graph, store.mode(), hit),
        ViewMode::Floor => select_floor(graph, store.current_building()?, hit.node),
        ViewMode::Default => None,
    }
}

fn inspect_monitor(graph: &SceneGraph, mode: ViewMode, hit: ClickHit) -> Option<ViewCommand> {
    let kind = mode.monitor_kind()?;
    let node = graph.node(hit.node);
    if !kind.matches(&node.name) {
        return None;
    }

    let parent = graph.parent(hit.node);
    let grandparent = parent.and_then(|p| graph.parent(p));
    let value = monitor_reading(kind);

    let tooltip = TooltipData {
        show: true,
        building: Some(grandparent.map_or_else(String::new, |g| graph.node(g).name.clone())),
        layer: Some(parent.map_or_else(String::new, |p| prefix_chars(&graph.node(p).name, 2))),
        room: Some(prefix_chars(&node.name, 3)),
        value: Some(value),
        abnormal: is_abnormal(kind, value),
        name: Some(node.name.clone()),
        kind: Some(kind.label().to_string()),
        screen: Some(hit.screen.to_array()),
        position: Some(hit.point.to_array()),
    };
    let monitor = ActiveMonitor {
        id: node.entity.to_bits().to_string(),
        name: node.name.clone(),
        kind,
        value,
    };

    Some(ViewCommand::InspectMonitor {
        entity: node.entity,
        tooltip,
        monitor,
    })
}

/// A hit inside the selected building picks the floor named by the node or its parent.
fn select_floor(graph: &SceneGraph, building: &str, node: NodeId) -> Option<ViewCommand> {
    let building = graph.find_by_name(building)?;
    if !graph.belongs_to(node, building) {
        return None;
    }

    std::iter::once(node)
        .chain(graph.parent(node))
        .map(|id| &graph.node(id).name)
        .find(|name| floor_number(name).is_some())
        .map(|name| ViewCommand::SelectLayer(Layer::parse(name)))
}

/// Ray-cast on left-button release, unless the press turned into an orbit drag.
pub fn handle_canvas_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    orbit: Res<OrbitCamera>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    ui_interactions: Query<&Interaction>,
    mut ray_cast: MeshRayCast,
    graph: Res<SceneGraph>,
    store: Res<ViewStore>,
    mut view_commands: EventWriter<ViewCommandEvent>,
) {
    if !mouse_button.just_released(MouseButton::Left) || orbit.press_travel > CLICK_DRAG_TOLERANCE
    {
        return;
    }
    // Clicks on overlay buttons are handled by the overlay.
    if ui_interactions.iter().any(|i| *i != Interaction::None) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let hit = ray_cast
        .cast_ray(ray, &MeshRayCastSettings::default())
        .iter()
        .find_map(|(entity, hit)| {
            graph.node_for_hit(*entity).map(|node| ClickHit {
                node,
                point: hit.point,
                screen: cursor,
            })
        });

    if let Some(command) = resolve_click(&graph, &store, hit) {
        view_commands.write(ViewCommandEvent {
            command,
            source: ViewCommandSource::Pointer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::graph::tests::GraphBuilder;
    use crate::engine::scene::naming::MonitorKind;
    use crate::view::store::StoreAction;

    fn community() -> SceneGraph {
        let mut b = GraphBuilder::default();
        let root = b.group("Scene", None, Vec3::ZERO);
        let building = b.group("1号楼", Some(root), Vec3::ZERO);
        let second = b.group("2F办公区", Some(building), Vec3::ZERO);
        b.mesh("201水管", Some(second), Vec3::ZERO);
        b.mesh("202电表", Some(second), Vec3::ZERO);
        b.mesh("2F", Some(building), Vec3::ZERO);
        let desk = b.group("3F", Some(building), Vec3::ZERO);
        b.mesh("会议桌", Some(desk), Vec3::ZERO);
        b.mesh("1号楼楼顶", Some(building), Vec3::ZERO);
        b.mesh("草地", Some(root), Vec3::ZERO);
        b.finish()
    }

    fn hit(graph: &SceneGraph, name: &str) -> Option<ClickHit> {
        Some(ClickHit {
            node: graph.find_by_name(name).unwrap(),
            point: Vec3::new(1.0, 2.0, 3.0),
            screen: Vec2::new(40.0, 50.0),
        })
    }

    fn store_in(mode: ViewMode) -> ViewStore {
        ViewStore::default().reduce(StoreAction::SetMode(mode))
    }

    #[test]
    fn pipe_click_in_water_mode_builds_tooltip_from_hierarchy() {
        let graph = community();
        let command = resolve_click(&graph, &store_in(ViewMode::Water), hit(&graph, "201水管"));

        let Some(ViewCommand::InspectMonitor {
            entity,
            tooltip,
            monitor,
        }) = command
        else {
            panic!("expected a monitor inspection, got {command:?}");
        };
        let pipe = graph.find_by_name("201水管").unwrap();
        assert_eq!(entity, graph.node(pipe).entity);
        assert!(tooltip.show);
        assert_eq!(tooltip.building.as_deref(), Some("1号楼"));
        assert_eq!(tooltip.layer.as_deref(), Some("2F"));
        assert_eq!(tooltip.room.as_deref(), Some("201"));
        assert_eq!(tooltip.value, Some(20.0));
        assert!(tooltip.abnormal);
        assert_eq!(tooltip.kind.as_deref(), Some("水"));
        assert_eq!(tooltip.screen, Some([40.0, 50.0]));
        assert_eq!(tooltip.position, Some([1.0, 2.0, 3.0]));
        assert_eq!(monitor.kind, MonitorKind::Water);
        assert_eq!(monitor.name, "201水管");
    }

    #[test]
    fn monitor_of_the_other_kind_is_ignored() {
        let graph = community();
        let store = store_in(ViewMode::Water);
        assert_eq!(resolve_click(&graph, &store, hit(&graph, "202电表")), None);

        let store = store_in(ViewMode::Electric);
        let command = resolve_click(&graph, &store, hit(&graph, "202电表"));
        assert!(matches!(
            command,
            Some(ViewCommand::InspectMonitor { ref monitor, .. }) if monitor.value == 480.0
        ));
    }

    #[test]
    fn empty_space_clears_except_in_floor_mode() {
        let graph = community();
        assert_eq!(
            resolve_click(&graph, &store_in(ViewMode::Water), None),
            Some(ViewCommand::ClearSelection)
        );
        assert_eq!(
            resolve_click(&graph, &store_in(ViewMode::Default), None),
            Some(ViewCommand::ClearSelection)
        );
        assert_eq!(resolve_click(&graph, &store_in(ViewMode::Floor), None), None);
    }

    #[test]
    fn floor_mode_click_selects_the_hit_floor() {
        let graph = community();
        let store = store_in(ViewMode::Floor)
            .reduce(StoreAction::SetCurrentBuilding(Some("1号楼".into())));

        assert_eq!(
            resolve_click(&graph, &store, hit(&graph, "2F")),
            Some(ViewCommand::SelectLayer(Layer::parse("2F")))
        );
        // The mesh name carries no floor, its parent does.
        assert_eq!(
            resolve_click(&graph, &store, hit(&graph, "会议桌")),
            Some(ViewCommand::SelectLayer(Layer::parse("3F")))
        );
        assert_eq!(resolve_click(&graph, &store, hit(&graph, "1号楼楼顶")), None);
        assert_eq!(resolve_click(&graph, &store, hit(&graph, "草地")), None);
    }

    #[test]
    fn floor_mode_without_building_ignores_hits() {
        let graph = community();
        assert_eq!(
            resolve_click(&graph, &store_in(ViewMode::Floor), hit(&graph, "2F")),
            None
        );
    }
}
