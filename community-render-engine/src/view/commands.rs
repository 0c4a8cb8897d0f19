//! View commands from the front-end, keyboard, pointer and overlay.
//!
//! Every source writes a [`ViewCommandEvent`]; [`apply_view_commands`] updates the store,
//! runs the matching planner and applies the plan to the scene.

use super::labels::SceneLabels;
use super::readings::ReadingSource;
use super::reconciler::{
    ReconcileSettings, ScenePlan, plan_building_release, plan_building_selection,
    plan_floor_layout, plan_mode_entry,
};
use super::store::{ActiveMonitor, Layer, StoreAction, TooltipData, ViewMode, ViewStore};
use crate::engine::camera::director::{CameraDirector, CameraPose, FlightCallback};
use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::config::ViewerConfig;
use crate::engine::scene::graph::SceneGraph;
use crate::engine::scene::materials::MaterialPalette;
use crate::engine::scene::sync::{StandardLedger, push_material_slot};
use crate::engine::scene::tween::PositionTween;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    SetMode(ViewMode),
    /// `None` leaves the selected building.
    SelectBuilding(Option<String>),
    SelectLayer(Layer),
    InspectMonitor {
        entity: Entity,
        tooltip: TooltipData,
        monitor: ActiveMonitor,
    },
    /// Hide the tooltip and drop outline selection.
    ClearSelection,
    CloseMonitor,
}

/// Origin of a command, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommandSource {
    Rpc,
    Keyboard,
    Pointer,
    Overlay,
    Startup,
}

#[derive(Event, Debug, Clone)]
pub struct ViewCommandEvent {
    pub command: ViewCommand,
    pub source: ViewCommandSource,
}

/// Everything needed to push a [`ScenePlan`] onto the world.
#[derive(SystemParam)]
pub struct SceneSync<'w, 's> {
    commands: Commands<'w, 's>,
    graph: ResMut<'w, SceneGraph>,
    ledger: ResMut<'w, StandardLedger>,
    palette: Res<'w, MaterialPalette>,
    labels: ResMut<'w, SceneLabels>,
    director: ResMut<'w, CameraDirector>,
    orbit: Res<'w, OrbitCamera>,
    camera_query: Query<'w, 's, &'static Transform, With<Camera3d>>,
}

impl SceneSync<'_, '_> {
    fn current_pose(&self) -> CameraPose {
        match self.camera_query.single() {
            Ok(transform) => CameraPose {
                position: transform.translation,
                target: self.orbit.target,
            },
            Err(_) => self.orbit.pose(),
        }
    }

    /// Apply materials, floor tweens, labels and the camera shot of a plan.
    pub fn apply(&mut self, plan: ScenePlan, on_arrival: Option<FlightCallback>) {
        for (node, slot) in plan.commit_materials(&mut *self.ledger) {
            push_material_slot(
                &mut self.commands,
                &self.graph,
                &self.ledger,
                &self.palette,
                node,
                slot,
            );
        }

        plan.commit_positions(&mut self.graph);
        for movement in &plan.moves {
            let entity = self.graph.node(movement.node).entity;
            self.commands
                .entity(entity)
                .insert(PositionTween::new(movement.target, movement.duration));
        }

        if !plan.labels.is_empty() {
            self.labels.apply(plan.labels);
        }

        if let Some(shot) = plan.camera {
            let from = self.current_pose();
            self.director.fly_to(from, shot, on_arrival);
        }
    }
}

pub fn apply_view_commands(
    mut events: EventReader<ViewCommandEvent>,
    mut store: ResMut<ViewStore>,
    mut sync: SceneSync,
    mut readings: ResMut<ReadingSource>,
    config: Res<ViewerConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let settings = ReconcileSettings::from(&*config);

    for event in events.read() {
        debug!("View command {:?} from {:?}", event.command, event.source);

        match &event.command {
            ViewCommand::SetMode(mode) => {
                store.dispatch(StoreAction::SetMode(*mode));
                let plan = plan_mode_entry(&sync.graph, *mode, &settings);
                sync.apply(plan, None);

                info!("View mode: {}", mode.as_str());
                rpc_interface.send_notification(
                    "mode_changed",
                    serde_json::json!({ "mode": mode.as_str() }),
                );
            }
            ViewCommand::SelectBuilding(Some(name)) => {
                if store.mode() != ViewMode::Floor {
                    warn!("Building selection ignored outside floor mode: {}", name);
                    continue;
                }
                let Some(plan) =
                    plan_building_selection(&sync.graph, name, &settings, &mut readings.0)
                else {
                    warn!("Building '{}' not found in the scene", name);
                    continue;
                };

                store.dispatch(StoreAction::SetCurrentBuilding(Some(name.clone())));
                store.dispatch(StoreAction::SetCurrentLayer(Layer::WholeBuilding));
                if let Some(layers) = plan.building_layers.clone() {
                    store.dispatch(StoreAction::SetBuildingLayers(layers));
                }

                let arrived = name.clone();
                sync.apply(
                    plan,
                    Some(Box::new(move || info!("Camera framed building {}", arrived))),
                );
            }
            ViewCommand::SelectBuilding(None) => {
                if store.current_building().is_none() {
                    continue;
                }
                store.dispatch(StoreAction::SetCurrentBuilding(None));
                sync.apply(plan_building_release(&sync.graph, &settings), None);
            }
            ViewCommand::SelectLayer(layer) => {
                let Some(building) = store
                    .current_building()
                    .and_then(|name| sync.graph.find_by_name(name))
                else {
                    warn!("Layer {} selected without a building", layer);
                    continue;
                };

                store.dispatch(StoreAction::SetCurrentLayer(layer.clone()));
                let plan =
                    plan_floor_layout(&sync.graph, building, layer, &settings, &mut readings.0);
                sync.apply(plan, None);
            }
            ViewCommand::InspectMonitor {
                entity,
                tooltip,
                monitor,
            } => {
                store.dispatch(StoreAction::ClearSelectedObjects);
                store.dispatch(StoreAction::AddSelectedObject(*entity));
                store.dispatch(StoreAction::SetTooltip(tooltip.clone()));
                store.dispatch(StoreAction::SetActiveMonitor(Some(monitor.clone())));
            }
            ViewCommand::ClearSelection => {
                store.dispatch(StoreAction::SetTooltip(TooltipData::hidden()));
                store.dispatch(StoreAction::ClearSelectedObjects);
            }
            ViewCommand::CloseMonitor => {
                store.dispatch(StoreAction::SetActiveMonitor(None));
            }
        }
    }
}

/// Broadcast store, tooltip and label changes to the front-end.
pub fn publish_view_state(
    store: Res<ViewStore>,
    labels: Res<SceneLabels>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last_tooltip: Local<Option<TooltipData>>,
) {
    if store.is_changed() {
        send_serialized(&mut rpc_interface, "view_state_changed", &store.snapshot());

        if last_tooltip.as_ref() != Some(store.tooltip()) {
            send_serialized(&mut rpc_interface, "tooltip_changed", store.tooltip());
            *last_tooltip = Some(store.tooltip().clone());
        }
    }

    if labels.is_changed() {
        send_serialized(&mut rpc_interface, "labels_changed", &*labels);
    }
}

fn send_serialized<T: serde::Serialize>(rpc: &mut WebRpcInterface, method: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(params) => rpc.send_notification(method, params),
        Err(e) => error!("Failed to serialize {}: {}", method, e),
    }
}

/// Next or previous entry of the building-layer list, clamped at both ends.
pub fn step_layer(layers: &[String], current: &Layer, delta: isize) -> Option<Layer> {
    let index = layers.iter().position(|l| l == current.as_str())?;
    let next = index
        .checked_add_signed(delta)?
        .min(layers.len().saturating_sub(1));
    (next != index).then(|| Layer::parse(&layers[next]))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn handle_view_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    store: Res<ViewStore>,
    mut view_commands: EventWriter<ViewCommandEvent>,
) {
    let mut send = |command| {
        view_commands.write(ViewCommandEvent {
            command,
            source: ViewCommandSource::Keyboard,
        });
    };

    let modes = [
        (KeyCode::Digit1, ViewMode::Default),
        (KeyCode::Digit2, ViewMode::Water),
        (KeyCode::Digit3, ViewMode::Electric),
        (KeyCode::Digit4, ViewMode::Floor),
    ];
    for (key, mode) in modes {
        if keyboard.just_pressed(key) {
            send(ViewCommand::SetMode(mode));
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        if store.current_building().is_some() {
            send(ViewCommand::SelectBuilding(None));
        } else if store.active_monitor().is_some() {
            send(ViewCommand::CloseMonitor);
        } else {
            send(ViewCommand::ClearSelection);
        }
    }

    let delta = if keyboard.just_pressed(KeyCode::ArrowUp) {
        1
    } else if keyboard.just_pressed(KeyCode::ArrowDown) {
        -1
    } else {
        return;
    };
    if let Some(layer) = step_layer(store.building_layers(), store.current_layer(), delta) {
        send(ViewCommand::SelectLayer(layer));
    }
}

/// No keyboard shortcuts in WASM builds; the front-end drives the view over RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_view_keyboard_shortcuts() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::graph::{LocalBounds, NodeRecord};
    use crate::engine::scene::materials::MaterialSlot;
    use bevy::pbr::wireframe::Wireframe;
    use constants::camera_presets::{DEFAULT_VIEW, FLAT_FLOOR_OFFSET_UNIT};
    use constants::scene_naming::WHOLE_BUILDING;

    const TRANSLUCENT: Handle<StandardMaterial> = Handle::weak_from_u128(1);

    fn palette() -> MaterialPalette {
        MaterialPalette {
            translucent: TRANSLUCENT,
            dimmed: Handle::weak_from_u128(2),
            water: Handle::weak_from_u128(3),
            electric: Handle::weak_from_u128(4),
        }
    }

    /// Spawns real entities so queued inserts have somewhere to land.
    struct CommunitySpawner<'w> {
        world: &'w mut World,
        graph: SceneGraph,
        ledger: StandardLedger,
        materials: u128,
    }

    impl CommunitySpawner<'_> {
        fn node(&mut self, name: &str, parent: Option<Entity>, at: Vec3, mesh: bool) -> Entity {
            let entity = self.world.spawn(Name::new(name.to_string())).id();
            let mut primitives = Vec::new();
            if mesh {
                let primitive = self.world.spawn_empty().id();
                self.materials += 1;
                self.ledger
                    .capture_original(primitive, Handle::weak_from_u128(100 + self.materials));
                primitives.push(primitive);
            }
            self.graph.ingest(NodeRecord {
                entity,
                name: name.to_string(),
                parent,
                transform: Transform::from_translation(at),
                primitives,
                bounds: mesh.then(|| LocalBounds::from_min_max(Vec3::splat(-1.0), Vec3::ONE)),
            });
            entity
        }
    }

    fn community_app() -> App {
        let mut app = App::new();
        app.add_event::<ViewCommandEvent>()
            .insert_resource(ViewStore::default())
            .insert_resource(palette())
            .insert_resource(SceneLabels::default())
            .insert_resource(CameraDirector::default())
            .insert_resource(OrbitCamera::from_pose(CameraPose {
                position: DEFAULT_VIEW.position,
                target: DEFAULT_VIEW.target,
            }))
            .insert_resource(ReadingSource::seeded(11))
            .insert_resource(ViewerConfig::default())
            .insert_resource(WebRpcInterface::default())
            .add_systems(Update, apply_view_commands);

        let mut spawner = CommunitySpawner {
            world: app.world_mut(),
            graph: SceneGraph::default(),
            ledger: StandardLedger::default(),
            materials: 0,
        };
        let root = spawner.node("Scene", None, Vec3::ZERO, false);
        let building = spawner.node("1号楼", Some(root), Vec3::new(10.0, 0.0, 0.0), false);
        spawner.node("1F", Some(building), Vec3::ZERO, true);
        spawner.node("2F", Some(building), Vec3::new(0.0, 3.0, 0.0), true);
        spawner.node("1号楼楼顶", Some(building), Vec3::new(0.0, 6.0, 0.0), true);
        spawner.node("草地", Some(root), Vec3::ZERO, true);

        let CommunitySpawner {
            mut graph, ledger, ..
        } = spawner;
        graph.rebuild_ownership();
        app.insert_resource(graph).insert_resource(ledger);
        app
    }

    fn send(app: &mut App, command: ViewCommand) {
        app.world_mut().send_event(ViewCommandEvent {
            command,
            source: ViewCommandSource::Rpc,
        });
        app.update();
    }

    /// Enter floor mode and wait out its camera shot.
    fn floor_mode_app() -> App {
        let mut app = community_app();
        send(&mut app, ViewCommand::SetMode(ViewMode::Floor));
        app.insert_resource(CameraDirector::default());
        app
    }

    fn entity_of(app: &App, name: &str) -> Entity {
        let graph = app.world().resource::<SceneGraph>();
        graph.node(graph.find_by_name(name).unwrap()).entity
    }

    fn primitive_of(app: &App, name: &str) -> Entity {
        let graph = app.world().resource::<SceneGraph>();
        graph.node(graph.find_by_name(name).unwrap()).primitives[0]
    }

    fn slot_of(app: &App, name: &str) -> MaterialSlot {
        let world = app.world();
        let graph = world.resource::<SceneGraph>();
        world
            .resource::<StandardLedger>()
            .slot(graph.find_by_name(name).unwrap())
    }

    #[test]
    fn selecting_a_building_pushes_the_plan_onto_the_world() {
        let mut app = floor_mode_app();
        send(&mut app, ViewCommand::SelectBuilding(Some("1号楼".into())));

        let store = app.world().resource::<ViewStore>();
        assert_eq!(store.current_building(), Some("1号楼"));
        assert_eq!(store.current_layer(), &Layer::WholeBuilding);
        assert_eq!(store.building_layers(), [WHOLE_BUILDING, "1F", "2F"]);
        assert!(app.world().resource::<CameraDirector>().is_animating());

        assert_eq!(slot_of(&app, "草地"), MaterialSlot::Translucent);
        assert_eq!(slot_of(&app, "2F"), MaterialSlot::Original);
        let lawn = app.world().entity(primitive_of(&app, "草地"));
        assert_eq!(
            lawn.get::<MeshMaterial3d<StandardMaterial>>().map(|m| m.0.clone()),
            Some(TRANSLUCENT)
        );
        assert!(lawn.contains::<Wireframe>());

        let floor = app.world().entity(entity_of(&app, "2F"));
        assert!(floor.contains::<PositionTween>());
    }

    #[test]
    fn unknown_building_changes_nothing() {
        let mut app = floor_mode_app();
        send(&mut app, ViewCommand::SelectBuilding(Some("9号楼".into())));

        let store = app.world().resource::<ViewStore>();
        assert_eq!(store.current_building(), None);
        assert!(store.building_layers().is_empty());
        assert!(!app.world().resource::<CameraDirector>().is_animating());
        assert_eq!(slot_of(&app, "草地"), MaterialSlot::Original);
    }

    #[test]
    fn building_selection_outside_floor_mode_is_ignored() {
        let mut app = community_app();
        send(&mut app, ViewCommand::SelectBuilding(Some("1号楼".into())));

        let world = app.world();
        assert_eq!(world.resource::<ViewStore>().current_building(), None);
        assert!(!world.resource::<CameraDirector>().is_animating());
        assert_eq!(world.resource::<StandardLedger>().overridden().count(), 0);
        assert!(
            !world
                .entity(primitive_of(&app, "草地"))
                .contains::<MeshMaterial3d<StandardMaterial>>()
        );
    }

    #[test]
    fn layer_without_a_building_is_ignored() {
        let mut app = floor_mode_app();
        send(&mut app, ViewCommand::SelectLayer(Layer::parse("1F")));

        let world = app.world();
        assert_eq!(world.resource::<ViewStore>().current_layer(), &Layer::WholeBuilding);
        assert!(!world.resource::<CameraDirector>().is_animating());
        assert!(!world.entity(entity_of(&app, "2F")).contains::<PositionTween>());
        assert_eq!(slot_of(&app, "2F"), MaterialSlot::Original);
    }

    #[test]
    fn selecting_a_layer_lifts_and_dims_the_other_floors() {
        let mut app = floor_mode_app();
        send(&mut app, ViewCommand::SelectBuilding(Some("1号楼".into())));
        send(&mut app, ViewCommand::SelectLayer(Layer::parse("1F")));

        assert_eq!(
            app.world().resource::<ViewStore>().current_layer(),
            &Layer::parse("1F")
        );
        assert_eq!(slot_of(&app, "1F"), MaterialSlot::Original);
        assert_eq!(slot_of(&app, "2F"), MaterialSlot::Dimmed);

        let graph = app.world().resource::<SceneGraph>();
        let upper = graph.node(graph.find_by_name("2F").unwrap());
        assert_eq!(upper.position.y, 3.0 + FLAT_FLOOR_OFFSET_UNIT);
        assert!(app.world().entity(upper.entity).contains::<PositionTween>());
    }

    fn layers() -> Vec<String> {
        [WHOLE_BUILDING, "1F", "2F", "3F"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn stepping_moves_through_the_layer_list() {
        let layers = layers();
        assert_eq!(
            step_layer(&layers, &Layer::WholeBuilding, 1),
            Some(Layer::parse("1F"))
        );
        assert_eq!(
            step_layer(&layers, &Layer::parse("2F"), -1),
            Some(Layer::parse("1F"))
        );
        assert_eq!(
            step_layer(&layers, &Layer::parse("1F"), -1),
            Some(Layer::WholeBuilding)
        );
    }

    #[test]
    fn stepping_stops_at_the_ends() {
        let layers = layers();
        assert_eq!(step_layer(&layers, &Layer::WholeBuilding, -1), None);
        assert_eq!(step_layer(&layers, &Layer::parse("3F"), 1), None);
        assert_eq!(step_layer(&[], &Layer::WholeBuilding, 1), None);
    }
}
