use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::camera_presets::DEFAULT_VIEW;

// Crate engine modules
use crate::engine::camera::director::CameraDirector;
use crate::engine::camera::drive_camera_flight;
use crate::engine::camera::orbit_camera::{OrbitCamera, orbit_camera_controller};
use crate::engine::config::ViewerConfig;
use crate::engine::core::app_state::{
    AppState, enter_initial_mode, transition_to_running, update_loading_frontend,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::model_loader::{
    ModelLoader, resolve_config, spawn_model_when_configured, start_loading,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::gizmos::draw_selection_outlines;
use crate::engine::scene::graph::SceneGraph;
use crate::engine::scene::indexing::index_scene_when_ready;
use crate::engine::scene::materials::setup_material_palette;
use crate::engine::scene::sync::StandardLedger;
use crate::engine::scene::tween::animate_position_tweens;
// View modules
use crate::view::commands::{
    ViewCommandEvent, apply_view_commands, handle_view_keyboard_shortcuts, publish_view_state,
};
use crate::view::interaction::handle_canvas_click;
use crate::view::labels::SceneLabels;
use crate::view::readings::ReadingSource;
use crate::view::store::ViewStore;
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::view::overlay::{
    create_native_overlays, fps_text_update_system, handle_label_clicks, position_label_nodes,
    rebuild_label_nodes, update_tooltip_overlay,
};

const LOG_FILTER: &str = "wgpu=error,naga=warn,community_render_engine=info";

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ViewerConfig as a loadable asset type from *.viewer.json files.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["viewer.json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(WireframePlugin::default())
        .insert_resource(WireframeConfig {
            global: false,
            default_color: Color::WHITE,
        });

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<ModelLoader>()
        .init_resource::<SceneGraph>()
        .init_resource::<StandardLedger>()
        .init_resource::<ViewStore>()
        .init_resource::<SceneLabels>()
        .init_resource::<ReadingSource>()
        .init_resource::<CameraDirector>()
        .init_resource::<OrbitCamera>()
        .add_event::<ViewCommandEvent>();

    app.add_systems(Startup, (setup, setup_material_palette, start_loading).chain())
        .add_systems(
            Update,
            (
                resolve_config,
                spawn_model_when_configured,
                index_scene_when_ready,
                update_loading_frontend,
                transition_to_running,
            )
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(OnEnter(AppState::Running), enter_initial_mode);

    // Inputs produce commands; commands produce plans; plans drive tweens and the camera.
    let runtime_systems = (
        (handle_view_keyboard_shortcuts, handle_canvas_click),
        apply_view_commands,
        (
            animate_position_tweens,
            (drive_camera_flight, orbit_camera_controller).chain(),
        ),
        (publish_view_state, draw_selection_outlines),
    )
        .chain();

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, create_native_overlays)
            .add_systems(Update, fps_text_update_system)
            .add_systems(
                Update,
                (
                    handle_label_clicks.before(apply_view_commands),
                    rebuild_label_nodes,
                    position_label_nodes,
                    update_tooltip_overlay,
                )
                    .run_if(in_state(AppState::Running)),
            );
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(DEFAULT_VIEW.position).looking_at(DEFAULT_VIEW.target, Vec3::Y),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        level: Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
