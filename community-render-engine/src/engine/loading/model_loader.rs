use crate::engine::config::{CONFIG_PATH, ViewerConfig};
use crate::engine::loading::progress::LoadingProgress;
use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

#[derive(Resource, Default)]
pub struct ModelLoader {
    config_handle: Option<Handle<ViewerConfig>>,
    pub scene_root: Option<Entity>,
    pub scene_ready: bool,
}

// Start the loading process
pub fn start_loading(mut loader: ResMut<ModelLoader>, asset_server: Res<AssetServer>) {
    loader.config_handle = Some(asset_server.load(CONFIG_PATH));
}

/// Resolve the viewer config, falling back to defaults when it is missing or invalid.
pub fn resolve_config(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    loader: Res<ModelLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<ViewerConfig>>,
) {
    if loading_progress.config_resolved {
        return;
    }
    let Some(handle) = loader.config_handle.as_ref() else {
        return;
    };

    let config = if let Some(config) = configs.get(handle) {
        match config.validate() {
            Ok(()) => {
                info!("✓ Viewer config loaded from {}", CONFIG_PATH);
                config.clone()
            }
            Err(e) => {
                error!("Invalid viewer config, using defaults: {}", e);
                ViewerConfig::default()
            }
        }
    } else if matches!(asset_server.get_load_state(handle), Some(LoadState::Failed(_))) {
        warn!("No viewer config at {}, using defaults", CONFIG_PATH);
        ViewerConfig::default()
    } else {
        return;
    };

    commands.insert_resource(config);
    loading_progress.config_resolved = true;
}

/// Spawn the GLTF scene once the config is known.
pub fn spawn_model_when_configured(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    mut loader: ResMut<ModelLoader>,
    config: Option<Res<ViewerConfig>>,
    asset_server: Res<AssetServer>,
) {
    if loading_progress.model_spawned {
        return;
    }
    let Some(config) = config else {
        return;
    };

    info!("Loading community model: {}", config.model_path);
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.model_path.clone()));
    let root = commands
        .spawn(SceneRoot(scene))
        .observe(
            |_trigger: Trigger<SceneInstanceReady>, mut loader: ResMut<ModelLoader>| {
                loader.scene_ready = true;
            },
        )
        .id();

    loader.scene_root = Some(root);
    loading_progress.model_spawned = true;
}
