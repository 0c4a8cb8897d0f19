use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::view::commands::{ViewCommand, ViewCommandEvent, ViewCommandSource};
use crate::view::store::ViewMode;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Report loading stages to the front-end whenever one completes.
pub fn update_loading_frontend(
    loading_progress: Res<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !loading_progress.is_changed() {
        return;
    }

    let stages = loading_progress.stages();
    let done = stages.iter().filter(|(_, done)| *done).count();
    rpc_interface.send_notification(
        "loading_progress",
        serde_json::json!({
            "progress": done as f32 / stages.len() as f32,
            "stages": stages
                .iter()
                .map(|(name, done)| serde_json::json!({ "name": name, "done": done }))
                .collect::<Vec<_>>(),
        }),
    );
}

pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !loading_progress.is_complete() {
        return;
    }
    info!("→ All systems ready, transitioning to Running state");
    next_state.set(AppState::Running);
    rpc_interface.send_notification(
        "state_transition",
        serde_json::json!({ "state": "running" }),
    );
}

/// Enter the overview mode once the scene is indexed.
pub fn enter_initial_mode(mut view_commands: EventWriter<ViewCommandEvent>) {
    view_commands.write(ViewCommandEvent {
        command: ViewCommand::SetMode(ViewMode::Default),
        source: ViewCommandSource::Startup,
    });
}
