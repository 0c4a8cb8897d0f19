use bevy::prelude::*;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub config_resolved: bool,
    pub model_spawned: bool,
    pub scene_indexed: bool,
}

impl LoadingProgress {
    pub fn stages(&self) -> [(&'static str, bool); 3] {
        [
            ("Viewer config", self.config_resolved),
            ("Community model", self.model_spawned),
            ("Scene index", self.scene_indexed),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.stages().iter().all(|(_, done)| *done)
    }
}
