//! Engine layer: app construction, configuration, loading, the indexed scene and camera.

/// Camera director and orbit controller.
pub mod camera;

/// Runtime viewer configuration.
pub mod config;

/// App construction, states and window setup.
pub mod core;

/// Config and model loading pipeline.
pub mod loading;

/// Scene graph adapter: index, materials, tweens, outlines.
pub mod scene;
