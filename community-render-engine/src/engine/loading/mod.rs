//! Asset loading pipeline: viewer config, then the community model, then the index.

/// Config resolution and GLTF scene spawning.
pub mod model_loader;

/// Loading stage flags reported to the front-end.
pub mod progress;
