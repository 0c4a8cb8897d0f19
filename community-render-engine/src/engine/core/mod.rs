//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
pub mod app_setup;

/// Loading → Running state machine and loading progress reporting.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
