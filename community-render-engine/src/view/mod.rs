//! What the viewer shows: mode and selection state, and how it maps onto the scene.

/// View commands and the systems that apply them.
pub mod commands;

/// Click resolution for monitor points and floors.
pub mod interaction;

/// Monitor, building and floor labels.
pub mod labels;

/// Native UI overlays for labels, tooltip and FPS.
#[cfg(not(target_arch = "wasm32"))]
pub mod overlay;

/// Mocked readings and trends.
pub mod readings;

/// Pure planners from view state to scene changes.
pub mod reconciler;

/// Mode/selection store and its reducer.
pub mod store;
