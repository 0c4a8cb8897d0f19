//! JSON-RPC 2.0 bridge to the dashboard page hosting the viewer.
//!
//! The viewer runs in an iframe; the page drives it with requests over `postMessage` and
//! listens for notifications.
//!
//! ```text
//! Dashboard (parent window)  <──postMessage──>  Viewer (iframe)
//!        │                                          │
//!        ├─ Request (with ID) ────────────────────> │
//!        │                                          ├─ queue ViewCommand
//!        │ <─────────────────── Response (with ID) ─┤
//!        │                                          │
//!        │ <──────────── Notification (no ID) ──────┤
//! ```
//!
//! ## Requests
//!
//! - `set_mode {mode}`: `default`, `water`, `electric` or `floor`
//! - `select_building {name}`: a building name, or `null` to leave the building
//! - `select_layer {layer}`: a floor name such as `3F`, or `全楼`
//! - `clear_selection`, `close_monitor`
//! - `get_view_state`, `get_building_layers {name?}`, `get_monitor_trend {type}`, `get_fps`
//!
//! Requests without an id are treated as notifications: they act but get no response.
//!
//! ## Notifications
//!
//! `mode_changed`, `view_state_changed`, `labels_changed`, `tooltip_changed`,
//! `camera_flight_completed`, `loading_progress`, `state_transition`.
//!
//! ## Error codes
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// Message listener, request dispatch and outgoing queue.
pub mod web_rpc;
