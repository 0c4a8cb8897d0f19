//! Scene graph adapter over the loaded community model.
//!
//! Indexes the GLTF hierarchy into an arena, keeps the original-material ledger and
//! pushes planned materials and positions back onto entities.

/// Arena index with parent pointers, name/entity lookups and world-space queries.
pub mod graph;

/// Selection outline gizmos.
pub mod gizmos;

/// One-shot traversal of the spawned model into the arena.
pub mod indexing;

/// Material slots, the original-material ledger and the shared override palette.
pub mod materials;

/// Node naming convention: floors, roofs, monitor points, vehicles, glow meshes.
pub mod naming;

/// Applies ledger slots to primitive entities.
pub mod sync;

/// Eased position tweens for floor moves.
pub mod tween;
