use super::graph::{NodeId, SceneGraph};
use super::materials::{MaterialLedger, MaterialPalette, MaterialSlot, hex_colour};
use bevy::pbr::wireframe::{Wireframe, WireframeColor};
use bevy::prelude::*;
use constants::palette::TRANSLUCENT_COLOUR;

pub type StandardLedger = MaterialLedger<Handle<StandardMaterial>>;

/// Push a node's slot onto its primitives' `MeshMaterial3d` components.
///
/// The ledger must already hold the assignment; only captured originals are restored.
pub fn push_material_slot(
    commands: &mut Commands,
    graph: &SceneGraph,
    ledger: &StandardLedger,
    palette: &MaterialPalette,
    node: NodeId,
    slot: MaterialSlot,
) {
    for &primitive in &graph.node(node).primitives {
        let handle = match slot {
            MaterialSlot::Original => ledger.original(primitive).cloned(),
            overridden => palette.handle(overridden),
        };
        let Some(handle) = handle else {
            warn!("No material for {:?} on '{}'", slot, graph.node(node).name);
            continue;
        };

        let mut entity = commands.entity(primitive);
        entity.insert(MeshMaterial3d(handle));
        if slot == MaterialSlot::Translucent {
            entity.insert((
                Wireframe,
                WireframeColor {
                    color: hex_colour(TRANSLUCENT_COLOUR),
                },
            ));
        } else {
            entity.remove::<(Wireframe, WireframeColor)>();
        }
    }
}
