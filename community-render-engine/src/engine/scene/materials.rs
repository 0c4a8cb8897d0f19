use super::graph::NodeId;
use super::naming::MonitorKind;
use bevy::prelude::*;
use constants::palette::*;
use std::collections::HashMap;

/// Which material a node currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Original,
    /// Shared translucent wireframe for everything outside the focus.
    Translucent,
    /// Shared dark material for floors other than the selected one.
    Dimmed,
    Highlight(MonitorKind),
}

/// Original materials per primitive plus the slot each node is assigned.
///
/// Originals are captured once per primitive, before any override, so every override
/// can be undone by assigning [`MaterialSlot::Original`].
#[derive(Resource, Debug)]
pub struct MaterialLedger<M> {
    originals: HashMap<Entity, M>,
    assigned: HashMap<NodeId, MaterialSlot>,
}

impl<M> Default for MaterialLedger<M> {
    fn default() -> Self {
        Self {
            originals: HashMap::new(),
            assigned: HashMap::new(),
        }
    }
}

impl<M> MaterialLedger<M> {
    /// Remember a primitive's material unless one is already recorded.
    pub fn capture_original(&mut self, primitive: Entity, material: M) -> bool {
        if self.originals.contains_key(&primitive) {
            return false;
        }
        self.originals.insert(primitive, material);
        true
    }

    pub fn original(&self, primitive: Entity) -> Option<&M> {
        self.originals.get(&primitive)
    }

    pub fn assign(&mut self, node: NodeId, slot: MaterialSlot) {
        if slot == MaterialSlot::Original {
            self.assigned.remove(&node);
        } else {
            self.assigned.insert(node, slot);
        }
    }

    pub fn slot(&self, node: NodeId) -> MaterialSlot {
        self.assigned
            .get(&node)
            .copied()
            .unwrap_or(MaterialSlot::Original)
    }

    /// Nodes currently showing anything other than their original material.
    #[cfg(test)]
    pub fn overridden(&self) -> impl Iterator<Item = (NodeId, MaterialSlot)> + '_ {
        self.assigned.iter().map(|(node, slot)| (*node, *slot))
    }

    #[cfg(test)]
    pub fn count_in(&self, slot: MaterialSlot) -> usize {
        self.assigned.values().filter(|s| **s == slot).count()
    }

    /// Forget every override; callers re-apply originals to the primitives.
    pub fn restore_all(&mut self) -> Vec<NodeId> {
        self.assigned.drain().map(|(node, _)| node).collect()
    }
}

/// Shared override materials, created once at startup.
#[derive(Resource, Clone)]
pub struct MaterialPalette {
    pub translucent: Handle<StandardMaterial>,
    pub dimmed: Handle<StandardMaterial>,
    pub water: Handle<StandardMaterial>,
    pub electric: Handle<StandardMaterial>,
}

impl MaterialPalette {
    pub fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        Self {
            translucent: materials.add(StandardMaterial {
                base_color: hex_colour(TRANSLUCENT_COLOUR).with_alpha(TRANSLUCENT_OPACITY),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            }),
            dimmed: materials.add(StandardMaterial {
                base_color: hex_colour(DIMMED_COLOUR).with_alpha(DIMMED_OPACITY),
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: DIMMED_ROUGHNESS,
                metallic: DIMMED_METALLIC,
                ..default()
            }),
            water: materials.add(highlight_material(WATER_COLOUR)),
            electric: materials.add(highlight_material(ELECTRIC_COLOUR)),
        }
    }

    /// Handle for an override slot; `None` for [`MaterialSlot::Original`].
    pub fn handle(&self, slot: MaterialSlot) -> Option<Handle<StandardMaterial>> {
        match slot {
            MaterialSlot::Original => None,
            MaterialSlot::Translucent => Some(self.translucent.clone()),
            MaterialSlot::Dimmed => Some(self.dimmed.clone()),
            MaterialSlot::Highlight(MonitorKind::Water) => Some(self.water.clone()),
            MaterialSlot::Highlight(MonitorKind::Electric) => Some(self.electric.clone()),
        }
    }
}

fn highlight_material(hex: u32) -> StandardMaterial {
    let colour = hex_colour(hex);
    StandardMaterial {
        base_color: colour,
        emissive: LinearRgba::from(colour) * HIGHLIGHT_EMISSIVE_INTENSITY,
        perceptual_roughness: HIGHLIGHT_ROUGHNESS,
        metallic: HIGHLIGHT_METALLIC,
        ..default()
    }
}

pub fn hex_colour(hex: u32) -> Color {
    let [r, g, b] = hex_channels(hex);
    Color::srgb_u8(r, g, b)
}

pub fn setup_material_palette(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(MaterialPalette::new(&mut materials));
}
