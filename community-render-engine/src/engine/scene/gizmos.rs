use super::graph::SceneGraph;
use super::materials::hex_colour;
use crate::view::store::ViewStore;
use bevy::prelude::*;
use constants::palette::SELECTION_OUTLINE_COLOUR;

/// Outline boxes around selected monitor points.
pub fn draw_selection_outlines(mut gizmos: Gizmos, store: Res<ViewStore>, graph: Res<SceneGraph>) {
    let colour = hex_colour(SELECTION_OUTLINE_COLOUR);
    for &entity in store.selected_objects() {
        let Some(id) = graph.find_by_entity(entity) else {
            continue;
        };
        let Some(bounds) = graph.node(id).bounds else {
            continue;
        };

        let (scale, rotation, translation) = graph.world_matrix(id).to_scale_rotation_translation();
        let center = translation + rotation * (scale * bounds.center);
        gizmos.cuboid(
            Transform::from_translation(center)
                .with_rotation(rotation)
                .with_scale(scale * bounds.half_extents * 2.0),
            colour,
        );
    }
}
