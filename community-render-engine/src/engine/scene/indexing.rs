use super::graph::{LocalBounds, NodeRecord, SceneGraph};
use super::sync::StandardLedger;
use crate::engine::loading::model_loader::ModelLoader;
use crate::engine::loading::progress::LoadingProgress;
use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::render::view::RenderLayers;
use constants::scene_naming::GLOW_RENDER_LAYER;

/// Walk the spawned model once and build the arena index.
///
/// Captures original materials and initial positions (first sight only), tags glow
/// meshes with the glow render layer and forces vehicles visible.
pub fn index_scene_when_ready(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    loader: Res<ModelLoader>,
    mut graph: ResMut<SceneGraph>,
    mut ledger: ResMut<StandardLedger>,
    nodes: Query<(Option<&Name>, &Transform, Option<&Children>), Without<Mesh3d>>,
    primitives: Query<(&Mesh3d, &MeshMaterial3d<StandardMaterial>, &Transform)>,
    meshes: Res<Assets<Mesh>>,
) {
    if loading_progress.scene_indexed || !loader.scene_ready {
        return;
    }
    let Some(root) = loader.scene_root else {
        return;
    };

    let mut stack = vec![(root, None::<Entity>)];
    while let Some((entity, parent)) = stack.pop() {
        let Ok((name, transform, children)) = nodes.get(entity) else {
            continue;
        };
        let children = children.map(|c| c.to_vec()).unwrap_or_default();

        let mut node_primitives = Vec::new();
        let mut bounds: Option<LocalBounds> = None;
        for &child in &children {
            let Ok((mesh, material, local)) = primitives.get(child) else {
                continue;
            };
            node_primitives.push(child);
            ledger.capture_original(child, material.0.clone());

            if let Some(aabb) = meshes.get(&mesh.0).and_then(|m| m.compute_aabb()) {
                let matrix = local.compute_matrix();
                let min = matrix.transform_point3(Vec3::from(aabb.min()));
                let max = matrix.transform_point3(Vec3::from(aabb.max()));
                let primitive_bounds = LocalBounds::from_min_max(min.min(max), min.max(max));
                bounds = Some(match bounds {
                    Some(existing) => existing.union(primitive_bounds),
                    None => primitive_bounds,
                });
            }
        }

        let id = graph.ingest(NodeRecord {
            entity,
            name: name.map(|n| n.as_str().to_string()).unwrap_or_default(),
            parent,
            transform: *transform,
            primitives: node_primitives,
            bounds,
        });

        let node = graph.node(id);
        if node.glow {
            for &primitive in &node.primitives {
                commands
                    .entity(primitive)
                    .insert(RenderLayers::from_layers(&[0, GLOW_RENDER_LAYER]));
            }
        }
        if node.vehicle {
            commands.entity(entity).insert(Visibility::Visible);
        }

        for &child in children.iter().rev() {
            if !primitives.contains(child) {
                stack.push((child, Some(entity)));
            }
        }
    }

    graph.rebuild_ownership();
    loading_progress.scene_indexed = true;
    info!(
        "✓ Scene indexed: {} nodes, {} meshes",
        graph.node_count(),
        graph.meshes().count()
    );
}
