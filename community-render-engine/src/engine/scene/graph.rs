//! Arena index over the loaded model's node hierarchy.
//!
//! Built once when the scene instance is ready. Planners query this index instead of
//! walking the live ECS tree, so ancestry and world-space lookups stay cheap and
//! independent of in-flight tweens.

use super::naming::{floor_number, is_glow_candidate, is_roof, is_vehicle};
use bevy::prelude::*;
use std::collections::HashMap;

/// Index of a node inside the [`SceneGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Axis-aligned bounds in the node's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl LocalBounds {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    pub fn union(self, other: Self) -> Self {
        let min = (self.center - self.half_extents).min(other.center - other.half_extents);
        let max = (self.center + self.half_extents).max(other.center + other.half_extents);
        Self::from_min_max(min, max)
    }
}

/// One node as read from the spawned scene hierarchy.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub entity: Entity,
    pub name: String,
    pub parent: Option<Entity>,
    pub transform: Transform,
    pub primitives: Vec<Entity>,
    pub bounds: Option<LocalBounds>,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub entity: Entity,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Local transform as spawned; translation is replaced by `position` when composing.
    pub local: Transform,
    /// Captured on first ingest and never overwritten.
    pub initial_position: Vec3,
    /// Planned local translation (equals `initial_position` until a move is planned).
    pub position: Vec3,
    pub primitives: Vec<Entity>,
    pub bounds: Option<LocalBounds>,
    pub glow: bool,
    pub vehicle: bool,
    /// Outermost building containing this node, filled by [`SceneGraph::rebuild_ownership`].
    pub building: Option<NodeId>,
}

impl SceneNode {
    pub fn is_mesh(&self) -> bool {
        !self.primitives.is_empty()
    }

    pub fn is_displaced(&self) -> bool {
        self.position != self.initial_position
    }

    pub fn floor_number(&self) -> Option<u32> {
        floor_number(&self.name)
    }
}

#[derive(Resource, Default, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    by_entity: HashMap<Entity, NodeId>,
    by_primitive: HashMap<Entity, NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl SceneGraph {
    /// Insert or refresh a node. Records must arrive parent-first.
    ///
    /// Refreshing keeps the captured `initial_position` and planned `position`.
    pub fn ingest(&mut self, record: NodeRecord) -> NodeId {
        let parent = record
            .parent
            .and_then(|entity| self.by_entity.get(&entity).copied());

        if let Some(&id) = self.by_entity.get(&record.entity) {
            for primitive in &record.primitives {
                self.by_primitive.insert(*primitive, id);
            }
            self.by_name.entry(record.name.clone()).or_insert(id);
            let node = &mut self.nodes[id.0];
            node.name = record.name;
            node.local = record.transform;
            node.primitives = record.primitives;
            node.bounds = record.bounds;
            node.glow = is_glow_candidate(&node.name);
            node.vehicle = is_vehicle(&node.name);
            return id;
        }

        let id = NodeId(self.nodes.len());
        for primitive in &record.primitives {
            self.by_primitive.insert(*primitive, id);
        }
        self.by_entity.insert(record.entity, id);
        // First match wins, mirroring a depth-first name lookup.
        self.by_name.entry(record.name.clone()).or_insert(id);
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }

        self.nodes.push(SceneNode {
            entity: record.entity,
            glow: is_glow_candidate(&record.name),
            vehicle: is_vehicle(&record.name),
            name: record.name,
            parent,
            children: Vec::new(),
            local: record.transform,
            initial_position: record.transform.translation,
            position: record.transform.translation,
            primitives: record.primitives,
            bounds: record.bounds,
            building: None,
        });
        id
    }

    /// Recompute node → building ownership. A building is a node with at least one
    /// floor- or roof-named child; ownership goes to the outermost such ancestor-or-self,
    /// so rooms nested under a floor still belong to the building.
    pub fn rebuild_ownership(&mut self) {
        let is_building: Vec<bool> = self
            .nodes
            .iter()
            .map(|node| {
                node.children.iter().any(|child| {
                    let name = &self.nodes[child.0].name;
                    floor_number(name).is_some() || is_roof(name)
                })
            })
            .collect();

        // Parents precede children in the arena, so one forward pass suffices.
        for index in 0..self.nodes.len() {
            let inherited = self.nodes[index]
                .parent
                .and_then(|parent| self.nodes[parent.0].building);
            let owner = inherited.or_else(|| is_building[index].then_some(NodeId(index)));
            self.nodes[index].building = owner;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes().filter(|(_, node)| node.is_mesh())
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn find_by_entity(&self, entity: Entity) -> Option<NodeId> {
        self.by_entity.get(&entity).copied()
    }

    /// Resolve a ray-cast hit (a primitive or a node entity) to its node.
    pub fn node_for_hit(&self, entity: Entity) -> Option<NodeId> {
        self.by_primitive
            .get(&entity)
            .or_else(|| self.by_entity.get(&entity))
            .copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn building_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].building
    }

    /// True when `building` owns `id` (the building itself included).
    pub fn belongs_to(&self, id: NodeId, building: NodeId) -> bool {
        self.building_of(id) == Some(building)
    }

    /// Record a planned local translation for a node.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        self.nodes[id.0].position = position;
    }

    /// Local-to-world matrix using planned positions.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = Transform {
            translation: node.position,
            ..node.local
        }
        .compute_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// Bounds centre of a mesh in world space.
    pub fn world_bounds_center(&self, id: NodeId) -> Option<Vec3> {
        let bounds = self.nodes[id.0].bounds?;
        Some(self.world_matrix(id).transform_point3(bounds.center))
    }
}
