//=========================================================================
// Scene Graph
//=========================================================================
//
// Entity registry with parent/child transforms.
//
// Entities are stored in a HashMap by id; each node keeps its pose
// relative to its parent (or to world space when it has none).
//
// Architecture:
//   SceneGraph
//     └─ nodes: HashMap<EntityId, Node>
//          ├─ local: Pose (relative to parent)
//          ├─ parent / children
//          └─ tag, active
//
// Reparenting keeps the world pose, so attaching an object to an anchor
// never makes it jump.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::math::Pose;

//=== EntityId ============================================================

/// Opaque handle to a scene entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== Node ================================================================

#[derive(Debug)]
struct Node {
    name: String,
    tag: Option<String>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    local: Pose,
    active: bool,
}

//=== SceneGraph ==========================================================

/// Registry of scene entities and their hierarchy.
pub struct SceneGraph {
    nodes: HashMap<EntityId, Node>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 1,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Spawns a root entity at the given world pose.
    pub fn spawn(&mut self, name: impl Into<String>, pose: Pose) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let name = name.into();
        debug!("Spawned entity {} '{}'", id, name);

        self.nodes.insert(
            id,
            Node {
                name,
                tag: None,
                parent: None,
                children: Vec::new(),
                local: pose,
                active: true,
            },
        );
        id
    }

    /// Removes an entity and all of its descendants.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };

        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }

        debug!("Despawned entity {} '{}'", id, node.name);

        for child in node.children {
            // Parent link is gone already; drop it so recursion does not
            // touch the removed node.
            if let Some(child_node) = self.nodes.get_mut(&child) {
                child_node.parent = None;
            }
            self.despawn(child);
        }
        true
    }

    //--- Hierarchy --------------------------------------------------------

    /// Reparents `child` under `parent` (or to the root when `None`),
    /// keeping its world pose.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        let Some(world) = self.world_pose(child) else {
            warn!("Cannot reparent missing entity {}", child);
            return false;
        };

        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                warn!("Cannot reparent {} under missing entity {}", child, p);
                return false;
            }
            if p == child || self.is_descendant_of(p, child) {
                warn!("Refusing to parent {} under its own descendant {}", child, p);
                return false;
            }
        }

        self.unlink(child);

        let local = match parent.and_then(|p| self.world_pose(p)) {
            Some(parent_world) => parent_world.inverse().mul(&world),
            None => world,
        };

        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
            node.local = local;
        }
        true
    }

    /// Moves every child of `id` to the root, keeping world poses.
    pub fn detach_children(&mut self, id: EntityId) {
        let children = self
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default();

        for child in children {
            self.set_parent(child, None);
        }
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    //--- Transforms -------------------------------------------------------

    /// Pose relative to the parent.
    pub fn local_pose(&self, id: EntityId) -> Option<Pose> {
        self.nodes.get(&id).map(|n| n.local)
    }

    pub fn set_local_pose(&mut self, id: EntityId, pose: Pose) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.local = pose;
                true
            }
            None => false,
        }
    }

    /// Pose in world space, composed through all ancestors.
    pub fn world_pose(&self, id: EntityId) -> Option<Pose> {
        let node = self.nodes.get(&id)?;
        match node.parent {
            Some(parent) => Some(self.world_pose(parent)?.mul(&node.local)),
            None => Some(node.local),
        }
    }

    /// Places an entity at a world pose, whatever its parent.
    pub fn set_world_pose(&mut self, id: EntityId, pose: Pose) -> bool {
        let parent_world = match self.parent(id) {
            Some(parent) => self.world_pose(parent),
            None => None,
        };
        let local = match parent_world {
            Some(parent_world) => parent_world.inverse().mul(&pose),
            None => pose,
        };
        self.set_local_pose(id, local)
    }

    //--- Tags & Activation ------------------------------------------------

    pub fn set_tag(&mut self, id: EntityId, tag: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.tag = Some(tag.into());
        }
    }

    /// First active entity (lowest id) carrying `tag`.
    pub fn find_with_tag(&self, tag: &str) -> Option<EntityId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.tag.as_deref() == Some(tag))
            .map(|(&id, _)| id)
            .filter(|&id| self.is_active_in_hierarchy(id))
            .min()
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.active = active;
        }
    }

    /// The entity's own active flag.
    pub fn is_active(&self, id: EntityId) -> bool {
        self.nodes.get(&id).map(|n| n.active).unwrap_or(false)
    }

    /// Active only if the entity and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.nodes.get(&cur) {
                Some(node) if node.active => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    //--- Queries ----------------------------------------------------------

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn unlink(&mut self, child: EntityId) {
        if let Some(old_parent) = self.parent(child) {
            if let Some(p) = self.nodes.get_mut(&old_parent) {
                p.children.retain(|&c| c != child);
            }
        }
    }

    fn is_descendant_of(&self, id: EntityId, ancestor: EntityId) -> bool {
        let mut current = self.parent(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.parent(cur);
        }
        false
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
