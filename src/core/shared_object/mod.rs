//=========================================================================
// Shared Objects
//=========================================================================
//
// Registry of relay-replicated objects ("Andy" figures) on this peer.
//
// Architecture:
//   ObjectNotice ──> SharedObjects ──> SceneGraph entity under anchor root
//                        │                 └─ PhysicsStep body (owner only)
//                        └─ JumpSequence per object
//                              └─ Jump / Destroy (owner only) ──> RelayService
//
// Owners simulate and publish their objects' poses; remote copies follow
// the relay's transform sync and never act on their own.
//
//=========================================================================

//=== Submodules ==========================================================

mod jump;

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

use glam::Vec3;
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::session::{NetworkObjectInfo, ObjectNotice, RelayService, ViewId};
use crate::core::world::{EntityId, PhysicsStep, SceneGraph};

//=== Public API ==========================================================

pub use jump::{JumpPhase, JumpSequence, JumpStep};

//=== JumpTuning ==========================================================

/// Forces and timing of the jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpTuning {
    /// Multiplier on the object's forward axis.
    pub forward: f32,
    /// Added to the forward component.
    pub impulse: Vec3,
    /// Seconds between the jump and watching for the second fall.
    pub pause: f32,
    pub mass: f32,
}

//=== SharedObject ========================================================

#[derive(Debug)]
struct SharedObject {
    entity: EntityId,
    is_mine: bool,
    /// `None` when no anchor root existed at instantiation.
    sequence: Option<JumpSequence>,
}

//=== SharedObjects =======================================================

/// Networked objects known to this peer, keyed by view id.
pub struct SharedObjects {
    anchor_tag: String,
    tuning: JumpTuning,
    objects: BTreeMap<ViewId, SharedObject>,
}

impl SharedObjects {
    pub fn new(anchor_tag: impl Into<String>, tuning: JumpTuning) -> Self {
        Self {
            anchor_tag: anchor_tag.into(),
            tuning,
            objects: BTreeMap::new(),
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.objects.contains_key(&view)
    }

    pub fn entity(&self, view: ViewId) -> Option<EntityId> {
        self.objects.get(&view).map(|o| o.entity)
    }

    pub fn is_mine(&self, view: ViewId) -> Option<bool> {
        self.objects.get(&view).map(|o| o.is_mine)
    }

    pub fn phase(&self, view: ViewId) -> Option<JumpPhase> {
        self.objects
            .get(&view)
            .and_then(|o| o.sequence.as_ref())
            .map(|s| s.phase())
    }

    //--- on_instantiated() ------------------------------------------------
    //
    // Runs on every peer when an object appears: spawn, attach to the
    // tagged anchor root, start the jump sequence. Without a root the
    // object stays where it spawned and never jumps.
    //
    pub fn on_instantiated(
        &mut self,
        info: &NetworkObjectInfo,
        scene: &mut SceneGraph,
        physics: &mut dyn PhysicsStep,
    ) -> Option<EntityId> {
        if self.objects.contains_key(&info.view) {
            debug!(target: "objects", "Duplicate instantiation of {} ignored", info.view);
            return None;
        }

        let entity = scene.spawn(format!("{} {}", info.prefab, info.view), info.pose);

        let sequence = match scene.find_with_tag(&self.anchor_tag) {
            Some(root) => {
                scene.set_parent(entity, Some(root));
                Some(JumpSequence::new(self.tuning.pause))
            }
            None => {
                warn!(
                    target: "objects",
                    "No '{}' root for {}, object left unattached",
                    self.anchor_tag,
                    info.view
                );
                None
            }
        };

        if info.is_mine {
            physics.insert_body(entity, self.tuning.mass);
        }

        info!(
            target: "objects",
            "Instantiated {} ({}) as {}",
            info.view,
            if info.is_mine { "mine" } else { "remote" },
            entity
        );

        self.objects.insert(
            info.view,
            SharedObject {
                entity,
                is_mine: info.is_mine,
                sequence,
            },
        );
        Some(entity)
    }

    //--- on_notice() ------------------------------------------------------

    /// Applies an object callback forwarded by the session adapter.
    pub fn on_notice(
        &mut self,
        notice: ObjectNotice,
        scene: &mut SceneGraph,
        physics: &mut dyn PhysicsStep,
    ) {
        match notice {
            ObjectNotice::Instantiated(info) => {
                self.on_instantiated(&info, scene, physics);
            }

            ObjectNotice::TransformSynced { view, local_pose } => {
                match self.objects.get(&view) {
                    Some(object) if !object.is_mine => {
                        scene.set_local_pose(object.entity, local_pose);
                    }
                    Some(_) => {}
                    None => debug!(target: "objects", "Sync for unknown {}", view),
                }
            }

            ObjectNotice::Destroyed(view) => {
                self.remove(view, scene, physics);
            }

            ObjectNotice::OwnershipChanged { view, is_mine } => {
                if let Some(object) = self.objects.get_mut(&view) {
                    object.is_mine = is_mine;
                    if is_mine && !physics.has_body(object.entity) {
                        physics.insert_body(object.entity, self.tuning.mass);
                    } else if !is_mine {
                        physics.remove_body(object.entity);
                    }
                    debug!(target: "objects", "{} ownership: mine={}", view, is_mine);
                }
            }
        }
    }

    //--- update() ---------------------------------------------------------
    //
    // Advances every sequence with the object's local height, performs
    // the owner's jump/destroy, and publishes owned poses.
    //
    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        physics: &mut dyn PhysicsStep,
        relay: &mut dyn RelayService,
        dt: f32,
    ) {
        let mut destroyed = Vec::new();

        for (&view, object) in self.objects.iter_mut() {
            let Some(local) = scene.local_pose(object.entity) else {
                continue;
            };

            if let Some(sequence) = object.sequence.as_mut() {
                match sequence.advance(local.position.y, object.is_mine, dt) {
                    JumpStep::Idle => {}
                    JumpStep::Jump => {
                        let forward = scene
                            .world_pose(object.entity)
                            .map(|p| p.forward())
                            .unwrap_or(Vec3::Z);
                        physics.set_velocity(object.entity, Vec3::ZERO);
                        physics.add_impulse(
                            object.entity,
                            forward * self.tuning.forward + self.tuning.impulse,
                        );
                        debug!(target: "objects", "{} jumps", view);
                    }
                    JumpStep::Destroy => {
                        info!(target: "objects", "{} fell twice, destroying", view);
                        relay.destroy(view);
                        destroyed.push(view);
                        continue;
                    }
                }
            }

            if object.is_mine {
                relay.sync_transform(view, local);
            }
        }

        for view in destroyed {
            self.remove(view, scene, physics);
        }
    }

    //--- Mutation ---------------------------------------------------------

    /// Applies an impulse to an owned object's body.
    pub fn add_impulse(&self, view: ViewId, impulse: Vec3, physics: &mut dyn PhysicsStep) {
        if let Some(object) = self.objects.get(&view) {
            physics.add_impulse(object.entity, impulse);
        }
    }

    /// Forgets an object and despawns its entity. Unknown views are ignored.
    pub fn remove(&mut self, view: ViewId, scene: &mut SceneGraph, physics: &mut dyn PhysicsStep) {
        if let Some(object) = self.objects.remove(&view) {
            physics.remove_body(object.entity);
            scene.despawn(object.entity);
            debug!(target: "objects", "Removed {}", view);
        }
    }

    /// Forgets every object (used on disconnect).
    pub fn clear(&mut self, scene: &mut SceneGraph, physics: &mut dyn PhysicsStep) {
        let views: Vec<ViewId> = self.objects.keys().copied().collect();
        for view in views {
            self.remove(view, scene, physics);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
