//=========================================================================
// Local Anchor Placement
//=========================================================================
//
// Turns a qualifying tap into a local anchor on a floor-like plane.
//
// Flow:
//   Tap → raycast(PLANE_WITHIN_POLYGON) → upward plane?
//       → destroy previous anchor (children detached first)
//       → create anchor + scene entity → LocalAnchorCreated
//
// At most one local anchor exists at a time; the orchestrator stops
// calling placement once a cloud anchor is established.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::tracking::{AnchorHandle, ArTracking, TrackableHitFlags};
use crate::core::events::LocalAnchorCreated;
use crate::core::input::Tap;
use crate::core::math::Pose;
use crate::core::message_bus::MessageBus;
use crate::core::world::{EntityId, SceneGraph};

//=== LocalAnchor =========================================================

/// A client-local anchor fixed to a detected plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAnchor {
    /// Tracking engine handle.
    pub handle: AnchorHandle,
    /// Scene entity following the anchor.
    pub entity: EntityId,
    /// Pose of the raycast hit the anchor was created at.
    pub pose: Pose,
}

//=== AnchorPlacement =====================================================

/// Owns the (single) local anchor.
#[derive(Debug, Default)]
pub struct AnchorPlacement {
    anchor: Option<LocalAnchor>,
}

impl AnchorPlacement {
    pub fn new() -> Self {
        Self { anchor: None }
    }

    pub fn anchor(&self) -> Option<&LocalAnchor> {
        self.anchor.as_ref()
    }

    //--- place() ----------------------------------------------------------
    //
    // Handles one tap. Returns `true` when a new anchor was created.
    // Misses, non-plane hits and non-upward planes leave state unchanged.
    //
    pub fn place(
        &mut self,
        tap: Tap,
        tracking: &mut dyn ArTracking,
        scene: &mut SceneGraph,
        bus: &mut MessageBus,
    ) -> bool {
        let Some(hit) = tracking.raycast(tap.x, tap.y, TrackableHitFlags::PLANE_WITHIN_POLYGON)
        else {
            debug!(target: "anchor", "Tap at ({}, {}) hit nothing", tap.x, tap.y);
            return false;
        };

        let Some(plane) = hit.upward_plane() else {
            debug!(target: "anchor", "Tap hit {:?}, not an upward plane", hit.trackable);
            return false;
        };

        self.clear(tracking, scene);

        let Some(handle) = tracking.create_anchor(plane, hit.pose) else {
            warn!(target: "anchor", "Tracking refused to anchor on plane {:?}", plane);
            return false;
        };

        let entity = scene.spawn(format!("LocalAnchor {}", handle), hit.pose);
        self.anchor = Some(LocalAnchor {
            handle,
            entity,
            pose: hit.pose,
        });

        info!(target: "anchor", "Local anchor {} placed at {:?}", handle, hit.pose.position);
        bus.push(LocalAnchorCreated);
        true
    }

    //--- clear() ----------------------------------------------------------
    //
    // Destroys the current anchor, detaching its children first so
    // whatever was attached (e.g. the anchor marker) survives.
    //
    pub fn clear(&mut self, tracking: &mut dyn ArTracking, scene: &mut SceneGraph) {
        if let Some(old) = self.anchor.take() {
            debug!(target: "anchor", "Replacing local anchor {}", old.handle);
            scene.detach_children(old.entity);
            scene.despawn(old.entity);
            tracking.release_anchor(old.handle);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
