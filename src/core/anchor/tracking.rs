//=========================================================================
// AR Tracking Interface
//=========================================================================
//
// Contract with the device's tracking / plane-detection engine.
//
// The session never implements tracking itself; it raycasts against what
// the engine has detected, asks it for anchors, and uses its camera to
// map screen points into the world.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::ops::BitOr;

use glam::Vec3;

//=== Internal Dependencies ===============================================

use crate::core::math::Pose;

//=== TrackableHitFlags ===================================================

/// Which kinds of trackables a raycast may hit.
///
/// Flags combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackableHitFlags(u32);

impl TrackableHitFlags {
    pub const NONE: Self = Self(0);
    /// Inside the detected polygon of a plane.
    pub const PLANE_WITHIN_POLYGON: Self = Self(1 << 0);
    /// Inside the plane's bounding box.
    pub const PLANE_WITHIN_BOUNDS: Self = Self(1 << 1);
    /// Anywhere on the plane's infinite extension.
    pub const PLANE_WITHIN_INFINITY: Self = Self(1 << 2);
    /// Sparse feature points.
    pub const FEATURE_POINT: Self = Self(1 << 3);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TrackableHitFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

//=== Trackables ==========================================================

/// Identifier of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneId(pub u64);

/// Orientation class of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    /// Floors and table tops.
    HorizontalUpwardFacing,
    /// Ceilings.
    HorizontalDownwardFacing,
    Vertical,
}

/// What a raycast hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trackable {
    Plane { id: PlaneId, kind: PlaneKind },
    FeaturePoint,
}

/// A raycast result: the trackable and the hit pose on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackableHit {
    pub trackable: Trackable,
    pub pose: Pose,
}

impl TrackableHit {
    /// Returns the plane id when the hit is a floor-like surface.
    pub fn upward_plane(&self) -> Option<PlaneId> {
        match self.trackable {
            Trackable::Plane {
                id,
                kind: PlaneKind::HorizontalUpwardFacing,
            } => Some(id),
            _ => None,
        }
    }
}

//=== AnchorHandle ========================================================

/// Engine-side handle to a local anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(pub u64);

impl fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

//=== ArTracking ==========================================================

/// Tracking engine consumed by placement and spawning.
pub trait ArTracking: Send {
    /// Casts a ray from the screen point into the tracked scene.
    fn raycast(&self, x: f32, y: f32, flags: TrackableHitFlags) -> Option<TrackableHit>;

    /// Creates an anchor on a plane. `None` if the plane stopped tracking.
    fn create_anchor(&mut self, plane: PlaneId, pose: Pose) -> Option<AnchorHandle>;

    /// Stops tracking a previously created anchor.
    fn release_anchor(&mut self, anchor: AnchorHandle);

    /// World point at `depth` meters in front of the camera under (x, y).
    fn screen_to_world(&self, x: f32, y: f32, depth: f32) -> Vec3;

    /// Camera viewing direction in world space.
    fn camera_forward(&self) -> Vec3;
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let flags = TrackableHitFlags::PLANE_WITHIN_POLYGON | TrackableHitFlags::FEATURE_POINT;
        assert!(flags.contains(TrackableHitFlags::PLANE_WITHIN_POLYGON));
        assert!(flags.contains(TrackableHitFlags::FEATURE_POINT));
        assert!(!flags.contains(TrackableHitFlags::PLANE_WITHIN_BOUNDS));
    }

    #[test]
    fn only_upward_planes_qualify() {
        let hit = |trackable| TrackableHit {
            trackable,
            pose: Pose::IDENTITY,
        };

        let floor = hit(Trackable::Plane {
            id: PlaneId(3),
            kind: PlaneKind::HorizontalUpwardFacing,
        });
        let wall = hit(Trackable::Plane {
            id: PlaneId(4),
            kind: PlaneKind::Vertical,
        });

        assert_eq!(floor.upward_plane(), Some(PlaneId(3)));
        assert_eq!(wall.upward_plane(), None);
        assert_eq!(hit(Trackable::FeaturePoint).upward_plane(), None);
    }
}
