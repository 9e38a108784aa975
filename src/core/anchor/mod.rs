//=========================================================================
// Anchors
//=========================================================================
//
// Local and cloud anchors.
//
// Architecture:
//   ArTracking ──raycast──> AnchorPlacement ──LocalAnchor──┐
//                                                          ↓
//   CloudAnchorService <──host/resolve── CloudAnchorAdapter ──CloudAnchor
//
//=========================================================================

//=== Module Declarations =================================================

pub mod cloud;
pub mod placement;
pub mod tracking;

//=== Public API ==========================================================

pub use cloud::{
    CloudAnchor, CloudAnchorAdapter, CloudAnchorId, CloudAnchorResult, CloudAnchorService,
    CloudResponse, HostedAnchor,
};
pub use placement::{AnchorPlacement, LocalAnchor};
pub use tracking::{
    AnchorHandle, ArTracking, PlaneId, PlaneKind, Trackable, TrackableHit, TrackableHitFlags,
};
