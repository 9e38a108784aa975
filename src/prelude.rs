//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use shared_anchor::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::core::platform_bridge::{CommandError, CommandSender, SessionUpdate, UiCommand};

// Session
pub use crate::core::anchor_session::{
    AnchorSession, Collaborators, Presentation, SessionState,
};
pub use crate::core::config::SessionConfig;
pub use crate::core::session::SessionError;

// Vendor seams
pub use crate::core::anchor::{ArTracking, CloudAnchorService, CloudResponse};
pub use crate::core::input::{NoUi, Tap, UiHitTest};
pub use crate::core::session::{RelayCallback, RelayService};
pub use crate::core::world::PhysicsStep;

// Math
pub use crate::core::math::Pose;
