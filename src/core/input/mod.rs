//=========================================================================
// Pointer Input
//
// Turns the platform's pointer stream into "qualifying taps": a primary
// click or touch start this frame that did not land on UI.
//
// Responsibilities:
// - Represent mouse and touch input in a stable, portable way
// - Track held buttons and fingers so repeats are not re-reported
// - Gate taps through a UI hit test
//
// Notes:
// Anchor placement and object spawning read the same gated tap; which of
// the two consumes it depends on whether a cloud anchor is established.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
mod pointer_tracker;

//=== Public API ==========================================================

pub use event::{MouseButton, PointerEvent, Tap};
pub use pointer_tracker::{NoUi, PointerTracker, UiHitTest};
