//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Interface types between the platform / UI and the core thread: events
// and UI commands inbound, session updates outbound, errors.
//
// Defines the contract for communication between the platform / UI and
// the core thread.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::anchor_session::{Presentation, SessionState};
use crate::core::input::PointerEvent;

//=== UiCommand ===========================================================

/// Button presses from the UI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Connect button with the room name field's text.
    Connect(String),

    /// Host button.
    HostAnchor,
}

//=== SessionUpdate =======================================================

/// What the UI surface should reflect, sent by the core thread on change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    State(SessionState),

    /// Panel and cloud-sign visibility.
    Presentation(Presentation),

    /// One new line for the on-screen log.
    Log(String),
}

//=== PlatformEvent =======================================================

/// Events sent to the core thread.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Batched pointer events for a frame.
    Inputs {
        discrete: Vec<PointerEvent>,
        continuous: Vec<PointerEvent>,
    },

    /// A UI command, applied before the next tick.
    Command(UiCommand),

    /// Window close requested.
    WindowClosed,
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
#[derive(Debug)]
pub(crate) enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    EventLoopCreation(String),

    /// Event loop execution error.
    EventLoopExecution(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

//=========================================================================
// Unit Tests
//=========================================================================
