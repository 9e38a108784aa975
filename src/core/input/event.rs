//=========================================================================
// Pointer Event Types
//
// Defines the internal representation of low-level pointer input.
//
// This module abstracts away platform-specific input (mouse buttons in a
// desktop window, touches on a handheld) into a unified, engine-friendly
// format used by the pointer tracker.
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    PointerEvent (this module)
//         ↓
//    PointerTracker (per-frame taps)
//         ↓
//    AnchorSession (placement / spawning)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left). Acts as a tap.
    Left,
    Right,
    Middle,
    Other,
}

//=== PointerEvent ========================================================

/// Low-level pointer event from the platform layer.
///
/// Coordinates are in screen space (pixels, top-left origin).
///
/// # Equality & Hashing Semantics
///
/// Events are compared by type + payload, except `Moved`, which compares
/// equal regardless of coordinates so the platform can coalesce cursor
/// motion (last position wins).
#[derive(Debug, Clone, Copy)]
pub enum PointerEvent {
    /// Mouse button pressed at the current cursor position.
    ButtonDown { button: MouseButton },

    /// Mouse button released.
    ButtonUp { button: MouseButton },

    /// Cursor moved.
    Moved { x: f32, y: f32 },

    /// A finger touched the screen.
    TouchStarted { id: u64, x: f32, y: f32 },

    /// A finger left the screen (ended or cancelled).
    TouchEnded { id: u64 },

    /// Unrecognized event, ignored by the tracker.
    Unidentified,
}

impl PointerEvent {
    /// Returns `true` for events whose latest value supersedes older ones.
    pub fn is_continuous(&self) -> bool {
        matches!(self, PointerEvent::Moved { .. })
    }
}

impl PartialEq for PointerEvent {
    fn eq(&self, other: &Self) -> bool {
        use PointerEvent::*;
        match (self, other) {
            (ButtonDown { button: a }, ButtonDown { button: b }) => a == b,
            (ButtonUp { button: a }, ButtonUp { button: b }) => a == b,
            (Moved { .. }, Moved { .. }) => true,
            (TouchStarted { id: a, x: ax, y: ay }, TouchStarted { id: b, x: bx, y: by }) => {
                a == b && ax.to_bits() == bx.to_bits() && ay.to_bits() == by.to_bits()
            }
            (TouchEnded { id: a }, TouchEnded { id: b }) => a == b,
            (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for PointerEvent {}

impl Hash for PointerEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PointerEvent::ButtonDown { button } | PointerEvent::ButtonUp { button } => {
                button.hash(state)
            }
            PointerEvent::TouchStarted { id, .. } | PointerEvent::TouchEnded { id } => {
                id.hash(state)
            }
            PointerEvent::Moved { .. } | PointerEvent::Unidentified => {}
        }
    }
}

//=== Tap =================================================================

/// A pointer-down or touch-began gesture in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub x: f32,
    pub y: f32,
}

//=========================================================================
// Unit Tests
//=========================================================================
