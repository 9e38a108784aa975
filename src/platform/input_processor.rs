//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit pointer events into engine PointerEvents.
//
// Architecture:
//   Winit Events → InputProcessor → PointerEvent (engine type) → InputBuffer
//
// Touch phases collapse to start/end: `Moved` touches are not taps and
// are dropped, `Cancelled` ends the touch like `Ended`.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::event::{ElementState, MouseButton as WinitMouseButton, Touch, TouchPhase};

//=== Internal Dependencies ===============================================

use crate::core::input::{MouseButton, PointerEvent};

//=== InputProcessor ======================================================

/// Stateless Winit → PointerEvent conversion.
pub(crate) struct InputProcessor;

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self
    }

    //--- Event Processing -------------------------------------------------

    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> PointerEvent {
        let button = MouseButton::from(button);
        match state {
            ElementState::Pressed => PointerEvent::ButtonDown { button },
            ElementState::Released => PointerEvent::ButtonUp { button },
        }
    }

    /// Cursor position in physical pixels.
    pub(crate) fn process_mouse_move(&self, x: f32, y: f32) -> PointerEvent {
        PointerEvent::Moved { x, y }
    }

    /// Returns `None` for touch motion.
    pub(crate) fn process_touch(&self, touch: &Touch) -> Option<PointerEvent> {
        self.touch_event(touch.id, touch.phase, touch.location.x as f32, touch.location.y as f32)
    }

    //--- Internal Helpers -------------------------------------------------

    fn touch_event(&self, id: u64, phase: TouchPhase, x: f32, y: f32) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started => Some(PointerEvent::TouchStarted { id, x, y }),
            TouchPhase::Ended | TouchPhase::Cancelled => Some(PointerEvent::TouchEnded { id }),
            TouchPhase::Moved => None,
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Left/Right/Middle mapped directly; Back/Forward/Other → Other.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
