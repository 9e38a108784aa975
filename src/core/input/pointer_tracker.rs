//=========================================================================
// Pointer Tracker
//=========================================================================
//
// Low-level pointer state tracking with per-frame tap detection.
//
// Architecture:
//   PointerEvent → process_events() → held buttons / touches → tap()
//
// Frame lifecycle: clear() → process_events() → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{MouseButton, PointerEvent, Tap};

//=== UiHitTest ===========================================================

/// Answers whether a screen position is covered by UI.
///
/// Taps landing on UI (buttons, text fields) must not reach the world.
pub trait UiHitTest: Send {
    fn is_over_ui(&self, x: f32, y: f32) -> bool;
}

/// Hit test for sessions without an overlay: nothing is ever UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUi;

impl UiHitTest for NoUi {
    fn is_over_ui(&self, _x: f32, _y: f32) -> bool {
        false
    }
}

//=== PointerTracker ======================================================

/// Tracks cursor/touch state and the first tap of each frame.
pub struct PointerTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    cursor: (f32, f32),
    buttons_down: HashSet<MouseButton>,
    touches_down: HashSet<u64>,

    //--- Frame Deltas (reset each frame via clear()) --------------------
    tap_this_frame: Option<Tap>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            cursor: (0.0, 0.0),
            buttons_down: HashSet::new(),
            touches_down: HashSet::new(),
            tap_this_frame: None,
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears the tap recorded for the previous frame.
    pub fn clear(&mut self) {
        self.tap_this_frame = None;
    }

    /// Processes one frame's worth of events in arrival order.
    pub fn process_events(&mut self, events: &[PointerEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Moved { x, y } => {
                self.cursor = (x, y);
            }

            PointerEvent::ButtonDown { button } => {
                // Only a fresh press counts, not OS key-repeat
                if self.buttons_down.insert(button) && button == MouseButton::Left {
                    let (x, y) = self.cursor;
                    self.record_tap(Tap { x, y });
                }
            }

            PointerEvent::ButtonUp { button } => {
                self.buttons_down.remove(&button);
            }

            PointerEvent::TouchStarted { id, x, y } => {
                if self.touches_down.insert(id) {
                    self.record_tap(Tap { x, y });
                }
            }

            PointerEvent::TouchEnded { id } => {
                self.touches_down.remove(&id);
            }

            PointerEvent::Unidentified => {}
        }
    }

    fn record_tap(&mut self, tap: Tap) {
        if self.tap_this_frame.is_none() {
            self.tap_this_frame = Some(tap);
        }
    }

    //=====================================================================
    // Query API
    //=====================================================================

    /// First tap of the current frame, UI or not.
    pub fn tap(&self) -> Option<Tap> {
        self.tap_this_frame
    }

    /// First tap of the current frame that did not land on UI.
    pub fn qualifying_tap(&self, ui: &dyn UiHitTest) -> Option<Tap> {
        self.tap_this_frame.filter(|tap| !ui.is_over_ui(tap.x, tap.y))
    }

    /// Last known cursor position.
    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    /// Returns `true` while any finger is on the screen.
    pub fn is_touching(&self) -> bool {
        !self.touches_down.is_empty()
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
