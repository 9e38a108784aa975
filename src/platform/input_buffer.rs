//=========================================================================
// Input Buffer
//
// Collects pointer events between two redraws, split into discrete and
// continuous streams. Acts as a transient aggregator between the
// Platform and the core thread.
//
// Responsibilities:
// - Store incoming pointer events per frame
// - Drop immediate repeats of discrete events (e.g., ButtonDown)
// - Coalesce continuous events (cursor motion, last position wins)
// - Hand the frame's events over via `drain()`
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::collections::HashSet;

//=== Internal Modules ====================================================
use crate::core::input::PointerEvent;

//=== InputBuffer =========================================================
//
// - `discrete`: ordered one-shot events (buttons, touches)
// - `continuous`: last-known state of continuous events (cursor)
//
pub(crate) struct InputBuffer {
    discrete: Vec<PointerEvent>,
    continuous: HashSet<PointerEvent>,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 32;
        const CONTINUOUS_BASE: usize = 4;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: HashSet::with_capacity(CONTINUOUS_BASE),
        }
    }

    //--- Continuous Event Handling ---------------------------------------
    //
    // The latest event replaces any previous one of the same kind.
    //
    pub(crate) fn push_continuous(&mut self, event: PointerEvent) {
        self.continuous.replace(event);
    }

    //--- Discrete Event Handling -----------------------------------------

    pub(crate) fn push_discrete(&mut self, event: PointerEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Routes by [`PointerEvent::is_continuous`].
    pub(crate) fn push(&mut self, event: PointerEvent) {
        if event.is_continuous() {
            self.push_continuous(event);
        } else {
            self.push_discrete(event);
        }
    }

    //--- Drain ------------------------------------------------------------
    //
    // Returns `(discrete, continuous)` and empties the buffer, or `None`
    // when nothing was buffered.
    //
    pub(crate) fn drain(&mut self) -> Option<(Vec<PointerEvent>, Vec<PointerEvent>)> {
        if self.is_empty() {
            return None;
        }
        let discrete = std::mem::take(&mut self.discrete);
        let continuous = self.continuous.drain().collect();
        Some((discrete, continuous))
    }

    //--- Utilities --------------------------------------------------------

    pub(crate) fn clear(&mut self) {
        self.discrete.clear();
        self.continuous.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::MouseButton;

    fn down() -> PointerEvent {
        PointerEvent::ButtonDown { button: MouseButton::Left }
    }

    fn moved(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Moved { x, y }
    }

    #[test]
    fn discrete_repeats_are_dropped() {
        let mut buffer = InputBuffer::new();
        buffer.push_discrete(down());
        buffer.push_discrete(down());
        buffer.push_discrete(PointerEvent::ButtonUp { button: MouseButton::Left });
        buffer.push_discrete(down());
        assert_eq!(buffer.discrete.len(), 3);
    }

    #[test]
    fn continuous_keeps_latest_position() {
        let mut buffer = InputBuffer::new();

        buffer.push_continuous(moved(10.0, 10.0));
        buffer.push_continuous(moved(20.0, 30.0));

        assert_eq!(buffer.continuous.len(), 1);
        match buffer.continuous.iter().next() {
            Some(PointerEvent::Moved { x, y }) => assert_eq!((*x, *y), (20.0, 30.0)),
            other => panic!("Expected Moved, found {:?}", other),
        }
    }

    #[test]
    fn push_routes_by_kind() {
        let mut buffer = InputBuffer::new();
        buffer.push(moved(1.0, 1.0));
        buffer.push(PointerEvent::TouchStarted { id: 0, x: 5.0, y: 5.0 });

        let (discrete, continuous) = buffer.drain().unwrap();
        assert_eq!(discrete.len(), 1);
        assert_eq!(continuous.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_empty_is_none() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());

        buffer.push(down());
        buffer.clear();
        assert!(buffer.drain().is_none());
    }
}
