//=========================================================================
// Jump Sequence
//=========================================================================
//
// Fall-and-settle lifecycle of a networked object, advanced once per tick.
//
// State machine:
// ```text
//   AwaitFirstFall ──height < 0──┬─ owner ──> Pausing ──pause elapsed──> AwaitSecondFall
//                                │   (Jump)                                   │
//                                └─ remote ──> Finished               height < 0
//                                                                             │
//                                          Finished <── owner: Destroy ───────┘
//                                                   <── remote: nothing
// ```
//
// Heights are local to the anchor root, so "below zero" means below the
// anchor plane.
//
//=========================================================================

//=== JumpStep ============================================================

/// What the owner must do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpStep {
    Idle,
    /// Zero the velocity and apply the jump impulse.
    Jump,
    /// Ask the relay to remove the object.
    Destroy,
}

//=== JumpPhase ===========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpPhase {
    AwaitFirstFall,
    Pausing { remaining: f32 },
    AwaitSecondFall,
    Finished,
}

//=== JumpSequence ========================================================

#[derive(Debug, Clone)]
pub struct JumpSequence {
    phase: JumpPhase,
    pause: f32,
}

impl JumpSequence {
    /// `pause` is how long to wait after the jump before watching for the
    /// second fall, in seconds.
    pub fn new(pause: f32) -> Self {
        Self {
            phase: JumpPhase::AwaitFirstFall,
            pause,
        }
    }

    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == JumpPhase::Finished
    }

    /// Advances with the object's current local height.
    pub fn advance(&mut self, height: f32, is_mine: bool, dt: f32) -> JumpStep {
        match self.phase {
            JumpPhase::AwaitFirstFall => {
                if height >= 0.0 {
                    return JumpStep::Idle;
                }
                if !is_mine {
                    self.phase = JumpPhase::Finished;
                    return JumpStep::Idle;
                }
                self.phase = JumpPhase::Pausing {
                    remaining: self.pause,
                };
                JumpStep::Jump
            }

            JumpPhase::Pausing { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = JumpPhase::Pausing { remaining };
                    return JumpStep::Idle;
                }
                // The wait resumes in the same tick the pause ends
                self.phase = JumpPhase::AwaitSecondFall;
                self.advance(height, is_mine, 0.0)
            }

            JumpPhase::AwaitSecondFall => {
                if height >= 0.0 {
                    return JumpStep::Idle;
                }
                self.phase = JumpPhase::Finished;
                if is_mine {
                    JumpStep::Destroy
                } else {
                    JumpStep::Idle
                }
            }

            JumpPhase::Finished => JumpStep::Idle,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.05;

    #[test]
    fn owner_jumps_once_then_destroys_once() {
        let mut seq = JumpSequence::new(0.2);
        let mut steps = Vec::new();

        // above, below (jump), below during pause, above, below (destroy), below
        for height in [0.5, -0.1, -0.05, 0.2, 0.3, 0.4, 0.1, -0.2, -0.3, -0.4] {
            steps.push(seq.advance(height, true, DT));
        }

        assert_eq!(steps.iter().filter(|s| **s == JumpStep::Jump).count(), 1);
        assert_eq!(steps.iter().filter(|s| **s == JumpStep::Destroy).count(), 1);
        assert_eq!(steps[1], JumpStep::Jump);
        assert_eq!(steps[7], JumpStep::Destroy);
        assert!(seq.is_finished());
    }

    #[test]
    fn pause_must_elapse_before_second_fall_counts() {
        let mut seq = JumpSequence::new(0.2);
        assert_eq!(seq.advance(-1.0, true, DT), JumpStep::Jump);

        // Still below zero but pausing: 0.2s at 0.05s per tick
        assert_eq!(seq.advance(-1.0, true, DT), JumpStep::Idle);
        assert_eq!(seq.advance(-1.0, true, DT), JumpStep::Idle);
        assert_eq!(seq.advance(-1.0, true, DT), JumpStep::Idle);

        // Pause ends this tick; the check runs immediately
        assert_eq!(seq.advance(-1.0, true, DT + 0.001), JumpStep::Destroy);
    }

    #[test]
    fn remote_object_takes_no_action() {
        let mut seq = JumpSequence::new(0.2);

        for height in [0.5, -0.1, 0.5, -0.1, -0.2] {
            assert_eq!(seq.advance(height, false, DT), JumpStep::Idle);
        }
        assert!(seq.is_finished());
    }

    #[test]
    fn losing_ownership_before_second_fall_skips_destroy() {
        let mut seq = JumpSequence::new(0.0);
        assert_eq!(seq.advance(-0.1, true, DT), JumpStep::Jump);
        assert_eq!(seq.advance(0.3, true, DT), JumpStep::Idle);
        assert_eq!(seq.advance(-0.1, false, DT), JumpStep::Idle);
        assert!(seq.is_finished());
    }

    #[test]
    fn stays_idle_while_above_plane() {
        let mut seq = JumpSequence::new(0.2);
        for _ in 0..100 {
            assert_eq!(seq.advance(0.0, true, DT), JumpStep::Idle);
        }
        assert_eq!(seq.phase(), JumpPhase::AwaitFirstFall);
    }
}
