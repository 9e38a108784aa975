//=========================================================================
// Session Configuration
//=========================================================================
//
// Tunables of the anchor session. Defaults match the demo room setup.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;

//=== Internal Dependencies ===============================================

use crate::core::session::InterestGroup;
use crate::core::shared_object::JumpTuning;

//=== SessionConfig =======================================================

/// Configuration for [`AnchorSession`](crate::core::anchor_session::AnchorSession).
///
/// # Default Values
///
/// - **Anchor key**: `"AnchorKey"` (room property holding the shared id)
/// - **Anchor tag**: `"Anchor"` (scene root networked objects attach to)
/// - **Object**: prefab `"Andy"` in interest group 1, spawned 0.2 m in
///   front of the camera with an impulse of forward·2 + up·1
/// - **Jump**: impulse (0, 4, 0) + forward·2, 0.2 s pause
/// - **Physics**: gravity (0, -9.81, 0), mass 1
/// - **Log**: 5 lines
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub anchor_key: String,
    pub anchor_tag: String,
    pub object_prefab: String,
    pub object_group: InterestGroup,
    /// Spawn depth in front of the camera, meters.
    pub front_distance: f32,
    pub throw_forward: f32,
    pub throw_up: f32,
    pub jump_impulse: Vec3,
    pub jump_forward: f32,
    /// Seconds.
    pub jump_pause: f32,
    pub gravity: Vec3,
    pub object_mass: f32,
    pub log_lines: usize,
    /// Seeds the spawn-yaw generator; entropy when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            anchor_key: "AnchorKey".to_string(),
            anchor_tag: "Anchor".to_string(),
            object_prefab: "Andy".to_string(),
            object_group: InterestGroup(1),
            front_distance: 0.2,
            throw_forward: 2.0,
            throw_up: 1.0,
            jump_impulse: Vec3::new(0.0, 4.0, 0.0),
            jump_forward: 2.0,
            jump_pause: 0.2,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            object_mass: 1.0,
            log_lines: 5,
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `key` is empty.
    pub fn with_anchor_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        assert!(!key.is_empty(), "Anchor key must not be empty");
        self.anchor_key = key;
        self
    }

    pub fn with_anchor_tag(mut self, tag: impl Into<String>) -> Self {
        self.anchor_tag = tag.into();
        self
    }

    pub fn with_object(mut self, prefab: impl Into<String>, group: InterestGroup) -> Self {
        self.object_prefab = prefab.into();
        self.object_group = group;
        self
    }

    /// # Panics
    ///
    /// Panics if `distance <= 0.0`.
    pub fn with_front_distance(mut self, distance: f32) -> Self {
        assert!(distance > 0.0, "Front distance must be positive, got {}", distance);
        self.front_distance = distance;
        self
    }

    pub fn with_throw(mut self, forward: f32, up: f32) -> Self {
        self.throw_forward = forward;
        self.throw_up = up;
        self
    }

    /// # Panics
    ///
    /// Panics if `pause < 0.0`.
    pub fn with_jump(mut self, impulse: Vec3, forward: f32, pause: f32) -> Self {
        assert!(pause >= 0.0, "Jump pause must not be negative, got {}", pause);
        self.jump_impulse = impulse;
        self.jump_forward = forward;
        self.jump_pause = pause;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// # Panics
    ///
    /// Panics if `mass <= 0.0`.
    pub fn with_object_mass(mut self, mass: f32) -> Self {
        assert!(mass > 0.0, "Object mass must be positive, got {}", mass);
        self.object_mass = mass;
        self
    }

    /// # Panics
    ///
    /// Panics if `lines == 0`.
    pub fn with_log_lines(mut self, lines: usize) -> Self {
        assert!(lines > 0, "Log must keep at least one line");
        self.log_lines = lines;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub(crate) fn jump_tuning(&self) -> JumpTuning {
        JumpTuning {
            forward: self.jump_forward,
            impulse: self.jump_impulse,
            pause: self.jump_pause,
            mass: self.object_mass,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
