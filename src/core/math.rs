//=========================================================================
// Pose Math
//=========================================================================
//
// Rigid transforms (position + rotation) shared by tracking, the scene
// graph and the relay.
//
// Convention: `parent * child` yields the child's pose expressed in the
// parent's space. Forward is +Z, up is +Y.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec3};

//=== Pose ================================================================

/// A position and orientation in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Composes `self` (parent) with `child` (expressed in parent space).
    pub fn mul(&self, child: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    /// Inverse transform, so that `p.inverse().mul(&p) == IDENTITY`.
    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Transforms a point from local space into this pose's parent space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Local +Z axis in parent space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Approximate equality, used by tests and change detection.
    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn compose_applies_parent_rotation_to_child_offset() {
        let parent = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let child = Pose::from_position(Vec3::new(0.0, 0.0, 1.0));

        let world = parent.mul(&child);

        assert!(world.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn inverse_cancels_pose() {
        let pose = Pose::new(Vec3::new(3.0, -2.0, 5.0), Quat::from_rotation_x(0.7));
        let identity = pose.inverse().mul(&pose);
        assert!(identity.abs_diff_eq(&Pose::IDENTITY, 1e-5));
    }

    #[test]
    fn forward_follows_rotation() {
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
        assert!(pose.forward().abs_diff_eq(Vec3::X, 1e-5));
    }
}
