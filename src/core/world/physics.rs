//=========================================================================
// Physics Step
//=========================================================================
//
// Explicit physics hook for bodies living in the scene graph.
//
// The session only needs impulses, velocity resets and gravity, so the
// default backend is a ballistic integrator. A real engine can be plugged
// in by implementing `PhysicsStep`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use glam::Vec3;
use log::trace;

//=== Internal Dependencies ===============================================

use super::scene_graph::{EntityId, SceneGraph};

//=== PhysicsStep =========================================================

/// Rigid-body simulation driven once per tick.
pub trait PhysicsStep: Send {
    /// Gives `entity` a dynamic body with the given mass.
    fn insert_body(&mut self, entity: EntityId, mass: f32);

    fn remove_body(&mut self, entity: EntityId);

    fn has_body(&self, entity: EntityId) -> bool;

    fn velocity(&self, entity: EntityId) -> Option<Vec3>;

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3);

    /// Applies an instantaneous change in momentum.
    fn add_impulse(&mut self, entity: EntityId, impulse: Vec3);

    /// Advances every body by `dt` seconds and writes poses back.
    fn step(&mut self, scene: &mut SceneGraph, dt: f32);
}

//=== BallisticPhysics ====================================================

#[derive(Debug, Clone, Copy)]
struct Body {
    velocity: Vec3,
    inverse_mass: f32,
}

/// Bodies fall under constant gravity; no collisions.
///
/// Nothing stops a body at the anchor plane: a landing is the body crossing
/// local y = 0 below its anchor, which callers detect from the local pose.
pub struct BallisticPhysics {
    gravity: Vec3,
    bodies: HashMap<EntityId, Body>,
}

impl BallisticPhysics {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            bodies: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl PhysicsStep for BallisticPhysics {
    fn insert_body(&mut self, entity: EntityId, mass: f32) {
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        self.bodies.insert(
            entity,
            Body {
                velocity: Vec3::ZERO,
                inverse_mass,
            },
        );
    }

    fn remove_body(&mut self, entity: EntityId) {
        self.bodies.remove(&entity);
    }

    fn has_body(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }

    fn velocity(&self, entity: EntityId) -> Option<Vec3> {
        self.bodies.get(&entity).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.velocity = velocity;
        }
    }

    fn add_impulse(&mut self, entity: EntityId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.velocity += impulse * body.inverse_mass;
        }
    }

    fn step(&mut self, scene: &mut SceneGraph, dt: f32) {
        // Bodies whose entity is gone are dropped here
        self.bodies.retain(|entity, _| scene.contains(*entity));

        for (&entity, body) in self.bodies.iter_mut() {
            if body.inverse_mass == 0.0 {
                continue;
            }

            // Semi-implicit Euler
            body.velocity += self.gravity * dt;

            if let Some(mut pose) = scene.world_pose(entity) {
                pose.position += body.velocity * dt;
                scene.set_world_pose(entity, pose);
                trace!("Body {} at {:?}", entity, pose.position);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Pose;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    #[test]
    fn impulse_scales_with_inverse_mass() {
        let mut scene = SceneGraph::new();
        let ball = scene.spawn("ball", Pose::IDENTITY);
        let mut physics = BallisticPhysics::new(GRAVITY);
        physics.insert_body(ball, 2.0);

        physics.add_impulse(ball, Vec3::new(0.0, 4.0, 0.0));

        assert_eq!(physics.velocity(ball), Some(Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn gravity_pulls_body_down() {
        let mut scene = SceneGraph::new();
        let ball = scene.spawn("ball", Pose::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let mut physics = BallisticPhysics::new(GRAVITY);
        physics.insert_body(ball, 1.0);

        for _ in 0..60 {
            physics.step(&mut scene, 1.0 / 60.0);
        }

        let y = scene.world_pose(ball).unwrap().position.y;
        assert!(y < 1.0 - 4.0, "after 1s of free fall y should be near -4, got {}", y);
    }

    #[test]
    fn child_crosses_below_its_anchor_plane() {
        let mut scene = SceneGraph::new();
        let anchor = scene.spawn("anchor", Pose::from_position(Vec3::new(0.0, -1.0, 0.5)));
        let ball = scene.spawn("ball", Pose::from_position(Vec3::new(0.0, -0.9, 0.5)));
        scene.set_parent(ball, Some(anchor));
        let mut physics = BallisticPhysics::new(GRAVITY);
        physics.insert_body(ball, 1.0);

        for _ in 0..30 {
            physics.step(&mut scene, 1.0 / 60.0);
        }

        let local_y = scene.local_pose(ball).unwrap().position.y;
        assert!(local_y < 0.0, "body should pass the anchor plane, local y {}", local_y);
    }

    #[test]
    fn set_velocity_resets_motion() {
        let mut scene = SceneGraph::new();
        let ball = scene.spawn("ball", Pose::IDENTITY);
        let mut physics = BallisticPhysics::new(GRAVITY);
        physics.insert_body(ball, 1.0);
        physics.add_impulse(ball, Vec3::X);

        physics.set_velocity(ball, Vec3::ZERO);

        assert_eq!(physics.velocity(ball), Some(Vec3::ZERO));
    }

    #[test]
    fn bodies_of_despawned_entities_are_dropped() {
        let mut scene = SceneGraph::new();
        let ball = scene.spawn("ball", Pose::IDENTITY);
        let mut physics = BallisticPhysics::new(GRAVITY);
        physics.insert_body(ball, 1.0);

        scene.despawn(ball);
        physics.step(&mut scene, 0.016);

        assert!(physics.is_empty());
    }
}
