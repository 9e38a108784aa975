//=========================================================================
// World
//=========================================================================
//
// Explicit scene-graph and physics hook standing in for a host engine.
//
// Architecture:
//   SceneGraph   → entities, hierarchy, tags, activation
//   PhysicsStep  → bodies keyed by EntityId, stepped once per tick
//
//=========================================================================

//=== Module Declarations =================================================

mod physics;
mod scene_graph;

//=== Public API ==========================================================

pub use physics::{BallisticPhysics, PhysicsStep};
pub use scene_graph::{EntityId, SceneGraph};
