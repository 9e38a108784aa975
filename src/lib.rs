//=========================================================================
// Shared Anchor: Library Root
//
// Collaborative AR session: one device places and hosts a cloud anchor,
// peers in the same relay room resolve it, and everyone spawns jumping
// objects that stay in sync relative to that anchor.
//
// Responsibilities:
// - Expose the runtime facade (`Engine`, `EngineBuilder`)
// - Expose the session core and the vendor service traits (`core`)
// - Keep the winit integration (`platform`) private
//
// Typical usage:
// ```no_run
// # fn services() -> shared_anchor::core::anchor_session::Collaborators { unimplemented!() }
// use shared_anchor::EngineBuilder;
//
// fn main() {
//     EngineBuilder::new().build(services()).run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the session logic and the traits the AR, cloud-anchor and
// relay vendors are plugged in through.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the window and pointer polling. `engine` wires it to
// the core thread.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use crate::core::platform_bridge::{CommandError, CommandSender, SessionUpdate, UiCommand};
pub use crate::engine::{Engine, EngineBuilder};
