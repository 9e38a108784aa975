//=========================================================================
// Message Bus
//=========================================================================
//
// Per-type event queues used to decouple the adapters (tracking, cloud,
// relay) from the orchestrator that reacts to them.
//
//=========================================================================

//=== Module Declarations =================================================

mod message_bus;
mod message_queue;

//=== Public API ==========================================================

pub use message_bus::{Message, MessageBus};
