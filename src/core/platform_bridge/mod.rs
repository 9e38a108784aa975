//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit) and the UI surface with the core
// thread.
//
// Components:
// - `interface`: Event, command, update and error definitions (the contract)
// - `command`: UI-side sender for button presses
// - `event_collector`: Core-side event collection and buffering
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod command;
pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use command::{CommandError, CommandSender};
pub use interface::{SessionUpdate, UiCommand};

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::{PlatformError, PlatformEvent};
