//=========================================================================
// Session
//=========================================================================
//
// Relay session: room membership, the shared anchor-id property and the
// callbacks the relay reports back.
//
//=========================================================================

//=== Module Declarations =================================================

mod adapter;
mod error;
pub mod relay;

//=== Public API ==========================================================

pub use adapter::SessionAdapter;
pub use error::SessionError;
pub use relay::{
    InterestGroup, NetworkObjectInfo, ObjectNotice, RelayCallback, RelayService, RoomProperties,
    ViewId,
};
