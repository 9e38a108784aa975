//=========================================================================
// Relay Interface
//=========================================================================
//
// Contract with the real-time relay / room service.
//
// Requests go out through `RelayService`; everything the relay reports
// back (connection progress, room property changes, replicated objects)
// arrives as `RelayCallback`s on a channel drained by the core thread.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::math::Pose;

//=== Types ===============================================================

/// Custom room properties: string keys to string values.
pub type RoomProperties = HashMap<String, String>;

/// Relay-wide identifier of a networked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Interest group objects are published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterestGroup(pub u8);

/// A networked object as announced by the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkObjectInfo {
    pub view: ViewId,
    pub prefab: String,
    /// Spawn pose in world space.
    pub pose: Pose,
    pub group: InterestGroup,
    /// `true` when this peer owns (instantiated) the object.
    pub is_mine: bool,
}

//=== RelayCallback =======================================================

/// Notifications delivered by the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayCallback {
    /// Session negotiation finished; rooms can be joined.
    ConnectedToMaster,

    JoinedRoom,

    JoinRoomFailed { code: i16, message: String },

    Disconnected { cause: String },

    /// Only the properties that changed.
    RoomPropertiesUpdated(RoomProperties),

    ObjectInstantiated(NetworkObjectInfo),

    /// Replicated pose (relative to the anchor root) of a remote object.
    ObjectTransformSynced { view: ViewId, local_pose: Pose },

    ObjectDestroyed(ViewId),

    OwnershipChanged { view: ViewId, is_mine: bool },
}

//=== ObjectNotice ========================================================

/// Object-related relay callbacks, forwarded to the object registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectNotice {
    Instantiated(NetworkObjectInfo),
    TransformSynced { view: ViewId, local_pose: Pose },
    Destroyed(ViewId),
    OwnershipChanged { view: ViewId, is_mine: bool },
}

//=== RelayService ========================================================

/// Real-time relay backend.
pub trait RelayService: Send {
    /// Starts session negotiation; answers with `ConnectedToMaster`.
    fn connect(&mut self);

    /// Answers with `JoinedRoom` or `JoinRoomFailed`.
    fn join_or_create_room(&mut self, room: &str);

    fn in_room(&self) -> bool;

    /// Current value of a custom property of the joined room.
    fn room_property(&self, key: &str) -> Option<String>;

    /// Merges properties into the joined room; peers get
    /// `RoomPropertiesUpdated`.
    fn set_room_properties(&mut self, properties: RoomProperties);

    /// Creates an object owned by this peer, replicated to the group.
    fn instantiate(&mut self, prefab: &str, pose: Pose, group: InterestGroup) -> ViewId;

    /// Removes an owned object on every peer.
    fn destroy(&mut self, view: ViewId);

    /// Publishes an owned object's pose relative to the anchor root.
    fn sync_transform(&mut self, view: ViewId, local_pose: Pose);

    /// Subscribes to (or leaves) an interest group.
    fn set_interest_group(&mut self, group: InterestGroup, enabled: bool);
}
