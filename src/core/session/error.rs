//=========================================================================
// Session Errors
//=========================================================================

/// Requests the session adapter refuses before touching the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Room name was empty or whitespace.
    EmptyRoomName,

    /// The operation needs a joined room.
    NotInRoom,

    /// `connect` while already in a room.
    AlreadyInRoom(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoomName => write!(f, "room name empty"),
            Self::NotInRoom => write!(f, "not in a room"),
            Self::AlreadyInRoom(room) => write!(f, "already in room '{}'", room),
        }
    }
}

impl std::error::Error for SessionError {}
