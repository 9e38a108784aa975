//=========================================================================
// Command Sender
//=========================================================================
//
// Handle the UI layer uses to push button presses to the core thread.
//
// Commands share the platform channel, so they are ordered with input
// batches. Sending never blocks: a full queue is reported to the caller.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Sender, TrySendError};
use log::debug;

//=== Internal Dependencies ===============================================

use super::interface::{PlatformEvent, UiCommand};

//=== CommandError ========================================================

/// Why a command was not delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The core thread is not keeping up; retry later.
    QueueFull,

    /// The core thread has stopped.
    Disconnected,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QueueFull => write!(f, "command queue full"),
            Self::Disconnected => write!(f, "core thread stopped"),
        }
    }
}

impl std::error::Error for CommandError {}

//=== CommandSender =======================================================

/// Cloneable, thread-safe sender of [`UiCommand`]s.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<PlatformEvent>,
}

impl CommandSender {
    pub(crate) fn new(sender: Sender<PlatformEvent>) -> Self {
        Self { sender }
    }

    /// Connect button. Blank names are rejected on the core thread.
    pub fn connect(&self, room: impl Into<String>) -> Result<(), CommandError> {
        self.send(UiCommand::Connect(room.into()))
    }

    /// Host button.
    pub fn host_anchor(&self) -> Result<(), CommandError> {
        self.send(UiCommand::HostAnchor)
    }

    pub fn send(&self, command: UiCommand) -> Result<(), CommandError> {
        debug!(target: "platform", "UI command {:?}", command);
        self.sender
            .try_send(PlatformEvent::Command(command))
            .map_err(|e| match e {
                TrySendError::Full(_) => CommandError::QueueFull,
                TrySendError::Disconnected(_) => CommandError::Disconnected,
            })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
