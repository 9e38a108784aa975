//=========================================================================
// Shared Anchor Engine
//
// Main entry point: wires the winit platform, the core thread and the
// anchor session together.
//
// Architecture:
// ```text
//     EngineBuilder  ──build(collaborators)──>  Engine  ──run()──>  [Runtime]
//         │                                       │
//         ├─ with_tps()                           ├─ command_sender()
//         ├─ with_channel_capacity()              ├─ session_updates()
//         └─ with_config()                        └─ spawns core thread,
//                                                    runs platform,
//                                                    blocks until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::anchor_session::{AnchorSession, Collaborators};
use crate::core::config::SessionConfig;
use crate::core::platform_bridge::{CommandSender, PlatformEvent, SessionUpdate};
use crate::core::CoreSystemsOrchestrator;
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (session ticks per second)
/// - **Channel capacity**: 128 events
/// - **Config**: [`SessionConfig::default`]
///
/// # Examples
///
/// ```no_run
/// # fn services() -> shared_anchor::core::anchor_session::Collaborators { unimplemented!() }
/// use shared_anchor::EngineBuilder;
///
/// let engine = EngineBuilder::new()
///     .with_tps(30.0)
///     .build(services());
///
/// let commands = engine.command_sender();
/// let updates = engine.session_updates();
/// commands.connect("lobby").ok();
/// std::thread::spawn(move || {
///     for update in updates {
///         println!("{:?}", update);
///     }
/// });
///
/// engine.run();
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    config: SessionConfig,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            config: SessionConfig::default(),
        }
    }

    /// Sets the target ticks per second for the core thread.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the platform → core channel and of the
    /// core → UI update channel.
    ///
    /// UI commands share the inbound channel; when it is full they are
    /// refused with [`CommandError::QueueFull`](crate::core::platform_bridge::CommandError).
    /// A full update channel holds updates back until the UI drains it.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine around the given services.
    pub fn build(self, collaborators: Collaborators) -> Engine {
        info!(
            target: "core",
            "Building engine (TPS: {}, channel: {})",
            self.tps,
            self.channel_capacity
        );

        let (sender, receiver) = bounded(self.channel_capacity);
        let (update_sender, updates) = bounded(self.channel_capacity);
        let session = AnchorSession::new(self.config, collaborators);

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(session, update_sender),
            tps: self.tps,
            sender,
            receiver,
            updates,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Shared anchor runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► PointerTracker → AnchorSession → SessionUpdate
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Pointer Polling
///
/// Communication: crossbeam channels (PlatformEvent in, SessionUpdate out)
/// ```
pub struct Engine {
    orchestrator: CoreSystemsOrchestrator,
    tps: f64,
    sender: Sender<PlatformEvent>,
    receiver: Receiver<PlatformEvent>,
    updates: Receiver<SessionUpdate>,
}

impl Engine {
    /// Handle for the UI's connect and host buttons.
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.sender.clone())
    }

    /// State, panel visibility and log lines for the UI, sent on change.
    ///
    /// Every clone competes for the same updates; keep one reader.
    pub fn session_updates(&self) -> Receiver<SessionUpdate> {
        self.updates.clone()
    }

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the window closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Spawns the core thread running at the configured TPS
    /// 2. Runs the platform event loop (blocks here)
    /// 3. On window close: platform sends `WindowClosed` → core thread exits
    /// 4. Joins the core thread
    pub fn run(self) {
        info!(target: "core", "Starting engine runtime (TPS: {})", self.tps);

        let core_handle = self.orchestrator.spawn_core_thread(self.receiver, self.tps);
        info!(target: "core", "Core logic thread spawned");

        let platform = Platform::new(self.sender);
        info!(target: "core", "Platform initialized, entering event loop");

        if let Err(e) = platform.run() {
            error!(target: "core", "Platform error: {}", e);
        }

        info!(target: "core", "Platform event loop exited");

        match core_handle.join() {
            Ok(()) => info!(target: "core", "Core thread terminated cleanly"),
            Err(e) => error!(target: "core", "Core thread panicked: {:?}", e),
        }

        info!(target: "core", "Engine shutdown complete");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
