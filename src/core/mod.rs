//=========================================================================
// Core Systems Orchestrator
//
// Coordinator for the session running on the logic (non-platform)
// thread.
//
// Responsibilities:
// - Receive pointer batches and UI commands from the platform channel
// - Turn pointer input into one tap per frame
// - Tick the AnchorSession at a fixed rate (TPS)
// - Report state, presentation and new log lines back to the UI
//
// Notes:
// The orchestrator runs independently from the platform layer. All
// session state lives on this thread; vendor services report back over
// channels polled during the tick, so nothing here takes a lock.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod anchor;
pub mod anchor_session;
pub mod config;
pub mod events;
pub mod input;
pub mod log_box;
pub mod math;
pub mod message_bus;
pub mod pending;
pub mod platform_bridge;
pub mod session;
pub mod shared_object;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, info, warn};

//=== Internal Modules ====================================================

use anchor_session::{AnchorSession, Presentation, SessionState};
use input::PointerTracker;
use platform_bridge::{EventCollector, PlatformEvent, SessionUpdate, TickControl, UiCommand};

//=== CoreSystemsOrchestrator =============================================
//
// Owns the session and the pointer tracker, and drives them from the
// platform channel.
//
pub(crate) struct CoreSystemsOrchestrator {
    session: AnchorSession,
    pointer: PointerTracker,
    updates: Sender<SessionUpdate>,
    published: Published,
}

/// What the UI has been sent so far.
#[derive(Debug, Default)]
struct Published {
    state: Option<SessionState>,
    presentation: Option<Presentation>,
    log_lines: usize,
}

impl CoreSystemsOrchestrator {
    //--- Construction -----------------------------------------------------

    pub fn new(session: AnchorSession, updates: Sender<SessionUpdate>) -> Self {
        Self {
            session,
            pointer: PointerTracker::new(),
            updates,
            published: Published::default(),
        }
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Each tick:
    //  1. Collects platform events (exit on WindowClosed / disconnect)
    //  2. Applies UI commands
    //  3. Feeds pointer batches to the tracker, ticks the session
    //  4. Sleeps to maintain fixed pacing
    //
    pub fn spawn_core_thread(
        mut self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let mut collector = EventCollector::new(receiver);

            loop {
                let frame_start = Instant::now();

                if self.run_frame(&mut collector, frame_duration.as_secs_f32())
                    == TickControl::Exit
                {
                    info!(target: "core", "Core thread exiting");
                    break;
                }

                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        })
    }

    //--- run_frame() ------------------------------------------------------

    pub(crate) fn run_frame(&mut self, collector: &mut EventCollector, dt: f32) -> TickControl {
        if collector.collect_frame() == TickControl::Exit {
            return TickControl::Exit;
        }

        for command in collector.take_commands() {
            self.apply(command);
        }

        self.pointer.clear();
        for batch in collector.batches() {
            self.pointer.process_events(batch);
        }

        self.session.tick(self.pointer.tap(), dt);
        self.publish_updates();
        TickControl::Continue
    }

    //--- publish_updates() ------------------------------------------------
    //
    // Sends whatever changed since the last successful send. A full queue
    // leaves the rest for the next frame; a dropped receiver means nobody
    // is watching and the update counts as delivered.
    //
    fn publish_updates(&mut self) {
        let state = self.session.state();
        if self.published.state.as_ref() != Some(state) {
            if !Self::send(&self.updates, SessionUpdate::State(state.clone())) {
                return;
            }
            self.published.state = Some(state.clone());
        }

        let presentation = self.session.presentation();
        if self.published.presentation != Some(presentation) {
            if !Self::send(&self.updates, SessionUpdate::Presentation(presentation)) {
                return;
            }
            self.published.presentation = Some(presentation);
        }

        let log = self.session.log();
        let fresh: Vec<&str> = log.since(self.published.log_lines).collect();
        let first = log.written() - fresh.len();
        for (i, line) in fresh.into_iter().enumerate() {
            if !Self::send(&self.updates, SessionUpdate::Log(line.to_string())) {
                self.published.log_lines = first + i;
                return;
            }
        }
        self.published.log_lines = log.written();
    }

    fn send(updates: &Sender<SessionUpdate>, update: SessionUpdate) -> bool {
        match updates.try_send(update) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => true,
            Err(TrySendError::Full(_)) => {
                debug!(target: "core", "Update queue full, retrying next frame");
                false
            }
        }
    }

    fn apply(&mut self, command: UiCommand) {
        debug!(target: "core", "Applying {:?}", command);
        match command {
            UiCommand::Connect(room) => {
                if let Err(e) = self.session.connect(&room) {
                    warn!(target: "core", "Connect rejected: {}", e);
                }
            }
            UiCommand::HostAnchor => {
                self.session.host_anchor();
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
