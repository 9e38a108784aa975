//=========================================================================
// Session Adapter
//=========================================================================
//
// Room membership and the shared anchor-id room property.
//
// Architecture:
//   connect(room) ──> RelayService::connect()
//   ConnectedToMaster ──> join_or_create_room(room)
//   JoinedRoom / JoinRoomFailed / Disconnected ──> connected flag
//                                     └─ ConnectionStateChanged (on change)
//   RoomPropertiesUpdated[anchor key] ──> AnchorIdShared (every delivery)
//   Object* callbacks ──> ObjectNotice (forwarded)
//
// Publishing is first-writer-wins from this client's point of view: an id
// is written only when the room has none. Two peers publishing at the
// same moment can still race; every client must accept whichever id the
// relay ends up reporting.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::error::SessionError;
use super::relay::{ObjectNotice, RelayCallback, RelayService, RoomProperties};
use crate::core::events::{AnchorIdShared, ConnectionStateChanged};
use crate::core::message_bus::MessageBus;

//=== SessionAdapter ======================================================

/// Client-side view of the relay session.
pub struct SessionAdapter {
    anchor_key: String,
    callbacks: Receiver<RelayCallback>,
    room_name: Option<String>,
    connected: bool,
}

impl SessionAdapter {
    /// `callbacks` is the channel the relay implementation reports on.
    pub fn new(anchor_key: impl Into<String>, callbacks: Receiver<RelayCallback>) -> Self {
        Self {
            anchor_key: anchor_key.into(),
            callbacks,
            room_name: None,
            connected: false,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room_name.as_deref()
    }

    pub fn anchor_key(&self) -> &str {
        &self.anchor_key
    }

    //--- connect() --------------------------------------------------------
    //
    // Validates the room name before any network call, then starts
    // negotiation. The join happens once the relay reports
    // ConnectedToMaster.
    //
    pub fn connect(
        &mut self,
        relay: &mut dyn RelayService,
        room: &str,
    ) -> Result<(), SessionError> {
        if room.trim().is_empty() {
            return Err(SessionError::EmptyRoomName);
        }
        if self.connected {
            let current = self.room_name.clone().unwrap_or_default();
            return Err(SessionError::AlreadyInRoom(current));
        }

        info!(target: "relay", "Connecting, target room '{}'", room);
        self.room_name = Some(room.to_string());
        relay.connect();
        Ok(())
    }

    //--- Anchor Id --------------------------------------------------------

    /// Anchor id stored in the joined room, if any.
    pub fn anchor_id(&self, relay: &dyn RelayService) -> Option<String> {
        if !relay.in_room() {
            return None;
        }
        relay
            .room_property(&self.anchor_key)
            .filter(|id| !id.is_empty())
    }

    /// Publishes `id` unless the room already carries one.
    ///
    /// Returns `Ok(true)` when the property was written.
    pub fn share_anchor_id(
        &self,
        relay: &mut dyn RelayService,
        id: &str,
    ) -> Result<bool, SessionError> {
        if !relay.in_room() {
            return Err(SessionError::NotInRoom);
        }

        if let Some(existing) = self.anchor_id(relay) {
            debug!(target: "relay", "Room already shares anchor {}, not publishing {}", existing, id);
            return Ok(false);
        }

        let mut properties = RoomProperties::new();
        properties.insert(self.anchor_key.clone(), id.to_string());
        relay.set_room_properties(properties);

        info!(target: "relay", "Published anchor id {}", id);
        Ok(true)
    }

    //--- poll() -----------------------------------------------------------
    //
    // Drains relay callbacks in arrival order. Session events go on the
    // bus; object callbacks are returned as notices.
    //
    pub fn poll(&mut self, relay: &mut dyn RelayService, bus: &mut MessageBus) -> Vec<ObjectNotice> {
        let mut notices = Vec::new();

        loop {
            match self.callbacks.try_recv() {
                Ok(callback) => {
                    if let Some(notice) = self.handle(callback, relay, bus) {
                        notices.push(notice);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!(target: "relay", "Relay callback channel closed");
                        self.set_connected(false, bus);
                    }
                    break;
                }
            }
        }

        notices
    }

    //--- Internal Helpers -------------------------------------------------

    fn handle(
        &mut self,
        callback: RelayCallback,
        relay: &mut dyn RelayService,
        bus: &mut MessageBus,
    ) -> Option<ObjectNotice> {
        match callback {
            RelayCallback::ConnectedToMaster => {
                match self.room_name.as_deref() {
                    Some(room) => {
                        debug!(target: "relay", "Connected to master, joining '{}'", room);
                        relay.join_or_create_room(room);
                    }
                    None => warn!(target: "relay", "Connected to master without a target room"),
                }
                None
            }

            RelayCallback::JoinedRoom => {
                self.set_connected(true, bus);
                None
            }

            RelayCallback::JoinRoomFailed { code, message } => {
                warn!(target: "relay", "Join failed ({}): {}", code, message);
                self.set_connected(false, bus);
                None
            }

            RelayCallback::Disconnected { cause } => {
                info!(target: "relay", "Disconnected: {}", cause);
                self.set_connected(false, bus);
                None
            }

            RelayCallback::RoomPropertiesUpdated(changed) => {
                match changed.get(&self.anchor_key) {
                    Some(id) if !id.is_empty() => {
                        debug!(target: "relay", "Room shares anchor id {}", id);
                        bus.push(AnchorIdShared(id.clone()));
                    }
                    _ => {}
                }
                None
            }

            RelayCallback::ObjectInstantiated(info) => Some(ObjectNotice::Instantiated(info)),

            RelayCallback::ObjectTransformSynced { view, local_pose } => {
                Some(ObjectNotice::TransformSynced { view, local_pose })
            }

            RelayCallback::ObjectDestroyed(view) => Some(ObjectNotice::Destroyed(view)),

            RelayCallback::OwnershipChanged { view, is_mine } => {
                Some(ObjectNotice::OwnershipChanged { view, is_mine })
            }
        }
    }

    fn set_connected(&mut self, connected: bool, bus: &mut MessageBus) {
        if self.connected == connected {
            return;
        }
        self.connected = connected;
        bus.push(ConnectionStateChanged(connected));
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::relay::ViewId;
    use crate::core::testing::FakeRoomServer;

    const KEY: &str = "AnchorKey";

    fn props(key: &str, value: &str) -> RoomProperties {
        let mut p = RoomProperties::new();
        p.insert(key.to_string(), value.to_string());
        p
    }

    #[test]
    fn empty_or_blank_room_name_makes_no_call() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let mut session = SessionAdapter::new(KEY, callbacks);

        assert_eq!(session.connect(&mut relay, ""), Err(SessionError::EmptyRoomName));
        assert_eq!(session.connect(&mut relay, "   "), Err(SessionError::EmptyRoomName));
        assert_eq!(relay.connect_calls(), 0);
        assert_eq!(session.room_name(), None);
    }

    #[test]
    fn connect_joins_room_after_master() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let mut session = SessionAdapter::new(KEY, callbacks);
        let mut bus = MessageBus::new();

        session.connect(&mut relay, "lobby").unwrap();
        assert_eq!(relay.connect_calls(), 1);

        session.poll(&mut relay, &mut bus);
        session.poll(&mut relay, &mut bus);

        assert!(session.connected());
        assert!(relay.in_room());
        assert_eq!(bus.drain::<ConnectionStateChanged>(), vec![ConnectionStateChanged(true)]);
    }

    #[test]
    fn connection_event_raised_only_on_change() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let mut session = SessionAdapter::new(KEY, callbacks);
        let mut bus = MessageBus::new();

        relay.inject(RelayCallback::JoinedRoom);
        relay.inject(RelayCallback::JoinedRoom);
        relay.inject(RelayCallback::Disconnected { cause: "timeout".into() });
        relay.inject(RelayCallback::JoinRoomFailed { code: 32758, message: "gone".into() });
        session.poll(&mut relay, &mut bus);

        assert_eq!(
            bus.drain::<ConnectionStateChanged>(),
            vec![ConnectionStateChanged(true), ConnectionStateChanged(false)]
        );
    }

    #[test]
    fn anchor_id_requires_joined_room() {
        let server = FakeRoomServer::new();
        server.set_property(KEY, "X123");
        let (mut relay, callbacks) = server.peer();
        let session = SessionAdapter::new(KEY, callbacks);

        assert_eq!(session.anchor_id(&relay), None);

        relay.join_or_create_room("lobby");
        assert_eq!(session.anchor_id(&relay), Some("X123".to_string()));
    }

    #[test]
    fn share_is_first_writer_wins() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let session = SessionAdapter::new(KEY, callbacks);
        relay.join_or_create_room("lobby");

        assert_eq!(session.share_anchor_id(&mut relay, "first"), Ok(true));
        assert_eq!(session.share_anchor_id(&mut relay, "second"), Ok(false));
        assert_eq!(session.share_anchor_id(&mut relay, "third"), Ok(false));

        assert_eq!(session.anchor_id(&relay), Some("first".to_string()));
    }

    #[test]
    fn share_outside_room_is_rejected() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let session = SessionAdapter::new(KEY, callbacks);

        assert_eq!(session.share_anchor_id(&mut relay, "X"), Err(SessionError::NotInRoom));
        assert_eq!(server.property(KEY), None);
    }

    #[test]
    fn property_updates_raise_shared_id_every_time() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let mut session = SessionAdapter::new(KEY, callbacks);
        let mut bus = MessageBus::new();

        relay.inject(RelayCallback::RoomPropertiesUpdated(props(KEY, "X123")));
        relay.inject(RelayCallback::RoomPropertiesUpdated(props(KEY, "X123")));
        relay.inject(RelayCallback::RoomPropertiesUpdated(props("Other", "ignored")));
        relay.inject(RelayCallback::RoomPropertiesUpdated(props(KEY, "")));
        session.poll(&mut relay, &mut bus);

        assert_eq!(
            bus.drain::<AnchorIdShared>(),
            vec![AnchorIdShared("X123".into()), AnchorIdShared("X123".into())]
        );
    }

    #[test]
    fn object_callbacks_become_notices() {
        let server = FakeRoomServer::new();
        let (mut relay, callbacks) = server.peer();
        let mut session = SessionAdapter::new(KEY, callbacks);
        let mut bus = MessageBus::new();

        relay.inject(RelayCallback::ObjectDestroyed(ViewId(4)));
        let notices = session.poll(&mut relay, &mut bus);

        assert_eq!(notices, vec![ObjectNotice::Destroyed(ViewId(4))]);
    }
}
