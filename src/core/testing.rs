//=========================================================================
// Test Doubles
//=========================================================================
//
// In-memory collaborators for unit and scenario tests.
//
// Every fake is `Clone` and shares its state through `Arc<Mutex<_>>`, so a
// test can box one copy into the session and keep another to script and
// inspect it.
//
// - `FakeTracking`   scripted raycast hit, counts live anchors
// - `FakeCloud`      completes host/resolve calls on demand (FIFO)
// - `FakeRoomServer` one shared room; `peer()` hands out `FakeRelay`s
// - `init_logging`   env_logger in test mode
//
//=========================================================================

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec3;

use crate::core::anchor::{
    AnchorHandle, ArTracking, CloudAnchorId, CloudAnchorResult, CloudAnchorService, LocalAnchor,
    PlaneId, TrackableHit, TrackableHitFlags,
};
use crate::core::math::Pose;
use crate::core::pending::{pending, Completer, Pending};
use crate::core::session::{
    InterestGroup, NetworkObjectInfo, RelayCallback, RelayService, RoomProperties, ViewId,
};

/// Routes `log` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

//=== FakeTracking ========================================================

#[derive(Debug)]
struct TrackingState {
    hit: Option<TrackableHit>,
    last_flags: Option<TrackableHitFlags>,
    last_point: Option<(f32, f32)>,
    raycasts: usize,
    next_handle: u64,
    live: HashSet<AnchorHandle>,
    camera: Pose,
}

#[derive(Debug, Clone)]
pub struct FakeTracking {
    state: Arc<Mutex<TrackingState>>,
}

impl FakeTracking {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackingState {
                hit: None,
                last_flags: None,
                last_point: None,
                raycasts: 0,
                next_handle: 1,
                live: HashSet::new(),
                camera: Pose::IDENTITY,
            })),
        }
    }

    /// What every following raycast returns.
    pub fn set_hit(&mut self, hit: Option<TrackableHit>) {
        self.state.lock().unwrap().hit = hit;
    }

    pub fn set_camera(&mut self, camera: Pose) {
        self.state.lock().unwrap().camera = camera;
    }

    pub fn last_raycast_flags(&self) -> Option<TrackableHitFlags> {
        self.state.lock().unwrap().last_flags
    }

    /// Screen point of the latest raycast.
    pub fn last_raycast_point(&self) -> Option<(f32, f32)> {
        self.state.lock().unwrap().last_point
    }

    pub fn raycasts(&self) -> usize {
        self.state.lock().unwrap().raycasts
    }

    pub fn live_anchors(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }
}

impl ArTracking for FakeTracking {
    fn raycast(&self, x: f32, y: f32, flags: TrackableHitFlags) -> Option<TrackableHit> {
        let mut state = self.state.lock().unwrap();
        state.raycasts += 1;
        state.last_point = Some((x, y));
        state.last_flags = Some(flags);
        state.hit
    }

    fn create_anchor(&mut self, _plane: PlaneId, _pose: Pose) -> Option<AnchorHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = AnchorHandle(state.next_handle);
        state.next_handle += 1;
        state.live.insert(handle);
        Some(handle)
    }

    fn release_anchor(&mut self, anchor: AnchorHandle) {
        self.state.lock().unwrap().live.remove(&anchor);
    }

    fn screen_to_world(&self, _x: f32, _y: f32, depth: f32) -> Vec3 {
        let camera = self.state.lock().unwrap().camera;
        camera.position + camera.forward() * depth
    }

    fn camera_forward(&self) -> Vec3 {
        self.state.lock().unwrap().camera.forward()
    }
}

//=== FakeCloud ===========================================================

#[derive(Debug, Default)]
struct CloudState {
    outstanding: VecDeque<Completer<CloudAnchorResult>>,
    host_calls: usize,
    resolve_calls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<CloudState>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes the oldest outstanding call. Returns `false` when there
    /// was none or its result was abandoned.
    pub fn complete_next(&mut self, result: CloudAnchorResult) -> bool {
        let completer = self.state.lock().unwrap().outstanding.pop_front();
        completer.map(|c| c.complete(result)).unwrap_or(false)
    }

    /// Drops every outstanding completer without a value.
    pub fn drop_pending(&mut self) {
        self.state.lock().unwrap().outstanding.clear();
    }

    pub fn outstanding(&self) -> usize {
        self.state.lock().unwrap().outstanding.len()
    }

    pub fn host_calls(&self) -> usize {
        self.state.lock().unwrap().host_calls
    }

    pub fn resolve_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().resolve_calls.clone()
    }
}

impl CloudAnchorService for FakeCloud {
    fn host(&mut self, _anchor: &LocalAnchor) -> Pending<CloudAnchorResult> {
        let (completer, pending) = pending();
        let mut state = self.state.lock().unwrap();
        state.host_calls += 1;
        state.outstanding.push_back(completer);
        pending
    }

    fn resolve(&mut self, id: &CloudAnchorId) -> Pending<CloudAnchorResult> {
        let (completer, pending) = pending();
        let mut state = self.state.lock().unwrap();
        state.resolve_calls.push(id.as_str().to_string());
        state.outstanding.push_back(completer);
        pending
    }
}

//=== FakeRoomServer ======================================================

#[derive(Debug, Default)]
struct PeerSlot {
    callbacks: Option<Sender<RelayCallback>>,
    in_room: bool,
    room: Option<String>,
    groups: HashSet<InterestGroup>,
    connect_calls: usize,
    withhold_instantiations: bool,
    instantiated: Vec<(String, Pose, InterestGroup)>,
    destroyed: Vec<ViewId>,
    synced: Vec<(ViewId, Pose)>,
}

impl PeerSlot {
    fn send(&self, callback: RelayCallback) {
        if let Some(sender) = &self.callbacks {
            let _ = sender.send(callback);
        }
    }
}

#[derive(Debug, Default)]
struct RoomState {
    properties: RoomProperties,
    peers: Vec<PeerSlot>,
    next_view: u32,
    groups_of: HashMap<ViewId, InterestGroup>,
}

impl RoomState {
    /// Sends to other in-room peers listening to `group`.
    fn broadcast_group(&self, from: usize, group: InterestGroup, callback: RelayCallback) {
        for (index, peer) in self.peers.iter().enumerate() {
            if index != from && peer.in_room && peer.groups.contains(&group) {
                peer.send(callback.clone());
            }
        }
    }
}

/// A single shared room every peer joins, whatever name it asks for.
#[derive(Debug, Clone, Default)]
pub struct FakeRoomServer {
    state: Arc<Mutex<RoomState>>,
}

impl FakeRoomServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new client and the channel its callbacks arrive on.
    pub fn peer(&self) -> (FakeRelay, Receiver<RelayCallback>) {
        let (sender, receiver) = unbounded();
        let mut state = self.state.lock().unwrap();
        state.peers.push(PeerSlot {
            callbacks: Some(sender),
            ..PeerSlot::default()
        });
        let relay = FakeRelay {
            server: self.clone(),
            index: state.peers.len() - 1,
        };
        (relay, receiver)
    }

    /// Writes a property without notifying anyone.
    pub fn set_property(&self, key: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .properties
            .insert(key.to_string(), value.to_string());
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().properties.get(key).cloned()
    }
}

//=== FakeRelay ===========================================================

#[derive(Debug, Clone)]
pub struct FakeRelay {
    server: FakeRoomServer,
    index: usize,
}

impl FakeRelay {
    fn with_slot<R>(&self, f: impl FnOnce(&mut PeerSlot) -> R) -> R {
        let mut state = self.server.state.lock().unwrap();
        f(&mut state.peers[self.index])
    }

    /// Delivers a callback to this peer as if the relay sent it.
    pub fn inject(&mut self, callback: RelayCallback) {
        self.with_slot(|slot| slot.send(callback));
    }

    /// Leaves the room and reports `Disconnected`.
    pub fn drop_connection(&mut self, cause: &str) {
        self.with_slot(|slot| {
            slot.in_room = false;
            slot.send(RelayCallback::Disconnected {
                cause: cause.to_string(),
            });
        });
    }

    pub fn connect_calls(&self) -> usize {
        self.with_slot(|slot| slot.connect_calls)
    }

    pub fn room(&self) -> Option<String> {
        self.with_slot(|slot| slot.room.clone())
    }

    /// Stops confirming this peer's own instantiations back to it.
    pub fn withhold_instantiations(&self) {
        self.with_slot(|slot| slot.withhold_instantiations = true);
    }

    pub fn instantiated(&self) -> Vec<(String, Pose, InterestGroup)> {
        self.with_slot(|slot| slot.instantiated.clone())
    }

    pub fn destroyed(&self) -> Vec<ViewId> {
        self.with_slot(|slot| slot.destroyed.clone())
    }

    pub fn synced(&self) -> Vec<(ViewId, Pose)> {
        self.with_slot(|slot| slot.synced.clone())
    }

    pub fn listens_to(&self, group: InterestGroup) -> bool {
        self.with_slot(|slot| slot.groups.contains(&group))
    }
}

impl RelayService for FakeRelay {
    fn connect(&mut self) {
        self.with_slot(|slot| {
            slot.connect_calls += 1;
            slot.send(RelayCallback::ConnectedToMaster);
        });
    }

    fn join_or_create_room(&mut self, room: &str) {
        self.with_slot(|slot| {
            slot.in_room = true;
            slot.room = Some(room.to_string());
            slot.send(RelayCallback::JoinedRoom);
        });
    }

    fn in_room(&self) -> bool {
        self.with_slot(|slot| slot.in_room)
    }

    fn room_property(&self, key: &str) -> Option<String> {
        self.server.property(key)
    }

    fn set_room_properties(&mut self, properties: RoomProperties) {
        let mut state = self.server.state.lock().unwrap();
        if !state.peers[self.index].in_room {
            return;
        }
        state.properties.extend(properties.clone());
        for peer in state.peers.iter().filter(|p| p.in_room) {
            peer.send(RelayCallback::RoomPropertiesUpdated(properties.clone()));
        }
    }

    fn instantiate(&mut self, prefab: &str, pose: Pose, group: InterestGroup) -> ViewId {
        let mut state = self.server.state.lock().unwrap();
        state.next_view += 1;
        let view = ViewId(state.next_view);
        state.groups_of.insert(view, group);

        let info = NetworkObjectInfo {
            view,
            prefab: prefab.to_string(),
            pose,
            group,
            is_mine: true,
        };
        let slot = &mut state.peers[self.index];
        slot.instantiated.push((prefab.to_string(), pose, group));
        if !slot.withhold_instantiations {
            slot.send(RelayCallback::ObjectInstantiated(info.clone()));
        }

        let remote = NetworkObjectInfo {
            is_mine: false,
            ..info
        };
        state.broadcast_group(self.index, group, RelayCallback::ObjectInstantiated(remote));
        view
    }

    fn destroy(&mut self, view: ViewId) {
        let mut state = self.server.state.lock().unwrap();
        state.peers[self.index].destroyed.push(view);
        if let Some(group) = state.groups_of.remove(&view) {
            state.broadcast_group(self.index, group, RelayCallback::ObjectDestroyed(view));
        }
    }

    fn sync_transform(&mut self, view: ViewId, local_pose: Pose) {
        let mut state = self.server.state.lock().unwrap();
        state.peers[self.index].synced.push((view, local_pose));
        if let Some(&group) = state.groups_of.get(&view) {
            state.broadcast_group(
                self.index,
                group,
                RelayCallback::ObjectTransformSynced { view, local_pose },
            );
        }
    }

    fn set_interest_group(&mut self, group: InterestGroup, enabled: bool) {
        self.with_slot(|slot| {
            if enabled {
                slot.groups.insert(group);
            } else {
                slot.groups.remove(&group);
            }
        });
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_writes_reach_every_peer_in_room() {
        let server = FakeRoomServer::new();
        let (mut a, a_rx) = server.peer();
        let (mut b, b_rx) = server.peer();
        a.join_or_create_room("r");
        b.join_or_create_room("r");
        let _ = a_rx.try_iter().count();
        let _ = b_rx.try_iter().count();

        let mut props = RoomProperties::new();
        props.insert("K".into(), "V".into());
        a.set_room_properties(props.clone());

        assert_eq!(a_rx.try_recv(), Ok(RelayCallback::RoomPropertiesUpdated(props.clone())));
        assert_eq!(b_rx.try_recv(), Ok(RelayCallback::RoomPropertiesUpdated(props)));
        assert_eq!(b.room_property("K"), Some("V".to_string()));
    }

    #[test]
    fn objects_reach_only_listening_peers() {
        let server = FakeRoomServer::new();
        let (mut a, _a_rx) = server.peer();
        let (mut b, b_rx) = server.peer();
        a.join_or_create_room("r");
        b.join_or_create_room("r");
        let _ = b_rx.try_iter().count();

        a.instantiate("Andy", Pose::IDENTITY, InterestGroup(1));
        assert!(b_rx.try_recv().is_err());

        b.set_interest_group(InterestGroup(1), true);
        let view = a.instantiate("Andy", Pose::IDENTITY, InterestGroup(1));
        match b_rx.try_recv() {
            Ok(RelayCallback::ObjectInstantiated(info)) => {
                assert_eq!(info.view, view);
                assert!(!info.is_mine);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
