//=========================================================================
// Anchor Session
//=========================================================================
//
// Per-client orchestrator tying tracking, the cloud anchor service and the
// relay together.
//
// State machine:
// ```text
//   Disconnected ──joined──> ConnectedNoAnchor ──host_anchor()──> Hosting
//        ↑                        │      ↑                          │
//        │              id shared │      └──── failure ─────────────┤
//        │                        ↓                                 │ success
//        │                   Resolving{id} ── success ──> AnchorEstablished
//        │                        └── failure ─> previous          │
//        └──────────────────────── disconnected ───────────────────┘
// ```
//
// Tick order:
//   1. relay callbacks     (SessionAdapter::poll)
//   2. cloud completions   (CloudAnchorAdapter::poll)
//   3. session events      (MessageBus)
//   4. object notices      (SharedObjects)
//   5. tap                 placement while no cloud anchor, spawn when
//                          established
//   6. physics + objects
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use crossbeam_channel::Receiver;
use glam::{Quat, Vec3};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use crate::core::anchor::{
    AnchorPlacement, ArTracking, CloudAnchor, CloudAnchorAdapter, CloudAnchorId,
    CloudAnchorService, LocalAnchor,
};
use crate::core::config::SessionConfig;
use crate::core::events::{
    AnchorIdShared, CloudAnchorResolved, CloudOperation, CloudOperationCompleted,
    ConnectionStateChanged, LocalAnchorCreated,
};
use crate::core::input::{NoUi, Tap, UiHitTest};
use crate::core::log_box::LogBox;
use crate::core::math::Pose;
use crate::core::message_bus::MessageBus;
use crate::core::session::{
    ObjectNotice, RelayCallback, RelayService, SessionAdapter, SessionError, ViewId,
};
use crate::core::shared_object::SharedObjects;
use crate::core::world::{BallisticPhysics, EntityId, PhysicsStep, SceneGraph};

const CLOUD_SIGN_COUNT: usize = 2;

/// Seconds a spawn impulse waits for the relay to confirm its object.
const SPAWN_CONFIRM_TIMEOUT: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
struct PendingImpulse {
    impulse: Vec3,
    remaining: f32,
}

//=== SessionState ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    ConnectedNoAnchor,
    Hosting,
    Resolving { id: String },
    AnchorEstablished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::ConnectedNoAnchor => write!(f, "connected, no anchor"),
            Self::Hosting => write!(f, "hosting"),
            Self::Resolving { id } => write!(f, "resolving {}", id),
            Self::AnchorEstablished => write!(f, "anchor established"),
        }
    }
}

//=== Presentation ========================================================

/// What the UI layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Room name field and connect button.
    pub connect_panel_visible: bool,
    /// Host button.
    pub anchor_panel_visible: bool,
    /// Markers shown on the anchor once it is shared through the cloud.
    pub cloud_signs_visible: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            connect_panel_visible: true,
            anchor_panel_visible: false,
            cloud_signs_visible: false,
        }
    }
}

//=== Collaborators =======================================================

/// External services a session runs against.
pub struct Collaborators {
    pub tracking: Box<dyn ArTracking>,
    pub cloud: Box<dyn CloudAnchorService>,
    pub relay: Box<dyn RelayService>,
    /// Channel the relay implementation delivers callbacks on.
    pub relay_callbacks: Receiver<RelayCallback>,
    pub ui: Box<dyn UiHitTest>,
    /// Ballistic physics with the configured gravity when `None`.
    pub physics: Option<Box<dyn PhysicsStep>>,
}

impl Collaborators {
    pub fn new(
        tracking: impl ArTracking + 'static,
        cloud: impl CloudAnchorService + 'static,
        relay: impl RelayService + 'static,
        relay_callbacks: Receiver<RelayCallback>,
    ) -> Self {
        Self {
            tracking: Box::new(tracking),
            cloud: Box::new(cloud),
            relay: Box::new(relay),
            relay_callbacks,
            ui: Box::new(NoUi),
            physics: None,
        }
    }

    pub fn with_ui(mut self, ui: impl UiHitTest + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }

    pub fn with_physics(mut self, physics: impl PhysicsStep + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }
}

//=== AnchorSession =======================================================

pub struct AnchorSession {
    config: SessionConfig,

    // Collaborators
    tracking: Box<dyn ArTracking>,
    cloud_service: Box<dyn CloudAnchorService>,
    relay: Box<dyn RelayService>,
    ui: Box<dyn UiHitTest>,
    physics: Box<dyn PhysicsStep>,

    // Adapters
    room: SessionAdapter,
    placement: AnchorPlacement,
    cloud: CloudAnchorAdapter,
    objects: SharedObjects,

    scene: SceneGraph,
    bus: MessageBus,
    log: LogBox,
    rng: StdRng,

    state: SessionState,
    presentation: Presentation,
    marker: EntityId,
    cloud_signs: [EntityId; CLOUD_SIGN_COUNT],
    /// Spawn impulses waiting for the relay to confirm the object.
    pending_impulses: HashMap<ViewId, PendingImpulse>,
}

impl AnchorSession {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            tracking,
            cloud,
            relay,
            relay_callbacks,
            ui,
            physics,
        } = collaborators;

        let physics: Box<dyn PhysicsStep> = match physics {
            Some(physics) => physics,
            None => Box::new(BallisticPhysics::new(config.gravity)),
        };
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Anchor marker: tagged root networked objects attach to
        let mut scene = SceneGraph::new();
        let marker = scene.spawn("AnchorMarker", Pose::IDENTITY);
        scene.set_tag(marker, config.anchor_tag.clone());
        let cloud_signs = std::array::from_fn(|i| {
            let sign = scene.spawn(format!("CloudSign {}", i), Pose::IDENTITY);
            scene.set_parent(sign, Some(marker));
            scene.set_active(sign, false);
            sign
        });

        Self {
            room: SessionAdapter::new(config.anchor_key.clone(), relay_callbacks),
            placement: AnchorPlacement::new(),
            cloud: CloudAnchorAdapter::new(),
            objects: SharedObjects::new(config.anchor_tag.clone(), config.jump_tuning()),
            log: LogBox::new(config.log_lines),
            bus: MessageBus::new(),
            config,
            tracking,
            cloud_service: cloud,
            relay,
            ui,
            physics,
            scene,
            rng,
            state: SessionState::Disconnected,
            presentation: Presentation::default(),
            marker,
            cloud_signs,
            pending_impulses: HashMap::new(),
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn connected(&self) -> bool {
        self.room.connected()
    }

    pub fn log(&self) -> &LogBox {
        &self.log
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn objects(&self) -> &SharedObjects {
        &self.objects
    }

    pub fn local_anchor(&self) -> Option<&LocalAnchor> {
        self.placement.anchor()
    }

    pub fn cloud_anchor(&self) -> Option<&CloudAnchor> {
        self.cloud.anchor()
    }

    /// Tagged entity that follows the current anchor.
    pub fn marker(&self) -> EntityId {
        self.marker
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Own spawns the relay has not confirmed yet.
    pub fn pending_spawns(&self) -> usize {
        self.pending_impulses.len()
    }

    //--- Commands ---------------------------------------------------------

    /// Connects to `room`. Blank names are rejected without a relay call.
    pub fn connect(&mut self, room: &str) -> Result<(), SessionError> {
        match self.room.connect(self.relay.as_mut(), room) {
            Ok(()) => {
                self.log.push(format!("Photon:connecting to {}...", room));
                Ok(())
            }
            Err(SessionError::EmptyRoomName) => {
                self.log.push("Photon:roomName empty!");
                Err(SessionError::EmptyRoomName)
            }
            Err(e) => {
                warn!(target: "session", "Connect refused: {}", e);
                Err(e)
            }
        }
    }

    /// Hosts the local anchor. Only valid while connected without an
    /// anchor and with no cloud operation running.
    pub fn host_anchor(&mut self) -> bool {
        if self.state != SessionState::ConnectedNoAnchor {
            debug!(target: "session", "Host ignored while {}", self.state);
            return false;
        }

        self.log.push("Anchor:hosting cloud anchor...");
        if !self.cloud.host(self.cloud_service.as_mut(), self.placement.anchor()) {
            self.log.push("Anchor:hosting cloud anchor failed");
            return false;
        }

        self.state = SessionState::Hosting;
        true
    }

    //--- tick() -----------------------------------------------------------

    /// Runs one frame. `tap` is this frame's raw tap, gated here through
    /// the UI hit test.
    pub fn tick(&mut self, tap: Option<Tap>, dt: f32) {
        let notices = self.room.poll(self.relay.as_mut(), &mut self.bus);
        self.cloud.poll(&mut self.scene, &mut self.bus);

        self.handle_session_events();
        self.handle_object_notices(notices);
        self.expire_pending_impulses(dt);

        if let Some(tap) = tap.filter(|t| !self.ui.is_over_ui(t.x, t.y)) {
            self.handle_tap(tap);
        }

        self.physics.step(&mut self.scene, dt);
        self.objects.update(
            &mut self.scene,
            self.physics.as_mut(),
            self.relay.as_mut(),
            dt,
        );
    }

    //--- Event Handling ---------------------------------------------------

    fn handle_session_events(&mut self) {
        for ConnectionStateChanged(connected) in self.bus.drain::<ConnectionStateChanged>() {
            if connected {
                self.on_joined();
            } else {
                self.on_disconnected();
            }
        }

        for resolved in self.bus.drain::<CloudAnchorResolved>() {
            self.on_cloud_anchor_resolved(resolved.established);
        }

        for completed in self.bus.drain::<CloudOperationCompleted>() {
            self.on_cloud_operation_completed(completed);
        }

        for AnchorIdShared(id) in self.bus.drain::<AnchorIdShared>() {
            self.on_anchor_id_shared(id);
        }
    }

    fn on_joined(&mut self) {
        self.log.push("Photon:connected!");
        self.presentation.connect_panel_visible = false;
        self.presentation.anchor_panel_visible = self.cloud.anchor().is_none();
        self.state = self.settled_state();

        match self.room.anchor_id(self.relay.as_ref()) {
            Some(id) => {
                self.log.push("Photon:already anchor hosted");
                self.on_anchor_id_shared(id);
            }
            None => {
                self.log.push("Photon:no anchor hosted");
                if let Some(own) = self.cloud.anchor_id().cloned() {
                    self.publish(&own);
                }
            }
        }

        if self.state == SessionState::AnchorEstablished {
            self.relay.set_interest_group(self.config.object_group, true);
        }
    }

    fn on_disconnected(&mut self) {
        self.log.push("Photon:disconnected...");
        self.presentation.connect_panel_visible = true;
        self.presentation.anchor_panel_visible = false;
        self.state = SessionState::Disconnected;

        self.objects.clear(&mut self.scene, self.physics.as_mut());
        self.pending_impulses.clear();
    }

    fn on_cloud_anchor_resolved(&mut self, established: bool) {
        self.set_cloud_signs(established);
        if established {
            self.presentation.anchor_panel_visible = false;
        }
        self.relay.set_interest_group(self.config.object_group, established);

        if let Some(entity) = self.cloud.anchor().map(|a| a.entity) {
            self.attach_marker(entity);
        }
    }

    fn on_cloud_operation_completed(&mut self, completed: CloudOperationCompleted) {
        match (completed.operation, completed.anchor_id) {
            (CloudOperation::Host, Some(id)) => {
                self.log.push("Anchor:cloud anchor hosted!");
                self.publish(&CloudAnchorId::new(id));
            }
            (CloudOperation::Host, None) => {
                self.log.push("Anchor:hosting cloud anchor failed");
            }
            (CloudOperation::Resolve, Some(_)) => {
                self.log.push("Anchor:cloud anchor resolved!");
            }
            (CloudOperation::Resolve, None) => {
                self.log.push("Anchor:resolving cloud anchor failed");
            }
        }
        if self.cloud.in_flight().is_none() {
            self.state = self.settled_state();
        }
    }

    fn on_anchor_id_shared(&mut self, id: String) {
        self.log.push(id.clone());

        if self.cloud.anchor_id().map(CloudAnchorId::as_str) == Some(id.as_str()) {
            debug!(target: "session", "Shared id {} is our own anchor", id);
            return;
        }
        if let SessionState::Resolving { id: current } = &self.state {
            if *current == id {
                debug!(target: "session", "Already resolving {}", id);
                return;
            }
        }

        self.log.push("Anchor:resolving cloud anchor...");
        self.cloud
            .resolve(self.cloud_service.as_mut(), &CloudAnchorId::new(id.clone()));
        self.state = SessionState::Resolving { id };
    }

    fn handle_object_notices(&mut self, notices: Vec<ObjectNotice>) {
        for notice in notices {
            let spawned = match &notice {
                ObjectNotice::Instantiated(info) if info.is_mine => Some(info.view),
                _ => None,
            };

            self.objects
                .on_notice(notice, &mut self.scene, self.physics.as_mut());

            if let Some(view) = spawned {
                if let Some(pending) = self.pending_impulses.remove(&view) {
                    self.objects
                        .add_impulse(view, pending.impulse, self.physics.as_mut());
                }
            }
        }
    }

    fn expire_pending_impulses(&mut self, dt: f32) {
        self.pending_impulses.retain(|view, pending| {
            pending.remaining -= dt;
            if pending.remaining > 0.0 {
                return true;
            }
            warn!(target: "session", "Relay never confirmed {}, dropping its impulse", view);
            false
        });
    }

    //--- Tap --------------------------------------------------------------

    fn handle_tap(&mut self, tap: Tap) {
        if self.cloud.anchor().is_none() {
            self.placement.place(
                tap,
                self.tracking.as_mut(),
                &mut self.scene,
                &mut self.bus,
            );
            if self.bus.drain::<LocalAnchorCreated>().pop().is_some() {
                self.on_local_anchor_created();
            }
        } else if self.state == SessionState::AnchorEstablished {
            self.spawn_object(tap);
        }
    }

    fn on_local_anchor_created(&mut self) {
        let Some(entity) = self.placement.anchor().map(|a| a.entity) else {
            return;
        };
        self.attach_marker(entity);
        self.set_cloud_signs(false);
        self.log.push("Anchor:local anchor created!");
    }

    fn spawn_object(&mut self, tap: Tap) {
        let position = self
            .tracking
            .screen_to_world(tap.x, tap.y, self.config.front_distance);
        let forward = self.tracking.camera_forward();
        let yaw: f32 = self.rng.gen_range(0.0..360.0);
        let pose = Pose::new(position, Quat::from_rotation_y(yaw.to_radians()));

        let view = self
            .relay
            .instantiate(&self.config.object_prefab, pose, self.config.object_group);
        let impulse = forward * self.config.throw_forward + Vec3::Y * self.config.throw_up;
        self.pending_impulses.insert(
            view,
            PendingImpulse {
                impulse,
                remaining: SPAWN_CONFIRM_TIMEOUT,
            },
        );

        debug!(target: "session", "Spawned {} at {:?}", view, position);
    }

    //--- Internal Helpers -------------------------------------------------

    /// State implied by membership and the held cloud anchor.
    fn settled_state(&self) -> SessionState {
        if !self.room.connected() {
            SessionState::Disconnected
        } else if self.cloud.anchor().is_some() {
            SessionState::AnchorEstablished
        } else {
            SessionState::ConnectedNoAnchor
        }
    }

    fn publish(&mut self, id: &CloudAnchorId) {
        if !self.room.connected() {
            debug!(target: "session", "Holding {} until a room is joined", id);
            return;
        }
        if let Err(e) = self.room.share_anchor_id(self.relay.as_mut(), id.as_str()) {
            warn!(target: "session", "Could not share {}: {}", id, e);
        }
    }

    fn attach_marker(&mut self, anchor: EntityId) {
        self.scene.set_parent(self.marker, Some(anchor));
        self.scene.set_local_pose(self.marker, Pose::IDENTITY);
    }

    fn set_cloud_signs(&mut self, visible: bool) {
        for sign in self.cloud_signs {
            self.scene.set_active(sign, visible);
        }
        self.presentation.cloud_signs_visible = visible;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
