//=========================================================================
// Cloud Anchor Adapter
//=========================================================================
//
// Hosts local anchors on, and resolves ids through, a cloud anchor
// service.
//
// Architecture:
//   host()/resolve() ──> CloudAnchorService ──> Pending<CloudAnchorResult>
//                                                   │
//   poll() each tick <──────────────────────────────┘
//     ├─ Success → replace cloud anchor, CloudAnchorResolved
//     └─ other   → state unchanged
//     └─ always  → CloudOperationCompleted
//
// Failures are never retried. Callers see a failed operation only as a
// completion without an anchor id.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::placement::LocalAnchor;
use crate::core::events::{CloudAnchorResolved, CloudOperation, CloudOperationCompleted};
use crate::core::math::Pose;
use crate::core::message_bus::MessageBus;
use crate::core::pending::{Completion, Pending};
use crate::core::world::{EntityId, SceneGraph};

//=== CloudAnchorId =======================================================

/// Opaque, shareable identifier of a hosted anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CloudAnchorId(String);

impl CloudAnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CloudAnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CloudAnchorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

//=== CloudResponse =======================================================

/// Response code reported by the cloud anchor service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudResponse {
    Success,
    ErrorInternal,
    ErrorNotAuthorized,
    ErrorServiceUnreachable,
    ErrorRequestThrottled,
    ErrorResourceExhausted,
    /// Not enough visual data was gathered around the anchor.
    ErrorDatasetInadequate,
    ErrorCloudIdNotFound,
    ErrorLocalizationFailed,
    ErrorSdkVersionTooOld,
    ErrorSdkVersionTooNew,
}

impl CloudResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, CloudResponse::Success)
    }
}

impl fmt::Display for CloudResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::ErrorInternal => "internal error",
            Self::ErrorNotAuthorized => "not authorized",
            Self::ErrorServiceUnreachable => "service unreachable",
            Self::ErrorRequestThrottled => "request throttled",
            Self::ErrorResourceExhausted => "resource exhausted",
            Self::ErrorDatasetInadequate => "dataset inadequate",
            Self::ErrorCloudIdNotFound => "cloud id not found",
            Self::ErrorLocalizationFailed => "localization failed",
            Self::ErrorSdkVersionTooOld => "sdk version too old",
            Self::ErrorSdkVersionTooNew => "sdk version too new",
        };
        f.write_str(text)
    }
}

//=== Results =============================================================

/// Anchor data returned by the service on success.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedAnchor {
    pub id: CloudAnchorId,
    pub pose: Pose,
}

/// What a host or resolve call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAnchorResult {
    pub response: CloudResponse,
    pub anchor: Option<HostedAnchor>,
}

impl CloudAnchorResult {
    pub fn success(id: impl Into<String>, pose: Pose) -> Self {
        Self {
            response: CloudResponse::Success,
            anchor: Some(HostedAnchor {
                id: CloudAnchorId::new(id),
                pose,
            }),
        }
    }

    pub fn failure(response: CloudResponse) -> Self {
        Self {
            response,
            anchor: None,
        }
    }
}

/// The session's established cloud anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAnchor {
    pub id: CloudAnchorId,
    pub pose: Pose,
    /// Scene entity following the anchor.
    pub entity: EntityId,
}

//=== CloudAnchorService ==================================================

/// Cloud anchor backend. Both calls return immediately; the result is
/// delivered through the returned handle.
pub trait CloudAnchorService: Send {
    fn host(&mut self, anchor: &LocalAnchor) -> Pending<CloudAnchorResult>;

    fn resolve(&mut self, id: &CloudAnchorId) -> Pending<CloudAnchorResult>;
}

//=== CloudAnchorAdapter ==================================================

struct InFlight {
    operation: CloudOperation,
    pending: Pending<CloudAnchorResult>,
}

/// Tracks the one cloud anchor and the one in-flight operation.
pub struct CloudAnchorAdapter {
    anchor: Option<CloudAnchor>,
    in_flight: Option<InFlight>,
}

impl CloudAnchorAdapter {
    pub fn new() -> Self {
        Self {
            anchor: None,
            in_flight: None,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn anchor(&self) -> Option<&CloudAnchor> {
        self.anchor.as_ref()
    }

    pub fn anchor_id(&self) -> Option<&CloudAnchorId> {
        self.anchor.as_ref().map(|a| &a.id)
    }

    /// Operation currently awaiting its result.
    pub fn in_flight(&self) -> Option<CloudOperation> {
        self.in_flight.as_ref().map(|f| f.operation)
    }

    //--- Operations -------------------------------------------------------

    /// Submits the local anchor for hosting. No-op without one.
    pub fn host(
        &mut self,
        service: &mut dyn CloudAnchorService,
        local: Option<&LocalAnchor>,
    ) -> bool {
        let Some(local) = local else {
            debug!(target: "anchor", "Host requested without a local anchor");
            return false;
        };

        info!(target: "anchor", "Hosting local anchor {}", local.handle);
        let pending = service.host(local);
        self.begin(CloudOperation::Host, pending);
        true
    }

    /// Asks the service to resolve a shared id.
    pub fn resolve(&mut self, service: &mut dyn CloudAnchorService, id: &CloudAnchorId) {
        info!(target: "anchor", "Resolving cloud anchor {}", id);
        let pending = service.resolve(id);
        self.begin(CloudOperation::Resolve, pending);
    }

    /// Drops the in-flight operation; its result will be ignored.
    pub fn abandon(&mut self) -> Option<CloudOperation> {
        let abandoned = self.in_flight.take().map(|f| f.operation);
        if let Some(operation) = abandoned {
            debug!(target: "anchor", "Abandoned in-flight {:?}", operation);
        }
        abandoned
    }

    //--- poll() -----------------------------------------------------------
    //
    // Checks the in-flight operation. On completion pushes
    // CloudOperationCompleted, plus CloudAnchorResolved when the anchor
    // was set.
    //
    pub fn poll(&mut self, scene: &mut SceneGraph, bus: &mut MessageBus) {
        let Some(in_flight) = self.in_flight.as_ref() else {
            return;
        };
        let operation = in_flight.operation;

        let result = match in_flight.pending.poll() {
            Completion::Waiting => return,
            Completion::Ready(result) => Some(result),
            Completion::Abandoned => {
                warn!(target: "anchor", "Cloud service dropped {:?} without a result", operation);
                None
            }
        };
        self.in_flight = None;

        let anchor_id = result.and_then(|r| self.apply(operation, r, scene));
        if anchor_id.is_some() {
            bus.push(CloudAnchorResolved { established: true });
        }

        bus.push(CloudOperationCompleted {
            operation,
            anchor_id,
        });
    }

    //--- Internal Helpers -------------------------------------------------

    fn begin(&mut self, operation: CloudOperation, pending: Pending<CloudAnchorResult>) {
        if let Some(previous) = self.in_flight.take() {
            debug!(
                target: "anchor",
                "{:?} superseded by {:?}; its result will be ignored",
                previous.operation,
                operation
            );
        }
        self.in_flight = Some(InFlight { operation, pending });
    }

    fn apply(
        &mut self,
        operation: CloudOperation,
        result: CloudAnchorResult,
        scene: &mut SceneGraph,
    ) -> Option<String> {
        if !result.response.is_success() {
            match operation {
                CloudOperation::Resolve => {
                    error!(target: "anchor", "Resolve failed: {}", result.response)
                }
                CloudOperation::Host => {
                    debug!(target: "anchor", "Host failed: {}", result.response)
                }
            }
            return None;
        }

        let Some(hosted) = result.anchor else {
            warn!(target: "anchor", "{:?} reported success without an anchor", operation);
            return None;
        };

        if let Some(previous) = self.anchor.take() {
            scene.detach_children(previous.entity);
            scene.despawn(previous.entity);
        }

        let entity = scene.spawn(format!("CloudAnchor {}", hosted.id), hosted.pose);
        let id = hosted.id.as_str().to_string();
        info!(target: "anchor", "Cloud anchor {} established via {:?}", hosted.id, operation);

        self.anchor = Some(CloudAnchor {
            id: hosted.id,
            pose: hosted.pose,
            entity,
        });
        Some(id)
    }
}

impl Default for CloudAnchorAdapter {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anchor::tracking::AnchorHandle;
    use crate::core::testing::FakeCloud;
    use glam::Vec3;

    fn local(scene: &mut SceneGraph) -> LocalAnchor {
        let entity = scene.spawn("local", Pose::IDENTITY);
        LocalAnchor {
            handle: AnchorHandle(1),
            entity,
            pose: Pose::IDENTITY,
        }
    }

    fn cloud_pose() -> Pose {
        Pose::from_position(Vec3::new(0.5, 0.0, -1.0))
    }

    #[test]
    fn host_success_sets_anchor_and_raises_events() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();
        let anchor = local(&mut scene);

        assert!(adapter.host(&mut cloud, Some(&anchor)));
        adapter.poll(&mut scene, &mut bus);
        assert_eq!(adapter.in_flight(), Some(CloudOperation::Host));
        assert!(bus.drain::<CloudOperationCompleted>().is_empty());

        cloud.complete_next(CloudAnchorResult::success("X123", cloud_pose()));
        adapter.poll(&mut scene, &mut bus);

        assert_eq!(adapter.anchor_id(), Some(&CloudAnchorId::from("X123")));
        assert_eq!(adapter.in_flight(), None);
        assert_eq!(
            bus.drain::<CloudAnchorResolved>(),
            vec![CloudAnchorResolved { established: true }]
        );
        assert_eq!(
            bus.drain::<CloudOperationCompleted>(),
            vec![CloudOperationCompleted {
                operation: CloudOperation::Host,
                anchor_id: Some("X123".to_string()),
            }]
        );
        let entity = adapter.anchor().unwrap().entity;
        assert_eq!(scene.world_pose(entity), Some(cloud_pose()));
    }

    #[test]
    fn host_without_local_anchor_is_noop() {
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        assert!(!adapter.host(&mut cloud, None));
        assert_eq!(cloud.host_calls(), 0);
        assert_eq!(adapter.in_flight(), None);
    }

    #[test]
    fn non_success_leaves_state_unchanged() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        for response in [
            CloudResponse::ErrorInternal,
            CloudResponse::ErrorCloudIdNotFound,
            CloudResponse::ErrorDatasetInadequate,
        ] {
            adapter.resolve(&mut cloud, &CloudAnchorId::from("X123"));
            cloud.complete_next(CloudAnchorResult::failure(response));
            adapter.poll(&mut scene, &mut bus);

            assert!(adapter.anchor().is_none());
            assert!(!bus.has_messages::<CloudAnchorResolved>());
            let completed = bus.drain::<CloudOperationCompleted>();
            assert_eq!(completed.len(), 1);
            assert!(!completed[0].succeeded());
        }
    }

    #[test]
    fn failure_keeps_previous_anchor() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        adapter.resolve(&mut cloud, &"A".into());
        cloud.complete_next(CloudAnchorResult::success("A", Pose::IDENTITY));
        adapter.poll(&mut scene, &mut bus);

        adapter.resolve(&mut cloud, &"B".into());
        cloud.complete_next(CloudAnchorResult::failure(CloudResponse::ErrorLocalizationFailed));
        adapter.poll(&mut scene, &mut bus);

        assert_eq!(adapter.anchor_id(), Some(&CloudAnchorId::from("A")));
    }

    #[test]
    fn new_success_replaces_anchor_entity() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        adapter.resolve(&mut cloud, &"A".into());
        cloud.complete_next(CloudAnchorResult::success("A", Pose::IDENTITY));
        adapter.poll(&mut scene, &mut bus);
        let first = adapter.anchor().unwrap().entity;

        adapter.resolve(&mut cloud, &"B".into());
        cloud.complete_next(CloudAnchorResult::success("B", cloud_pose()));
        adapter.poll(&mut scene, &mut bus);

        assert!(!scene.contains(first));
        assert_eq!(adapter.anchor_id(), Some(&CloudAnchorId::from("B")));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn abandoned_operation_result_is_ignored() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        adapter.resolve(&mut cloud, &"A".into());
        assert_eq!(adapter.abandon(), Some(CloudOperation::Resolve));

        cloud.complete_next(CloudAnchorResult::success("A", Pose::IDENTITY));
        adapter.poll(&mut scene, &mut bus);

        assert!(adapter.anchor().is_none());
        assert!(!bus.has_messages::<CloudOperationCompleted>());
    }

    #[test]
    fn dropped_completer_reports_failed_completion() {
        let mut scene = SceneGraph::new();
        let mut bus = MessageBus::new();
        let mut cloud = FakeCloud::new();
        let mut adapter = CloudAnchorAdapter::new();

        adapter.resolve(&mut cloud, &"A".into());
        cloud.drop_pending();
        adapter.poll(&mut scene, &mut bus);

        let completed = bus.drain::<CloudOperationCompleted>();
        assert_eq!(completed.len(), 1);
        assert!(!completed[0].succeeded());
        assert_eq!(adapter.in_flight(), None);
    }

    #[test]
    fn response_display_is_readable() {
        assert_eq!(CloudResponse::ErrorCloudIdNotFound.to_string(), "cloud id not found");
        assert!(CloudResponse::Success.is_success());
    }
}
