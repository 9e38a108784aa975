//=========================================================================
// Session Events
//=========================================================================
//
// Typed payloads carried on the MessageBus between the adapters and the
// orchestrator.
//
// Delivery semantics differ per event:
// - `ConnectionStateChanged` is raised only when the flag flips
// - `AnchorIdShared` is raised on every matching room property delivery,
//   duplicates included
//
//=========================================================================

/// A new local anchor replaced the previous one (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAnchorCreated;

/// The cloud anchor was set (hosted or resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudAnchorResolved {
    pub established: bool,
}

/// Room membership flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStateChanged(pub bool);

/// The room carries a non-empty anchor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorIdShared(pub String);

/// Which cloud operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudOperation {
    Host,
    Resolve,
}

/// A host or resolve finished, successfully or not.
///
/// `anchor_id` is `None` when the service reported a non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudOperationCompleted {
    pub operation: CloudOperation,
    pub anchor_id: Option<String>,
}

impl CloudOperationCompleted {
    pub fn succeeded(&self) -> bool {
        self.anchor_id.is_some()
    }
}
