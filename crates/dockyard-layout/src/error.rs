//! Error types for loading, mutating, and measuring a layout model.

use dockyard_core::{Edge, Orientation};
use thiserror::Error;

use crate::action::DropLocation;
use crate::node::{NodeId, NodeKind};

/// Fatal errors raised while constructing or validating a [`Model`](crate::Model).
///
/// Loading fails closed: no partially-initialized model is ever returned.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed layout document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id {id}")]
    DuplicateId { id: NodeId },

    #[error("duplicate border location {location}")]
    DuplicateBorder { location: Edge },

    #[error("root node {id} must be a row")]
    RootNotRow { id: NodeId },

    #[error("node {id} references missing node {missing}")]
    MissingNode { id: NodeId, missing: NodeId },

    #[error("node {id} parent mismatch: expected {expected:?}, got {actual:?}")]
    ParentMismatch {
        id: NodeId,
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("{parent_kind} {parent} cannot contain {child_kind} {child}")]
    InvalidChild {
        parent: NodeId,
        parent_kind: NodeKind,
        child: NodeId,
        child_kind: NodeKind,
    },

    #[error("container {id} has invalid selection {selected} ({count} children)")]
    InvalidSelection {
        id: NodeId,
        selected: i64,
        count: usize,
    },

    #[error("border {id} lists invalid visible tab {index} ({count} children)")]
    InvalidVisibleTab {
        id: NodeId,
        index: usize,
        count: usize,
    },

    #[error("border {id} has {weights} tile weights for {tiles} visible tabs")]
    TileWeightMismatch {
        id: NodeId,
        weights: usize,
        tiles: usize,
    },

    #[error("node {id} has non-positive weight {weight}")]
    NonPositiveWeight { id: NodeId, weight: f64 },

    #[error("container {id} is empty")]
    EmptyContainer { id: NodeId },

    #[error("row {id} has {count} children")]
    DegenerateRow { id: NodeId, count: usize },

    #[error("floating window {id} has an invalid rect")]
    InvalidWindowRect { id: NodeId },

    #[error("node {id} is unreachable from the layout roots")]
    Unreachable { id: NodeId },

    #[error("floating window z-order does not match the window list")]
    ZOrderMismatch,

    #[error("{role} tabset {id} does not exist")]
    DanglingTabsetRef { id: NodeId, role: &'static str },

    #[error("flyout references tab {tab} outside border {border}")]
    InvalidFlyout { border: NodeId, tab: NodeId },
}

/// Non-fatal rejection of a single action.
///
/// A rejected action leaves the model exactly as it was and emits no change
/// notification.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("node {id} not found")]
    UnknownNode { id: NodeId },

    #[error("node {id} is a {actual}, expected {expected}")]
    WrongKind {
        id: NodeId,
        expected: &'static str,
        actual: NodeKind,
    },

    #[error("{given} weights supplied for {expected} children of {id}")]
    WeightCountMismatch {
        id: NodeId,
        given: usize,
        expected: usize,
    },

    #[error("weights must be finite and positive")]
    NonPositiveWeight,

    #[error("orientation {given} does not match row {id} ({actual})")]
    OrientationMismatch {
        id: NodeId,
        given: Orientation,
        actual: Orientation,
    },

    #[error("{feature} is disabled on node {id}")]
    Disabled { id: NodeId, feature: &'static str },

    #[error("drop location {location} is not accepted by {id}")]
    InvalidLocation { id: NodeId, location: DropLocation },

    #[error("action would not change the layout")]
    NoEffect,

    #[error("tab {id} is not in a floating window")]
    NotFloating { id: NodeId },

    #[error("border {id} already shows {max} tiles")]
    TooManyTiles { id: NodeId, max: usize },

    #[error("attribute {key} cannot be changed through attribute updates")]
    ReservedAttribute { key: String },

    #[error("invalid attributes: {0}")]
    InvalidAttributes(#[source] serde_json::Error),

    #[error("node id {id} is already in use")]
    DuplicateId { id: NodeId },

    #[error("tab {tab} is not a child of {container}")]
    NotInContainer { tab: NodeId, container: NodeId },

    #[error("flyout is not open")]
    NoFlyout,

    #[error("invariant violated: {0}")]
    Invariant(#[from] ModelError),
}

impl ActionError {
    pub(crate) fn unknown(id: &NodeId) -> Self {
        Self::UnknownNode { id: id.clone() }
    }

    pub(crate) fn wrong_kind(id: &NodeId, expected: &'static str, actual: NodeKind) -> Self {
        Self::WrongKind {
            id: id.clone(),
            expected,
            actual,
        }
    }
}

/// Errors from geometry queries against the last computed layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("no layout has been computed yet")]
    NoLayout,

    #[error("row {id} has no computed geometry")]
    UnknownRow { id: NodeId },

    #[error("splitter {index} out of range for {id} ({count} children)")]
    SplitterOutOfRange {
        id: NodeId,
        index: usize,
        count: usize,
    },

    #[error("border {id} has no computed geometry")]
    UnknownBorder { id: NodeId },

    #[error("floating window {id} not found")]
    UnknownWindow { id: NodeId },
}
