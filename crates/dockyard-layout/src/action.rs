//! The closed set of model mutations.
//!
//! Actions are plain data: they serialize as `{"type": "moveNode", ...}` so a
//! session can be recorded and replayed against a fresh model.

use std::fmt;

use dockyard_core::{Edge, Orientation, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::TabJson;
use crate::node::{DockState, NodeId};

/// Where a dragged node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropLocation {
    /// Merge into the target container.
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl DropLocation {
    /// The split edge, or `None` for a center drop.
    #[must_use]
    pub const fn edge(self) -> Option<Edge> {
        match self {
            Self::Center => None,
            Self::Top => Some(Edge::Top),
            Self::Bottom => Some(Edge::Bottom),
            Self::Left => Some(Edge::Left),
            Self::Right => Some(Edge::Right),
        }
    }

    #[must_use]
    pub const fn from_edge(edge: Edge) -> Self {
        match edge {
            Edge::Top => Self::Top,
            Edge::Bottom => Self::Bottom,
            Edge::Left => Self::Left,
            Edge::Right => Self::Right,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for DropLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mutation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    SelectTab {
        tab: NodeId,
    },
    SetActiveTabset {
        tabset: Option<NodeId>,
    },
    /// Create a tab from JSON and place it at `to`.
    AddNode {
        json: TabJson,
        to: NodeId,
        location: DropLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select: Option<bool>,
    },
    /// Move a tab or a whole tabset.
    MoveNode {
        node: NodeId,
        to: NodeId,
        location: DropLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select: Option<bool>,
    },
    DeleteTab {
        tab: NodeId,
    },
    DeleteTabset {
        tabset: NodeId,
    },
    RenameTab {
        tab: NodeId,
        name: String,
    },
    MaximizeToggle {
        tabset: NodeId,
    },
    UpdateModelAttributes {
        attributes: Map<String, Value>,
    },
    UpdateNodeAttributes {
        node: NodeId,
        attributes: Map<String, Value>,
    },
    /// Replace a row's child weights verbatim.
    AdjustWeights {
        row: NodeId,
        weights: Vec<f64>,
        orientation: Orientation,
    },
    AdjustBorderSplit {
        border: NodeId,
        size: f64,
    },
    SetDockState {
        border: NodeId,
        state: DockState,
    },
    ToggleDockState {
        border: NodeId,
    },
    SplitBorderTab {
        border: NodeId,
        tab: NodeId,
    },
    UntileBorder {
        border: NodeId,
    },
    AdjustTileWeights {
        border: NodeId,
        weights: Vec<f64>,
    },
    FloatTab {
        tab: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rect: Option<Rect>,
    },
    FloatTabset {
        tabset: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rect: Option<Rect>,
    },
    DockTab {
        tab: NodeId,
        to: NodeId,
        location: DropLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    DockTabset {
        window: NodeId,
        to: NodeId,
        location: DropLocation,
    },
    MoveWindow {
        window: NodeId,
        x: f64,
        y: f64,
    },
    ResizeWindow {
        window: NodeId,
        rect: Rect,
    },
    FocusWindow {
        window: NodeId,
    },
    CloseWindow {
        window: NodeId,
    },
    OpenFlyout {
        border: NodeId,
        tab: NodeId,
    },
    CloseFlyout,
}

/// Stable discriminator for [`Action`], used in logs and spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SelectTab,
    SetActiveTabset,
    AddNode,
    MoveNode,
    DeleteTab,
    DeleteTabset,
    RenameTab,
    MaximizeToggle,
    UpdateModelAttributes,
    UpdateNodeAttributes,
    AdjustWeights,
    AdjustBorderSplit,
    SetDockState,
    ToggleDockState,
    SplitBorderTab,
    UntileBorder,
    AdjustTileWeights,
    FloatTab,
    FloatTabset,
    DockTab,
    DockTabset,
    MoveWindow,
    ResizeWindow,
    FocusWindow,
    CloseWindow,
    OpenFlyout,
    CloseFlyout,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectTab => "selectTab",
            Self::SetActiveTabset => "setActiveTabset",
            Self::AddNode => "addNode",
            Self::MoveNode => "moveNode",
            Self::DeleteTab => "deleteTab",
            Self::DeleteTabset => "deleteTabset",
            Self::RenameTab => "renameTab",
            Self::MaximizeToggle => "maximizeToggle",
            Self::UpdateModelAttributes => "updateModelAttributes",
            Self::UpdateNodeAttributes => "updateNodeAttributes",
            Self::AdjustWeights => "adjustWeights",
            Self::AdjustBorderSplit => "adjustBorderSplit",
            Self::SetDockState => "setDockState",
            Self::ToggleDockState => "toggleDockState",
            Self::SplitBorderTab => "splitBorderTab",
            Self::UntileBorder => "untileBorder",
            Self::AdjustTileWeights => "adjustTileWeights",
            Self::FloatTab => "floatTab",
            Self::FloatTabset => "floatTabset",
            Self::DockTab => "dockTab",
            Self::DockTabset => "dockTabset",
            Self::MoveWindow => "moveWindow",
            Self::ResizeWindow => "resizeWindow",
            Self::FocusWindow => "focusWindow",
            Self::CloseWindow => "closeWindow",
            Self::OpenFlyout => "openFlyout",
            Self::CloseFlyout => "closeFlyout",
        }
    }

    /// Whether the action can restructure the tree.
    ///
    /// Structural actions run on a cloned working model that is validated
    /// before it replaces the live one. The rest check their preconditions
    /// up front and then write in place.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(
            self,
            Self::SelectTab
                | Self::SetActiveTabset
                | Self::RenameTab
                | Self::MaximizeToggle
                | Self::AdjustWeights
                | Self::AdjustBorderSplit
                | Self::AdjustTileWeights
                | Self::MoveWindow
                | Self::ResizeWindow
                | Self::FocusWindow
                | Self::OpenFlyout
                | Self::CloseFlyout
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::SelectTab { .. } => ActionKind::SelectTab,
            Self::SetActiveTabset { .. } => ActionKind::SetActiveTabset,
            Self::AddNode { .. } => ActionKind::AddNode,
            Self::MoveNode { .. } => ActionKind::MoveNode,
            Self::DeleteTab { .. } => ActionKind::DeleteTab,
            Self::DeleteTabset { .. } => ActionKind::DeleteTabset,
            Self::RenameTab { .. } => ActionKind::RenameTab,
            Self::MaximizeToggle { .. } => ActionKind::MaximizeToggle,
            Self::UpdateModelAttributes { .. } => ActionKind::UpdateModelAttributes,
            Self::UpdateNodeAttributes { .. } => ActionKind::UpdateNodeAttributes,
            Self::AdjustWeights { .. } => ActionKind::AdjustWeights,
            Self::AdjustBorderSplit { .. } => ActionKind::AdjustBorderSplit,
            Self::SetDockState { .. } => ActionKind::SetDockState,
            Self::ToggleDockState { .. } => ActionKind::ToggleDockState,
            Self::SplitBorderTab { .. } => ActionKind::SplitBorderTab,
            Self::UntileBorder { .. } => ActionKind::UntileBorder,
            Self::AdjustTileWeights { .. } => ActionKind::AdjustTileWeights,
            Self::FloatTab { .. } => ActionKind::FloatTab,
            Self::FloatTabset { .. } => ActionKind::FloatTabset,
            Self::DockTab { .. } => ActionKind::DockTab,
            Self::DockTabset { .. } => ActionKind::DockTabset,
            Self::MoveWindow { .. } => ActionKind::MoveWindow,
            Self::ResizeWindow { .. } => ActionKind::ResizeWindow,
            Self::FocusWindow { .. } => ActionKind::FocusWindow,
            Self::CloseWindow { .. } => ActionKind::CloseWindow,
            Self::OpenFlyout { .. } => ActionKind::OpenFlyout,
            Self::CloseFlyout => ActionKind::CloseFlyout,
        }
    }

    #[must_use]
    pub fn select_tab(tab: impl Into<NodeId>) -> Self {
        Self::SelectTab { tab: tab.into() }
    }

    #[must_use]
    pub fn delete_tab(tab: impl Into<NodeId>) -> Self {
        Self::DeleteTab { tab: tab.into() }
    }

    /// Move `node` to `to` at `location`, appending for center drops.
    #[must_use]
    pub fn move_node(node: impl Into<NodeId>, to: impl Into<NodeId>, location: DropLocation) -> Self {
        Self::MoveNode {
            node: node.into(),
            to: to.into(),
            location,
            index: None,
            select: None,
        }
    }

    #[must_use]
    pub fn add_node(json: TabJson, to: impl Into<NodeId>, location: DropLocation) -> Self {
        Self::AddNode {
            json,
            to: to.into(),
            location,
            index: None,
            select: None,
        }
    }

    #[must_use]
    pub fn adjust_weights(row: impl Into<NodeId>, weights: Vec<f64>, orientation: Orientation) -> Self {
        Self::AdjustWeights {
            row: row.into(),
            weights,
            orientation,
        }
    }

    #[must_use]
    pub fn set_dock_state(border: impl Into<NodeId>, state: DockState) -> Self {
        Self::SetDockState {
            border: border.into(),
            state,
        }
    }

    #[must_use]
    pub fn float_tab(tab: impl Into<NodeId>) -> Self {
        Self::FloatTab {
            tab: tab.into(),
            rect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_use_a_type_tag() {
        let action = Action::move_node("tab1", "ts2", DropLocation::Left);
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value,
            json!({"type": "moveNode", "node": "tab1", "to": "ts2", "location": "left"})
        );
        let back: Action = serde_json::from_value(value).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn fields_are_camel_case() {
        let value = json!({
            "type": "adjustWeights",
            "row": "r0",
            "weights": [37.5, 62.5],
            "orientation": "horizontal"
        });
        let action: Action = serde_json::from_value(value).unwrap();
        assert_eq!(action.kind(), ActionKind::AdjustWeights);
        assert_eq!(action.kind().to_string(), "adjustWeights");
    }

    #[test]
    fn unit_action_round_trips() {
        let value = serde_json::to_value(Action::CloseFlyout).unwrap();
        assert_eq!(value, json!({"type": "closeFlyout"}));
    }

    #[test]
    fn hot_path_actions_are_not_structural() {
        assert!(!ActionKind::AdjustWeights.is_structural());
        assert!(!ActionKind::MoveWindow.is_structural());
        assert!(ActionKind::MoveNode.is_structural());
        assert!(ActionKind::SetDockState.is_structural());
    }

    #[test]
    fn drop_location_edges() {
        assert_eq!(DropLocation::Center.edge(), None);
        for edge in Edge::ALL {
            assert_eq!(DropLocation::from_edge(edge).edge(), Some(edge));
        }
    }
}
