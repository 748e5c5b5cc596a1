//! Node records stored in the model arena.
//!
//! Every node carries its own id and, where applicable, a parent back-link
//! and an ordered child list. Attribute structs hold the persisted per-node
//! settings; unset policy attributes fall back to [`GlobalConfig`].

use std::borrow::Borrow;
use std::fmt;

use dockyard_core::weights::SizeBounds;
use dockyard_core::{Edge, Orientation, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GlobalConfig;

/// Stable identifier for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Discriminator for the closed set of node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Row,
    TabSet,
    Tab,
    Border,
    Window,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::TabSet => "tabset",
            Self::Tab => "tab",
            Self::Border => "border",
            Self::Window => "window",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a tab's close button is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseType {
    Always,
    OnHover,
    Never,
}

/// Which side of a tabset carries its tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabLocation {
    Top,
    Bottom,
}

/// Border docking state.
///
/// ```text
/// Expanded -> Collapsed -> Hidden -> Expanded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockState {
    /// Tab strip and content both occupy layout space.
    #[default]
    Expanded,
    /// Only the tab strip remains.
    Collapsed,
    /// Nothing but a dock toggle affordance remains.
    #[serde(alias = "minimized")]
    Hidden,
}

impl DockState {
    /// Next state in the toggle cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Expanded => Self::Collapsed,
            Self::Collapsed => Self::Hidden,
            Self::Hidden => Self::Expanded,
        }
    }
}

pub(crate) const DEFAULT_WEIGHT: f64 = 100.0;

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Factory key the host uses to build the tab's content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Opaque consumer payload, never interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_drag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rename: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_float: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_type: Option<CloseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabSetAttributes {
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_drag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_maximize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_tab_strip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_divide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_delete_when_empty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_select_tab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_location: Option<TabLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TabSetAttributes {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            name: None,
            enable_drop: None,
            enable_drag: None,
            enable_close: None,
            enable_maximize: None,
            enable_tab_strip: None,
            enable_divide: None,
            enable_delete_when_empty: None,
            auto_select_tab: None,
            tab_location: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            class_name: None,
            config: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowAttributes {
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RowAttributes {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderAttributes {
    /// Content size in pixels along the border's growth axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<f64>,
    pub dock_state: DockState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_select_tab_when_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tiles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Split container. Orientation is derived from depth, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub attrs: RowAttributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabSetNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// `None` exactly when the tabset is empty.
    pub selected: Option<usize>,
    pub attrs: TabSetAttributes,
}

impl TabSetNode {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            selected: None,
            attrs: TabSetAttributes::default(),
        }
    }

    #[must_use]
    pub fn selected_tab(&self) -> Option<&NodeId> {
        self.selected.and_then(|index| self.children.get(index))
    }

    #[must_use]
    pub fn enable_drop(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_drop.unwrap_or(config.tabset_enable_drop)
    }

    #[must_use]
    pub fn enable_drag(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_drag.unwrap_or(config.tabset_enable_drag)
    }

    #[must_use]
    pub fn enable_close(&self) -> bool {
        self.attrs.enable_close.unwrap_or(true)
    }

    #[must_use]
    pub fn enable_divide(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_divide.unwrap_or(config.tabset_enable_divide)
    }

    #[must_use]
    pub fn enable_maximize(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .enable_maximize
            .unwrap_or(config.tabset_enable_maximize)
    }

    #[must_use]
    pub fn enable_tab_strip(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .enable_tab_strip
            .unwrap_or(config.tabset_enable_tab_strip)
    }

    #[must_use]
    pub fn enable_delete_when_empty(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .enable_delete_when_empty
            .unwrap_or(config.tabset_enable_delete_when_empty)
    }

    #[must_use]
    pub fn auto_select_tab(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .auto_select_tab
            .unwrap_or(config.tabset_auto_select_tab)
    }

    #[must_use]
    pub fn tab_location(&self, config: &GlobalConfig) -> TabLocation {
        self.attrs
            .tab_location
            .unwrap_or(config.tabset_tab_location)
    }

    /// Pixel bounds along `axis`.
    #[must_use]
    pub fn bounds(&self, axis: Orientation, config: &GlobalConfig) -> SizeBounds {
        match axis {
            Orientation::Horizontal => SizeBounds::new(
                self.attrs.min_width.unwrap_or(config.tabset_min_width),
                self.attrs.max_width.unwrap_or(config.tabset_max_width),
            ),
            Orientation::Vertical => SizeBounds::new(
                self.attrs.min_height.unwrap_or(config.tabset_min_height),
                self.attrs.max_height.unwrap_or(config.tabset_max_height),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabNode {
    pub id: NodeId,
    /// Owning tabset, border, or floating window.
    pub parent: Option<NodeId>,
    pub attrs: TabAttributes,
}

impl TabNode {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.attrs.name
    }

    #[must_use]
    pub fn enable_close(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_close.unwrap_or(config.tab_enable_close)
    }

    #[must_use]
    pub fn enable_drag(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_drag.unwrap_or(config.tab_enable_drag)
    }

    #[must_use]
    pub fn enable_rename(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_rename.unwrap_or(config.tab_enable_rename)
    }

    #[must_use]
    pub fn enable_float(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_float.unwrap_or(config.tab_enable_float)
    }

    #[must_use]
    pub fn close_type(&self, config: &GlobalConfig) -> CloseType {
        self.attrs.close_type.unwrap_or(config.tab_close_type)
    }
}

/// Fixed-edge docking container.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderNode {
    pub id: NodeId,
    pub location: Edge,
    pub children: Vec<NodeId>,
    /// Active tab among `visible_tabs`.
    pub selected: Option<usize>,
    /// Indices of the tabs currently shown, one tile each.
    pub visible_tabs: Vec<usize>,
    /// One weight per entry of `visible_tabs`.
    pub tile_weights: Vec<f64>,
    pub attrs: BorderAttributes,
}

impl BorderNode {
    #[cfg(test)]
    pub(crate) fn new(id: NodeId, location: Edge) -> Self {
        Self {
            id,
            location,
            children: Vec::new(),
            selected: None,
            visible_tabs: Vec::new(),
            tile_weights: Vec::new(),
            attrs: BorderAttributes::default(),
        }
    }

    #[must_use]
    pub fn dock_state(&self) -> DockState {
        self.attrs.dock_state
    }

    #[must_use]
    pub fn is_tiled(&self) -> bool {
        self.visible_tabs.len() > 1
    }

    #[must_use]
    pub fn selected_tab(&self) -> Option<&NodeId> {
        self.selected.and_then(|index| self.children.get(index))
    }

    /// Configured content size clamped into the border's own bounds.
    #[must_use]
    pub fn size(&self, config: &GlobalConfig) -> f64 {
        let size = self.attrs.size.unwrap_or(config.border_size);
        self.size_bounds(config).clamp(size)
    }

    #[must_use]
    pub fn size_bounds(&self, config: &GlobalConfig) -> SizeBounds {
        SizeBounds::new(
            self.attrs.min_size.unwrap_or(config.border_min_size),
            self.attrs.max_size.unwrap_or(config.border_max_size),
        )
    }

    #[must_use]
    pub fn enable_drop(&self, config: &GlobalConfig) -> bool {
        self.attrs.enable_drop.unwrap_or(config.border_enable_drop)
    }

    #[must_use]
    pub fn enable_auto_hide(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .enable_auto_hide
            .unwrap_or(config.border_enable_auto_hide)
    }

    #[must_use]
    pub fn auto_select_tab_when_open(&self, config: &GlobalConfig) -> bool {
        self.attrs
            .auto_select_tab_when_open
            .unwrap_or(config.border_auto_select_tab_when_open)
    }

    #[must_use]
    pub fn max_tiles(&self, config: &GlobalConfig) -> usize {
        self.attrs.max_tiles.unwrap_or(config.border_max_tiles).max(1)
    }
}

/// Detached, freely positioned tab container.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowNode {
    pub id: NodeId,
    pub children: Vec<NodeId>,
    pub selected: Option<usize>,
    pub rect: Rect,
    pub attrs: WindowAttributes,
}

impl WindowNode {
    #[must_use]
    pub fn selected_tab(&self) -> Option<&NodeId> {
        self.selected.and_then(|index| self.children.get(index))
    }
}

/// Any node stored in the model arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Row(RowNode),
    TabSet(TabSetNode),
    Tab(TabNode),
    Border(BorderNode),
    Window(WindowNode),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Row(node) => &node.id,
            Self::TabSet(node) => &node.id,
            Self::Tab(node) => &node.id,
            Self::Border(node) => &node.id,
            Self::Window(node) => &node.id,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Row(_) => NodeKind::Row,
            Self::TabSet(_) => NodeKind::TabSet,
            Self::Tab(_) => NodeKind::Tab,
            Self::Border(_) => NodeKind::Border,
            Self::Window(_) => NodeKind::Window,
        }
    }

    /// Parent link. Borders and windows hang off the model itself.
    #[must_use]
    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Self::Row(node) => node.parent.as_ref(),
            Self::TabSet(node) => node.parent.as_ref(),
            Self::Tab(node) => node.parent.as_ref(),
            Self::Border(_) | Self::Window(_) => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Row(node) => node.parent = parent,
            Self::TabSet(node) => node.parent = parent,
            Self::Tab(node) => node.parent = parent,
            Self::Border(_) | Self::Window(_) => {}
        }
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Row(node) => &node.children,
            Self::TabSet(node) => &node.children,
            Self::Border(node) => &node.children,
            Self::Window(node) => &node.children,
            Self::Tab(_) => &[],
        }
    }

    /// Selected child index for tab containers.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        match self {
            Self::TabSet(node) => node.selected,
            Self::Border(node) => node.selected,
            Self::Window(node) => node.selected,
            Self::Row(_) | Self::Tab(_) => None,
        }
    }

    /// Split weight for row children.
    #[must_use]
    pub fn weight(&self) -> Option<f64> {
        match self {
            Self::Row(node) => Some(node.attrs.weight),
            Self::TabSet(node) => Some(node.attrs.weight),
            _ => None,
        }
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        match self {
            Self::Row(node) => node.attrs.weight = weight,
            Self::TabSet(node) => node.attrs.weight = weight,
            _ => {}
        }
    }

    #[must_use]
    pub fn as_row(&self) -> Option<&RowNode> {
        match self {
            Self::Row(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tabset(&self) -> Option<&TabSetNode> {
        match self {
            Self::TabSet(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tab(&self) -> Option<&TabNode> {
        match self {
            Self::Tab(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_border(&self) -> Option<&BorderNode> {
        match self {
            Self::Border(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_window(&self) -> Option<&WindowNode> {
        match self {
            Self::Window(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn as_row_mut(&mut self) -> Option<&mut RowNode> {
        match self {
            Self::Row(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn as_tab_mut(&mut self) -> Option<&mut TabNode> {
        match self {
            Self::Tab(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn as_border_mut(&mut self) -> Option<&mut BorderNode> {
        match self {
            Self::Border(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn as_window_mut(&mut self) -> Option<&mut WindowNode> {
        match self {
            Self::Window(node) => Some(node),
            _ => None,
        }
    }
}

/// Selection after removing the child at `removed` from a container that
/// now holds `remaining` children.
///
/// Removing the selected child selects its previous neighbour, falling back
/// to the first child, then to nothing. Removing a child before the selected
/// one shifts the selection down.
#[must_use]
pub(crate) fn selection_after_removal(
    selected: Option<usize>,
    removed: usize,
    remaining: usize,
) -> Option<usize> {
    let selected = selected?;
    if remaining == 0 {
        return None;
    }
    if selected == removed {
        Some(selected.saturating_sub(1).min(remaining - 1))
    } else if selected > removed {
        Some(selected - 1)
    } else {
        Some(selected)
    }
}

/// Selection after inserting a child at `inserted`.
#[must_use]
pub(crate) fn selection_after_insert(selected: Option<usize>, inserted: usize) -> Option<usize> {
    selected.map(|s| if s >= inserted { s + 1 } else { s })
}
