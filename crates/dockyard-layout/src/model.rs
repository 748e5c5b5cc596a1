//! The layout model: an id-indexed arena of rows, tabsets, tabs, borders,
//! and floating windows.
//!
//! # Invariants
//!
//! 1. Every node is reachable from the root row, a border, or a window, and
//!    its parent link names the container that lists it.
//! 2. Non-root rows hold at least two children. The root holds at least one.
//! 3. Tabsets and windows select a valid child exactly when non-empty.
//! 4. Border `visible_tabs` entries are valid, distinct child indices, the
//!    selection is one of them, and `tile_weights` matches them one to one.
//! 5. Row and tabset weights are finite and positive.
//! 6. The z-order is a permutation of the window list.
//!
//! [`Model::validate`] checks all of them. Structural actions are applied to
//! a clone, validated, and only then swapped in.

use dockyard_core::{Edge, Orientation, Rect};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

use crate::config::GlobalConfig;
use crate::error::{ActionError, ModelError};
use crate::flyout::Flyout;
use crate::layout::LayoutSnapshot;
use crate::node::{
    BorderNode, Node, NodeId, NodeKind, RowAttributes, RowNode, TabNode, TabSetNode, WindowNode,
    selection_after_insert, selection_after_removal,
};

/// Root aggregate of the layout.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) config: GlobalConfig,
    pub(crate) nodes: FxHashMap<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) borders: Vec<NodeId>,
    /// Floating windows in creation order.
    pub(crate) windows: Vec<NodeId>,
    /// Floating windows back to front.
    pub(crate) z_order: Vec<NodeId>,
    pub(crate) active_tabset: Option<NodeId>,
    pub(crate) maximized_tabset: Option<NodeId>,
    pub(crate) flyout: Option<Flyout>,
    pub(crate) next_id: u64,
    pub(crate) revision: u64,
    pub(crate) last_layout: Option<LayoutSnapshot>,
    pub(crate) extensions: Map<String, Value>,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(GlobalConfig::default())
    }
}

impl Model {
    /// An empty layout: a root row holding one placeholder tabset.
    #[must_use]
    pub fn with_config(config: GlobalConfig) -> Self {
        let mut model = Self::empty(config);
        let root = model.alloc_id();
        model.nodes.insert(
            root.clone(),
            Node::Row(RowNode {
                id: root.clone(),
                parent: None,
                children: Vec::new(),
                attrs: RowAttributes::default(),
            }),
        );
        model.root = root.clone();
        model.insert_placeholder();
        model
    }

    pub(crate) fn empty(config: GlobalConfig) -> Self {
        Self {
            config,
            nodes: FxHashMap::default(),
            root: NodeId::from(""),
            borders: Vec::new(),
            windows: Vec::new(),
            z_order: Vec::new(),
            active_tabset: None,
            maximized_tabset: None,
            flyout: None,
            next_id: 0,
            revision: 0,
            last_layout: None,
            extensions: Map::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    /// O(1) lookup. Unknown ids return `None`.
    #[must_use]
    pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    #[must_use]
    pub fn root(&self) -> Option<&RowNode> {
        self.nodes.get(&self.root).and_then(Node::as_row)
    }

    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    #[must_use]
    pub fn is_root_orientation_vertical(&self) -> bool {
        self.config.root_orientation_vertical
    }

    #[must_use]
    pub fn splitter_size(&self) -> f64 {
        self.config.splitter_size
    }

    /// Borders in document order.
    pub fn borders(&self) -> impl Iterator<Item = &BorderNode> {
        self.borders
            .iter()
            .filter_map(|id| self.nodes.get(id).and_then(Node::as_border))
    }

    #[must_use]
    pub fn border(&self, location: Edge) -> Option<&BorderNode> {
        self.borders().find(|border| border.location == location)
    }

    /// Floating windows in creation order.
    pub fn windows(&self) -> impl Iterator<Item = &WindowNode> {
        self.windows
            .iter()
            .filter_map(|id| self.nodes.get(id).and_then(Node::as_window))
    }

    /// Window ids back to front.
    #[must_use]
    pub fn z_order(&self) -> &[NodeId] {
        &self.z_order
    }

    #[must_use]
    pub fn active_tabset(&self) -> Option<&NodeId> {
        self.active_tabset.as_ref()
    }

    #[must_use]
    pub fn maximized_tabset(&self) -> Option<&NodeId> {
        self.maximized_tabset.as_ref()
    }

    #[must_use]
    pub fn flyout(&self) -> Option<&Flyout> {
        self.flyout.as_ref()
    }

    /// Number of actions applied since the model was created or loaded.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn last_layout(&self) -> Option<&LayoutSnapshot> {
        self.last_layout.as_ref()
    }

    /// Top-level document keys this version does not interpret.
    #[must_use]
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    /// Nesting depth of a docked row or tabset, the root row being depth 0.
    #[must_use]
    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = self.nodes.get(id)?;
        while let Some(parent) = cursor.parent() {
            match cursor.kind() {
                NodeKind::Row | NodeKind::TabSet => {}
                _ => return None,
            }
            depth += 1;
            cursor = self.nodes.get(parent)?;
        }
        (cursor.id() == &self.root).then_some(depth)
    }

    /// Main axis of a row, derived from its depth.
    #[must_use]
    pub fn orientation_of(&self, row: &NodeId) -> Option<Orientation> {
        self.nodes.get(row)?.as_row()?;
        let depth = self.depth_of(row)?;
        Some(Orientation::at_depth(depth, self.config.root_orientation_vertical))
    }

    /// Tabsets reachable from the root row, in depth-first order.
    #[must_use]
    pub fn tabsets(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            match self.nodes.get(&id) {
                Some(Node::Row(row)) => stack.extend(row.children.iter().rev().cloned()),
                Some(Node::TabSet(_)) => out.push(id),
                _ => {}
            }
        }
        out
    }

    /// Every tab id in the model.
    #[must_use]
    pub fn tab_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.kind() == NodeKind::Tab)
            .map(|node| node.id().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Whether two models describe the same persisted layout.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.to_document() == other.to_document()
    }

    // ---------------------------------------------------------------------
    // Arena helpers
    // ---------------------------------------------------------------------

    /// Allocate a fresh `#<n>` id that no node uses.
    pub(crate) fn alloc_id(&mut self) -> NodeId {
        loop {
            let candidate = NodeId::new(format!("#{}", self.next_id));
            self.next_id += 1;
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn node(&self, id: &NodeId) -> Result<&Node, ActionError> {
        self.nodes.get(id).ok_or_else(|| ActionError::unknown(id))
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, ActionError> {
        self.nodes.get_mut(id).ok_or_else(|| ActionError::unknown(id))
    }

    pub(crate) fn tabset(&self, id: &NodeId) -> Result<&TabSetNode, ActionError> {
        let node = self.node(id)?;
        node.as_tabset()
            .ok_or_else(|| ActionError::wrong_kind(id, "tabset", node.kind()))
    }

    pub(crate) fn row(&self, id: &NodeId) -> Result<&RowNode, ActionError> {
        let node = self.node(id)?;
        node.as_row()
            .ok_or_else(|| ActionError::wrong_kind(id, "row", node.kind()))
    }

    pub(crate) fn row_mut(&mut self, id: &NodeId) -> Result<&mut RowNode, ActionError> {
        let node = self.node_mut(id)?;
        let kind = node.kind();
        node.as_row_mut()
            .ok_or_else(|| ActionError::wrong_kind(id, "row", kind))
    }

    pub(crate) fn tab(&self, id: &NodeId) -> Result<&TabNode, ActionError> {
        let node = self.node(id)?;
        node.as_tab()
            .ok_or_else(|| ActionError::wrong_kind(id, "tab", node.kind()))
    }

    pub(crate) fn border_node(&self, id: &NodeId) -> Result<&BorderNode, ActionError> {
        let node = self.node(id)?;
        node.as_border()
            .ok_or_else(|| ActionError::wrong_kind(id, "border", node.kind()))
    }

    pub(crate) fn border_node_mut(&mut self, id: &NodeId) -> Result<&mut BorderNode, ActionError> {
        let node = self.node_mut(id)?;
        let kind = node.kind();
        node.as_border_mut()
            .ok_or_else(|| ActionError::wrong_kind(id, "border", kind))
    }

    pub(crate) fn window(&self, id: &NodeId) -> Result<&WindowNode, ActionError> {
        let node = self.node(id)?;
        node.as_window()
            .ok_or_else(|| ActionError::wrong_kind(id, "window", node.kind()))
    }

    pub(crate) fn window_mut(&mut self, id: &NodeId) -> Result<&mut WindowNode, ActionError> {
        let node = self.node_mut(id)?;
        let kind = node.kind();
        node.as_window_mut()
            .ok_or_else(|| ActionError::wrong_kind(id, "window", kind))
    }

    /// Container holding `tab` and the tab's index in it.
    pub(crate) fn tab_position(&self, tab: &NodeId) -> Result<(NodeId, usize), ActionError> {
        let parent = self
            .tab(tab)?
            .parent
            .clone()
            .ok_or_else(|| ActionError::unknown(tab))?;
        let index = self
            .node(&parent)?
            .children()
            .iter()
            .position(|child| child == tab)
            .ok_or_else(|| ActionError::unknown(tab))?;
        Ok((parent, index))
    }

    /// Parent row of a docked row or tabset and the child's index in it.
    pub(crate) fn row_position(&self, child: &NodeId) -> Result<(NodeId, usize), ActionError> {
        let parent = self
            .node(child)?
            .parent()
            .cloned()
            .ok_or_else(|| ActionError::unknown(child))?;
        let index = self
            .row(&parent)?
            .children
            .iter()
            .position(|id| id == child)
            .ok_or_else(|| ActionError::unknown(child))?;
        Ok((parent, index))
    }

    pub(crate) fn weight_of(&self, id: &NodeId) -> f64 {
        self.nodes
            .get(id)
            .and_then(Node::weight)
            .unwrap_or(crate::node::DEFAULT_WEIGHT)
    }

    pub(crate) fn set_weight(&mut self, id: &NodeId, weight: f64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_weight(weight);
        }
    }

    pub(crate) fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        if self.active_tabset.as_ref() == Some(id) {
            self.active_tabset = None;
        }
        if self.maximized_tabset.as_ref() == Some(id) {
            self.maximized_tabset = None;
        }
        self.nodes.remove(id)
    }

    /// Remove a tab from the arena entirely. The tab must be detached.
    pub(crate) fn drop_tab(&mut self, tab: &NodeId) {
        let _ = self.remove_node(tab);
    }

    // ---------------------------------------------------------------------
    // Tab ownership transfer
    // ---------------------------------------------------------------------

    /// Unlink `tab` from its container and repair the container's selection.
    ///
    /// Empty containers are left in place for [`Model::tidy`] to collect.
    pub(crate) fn detach_tab(&mut self, tab: &NodeId) -> Result<(), ActionError> {
        let (container, index) = self.tab_position(tab)?;
        match self.node_mut(&container)? {
            Node::TabSet(tabset) => {
                tabset.children.remove(index);
                tabset.selected =
                    selection_after_removal(tabset.selected, index, tabset.children.len());
            }
            Node::Window(window) => {
                window.children.remove(index);
                window.selected =
                    selection_after_removal(window.selected, index, window.children.len());
            }
            Node::Border(border) => border.remove_child(index),
            other => return Err(ActionError::wrong_kind(&container, "tab container", other.kind())),
        }
        if let Some(Node::Tab(node)) = self.nodes.get_mut(tab) {
            node.parent = None;
        }
        if self.flyout.as_ref().is_some_and(|flyout| &flyout.tab == tab) {
            self.flyout = None;
        }
        Ok(())
    }

    /// Insert a detached tab into a tabset, border, or window.
    ///
    /// Tabsets and windows select the new tab when `select` says so, when
    /// unspecified and the tabset auto-selects, or when it is their first
    /// tab. Borders follow their own selection rules.
    pub(crate) fn attach_tab(
        &mut self,
        tab: &NodeId,
        container: &NodeId,
        index: Option<usize>,
        select: Option<bool>,
    ) -> Result<usize, ActionError> {
        let auto_select = match self.node(container)? {
            Node::TabSet(tabset) => tabset.auto_select_tab(&self.config),
            _ => false,
        };
        let at = match self.node_mut(container)? {
            Node::TabSet(tabset) => {
                let at = index.unwrap_or(tabset.children.len()).min(tabset.children.len());
                tabset.children.insert(at, tab.clone());
                tabset.selected = selection_after_insert(tabset.selected, at);
                if select.unwrap_or(auto_select) || tabset.selected.is_none() {
                    tabset.selected = Some(at);
                }
                at
            }
            Node::Window(window) => {
                let at = index.unwrap_or(window.children.len()).min(window.children.len());
                window.children.insert(at, tab.clone());
                window.selected = selection_after_insert(window.selected, at);
                if select.unwrap_or(true) || window.selected.is_none() {
                    window.selected = Some(at);
                }
                at
            }
            Node::Border(border) => {
                border.insert_child(index, tab.clone(), select.unwrap_or(false))
            }
            other => return Err(ActionError::wrong_kind(container, "tab container", other.kind())),
        };
        if let Some(Node::Tab(node)) = self.nodes.get_mut(tab) {
            node.parent = Some(container.clone());
        }
        Ok(at)
    }

    // ---------------------------------------------------------------------
    // Row structure
    // ---------------------------------------------------------------------

    /// Create an empty tabset (not yet linked into any row).
    pub(crate) fn new_tabset(&mut self) -> NodeId {
        let id = self.alloc_id();
        self.nodes
            .insert(id.clone(), Node::TabSet(TabSetNode::new(id.clone())));
        id
    }

    pub(crate) fn new_row(&mut self, weight: f64) -> NodeId {
        let id = self.alloc_id();
        self.nodes.insert(
            id.clone(),
            Node::Row(RowNode {
                id: id.clone(),
                parent: None,
                children: Vec::new(),
                attrs: RowAttributes {
                    weight,
                    ..RowAttributes::default()
                },
            }),
        );
        id
    }

    fn insert_placeholder(&mut self) {
        let tabset = self.new_tabset();
        let root = self.root.clone();
        self.link_child(&root, tabset, None);
    }

    /// Link `child` into `row` at `index` (end when `None`).
    pub(crate) fn link_child(&mut self, row: &NodeId, child: NodeId, index: Option<usize>) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.set_parent(Some(row.clone()));
        }
        if let Some(Node::Row(parent)) = self.nodes.get_mut(row) {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, child);
        }
    }

    /// Unlink a row or tabset from its parent row without collapsing.
    pub(crate) fn unlink_child(&mut self, child: &NodeId) -> Result<(NodeId, usize), ActionError> {
        let (parent, index) = self.row_position(child)?;
        self.row_mut(&parent)?.children.remove(index);
        self.node_mut(child)?.set_parent(None);
        Ok((parent, index))
    }

    /// Unlink a row or tabset and repair the rows above it.
    pub(crate) fn remove_from_row(&mut self, child: &NodeId) -> Result<(), ActionError> {
        let (parent, _) = self.unlink_child(child)?;
        self.collapse_row(&parent)
    }

    /// Restore the row invariants after `row` lost a child.
    ///
    /// Empty rows disappear (the root gets a placeholder tabset instead), and
    /// a row left with one child is replaced by that child. A lone row child
    /// is spliced so that depth parity, and with it orientation, is kept.
    pub(crate) fn collapse_row(&mut self, row: &NodeId) -> Result<(), ActionError> {
        let children = self.row(row)?.children.clone();
        let is_root = *row == self.root;
        match children.as_slice() {
            [] if is_root => self.insert_placeholder(),
            [] => {
                let (parent, _) = self.unlink_child(row)?;
                let _ = self.remove_node(row);
                self.collapse_row(&parent)?;
            }
            [only] if is_root => {
                if let Some(Node::Row(inner)) = self.nodes.get(only) {
                    let grandchildren = inner.children.clone();
                    let only = only.clone();
                    self.row_mut(row)?.children.clear();
                    for child in grandchildren {
                        self.link_child(row, child, None);
                    }
                    let _ = self.remove_node(&only);
                    self.config.root_orientation_vertical = !self.config.root_orientation_vertical;
                    tracing::trace!(
                        target: "dockyard.model",
                        root = %row,
                        vertical = self.config.root_orientation_vertical,
                        "root hoisted its only row child"
                    );
                }
            }
            [only] => {
                let only = only.clone();
                let weight = self.weight_of(row);
                let (parent, index) = self.unlink_child(row)?;
                self.row_mut(row)?.children.clear();
                let _ = self.remove_node(row);
                if let Some(Node::Row(inner)) = self.nodes.get(&only) {
                    let grandchildren = inner.children.clone();
                    let weights: Vec<f64> = grandchildren.iter().map(|id| self.weight_of(id)).collect();
                    let scaled = dockyard_core::weights::scale_to_sum(&weights, weight);
                    let _ = self.remove_node(&only);
                    for (offset, (child, weight)) in grandchildren.into_iter().zip(scaled).enumerate() {
                        self.set_weight(&child, weight);
                        self.link_child(&parent, child, Some(index + offset));
                    }
                } else {
                    self.set_weight(&only, weight);
                    self.link_child(&parent, only, Some(index));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Collect empty containers left behind by a structural edit.
    ///
    /// Empty floating windows are destroyed. Empty tabsets are removed from
    /// their rows unless they are placeholders: tabsets that opt out of
    /// deletion, or the sole child of the root row.
    pub(crate) fn tidy(&mut self) -> Result<(), ActionError> {
        let empty_windows: Vec<NodeId> = self
            .windows()
            .filter(|window| window.children.is_empty())
            .map(|window| window.id.clone())
            .collect();
        for window in empty_windows {
            self.destroy_window(&window);
        }

        loop {
            let root_children = self.row(&self.root)?.children.len();
            let doomed = self.tabsets().into_iter().find(|id| {
                self.nodes.get(id).and_then(Node::as_tabset).is_some_and(|tabset| {
                    tabset.children.is_empty()
                        && tabset.enable_delete_when_empty(&self.config)
                        && !(root_children == 1 && tabset.parent.as_ref() == Some(&self.root))
                })
            });
            let Some(tabset) = doomed else { break };
            tracing::trace!(target: "dockyard.model", tabset = %tabset, "removing empty tabset");
            self.remove_from_row(&tabset)?;
            let _ = self.remove_node(&tabset);
        }
        Ok(())
    }

    pub(crate) fn destroy_window(&mut self, window: &NodeId) {
        self.windows.retain(|id| id != window);
        self.z_order.retain(|id| id != window);
        let _ = self.remove_node(window);
    }

    /// Create a floating window at `rect` and put it in front.
    pub(crate) fn new_window(&mut self, rect: Rect) -> NodeId {
        let id = self.alloc_id();
        self.nodes.insert(
            id.clone(),
            Node::Window(WindowNode {
                id: id.clone(),
                children: Vec::new(),
                selected: None,
                rect,
                attrs: Default::default(),
            }),
        );
        self.windows.push(id.clone());
        self.z_order.push(id.clone());
        id
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let root = self.nodes.get(&self.root).ok_or_else(|| ModelError::MissingNode {
            id: self.root.clone(),
            missing: self.root.clone(),
        })?;
        if root.kind() != NodeKind::Row {
            return Err(ModelError::RootNotRow {
                id: self.root.clone(),
            });
        }
        if root.parent().is_some() {
            return Err(ModelError::ParentMismatch {
                id: self.root.clone(),
                expected: None,
                actual: root.parent().cloned(),
            });
        }
        if root.children().is_empty() {
            return Err(ModelError::EmptyContainer {
                id: self.root.clone(),
            });
        }
        self.validate_docked(&self.root, &mut seen)?;

        let mut locations = FxHashSet::default();
        for id in &self.borders {
            let border = self.expect_kind(id, id, NodeKind::Border)?;
            let Node::Border(border) = border else {
                continue;
            };
            if !locations.insert(border.location) {
                return Err(ModelError::DuplicateBorder {
                    location: border.location,
                });
            }
            mark_seen(&mut seen, id)?;
            self.validate_tabs(id, &border.children, &mut seen)?;
            validate_border_selection(border)?;
        }

        for id in &self.windows {
            let Node::Window(window) = self.expect_kind(id, id, NodeKind::Window)? else {
                continue;
            };
            mark_seen(&mut seen, id)?;
            let rect = window.rect;
            let finite = [rect.x, rect.y, rect.width, rect.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
                return Err(ModelError::InvalidWindowRect { id: id.clone() });
            }
            if window.children.is_empty() {
                return Err(ModelError::EmptyContainer { id: id.clone() });
            }
            self.validate_tabs(id, &window.children, &mut seen)?;
            validate_selection(id, window.selected, window.children.len())?;
        }

        let mut z_sorted = self.z_order.clone();
        let mut w_sorted = self.windows.clone();
        z_sorted.sort();
        w_sorted.sort();
        if z_sorted != w_sorted {
            return Err(ModelError::ZOrderMismatch);
        }

        for (role, reference) in [
            ("active", &self.active_tabset),
            ("maximized", &self.maximized_tabset),
        ] {
            if let Some(id) = reference {
                let docked = self.nodes.get(id).is_some_and(|node| node.kind() == NodeKind::TabSet);
                if !docked {
                    return Err(ModelError::DanglingTabsetRef {
                        id: id.clone(),
                        role,
                    });
                }
            }
        }

        if let Some(flyout) = &self.flyout {
            let owned = self
                .nodes
                .get(&flyout.border)
                .and_then(Node::as_border)
                .is_some_and(|border| border.children.contains(&flyout.tab));
            if !owned {
                return Err(ModelError::InvalidFlyout {
                    border: flyout.border.clone(),
                    tab: flyout.tab.clone(),
                });
            }
        }

        if let Some(orphan) = self.nodes.keys().find(|id| !seen.contains(*id)) {
            return Err(ModelError::Unreachable { id: orphan.clone() });
        }
        Ok(())
    }

    fn expect_kind(
        &self,
        id: &NodeId,
        referrer: &NodeId,
        kind: NodeKind,
    ) -> Result<&Node, ModelError> {
        let node = self.nodes.get(id).ok_or_else(|| ModelError::MissingNode {
            id: referrer.clone(),
            missing: id.clone(),
        })?;
        if node.kind() != kind {
            return Err(ModelError::InvalidChild {
                parent: referrer.clone(),
                parent_kind: self
                    .nodes
                    .get(referrer)
                    .map_or(NodeKind::Row, Node::kind),
                child: id.clone(),
                child_kind: node.kind(),
            });
        }
        Ok(node)
    }

    fn validate_docked(&self, id: &NodeId, seen: &mut FxHashSet<NodeId>) -> Result<(), ModelError> {
        mark_seen(seen, id)?;
        let node = self.nodes.get(id).ok_or_else(|| ModelError::MissingNode {
            id: id.clone(),
            missing: id.clone(),
        })?;
        if let Some(weight) = node.weight()
            && !(weight.is_finite() && weight > 0.0)
        {
            return Err(ModelError::NonPositiveWeight {
                id: id.clone(),
                weight,
            });
        }
        match node {
            Node::Row(row) => {
                if *id != self.root && row.children.len() < 2 {
                    return Err(ModelError::DegenerateRow {
                        id: id.clone(),
                        count: row.children.len(),
                    });
                }
                for child in &row.children {
                    let child_node = self.nodes.get(child).ok_or_else(|| ModelError::MissingNode {
                        id: id.clone(),
                        missing: child.clone(),
                    })?;
                    if !matches!(child_node.kind(), NodeKind::Row | NodeKind::TabSet) {
                        return Err(ModelError::InvalidChild {
                            parent: id.clone(),
                            parent_kind: NodeKind::Row,
                            child: child.clone(),
                            child_kind: child_node.kind(),
                        });
                    }
                    check_parent(child, child_node.parent(), id)?;
                    self.validate_docked(child, seen)?;
                }
            }
            Node::TabSet(tabset) => {
                self.validate_tabs(id, &tabset.children, seen)?;
                validate_selection(id, tabset.selected, tabset.children.len())?;
            }
            other => {
                return Err(ModelError::InvalidChild {
                    parent: other.parent().cloned().unwrap_or_else(|| id.clone()),
                    parent_kind: NodeKind::Row,
                    child: id.clone(),
                    child_kind: other.kind(),
                });
            }
        }
        Ok(())
    }

    fn validate_tabs(
        &self,
        container: &NodeId,
        tabs: &[NodeId],
        seen: &mut FxHashSet<NodeId>,
    ) -> Result<(), ModelError> {
        for tab in tabs {
            let node = self.expect_kind(tab, container, NodeKind::Tab)?;
            check_parent(tab, node.parent(), container)?;
            mark_seen(seen, tab)?;
        }
        Ok(())
    }
}

fn mark_seen(seen: &mut FxHashSet<NodeId>, id: &NodeId) -> Result<(), ModelError> {
    if seen.insert(id.clone()) {
        Ok(())
    } else {
        Err(ModelError::DuplicateId { id: id.clone() })
    }
}

fn check_parent(id: &NodeId, actual: Option<&NodeId>, expected: &NodeId) -> Result<(), ModelError> {
    if actual == Some(expected) {
        Ok(())
    } else {
        Err(ModelError::ParentMismatch {
            id: id.clone(),
            expected: Some(expected.clone()),
            actual: actual.cloned(),
        })
    }
}

fn validate_selection(id: &NodeId, selected: Option<usize>, count: usize) -> Result<(), ModelError> {
    let valid = match selected {
        None => count == 0,
        Some(index) => index < count,
    };
    if valid {
        Ok(())
    } else {
        Err(ModelError::InvalidSelection {
            id: id.clone(),
            selected: selected.map_or(-1, |index| index as i64),
            count,
        })
    }
}

fn validate_border_selection(border: &BorderNode) -> Result<(), ModelError> {
    let count = border.children.len();
    let mut distinct = FxHashSet::default();
    for &index in &border.visible_tabs {
        if index >= count || !distinct.insert(index) {
            return Err(ModelError::InvalidVisibleTab {
                id: border.id.clone(),
                index,
                count,
            });
        }
    }
    let consistent = match border.selected {
        None => border.visible_tabs.is_empty(),
        Some(index) => border.visible_tabs.contains(&index),
    };
    if !consistent {
        return Err(ModelError::InvalidSelection {
            id: border.id.clone(),
            selected: border.selected.map_or(-1, |index| index as i64),
            count,
        });
    }
    if border.tile_weights.len() != border.visible_tabs.len() {
        return Err(ModelError::TileWeightMismatch {
            id: border.id.clone(),
            weights: border.tile_weights.len(),
            tiles: border.visible_tabs.len(),
        });
    }
    if let Some(&weight) = border
        .tile_weights
        .iter()
        .find(|w| !(w.is_finite() && **w > 0.0))
    {
        return Err(ModelError::NonPositiveWeight {
            id: border.id.clone(),
            weight,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_tab(model: &mut Model, tabset: &NodeId, name: &str) -> NodeId {
        let id = NodeId::from(name);
        model.nodes.insert(
            id.clone(),
            Node::Tab(TabNode {
                id: id.clone(),
                parent: None,
                attrs: Default::default(),
            }),
        );
        model.attach_tab(&id, tabset, None, None).unwrap();
        id
    }

    #[test]
    fn default_model_has_placeholder() {
        let model = Model::default();
        let root = model.root().unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(model.tabsets().len(), 1);
        model.validate().unwrap();
    }

    #[test]
    fn alloc_skips_ids_in_use() {
        let mut model = Model::default();
        let before: Vec<NodeId> = model.nodes.keys().cloned().collect();
        let fresh = model.alloc_id();
        assert!(!before.contains(&fresh));
        assert!(fresh.as_str().starts_with('#'));
    }

    #[test]
    fn detach_fixes_selection_and_tidy_keeps_placeholder() {
        let mut model = Model::default();
        let tabset = model.tabsets()[0].clone();
        let a = add_tab(&mut model, &tabset, "a");
        let b = add_tab(&mut model, &tabset, "b");
        assert_eq!(model.tabset(&tabset).unwrap().selected, Some(1));

        model.detach_tab(&b).unwrap();
        assert_eq!(model.tabset(&tabset).unwrap().selected, Some(0));
        model.drop_tab(&b);

        model.detach_tab(&a).unwrap();
        model.drop_tab(&a);
        model.tidy().unwrap();
        assert_eq!(model.tabsets(), vec![tabset.clone()]);
        assert_eq!(model.tabset(&tabset).unwrap().selected, None);
        model.validate().unwrap();
    }

    #[test]
    fn collapse_hoists_single_child() {
        let mut model = Model::default();
        let root = model.root.clone();
        let first = model.tabsets()[0].clone();
        add_tab(&mut model, &first, "a");

        // root[first, row[x, y]]
        let inner = model.new_row(100.0);
        model.link_child(&root, inner.clone(), None);
        let x = model.new_tabset();
        let y = model.new_tabset();
        model.link_child(&inner, x.clone(), None);
        model.link_child(&inner, y.clone(), None);
        add_tab(&mut model, &x, "x1");
        add_tab(&mut model, &y, "y1");
        model.validate().unwrap();

        model.remove_from_row(&y).unwrap();
        assert!(model.get_node_by_id(inner.as_str()).is_none());
        assert_eq!(model.row(&root).unwrap().children, vec![first, x.clone()]);
        assert_eq!(model.weight_of(&x), 100.0);
    }

    #[test]
    fn root_hoist_flips_orientation() {
        let mut model = Model::default();
        let root = model.root.clone();
        let placeholder = model.tabsets()[0].clone();
        let inner = model.new_row(100.0);
        model.link_child(&root, inner.clone(), None);
        let x = model.new_tabset();
        let y = model.new_tabset();
        model.link_child(&inner, x.clone(), None);
        model.link_child(&inner, y.clone(), None);
        assert_eq!(model.orientation_of(&inner), Some(Orientation::Vertical));

        model.remove_from_row(&placeholder).unwrap();
        let _ = model.remove_node(&placeholder);
        assert!(model.is_root_orientation_vertical());
        assert_eq!(model.row(&root).unwrap().children, vec![x, y]);
        assert_eq!(model.orientation_of(&root), Some(Orientation::Vertical));
    }

    #[test]
    fn validate_reports_unreachable_nodes() {
        let mut model = Model::default();
        let stray = NodeId::from("stray");
        model.nodes.insert(
            stray.clone(),
            Node::Tab(TabNode {
                id: stray.clone(),
                parent: None,
                attrs: Default::default(),
            }),
        );
        assert!(matches!(
            model.validate(),
            Err(ModelError::Unreachable { id }) if id == stray
        ));
    }
}
