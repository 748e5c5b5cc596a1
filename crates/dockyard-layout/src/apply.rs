//! The action pipeline.
//!
//! [`Model::do_action`] applies one [`Action`] atomically. Structural
//! actions run against a clone that is tidied and validated before it
//! replaces the model. Hot-path actions (selection, weights, window
//! geometry) check every precondition first and then mutate in place.
//! A rejected action leaves the model untouched.

use dockyard_core::{Edge, Rect, weights};

use crate::action::{Action, DropLocation};
use crate::error::ActionError;
use crate::json::TabJson;
use crate::model::Model;
use crate::node::{DEFAULT_WEIGHT, Node, NodeId, NodeKind, TabNode};

impl Model {
    /// Apply `action`, bumping the revision on success.
    pub fn do_action(&mut self, action: &Action) -> Result<(), ActionError> {
        let kind = action.kind();
        let span = tracing::debug_span!(
            "dockyard.dispatch",
            kind = %kind,
            result = tracing::field::Empty,
        )
        .entered();

        let result = if kind.is_structural() {
            self.apply_on_clone(action)
        } else {
            self.apply(action)
        };

        match &result {
            Ok(()) => {
                self.revision += 1;
                span.record("result", "applied");
                tracing::debug!(
                    target: "dockyard.action",
                    kind = %kind,
                    revision = self.revision,
                    "action applied"
                );
            }
            Err(err) => {
                span.record("result", "rejected");
                tracing::debug!(
                    target: "dockyard.action",
                    kind = %kind,
                    reason = %err,
                    "action rejected"
                );
            }
        }
        result
    }

    fn apply_on_clone(&mut self, action: &Action) -> Result<(), ActionError> {
        // The layout snapshot is only read during apply; move it instead of
        // cloning it.
        let layout = self.last_layout.take();
        let mut working = self.clone();
        working.last_layout = layout;

        let outcome = working
            .apply(action)
            .and_then(|()| working.tidy())
            .and_then(|()| working.validate().map_err(ActionError::from));
        match outcome {
            Ok(()) => {
                *self = working;
                Ok(())
            }
            Err(err) => {
                self.last_layout = working.last_layout.take();
                Err(err)
            }
        }
    }

    fn apply(&mut self, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::SelectTab { tab } => self.apply_select_tab(tab),
            Action::SetActiveTabset { tabset } => self.apply_set_active_tabset(tabset.as_ref()),
            Action::AddNode {
                json,
                to,
                location,
                index,
                select,
            } => self.apply_add_node(json, to, *location, *index, *select),
            Action::MoveNode {
                node,
                to,
                location,
                index,
                select,
            } => match self.node(node)?.kind() {
                NodeKind::Tab => self.move_tab(node, to, *location, *index, *select),
                NodeKind::TabSet => self.move_tabset(node, to, *location, *index),
                other => Err(ActionError::wrong_kind(node, "tab or tabset", other)),
            },
            Action::DeleteTab { tab } => self.apply_delete_tab(tab),
            Action::DeleteTabset { tabset } => self.apply_delete_tabset(tabset),
            Action::RenameTab { tab, name } => self.apply_rename_tab(tab, name),
            Action::MaximizeToggle { tabset } => self.apply_maximize_toggle(tabset),
            Action::UpdateModelAttributes { attributes } => {
                self.config = self
                    .config
                    .merged(attributes)
                    .map_err(ActionError::InvalidAttributes)?;
                Ok(())
            }
            Action::UpdateNodeAttributes { node, attributes } => {
                let merged = self.merged_attributes(node, attributes)?;
                *self.node_mut(node)? = merged;
                Ok(())
            }
            Action::AdjustWeights {
                row,
                weights,
                orientation,
            } => self.apply_adjust_weights(row, weights, *orientation),
            Action::AdjustBorderSplit { border, size } => self.apply_adjust_border_split(border, *size),
            Action::SetDockState { border, state } => self.apply_set_dock_state(border, *state),
            Action::ToggleDockState { border } => self.apply_toggle_dock_state(border),
            Action::SplitBorderTab { border, tab } => self.apply_split_border_tab(border, tab),
            Action::UntileBorder { border } => self.apply_untile_border(border),
            Action::AdjustTileWeights { border, weights } => {
                self.apply_adjust_tile_weights(border, weights)
            }
            Action::FloatTab { tab, rect } => self.apply_float_tab(tab, *rect),
            Action::FloatTabset { tabset, rect } => self.apply_float_tabset(tabset, *rect),
            Action::DockTab {
                tab,
                to,
                location,
                index,
            } => self.apply_dock_tab(tab, to, *location, *index),
            Action::DockTabset {
                window,
                to,
                location,
            } => self.apply_dock_tabset(window, to, *location),
            Action::MoveWindow { window, x, y } => self.apply_move_window(window, *x, *y),
            Action::ResizeWindow { window, rect } => self.apply_resize_window(window, *rect),
            Action::FocusWindow { window } => self.apply_focus_window(window),
            Action::CloseWindow { window } => self.apply_close_window(window),
            Action::OpenFlyout { border, tab } => self.apply_open_flyout(border, tab),
            Action::CloseFlyout => self.apply_close_flyout(),
        }
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    fn apply_select_tab(&mut self, tab: &NodeId) -> Result<(), ActionError> {
        let (container, index) = self.tab_position(tab)?;
        match self.node_mut(&container)? {
            Node::TabSet(tabset) => {
                tabset.selected = Some(index);
                self.active_tabset = Some(container);
            }
            Node::Border(border) => border.select(index),
            Node::Window(window) => {
                window.selected = Some(index);
                let _ = self.raise_window(&container);
            }
            other => return Err(ActionError::wrong_kind(&container, "tab container", other.kind())),
        }
        Ok(())
    }

    fn apply_set_active_tabset(&mut self, tabset: Option<&NodeId>) -> Result<(), ActionError> {
        if let Some(id) = tabset {
            self.tabset(id)?;
        }
        self.active_tabset = tabset.cloned();
        Ok(())
    }

    fn apply_maximize_toggle(&mut self, tabset: &NodeId) -> Result<(), ActionError> {
        if !self.tabset(tabset)?.enable_maximize(&self.config) {
            return Err(ActionError::Disabled {
                id: tabset.clone(),
                feature: "maximize",
            });
        }
        if self.maximized_tabset.as_ref() == Some(tabset) {
            self.maximized_tabset = None;
        } else {
            self.maximized_tabset = Some(tabset.clone());
        }
        self.active_tabset = Some(tabset.clone());
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tabs
    // ---------------------------------------------------------------------

    fn apply_add_node(
        &mut self,
        json: &TabJson,
        to: &NodeId,
        location: DropLocation,
        index: Option<usize>,
        select: Option<bool>,
    ) -> Result<(), ActionError> {
        let id = match &json.id {
            Some(id) if self.nodes.contains_key(id) => {
                return Err(ActionError::DuplicateId { id: id.clone() });
            }
            Some(id) => id.clone(),
            None => self.alloc_id(),
        };
        let container = self.drop_container(to, location)?;
        self.nodes.insert(
            id.clone(),
            Node::Tab(TabNode {
                id: id.clone(),
                parent: None,
                attrs: json.attrs.clone(),
            }),
        );
        let index = if location == DropLocation::Center { index } else { None };
        self.attach_tab(&id, &container, index, select)?;
        self.after_drop(&container);
        Ok(())
    }

    /// Whether moving `tab` to (`to`, `location`, `index`) changes nothing.
    pub(crate) fn is_noop_tab_move(
        &self,
        tab: &NodeId,
        to: &NodeId,
        location: DropLocation,
        index: Option<usize>,
    ) -> Result<bool, ActionError> {
        let (from, from_index) = self.tab_position(tab)?;
        let count = self.node(&from)?.children().len();
        if *to == self.root && location != DropLocation::Center {
            // a lone tab in the root's only tabset would be rewrapped as is
            let sole_root_child = self
                .row(&self.root)
                .is_ok_and(|root| root.children.len() == 1 && root.children[0] == from);
            return Ok(count == 1 && sole_root_child);
        }
        if &from != to {
            return Ok(false);
        }
        Ok(match location {
            DropLocation::Center => {
                let target = match index {
                    Some(i) if i > from_index => i - 1,
                    Some(i) => i,
                    None => count - 1,
                };
                target.min(count - 1) == from_index
            }
            _ => count == 1,
        })
    }

    fn move_tab(
        &mut self,
        tab: &NodeId,
        to: &NodeId,
        location: DropLocation,
        index: Option<usize>,
        select: Option<bool>,
    ) -> Result<(), ActionError> {
        if self.is_noop_tab_move(tab, to, location, index)? {
            return Err(ActionError::NoEffect);
        }
        let (from, from_index) = self.tab_position(tab)?;
        let mut index = if location == DropLocation::Center { index } else { None };
        if &from == to {
            index = index.map(|i| if i > from_index { i - 1 } else { i });
        }
        let container = self.drop_container(to, location)?;
        self.detach_tab(tab)?;
        self.attach_tab(tab, &container, index, select)?;
        self.after_drop(&container);
        Ok(())
    }

    fn apply_delete_tab(&mut self, tab: &NodeId) -> Result<(), ActionError> {
        self.detach_tab(tab)?;
        self.drop_tab(tab);
        Ok(())
    }

    fn apply_rename_tab(&mut self, tab: &NodeId, name: &str) -> Result<(), ActionError> {
        let config = &self.config;
        let node = self
            .nodes
            .get_mut(tab)
            .ok_or_else(|| ActionError::unknown(tab))?;
        let kind = node.kind();
        let node = node
            .as_tab_mut()
            .ok_or_else(|| ActionError::wrong_kind(tab, "tab", kind))?;
        if !node.enable_rename(config) {
            return Err(ActionError::Disabled {
                id: tab.clone(),
                feature: "rename",
            });
        }
        node.attrs.name = name.to_owned();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tabsets
    // ---------------------------------------------------------------------

    fn move_tabset(
        &mut self,
        tabset: &NodeId,
        to: &NodeId,
        location: DropLocation,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        if tabset == to {
            return Err(ActionError::NoEffect);
        }
        let node = self.tabset(tabset)?;
        let tabs = node.children.clone();
        let selected = node.selected_tab().cloned();

        let edge = location.edge();
        let to_kind = self.node(to)?.kind();
        match (to_kind, edge) {
            // Edge drops move the tabset node itself so its attributes survive.
            (NodeKind::TabSet, Some(edge)) => {
                self.remove_from_row(tabset)?;
                self.insert_beside(to, tabset.clone(), edge)
            }
            (NodeKind::Row, Some(edge)) if *to == self.root => {
                if self.row(&self.root)?.children.len() == 1 {
                    return Err(ActionError::NoEffect);
                }
                self.remove_from_row(tabset)?;
                self.insert_at_root_edge(tabset.clone(), edge)
            }
            _ => {
                if tabs.is_empty() {
                    return Err(ActionError::NoEffect);
                }
                let container = self.drop_container(to, location)?;
                self.transfer_tabs(&tabs, selected.as_ref(), &container, index)?;
                self.after_drop(&container);
                Ok(())
            }
        }
    }

    fn apply_delete_tabset(&mut self, tabset: &NodeId) -> Result<(), ActionError> {
        let node = self.tabset(tabset)?;
        if !node.enable_close() {
            return Err(ActionError::Disabled {
                id: tabset.clone(),
                feature: "close",
            });
        }
        for tab in node.children.clone() {
            self.detach_tab(&tab)?;
            self.drop_tab(&tab);
        }
        self.remove_from_row(tabset)?;
        let _ = self.remove_node(tabset);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Floating windows
    // ---------------------------------------------------------------------

    fn apply_float_tab(&mut self, tab: &NodeId, rect: Option<Rect>) -> Result<(), ActionError> {
        if !self.tab(tab)?.enable_float(&self.config) {
            return Err(ActionError::Disabled {
                id: tab.clone(),
                feature: "float",
            });
        }
        let (container, _) = self.tab_position(tab)?;
        if let Node::Window(window) = self.node(&container)? {
            if window.children.len() == 1 {
                return Err(ActionError::NoEffect);
            }
        }
        let rect = self.float_rect(rect)?;
        self.detach_tab(tab)?;
        let window = self.new_window(rect);
        self.attach_tab(tab, &window, None, Some(true))?;
        Ok(())
    }

    fn apply_float_tabset(&mut self, tabset: &NodeId, rect: Option<Rect>) -> Result<(), ActionError> {
        let node = self.tabset(tabset)?;
        let tabs = node.children.clone();
        let selected = node.selected_tab().cloned();
        if tabs.is_empty() {
            return Err(ActionError::NoEffect);
        }
        for tab in &tabs {
            if !self.tab(tab)?.enable_float(&self.config) {
                return Err(ActionError::Disabled {
                    id: tab.clone(),
                    feature: "float",
                });
            }
        }
        let rect = self.float_rect(rect)?;
        let window = self.new_window(rect);
        self.transfer_tabs(&tabs, selected.as_ref(), &window, None)
    }

    fn apply_dock_tab(
        &mut self,
        tab: &NodeId,
        to: &NodeId,
        location: DropLocation,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        let (window, _) = self.tab_position(tab)?;
        if self.node(&window)?.kind() != NodeKind::Window {
            return Err(ActionError::NotFloating { id: tab.clone() });
        }
        if self.node(to)?.kind() == NodeKind::Window {
            return Err(ActionError::InvalidLocation {
                id: to.clone(),
                location,
            });
        }
        let container = self.drop_container(to, location)?;
        let index = if location == DropLocation::Center { index } else { None };
        self.detach_tab(tab)?;
        self.attach_tab(tab, &container, index, Some(true))?;
        self.after_drop(&container);
        Ok(())
    }

    fn apply_dock_tabset(
        &mut self,
        window: &NodeId,
        to: &NodeId,
        location: DropLocation,
    ) -> Result<(), ActionError> {
        let node = self.window(window)?;
        let tabs = node.children.clone();
        let selected = node.selected_tab().cloned();
        if self.node(to)?.kind() == NodeKind::Window {
            return Err(ActionError::InvalidLocation {
                id: to.clone(),
                location,
            });
        }
        let container = self.drop_container(to, location)?;
        self.transfer_tabs(&tabs, selected.as_ref(), &container, None)?;
        self.after_drop(&container);
        Ok(())
    }

    fn apply_close_window(&mut self, window: &NodeId) -> Result<(), ActionError> {
        for tab in self.window(window)?.children.clone() {
            self.drop_tab(&tab);
        }
        self.destroy_window(window);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Weights
    // ---------------------------------------------------------------------

    fn apply_adjust_weights(
        &mut self,
        row: &NodeId,
        new_weights: &[f64],
        orientation: dockyard_core::Orientation,
    ) -> Result<(), ActionError> {
        let children = self.row(row)?.children.clone();
        let actual = self
            .orientation_of(row)
            .ok_or_else(|| ActionError::unknown(row))?;
        if orientation != actual {
            return Err(ActionError::OrientationMismatch {
                id: row.clone(),
                given: orientation,
                actual,
            });
        }
        if new_weights.len() != children.len() {
            return Err(ActionError::WeightCountMismatch {
                id: row.clone(),
                given: new_weights.len(),
                expected: children.len(),
            });
        }
        if !weights::all_positive(new_weights) {
            return Err(ActionError::NonPositiveWeight);
        }
        for (child, weight) in children.iter().zip(new_weights) {
            self.set_weight(child, *weight);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Placement
    // ---------------------------------------------------------------------

    /// The container tabs dropped at (`to`, `location`) land in, creating
    /// and linking a new tabset for edge drops.
    pub(crate) fn drop_container(
        &mut self,
        to: &NodeId,
        location: DropLocation,
    ) -> Result<NodeId, ActionError> {
        let kind = self.node(to)?.kind();
        match (kind, location.edge()) {
            (NodeKind::TabSet, None) => Ok(to.clone()),
            (NodeKind::TabSet, Some(edge)) => {
                let tabset = self.new_tabset();
                self.insert_beside(to, tabset.clone(), edge)?;
                Ok(tabset)
            }
            (NodeKind::Border | NodeKind::Window, None) => Ok(to.clone()),
            (NodeKind::Row, Some(edge)) if *to == self.root => {
                let tabset = self.new_tabset();
                self.insert_at_root_edge(tabset.clone(), edge)?;
                Ok(tabset)
            }
            (NodeKind::Border | NodeKind::Window | NodeKind::Row, _) => {
                Err(ActionError::InvalidLocation {
                    id: to.clone(),
                    location,
                })
            }
            (other, _) => Err(ActionError::wrong_kind(to, "drop target", other)),
        }
    }

    fn after_drop(&mut self, container: &NodeId) {
        match self.nodes.get(container).map(Node::kind) {
            Some(NodeKind::TabSet) => self.active_tabset = Some(container.clone()),
            Some(NodeKind::Window) => {
                let _ = self.raise_window(container);
            }
            _ => {}
        }
    }

    /// Move `tabs` into `container` in order, keeping `selected` selected.
    fn transfer_tabs(
        &mut self,
        tabs: &[NodeId],
        selected: Option<&NodeId>,
        container: &NodeId,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        for (offset, tab) in tabs.iter().enumerate() {
            self.detach_tab(tab)?;
            let select = Some(selected == Some(tab));
            self.attach_tab(tab, container, index.map(|i| i + offset), select)?;
        }
        Ok(())
    }

    /// Put `new` next to the docked `target`, splitting the target's weight.
    ///
    /// A parent row on the edge's axis takes `new` as a sibling. Otherwise
    /// the target is wrapped in a new row on the perpendicular axis.
    pub(crate) fn insert_beside(&mut self, target: &NodeId, new: NodeId, edge: Edge) -> Result<(), ActionError> {
        let (parent, index) = self.row_position(target)?;
        let axis = self
            .orientation_of(&parent)
            .ok_or_else(|| ActionError::unknown(&parent))?;
        let weight = self.weight_of(target);

        if axis == edge.orientation() {
            self.set_weight(target, weight / 2.0);
            self.set_weight(&new, weight / 2.0);
            let at = if edge.is_near() { index } else { index + 1 };
            self.link_child(&parent, new, Some(at));
            return Ok(());
        }

        let row = self.new_row(weight);
        self.row_mut(&parent)?.children[index] = row.clone();
        self.node_mut(&row)?.set_parent(Some(parent));
        self.node_mut(target)?.set_parent(None);
        self.set_weight(target, DEFAULT_WEIGHT / 2.0);
        self.set_weight(&new, DEFAULT_WEIGHT / 2.0);
        let (first, second) = if edge.is_near() {
            (new, target.clone())
        } else {
            (target.clone(), new)
        };
        self.link_child(&row, first, None);
        self.link_child(&row, second, None);
        Ok(())
    }

    /// Dock `new` along an edge of the whole layout.
    ///
    /// On the root's own axis `new` becomes the first or last child. Across
    /// it the root orientation flips and the existing children move into a
    /// wrapper row, so every other node keeps its on-screen arrangement.
    pub(crate) fn insert_at_root_edge(&mut self, new: NodeId, edge: Edge) -> Result<(), ActionError> {
        let root = self.root.clone();
        let axis = self
            .orientation_of(&root)
            .ok_or_else(|| ActionError::unknown(&root))?;
        let children = self.row(&root)?.children.clone();
        let at = |len: usize| if edge.is_near() { 0 } else { len };

        if axis == edge.orientation() {
            let weight = if children.is_empty() {
                DEFAULT_WEIGHT
            } else {
                children.iter().map(|child| self.weight_of(child)).sum::<f64>() / children.len() as f64
            };
            self.set_weight(&new, weight);
            self.link_child(&root, new, Some(at(children.len())));
            return Ok(());
        }

        self.config.root_orientation_vertical = !self.config.root_orientation_vertical;
        if children.len() > 1 {
            let wrapper = self.new_row(DEFAULT_WEIGHT / 2.0);
            self.row_mut(&root)?.children.clear();
            for child in children {
                self.link_child(&wrapper, child, None);
            }
            self.link_child(&root, wrapper, None);
        } else if let Some(only) = children.first() {
            self.set_weight(only, DEFAULT_WEIGHT / 2.0);
        }
        self.set_weight(&new, DEFAULT_WEIGHT / 2.0);
        let len = self.row(&root)?.children.len();
        self.link_child(&root, new, Some(at(len)));
        Ok(())
    }
}
