//! Border dock states and border tiling.
//!
//! A border shows `visible_tabs` as weighted tiles, `selected` being the
//! active one. An untiled border shows at most one tab.

use dockyard_core::weights;

use crate::config::GlobalConfig;
use crate::error::ActionError;
use crate::model::Model;
use crate::node::{BorderNode, DockState, NodeId, selection_after_insert, selection_after_removal};

impl BorderNode {
    /// Pixel thickness the border takes out of the layout.
    #[must_use]
    pub fn strip_size(&self, config: &GlobalConfig) -> f64 {
        if self.enable_auto_hide(config) && self.children.is_empty() {
            return 0.0;
        }
        match self.dock_state() {
            DockState::Hidden => 0.0,
            DockState::Collapsed => config.border_bar_size,
            DockState::Expanded => config.border_bar_size + self.content_size(config),
        }
    }

    /// Content thickness, zero unless expanded with something shown.
    #[must_use]
    pub fn content_size(&self, config: &GlobalConfig) -> f64 {
        if self.dock_state() == DockState::Expanded && !self.visible_tabs.is_empty() {
            self.size(config)
        } else {
            0.0
        }
    }

    fn show_only(&mut self, index: usize) {
        self.selected = Some(index);
        self.visible_tabs = vec![index];
        self.tile_weights = weights::uniform(1);
    }

    fn show_nothing(&mut self) {
        self.selected = None;
        self.visible_tabs.clear();
        self.tile_weights.clear();
    }

    /// Rebuild tile weights to uniform when their count drifted.
    pub(crate) fn reconcile_tile_weights(&mut self) {
        if self.tile_weights.len() != self.visible_tabs.len() {
            self.tile_weights = weights::uniform(self.visible_tabs.len());
        }
    }

    /// Select the tab at `index`.
    ///
    /// Untiled, re-selecting the shown tab closes the content. Tiled, a
    /// visible tab becomes the active tile and any other tab replaces the
    /// active tile's entry.
    pub(crate) fn select(&mut self, index: usize) {
        if !self.is_tiled() {
            if self.selected == Some(index) {
                self.show_nothing();
            } else {
                self.show_only(index);
            }
            return;
        }
        if !self.visible_tabs.contains(&index) {
            let slot = self
                .selected
                .and_then(|active| self.visible_tabs.iter().position(|&v| v == active))
                .unwrap_or(0);
            self.visible_tabs[slot] = index;
        }
        self.selected = Some(index);
    }

    pub(crate) fn insert_child(&mut self, index: Option<usize>, tab: NodeId, select: bool) -> usize {
        let was_empty = self.children.is_empty();
        let at = index.unwrap_or(self.children.len()).min(self.children.len());
        self.children.insert(at, tab);
        for visible in &mut self.visible_tabs {
            if *visible >= at {
                *visible += 1;
            }
        }
        self.selected = selection_after_insert(self.selected, at);
        if was_empty {
            self.show_only(at);
            self.attrs.dock_state = DockState::Expanded;
        } else if select {
            if self.is_tiled() {
                self.select(at);
            } else {
                self.show_only(at);
            }
        }
        at
    }

    /// Remove the child at `index`, keeping the tiles consistent.
    ///
    /// Remaining tile weights are rescaled to the old total. When nothing is
    /// left to show the border is forced to [`DockState::Hidden`].
    pub(crate) fn remove_child(&mut self, index: usize) {
        let had_visible = !self.visible_tabs.is_empty();
        let old_total = weights::sum(&self.tile_weights);
        let visible_slot = self.visible_tabs.iter().position(|&v| v == index);

        self.children.remove(index);
        if let Some(slot) = visible_slot {
            self.visible_tabs.remove(slot);
            if slot < self.tile_weights.len() {
                self.tile_weights.remove(slot);
            }
            self.tile_weights = weights::scale_to_sum(&self.tile_weights, old_total);
        }
        for visible in &mut self.visible_tabs {
            if *visible > index {
                *visible -= 1;
            }
        }

        match self.selected {
            Some(selected) if selected == index => {
                let neighbour = visible_slot
                    .and_then(|slot| self.visible_tabs.get(slot.saturating_sub(1)))
                    .copied();
                match neighbour {
                    Some(next) => self.selected = Some(next),
                    None => match selection_after_removal(Some(index), index, self.children.len()) {
                        Some(next) => self.show_only(next),
                        None => self.show_nothing(),
                    },
                }
            }
            Some(selected) if selected > index => self.selected = Some(selected - 1),
            _ => {}
        }
        self.reconcile_tile_weights();

        if self.children.is_empty() || (had_visible && self.visible_tabs.is_empty()) {
            self.attrs.dock_state = DockState::Hidden;
        }
    }

    /// Enter `state`. Expanding with nothing shown auto-selects the first
    /// tab when `auto_select` is set. `selected` and `visible_tabs` survive
    /// every other transition.
    pub(crate) fn enter_state(&mut self, state: DockState, auto_select: bool) {
        self.attrs.dock_state = state;
        if state == DockState::Expanded
            && self.selected.is_none()
            && auto_select
            && !self.children.is_empty()
        {
            self.show_only(0);
        }
    }

    /// Show the tab at `index` as an extra tile.
    pub(crate) fn split_tab(&mut self, index: usize, max_tiles: usize) -> Result<(), ActionError> {
        if self.visible_tabs.contains(&index) {
            return Err(ActionError::NoEffect);
        }
        if self.visible_tabs.len() >= max_tiles {
            return Err(ActionError::TooManyTiles {
                id: self.id.clone(),
                max: max_tiles,
            });
        }
        if self.visible_tabs.is_empty() {
            self.show_only(index);
            return Ok(());
        }
        self.visible_tabs.push(index);
        self.tile_weights = weights::uniform(self.visible_tabs.len());
        Ok(())
    }

    /// Collapse the tiles back to the active tab.
    pub(crate) fn untile(&mut self) -> Result<(), ActionError> {
        if !self.is_tiled() {
            return Err(ActionError::NoEffect);
        }
        let active = self.selected.unwrap_or(self.visible_tabs[0]);
        self.show_only(active);
        Ok(())
    }
}

impl Model {
    fn tab_index_in_border(&self, border: &NodeId, tab: &NodeId) -> Result<usize, ActionError> {
        self.border_node(border)?
            .children
            .iter()
            .position(|child| child == tab)
            .ok_or_else(|| ActionError::NotInContainer {
                tab: tab.clone(),
                container: border.clone(),
            })
    }

    pub(crate) fn apply_set_dock_state(
        &mut self,
        border: &NodeId,
        state: DockState,
    ) -> Result<(), ActionError> {
        let auto_select = self.border_node(border)?.auto_select_tab_when_open(&self.config);
        self.border_node_mut(border)?.enter_state(state, auto_select);
        if state != DockState::Collapsed
            && self.flyout.as_ref().is_some_and(|flyout| &flyout.border == border)
        {
            self.flyout = None;
        }
        Ok(())
    }

    pub(crate) fn apply_toggle_dock_state(&mut self, border: &NodeId) -> Result<(), ActionError> {
        let next = self.border_node(border)?.dock_state().next();
        self.apply_set_dock_state(border, next)
    }

    pub(crate) fn apply_split_border_tab(
        &mut self,
        border: &NodeId,
        tab: &NodeId,
    ) -> Result<(), ActionError> {
        let index = self.tab_index_in_border(border, tab)?;
        let max_tiles = self.border_node(border)?.max_tiles(&self.config);
        self.border_node_mut(border)?.split_tab(index, max_tiles)
    }

    pub(crate) fn apply_untile_border(&mut self, border: &NodeId) -> Result<(), ActionError> {
        self.border_node_mut(border)?.untile()
    }

    pub(crate) fn apply_adjust_tile_weights(
        &mut self,
        border: &NodeId,
        new_weights: &[f64],
    ) -> Result<(), ActionError> {
        let tiles = self.border_node(border)?.visible_tabs.len();
        if new_weights.len() != tiles {
            return Err(ActionError::WeightCountMismatch {
                id: border.clone(),
                given: new_weights.len(),
                expected: tiles,
            });
        }
        if !weights::all_positive(new_weights) {
            return Err(ActionError::NonPositiveWeight);
        }
        self.border_node_mut(border)?.tile_weights = new_weights.to_vec();
        Ok(())
    }

    /// Set a border's content size, clamped into its bounds and into the
    /// space the last computed layout leaves for it.
    pub(crate) fn apply_adjust_border_split(
        &mut self,
        border: &NodeId,
        size: f64,
    ) -> Result<(), ActionError> {
        if !size.is_finite() {
            return Err(ActionError::NonPositiveWeight);
        }
        let node = self.border_node(border)?;
        let mut clamped = node.size_bounds(&self.config).clamp(size.max(0.0));
        if let Some(layout) = &self.last_layout {
            let axis = node.location.orientation();
            let opposite = layout.insets.get(node.location.opposite());
            let available =
                (layout.bounds.extent(axis) - opposite - self.config.border_bar_size).max(0.0);
            clamped = clamped.min(available);
        }
        self.border_node_mut(border)?.attrs.size = Some(clamped);
        Ok(())
    }

    pub(crate) fn apply_open_flyout(&mut self, border: &NodeId, tab: &NodeId) -> Result<(), ActionError> {
        self.tab_index_in_border(border, tab)?;
        if self.border_node(border)?.dock_state() != DockState::Collapsed {
            return Err(ActionError::Disabled {
                id: border.clone(),
                feature: "flyout",
            });
        }
        self.flyout = Some(crate::flyout::Flyout {
            border: border.clone(),
            tab: tab.clone(),
        });
        Ok(())
    }

    pub(crate) fn apply_close_flyout(&mut self) -> Result<(), ActionError> {
        self.flyout.take().map(|_| ()).ok_or(ActionError::NoFlyout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_core::Edge;

    fn border_with(count: usize) -> BorderNode {
        let mut border = BorderNode::new(NodeId::from("left"), Edge::Left);
        for i in 0..count {
            border.insert_child(None, NodeId::new(format!("t{i}")), false);
        }
        border
    }

    #[test]
    fn first_tab_expands_and_selects() {
        let mut border = BorderNode::new(NodeId::from("b"), Edge::Bottom);
        border.attrs.dock_state = DockState::Hidden;
        border.insert_child(None, NodeId::from("a"), false);
        assert_eq!(border.dock_state(), DockState::Expanded);
        assert_eq!(border.selected, Some(0));
        assert_eq!(border.visible_tabs, vec![0]);
    }

    #[test]
    fn reselect_closes_untiled_border() {
        let mut border = border_with(2);
        border.select(1);
        assert_eq!(border.visible_tabs, vec![1]);
        border.select(1);
        assert_eq!(border.selected, None);
        assert!(border.visible_tabs.is_empty());
        assert_eq!(border.dock_state(), DockState::Expanded);
    }

    #[test]
    fn removing_last_tab_hides() {
        let mut border = border_with(1);
        border.remove_child(0);
        assert!(border.visible_tabs.is_empty());
        assert_eq!(border.dock_state(), DockState::Hidden);
    }

    #[test]
    fn removing_selected_untiled_picks_neighbour() {
        let mut border = border_with(3);
        border.select(2);
        border.remove_child(2);
        assert_eq!(border.selected, Some(1));
        assert_eq!(border.visible_tabs, vec![1]);
        assert_eq!(border.dock_state(), DockState::Expanded);
    }

    #[test]
    fn removing_tile_rescales_weights() {
        let mut border = border_with(3);
        border.split_tab(2, 4).unwrap();
        border.tile_weights = vec![1.0, 3.0];
        border.visible_tabs = vec![0, 2];
        border.split_tab(1, 4).unwrap();
        // uniform after split
        assert_eq!(border.tile_weights, vec![1.0, 1.0, 1.0]);
        border.tile_weights = vec![2.0, 1.0, 1.0];

        border.remove_child(0);
        assert_eq!(border.visible_tabs, vec![1, 0]);
        let total: f64 = border.tile_weights.iter().sum();
        assert!((total - 4.0).abs() < 1e-9);
        assert_eq!(border.tile_weights, vec![2.0, 2.0]);
        assert_eq!(border.selected, Some(1));
    }

    #[test]
    fn split_respects_max_tiles() {
        let mut border = border_with(3);
        border.split_tab(1, 2).unwrap();
        assert!(matches!(border.split_tab(2, 2), Err(ActionError::TooManyTiles { max: 2, .. })));
        assert!(matches!(border.split_tab(1, 2), Err(ActionError::NoEffect)));
    }

    #[test]
    fn untile_keeps_active() {
        let mut border = border_with(3);
        border.split_tab(2, 4).unwrap();
        border.select(2);
        border.untile().unwrap();
        assert_eq!(border.visible_tabs, vec![2]);
        assert_eq!(border.tile_weights, vec![1.0]);
        assert!(matches!(border.untile(), Err(ActionError::NoEffect)));
    }

    #[test]
    fn leaving_expanded_keeps_selection() {
        let mut border = border_with(3);
        border.select(1);
        assert_eq!(border.selected, Some(1));
        for state in [DockState::Collapsed, DockState::Hidden, DockState::Expanded] {
            border.enter_state(state, true);
            assert_eq!(border.selected, Some(1), "{state:?}");
            assert_eq!(border.visible_tabs, vec![1], "{state:?}");
        }
    }

    #[test]
    fn expanding_auto_selects() {
        let mut border = border_with(2);
        // closes the content shown on insert
        border.select(0);
        assert_eq!(border.selected, None);
        border.enter_state(DockState::Collapsed, true);
        border.enter_state(DockState::Expanded, true);
        assert_eq!(border.selected, Some(0));
        assert_eq!(border.visible_tabs, vec![0]);

        let mut manual = border_with(2);
        manual.select(0);
        manual.enter_state(DockState::Expanded, false);
        assert_eq!(manual.selected, None);
        assert!(manual.visible_tabs.is_empty());
    }

    #[test]
    fn strip_sizes_follow_state() {
        let config = GlobalConfig::default();
        let mut border = border_with(1);
        assert_eq!(border.strip_size(&config), 230.0);
        border.enter_state(DockState::Collapsed, true);
        assert_eq!(border.strip_size(&config), 30.0);
        border.enter_state(DockState::Hidden, true);
        assert_eq!(border.strip_size(&config), 0.0);

        let mut empty = BorderNode::new(NodeId::from("e"), Edge::Top);
        assert_eq!(empty.strip_size(&config), 30.0);
        empty.attrs.enable_auto_hide = Some(true);
        assert_eq!(empty.strip_size(&config), 0.0);
    }
}
