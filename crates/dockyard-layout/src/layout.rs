//! Pixel geometry computed from the model.
//!
//! Layout is a pure function of the model and the available bounds. Borders
//! are carved off first (top and bottom across the full width, then left and
//! right between them), the root row fills the rest, and row children share
//! their main axis by weight, clamped to their min/max sizes.

use dockyard_core::weights::{self, SizeBounds};
use dockyard_core::{Edge, Insets, Orientation, Rect};
use rustc_hash::FxHashMap;

use crate::config::GlobalConfig;
use crate::model::Model;
use crate::node::{BorderNode, Node, NodeId, TabLocation};

/// Geometry of one border.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderGeometry {
    pub location: Edge,
    /// Whole band taken out of the layout, tab bar included.
    pub strip: Rect,
    pub bar: Rect,
    /// Content area, present only when expanded with a tab shown.
    pub content: Option<Rect>,
    /// One rect per visible tab, in `visible_tabs` order.
    pub tiles: Vec<(NodeId, Rect)>,
    pub tile_sizes: Vec<f64>,
    pub tile_splitters: Vec<Rect>,
}

/// Geometry of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub rect: Rect,
    pub orientation: Orientation,
    /// Child sizes along `orientation`.
    pub sizes: Vec<f64>,
    /// One splitter between each pair of children.
    pub splitters: Vec<Rect>,
    /// Min/max size of every child along `orientation`.
    pub bounds: Vec<SizeBounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabSetGeometry {
    pub rect: Rect,
    pub strip: Option<Rect>,
    pub content: Rect,
}

/// Everything a renderer needs to place the layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub bounds: Rect,
    /// Bounds minus border strips.
    pub root: Rect,
    /// Strip thickness per edge.
    pub insets: Insets,
    pub borders: FxHashMap<NodeId, BorderGeometry>,
    pub rows: FxHashMap<NodeId, RowGeometry>,
    pub tabsets: FxHashMap<NodeId, TabSetGeometry>,
    pub windows: FxHashMap<NodeId, Rect>,
    pub flyout: Option<Rect>,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn tabset(&self, id: &str) -> Option<&TabSetGeometry> {
        self.tabsets.get(id)
    }

    #[must_use]
    pub fn row(&self, id: &str) -> Option<&RowGeometry> {
        self.rows.get(id)
    }

    #[must_use]
    pub fn border(&self, id: &str) -> Option<&BorderGeometry> {
        self.borders.get(id)
    }
}

/// Order in which borders claim space.
const BORDER_ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

/// Subtree size bounds computed once per layout pass.
type BoundsCache = FxHashMap<(NodeId, Orientation), SizeBounds>;

impl Model {
    /// Compute geometry for `bounds` without touching the model.
    #[must_use]
    pub fn compute_layout(&self, bounds: Rect) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot {
            bounds,
            ..LayoutSnapshot::default()
        };

        let mut rest = bounds;
        for edge in BORDER_ORDER {
            let Some(border) = self.border(edge) else {
                continue;
            };
            let size = border
                .strip_size(&self.config)
                .min(rest.extent(edge.orientation()));
            let (strip, remainder) = rest.split_edge(edge, size);
            rest = remainder;
            snapshot.insets.set(edge, size);
            snapshot
                .borders
                .insert(border.id.clone(), self.border_geometry(border, strip));
        }
        snapshot.root = rest;

        match self.maximized_tabset.as_ref() {
            Some(maximized) => {
                if let Some(Node::TabSet(tabset)) = self.nodes.get(maximized) {
                    let geometry = tabset_geometry(tabset, rest, &self.config);
                    snapshot.tabsets.insert(maximized.clone(), geometry);
                }
            }
            None => {
                let mut cache = BoundsCache::default();
                self.layout_row(&self.root, rest, 0, &mut snapshot, &mut cache);
            }
        }

        for window in self.windows() {
            snapshot.windows.insert(window.id.clone(), window.rect);
        }
        snapshot.flyout = self.flyout_rect(&snapshot);
        snapshot
    }

    /// Compute geometry and keep it as the last computed layout, which
    /// splitter queries and window clamping read.
    pub fn update_layout(&mut self, bounds: Rect) -> &LayoutSnapshot {
        let snapshot = self.compute_layout(bounds);
        self.last_layout.insert(snapshot)
    }

    fn border_geometry(&self, border: &BorderNode, strip: Rect) -> BorderGeometry {
        let edge = border.location;
        let bar_size = self.config.border_bar_size.min(strip.extent(edge.orientation()));
        let (bar, content) = strip.split_edge(edge, bar_size);
        let content = (border.content_size(&self.config) > 0.0).then_some(content);

        let mut tiles = Vec::new();
        let mut tile_sizes = Vec::new();
        let mut tile_splitters = Vec::new();
        if let Some(content) = content {
            let axis = edge.orientation().flip();
            let count = border.visible_tabs.len();
            let splitter = self.config.splitter_size;
            let available = (content.extent(axis) - splitter * (count.saturating_sub(1)) as f64).max(0.0);
            let bounds = vec![SizeBounds::UNBOUNDED; count];
            tile_sizes = weights::distribute(available, &border.tile_weights, &bounds);
            let mut offset = 0.0;
            for (slot, (&index, &size)) in border.visible_tabs.iter().zip(&tile_sizes).enumerate() {
                if slot > 0 {
                    tile_splitters.push(content.slice(axis, offset, splitter));
                    offset += splitter;
                }
                if let Some(tab) = border.children.get(index) {
                    tiles.push((tab.clone(), content.slice(axis, offset, size)));
                }
                offset += size;
            }
        }

        BorderGeometry {
            location: edge,
            strip,
            bar,
            content,
            tiles,
            tile_sizes,
            tile_splitters,
        }
    }

    fn layout_row(
        &self,
        id: &NodeId,
        rect: Rect,
        depth: usize,
        snapshot: &mut LayoutSnapshot,
        cache: &mut BoundsCache,
    ) {
        let Some(Node::Row(row)) = self.nodes.get(id) else {
            return;
        };
        let orientation = Orientation::at_depth(depth, self.config.root_orientation_vertical);
        let splitter = self.config.splitter_size;
        let count = row.children.len();
        let available =
            (rect.extent(orientation) - splitter * count.saturating_sub(1) as f64).max(0.0);
        let child_weights: Vec<f64> = row.children.iter().map(|child| self.weight_of(child)).collect();
        let bounds: Vec<SizeBounds> = row
            .children
            .iter()
            .map(|child| self.size_bounds(child, orientation.flip(), orientation, cache))
            .collect();
        let sizes = weights::distribute(available, &child_weights, &bounds);

        let mut splitters = Vec::with_capacity(count.saturating_sub(1));
        let mut offset = 0.0;
        for (index, (child, &size)) in row.children.iter().zip(&sizes).enumerate() {
            if index > 0 {
                splitters.push(rect.slice(orientation, offset, splitter));
                offset += splitter;
            }
            let child_rect = rect.slice(orientation, offset, size);
            offset += size;
            match self.nodes.get(child) {
                Some(Node::Row(_)) => self.layout_row(child, child_rect, depth + 1, snapshot, cache),
                Some(Node::TabSet(tabset)) => {
                    snapshot
                        .tabsets
                        .insert(child.clone(), tabset_geometry(tabset, child_rect, &self.config));
                }
                _ => {}
            }
        }

        snapshot.rows.insert(
            id.clone(),
            RowGeometry {
                rect,
                orientation,
                sizes,
                splitters,
                bounds,
            },
        );
    }

    /// Min/max pixel size of a docked node along `axis`, where
    /// `orientation` is the node's own orientation should it be a row.
    fn size_bounds(
        &self,
        id: &NodeId,
        orientation: Orientation,
        axis: Orientation,
        cache: &mut BoundsCache,
    ) -> SizeBounds {
        let key = (id.clone(), axis);
        if let Some(bounds) = cache.get(&key) {
            return *bounds;
        }
        let bounds = match self.nodes.get(id) {
            Some(Node::TabSet(tabset)) => tabset.bounds(axis, &self.config),
            Some(Node::Row(row)) => {
                let children: Vec<SizeBounds> = row
                    .children
                    .iter()
                    .map(|child| self.size_bounds(child, orientation.flip(), axis, cache))
                    .collect();
                if orientation == axis {
                    let gaps = self.config.splitter_size * row.children.len().saturating_sub(1) as f64;
                    SizeBounds {
                        min: children.iter().map(|b| b.min).sum::<f64>() + gaps,
                        max: children.iter().map(|b| b.max).sum::<f64>() + gaps,
                    }
                } else {
                    let min = children.iter().map(|b| b.min).fold(0.0, f64::max);
                    let max = children.iter().map(|b| b.max).fold(f64::INFINITY, f64::min);
                    SizeBounds { min, max: max.max(min) }
                }
            }
            _ => SizeBounds::UNBOUNDED,
        };
        cache.insert(key, bounds);
        bounds
    }
}

fn tabset_geometry(tabset: &crate::node::TabSetNode, rect: Rect, config: &GlobalConfig) -> TabSetGeometry {
    if !tabset.enable_tab_strip(config) {
        return TabSetGeometry {
            rect,
            strip: None,
            content: rect,
        };
    }
    let edge = match tabset.tab_location(config) {
        TabLocation::Top => Edge::Top,
        TabLocation::Bottom => Edge::Bottom,
    };
    let (strip, content) = rect.split_edge(edge, config.tabset_tab_strip_height);
    TabSetGeometry {
        rect,
        strip: Some(strip),
        content,
    }
}
