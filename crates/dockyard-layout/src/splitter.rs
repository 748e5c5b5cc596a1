//! Splitter drags: pixel positions back to weights.
//!
//! A drag snapshots the flanking sizes at pointer-down, clamps every pointer
//! position into the legal range, and converts the resulting pixel split back
//! into a weight pair with the same combined weight. Every move yields a
//! complete weight array. There is no commit step.

use dockyard_core::weights::{self, SizeBounds};
use dockyard_core::{Edge, Orientation, Point};

use crate::action::Action;
use crate::error::LayoutError;
use crate::layout::RowGeometry;
use crate::model::Model;
use crate::node::NodeId;

/// Smallest share of the combined weight either side of a splitter keeps.
const MIN_PAIR_SHARE: f64 = 1e-3;

/// Pre-drag snapshot of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterInitials {
    /// Pixel size of every child along the row's axis.
    pub initial_sizes: Vec<f64>,
    /// Sum of the children's weights.
    pub sum: f64,
    /// Row start along its axis.
    pub start_position: f64,
}

impl SplitterInitials {
    /// Pixel offset of the leading edge of splitter `index`.
    #[must_use]
    pub fn splitter_position(&self, index: usize, splitter_size: f64) -> f64 {
        self.pair_base(index, splitter_size) + self.initial_sizes.get(index).copied().unwrap_or(0.0)
    }

    fn pair_base(&self, index: usize, splitter_size: f64) -> f64 {
        self.start_position
            + self.initial_sizes[..index.min(self.initial_sizes.len())].iter().sum::<f64>()
            + splitter_size * index as f64
    }
}

/// Legal positions for the leading edge of a splitter between two children.
fn pair_range(base: f64, combined: f64, first: SizeBounds, second: SizeBounds) -> (f64, f64) {
    let lo = base + first.min.max(combined - second.max);
    let hi = base + (combined - second.min).min(first.max);
    (lo, hi.max(lo))
}

/// Rebalance `weights[index]` and `weights[index + 1]` to a new pixel split.
fn split_weights(weights: &[f64], index: usize, first_px: f64, second_px: f64) -> Vec<f64> {
    let mut out = weights.to_vec();
    let combined = out[index] + out[index + 1];
    if let Some((first, _)) = weights::split_pair(combined, first_px, second_px) {
        let floor = combined * MIN_PAIR_SHARE;
        let first = first.clamp(floor, combined - floor);
        out[index] = first;
        out[index + 1] = combined - first;
    }
    out
}

impl Model {
    fn row_geometry(&self, row: &NodeId) -> Result<&RowGeometry, LayoutError> {
        let layout = self.last_layout.as_ref().ok_or(LayoutError::NoLayout)?;
        layout
            .rows
            .get(row)
            .ok_or_else(|| LayoutError::UnknownRow { id: row.clone() })
    }

    fn check_splitter(&self, row: &NodeId, index: usize, count: usize) -> Result<(), LayoutError> {
        if index + 1 >= count {
            return Err(LayoutError::SplitterOutOfRange {
                id: row.clone(),
                index,
                count,
            });
        }
        Ok(())
    }

    /// Snapshot the pixel sizes of a row's children before a drag.
    pub fn splitter_initials(&self, row: &NodeId, index: usize) -> Result<SplitterInitials, LayoutError> {
        let geometry = self.row_geometry(row)?;
        self.check_splitter(row, index, geometry.sizes.len())?;
        let node = self
            .nodes
            .get(row)
            .and_then(|node| node.as_row())
            .ok_or_else(|| LayoutError::UnknownRow { id: row.clone() })?;
        let sum = node.children.iter().map(|child| self.weight_of(child)).sum();
        Ok(SplitterInitials {
            initial_sizes: geometry.sizes.clone(),
            sum,
            start_position: geometry.rect.start(geometry.orientation),
        })
    }

    fn pair_bounds(
        &self,
        row: &NodeId,
        index: usize,
        initials: &SplitterInitials,
    ) -> Result<(f64, f64), LayoutError> {
        let geometry = self.row_geometry(row)?;
        let count = initials.initial_sizes.len();
        self.check_splitter(row, index, count)?;
        let node = self
            .nodes
            .get(row)
            .and_then(|node| node.as_row())
            .ok_or_else(|| LayoutError::UnknownRow { id: row.clone() })?;
        if node.children.len() != count || geometry.bounds.len() != count {
            return Err(LayoutError::UnknownRow { id: row.clone() });
        }
        let (first, second) = (geometry.bounds[index], geometry.bounds[index + 1]);
        let combined = initials.initial_sizes[index] + initials.initial_sizes[index + 1];
        let base = initials.pair_base(index, self.config.splitter_size);
        Ok(pair_range(base, combined, first, second))
    }

    /// Draggable range `[min, max]` of splitter `index`, in absolute pixels.
    pub fn splitter_bounds(&self, row: &NodeId, index: usize) -> Result<(f64, f64), LayoutError> {
        let initials = self.splitter_initials(row, index)?;
        self.pair_bounds(row, index, &initials)
    }

    /// Weights for the whole row after moving splitter `index` to
    /// `position`. Only the two flanking weights change and their sum is
    /// preserved. The row total is pinned to `initials.sum`, so weights
    /// edited mid-drag are rescaled to the snapshot first.
    pub fn calculate_split(
        &self,
        row: &NodeId,
        index: usize,
        position: f64,
        initials: &SplitterInitials,
    ) -> Result<Vec<f64>, LayoutError> {
        let (lo, hi) = self.pair_bounds(row, index, initials)?;
        let position = position.clamp(lo, hi);
        let base = initials.pair_base(index, self.config.splitter_size);
        let combined = initials.initial_sizes[index] + initials.initial_sizes[index + 1];
        let first_px = position - base;
        let current: Vec<f64> = self
            .nodes
            .get(row)
            .and_then(|node| node.as_row())
            .map(|node| node.children.iter().map(|child| self.weight_of(child)).collect())
            .unwrap_or_default();
        let current = weights::scale_to_sum(&current, initials.sum);
        Ok(split_weights(&current, index, first_px, combined - first_px))
    }
}

/// What a splitter drag resizes.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitterTarget {
    /// Splitter `index` between row children `index` and `index + 1`.
    Row { row: NodeId, index: usize },
    /// Splitter between border tiles `index` and `index + 1`.
    Tile { border: NodeId, index: usize },
    /// The inner edge of a border.
    Border { border: NodeId },
}

#[derive(Debug, Clone)]
enum DragSnapshot {
    Row {
        initials: SplitterInitials,
        orientation: Orientation,
    },
    Tile {
        sizes: Vec<f64>,
        weights: Vec<f64>,
        start: f64,
        axis: Orientation,
    },
    Border {
        size: f64,
        edge: Edge,
    },
}

/// One splitter gesture, from pointer-down to pointer-up.
#[derive(Debug, Clone)]
pub struct SplitterDrag {
    target: SplitterTarget,
    origin: Point,
    snapshot: DragSnapshot,
}

impl SplitterDrag {
    /// Capture the state the drag is relative to.
    pub fn start(model: &Model, target: SplitterTarget, origin: Point) -> Result<Self, LayoutError> {
        let snapshot = match &target {
            SplitterTarget::Row { row, index } => {
                let initials = model.splitter_initials(row, *index)?;
                let orientation = model.row_geometry(row)?.orientation;
                DragSnapshot::Row {
                    initials,
                    orientation,
                }
            }
            SplitterTarget::Tile { border, index } => {
                let layout = model.last_layout.as_ref().ok_or(LayoutError::NoLayout)?;
                let geometry = layout
                    .borders
                    .get(border)
                    .ok_or_else(|| LayoutError::UnknownBorder { id: border.clone() })?;
                let content = geometry
                    .content
                    .ok_or_else(|| LayoutError::UnknownBorder { id: border.clone() })?;
                if index + 1 >= geometry.tile_sizes.len() {
                    return Err(LayoutError::SplitterOutOfRange {
                        id: border.clone(),
                        index: *index,
                        count: geometry.tile_sizes.len(),
                    });
                }
                let node = model
                    .nodes
                    .get(border)
                    .and_then(|node| node.as_border())
                    .ok_or_else(|| LayoutError::UnknownBorder { id: border.clone() })?;
                let axis = geometry.location.orientation().flip();
                DragSnapshot::Tile {
                    sizes: geometry.tile_sizes.clone(),
                    weights: node.tile_weights.clone(),
                    start: content.start(axis),
                    axis,
                }
            }
            SplitterTarget::Border { border } => {
                let node = model
                    .nodes
                    .get(border)
                    .and_then(|node| node.as_border())
                    .ok_or_else(|| LayoutError::UnknownBorder { id: border.clone() })?;
                DragSnapshot::Border {
                    size: node.size(&model.config),
                    edge: node.location,
                }
            }
        };
        Ok(Self {
            target,
            origin,
            snapshot,
        })
    }

    #[must_use]
    pub fn target(&self) -> &SplitterTarget {
        &self.target
    }

    /// Action for the pointer at `pointer`.
    pub fn update(&self, model: &Model, pointer: Point) -> Result<Action, LayoutError> {
        match (&self.target, &self.snapshot) {
            (
                SplitterTarget::Row { row, index },
                DragSnapshot::Row {
                    initials,
                    orientation,
                },
            ) => {
                let delta = pointer.along(*orientation) - self.origin.along(*orientation);
                let position = initials.splitter_position(*index, model.config.splitter_size) + delta;
                let weights = model.calculate_split(row, *index, position, initials)?;
                Ok(Action::AdjustWeights {
                    row: row.clone(),
                    weights,
                    orientation: *orientation,
                })
            }
            (
                SplitterTarget::Tile { border, index },
                DragSnapshot::Tile {
                    sizes,
                    weights,
                    start,
                    axis,
                },
            ) => {
                let splitter = model.config.splitter_size;
                let base = start + sizes[..*index].iter().sum::<f64>() + splitter * *index as f64;
                let combined = sizes[*index] + sizes[*index + 1];
                let delta = pointer.along(*axis) - self.origin.along(*axis);
                let (lo, hi) = pair_range(base, combined, SizeBounds::UNBOUNDED, SizeBounds::UNBOUNDED);
                let position = (base + sizes[*index] + delta).clamp(lo, hi);
                let first_px = position - base;
                Ok(Action::AdjustTileWeights {
                    border: border.clone(),
                    weights: split_weights(weights, *index, first_px, combined - first_px),
                })
            }
            (SplitterTarget::Border { border }, DragSnapshot::Border { size, edge }) => {
                let axis = edge.orientation();
                let delta = pointer.along(axis) - self.origin.along(axis);
                let grown = if edge.is_near() { delta } else { -delta };
                Ok(Action::AdjustBorderSplit {
                    border: border.clone(),
                    size: (size + grown).max(0.0),
                })
            }
            _ => Err(LayoutError::NoLayout),
        }
    }
}
