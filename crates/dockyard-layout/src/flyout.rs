//! Flyout overlay for collapsed borders.
//!
//! A flyout shows one tab of a collapsed border on top of the docked layout
//! without expanding the border. It stacks above docked content and below
//! floating windows.

use dockyard_core::{Edge, Insets, Orientation, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutSnapshot;
use crate::model::Model;
use crate::node::NodeId;

/// Flyout size along the border axis when the border has no size of its own.
pub const DEFAULT_FLYOUT_FRACTION: f64 = 0.25;

/// Upper bound of the flyout size along the border axis.
pub const MAX_FLYOUT_FRACTION: f64 = 0.5;

/// The tab currently popped out of a collapsed border.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flyout {
    pub border: NodeId,
    pub tab: NodeId,
}

/// Paint and hit-test order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Docked,
    Flyout,
    Floating,
}

/// Overlay rect for a border at `edge`.
///
/// `strip` is the border's strip in the current layout. The overlay sits
/// flush against its inner side and spans the cross axis between the strips
/// of the borders on that axis.
#[must_use]
pub fn flyout_geometry(
    edge: Edge,
    configured: Option<f64>,
    bounds: Rect,
    strip: Rect,
    insets: Insets,
) -> Rect {
    let axis = edge.orientation();
    let extent = bounds.extent(axis);
    let size = configured
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or(extent * DEFAULT_FLYOUT_FRACTION)
        .min(extent * MAX_FLYOUT_FRACTION);

    let (near, far) = match axis.flip() {
        Orientation::Horizontal => (Edge::Left, Edge::Right),
        Orientation::Vertical => (Edge::Top, Edge::Bottom),
    };
    let cross_start = bounds.start(axis.flip()) + insets.get(near);
    let cross_len = (bounds.extent(axis.flip()) - insets.get(near) - insets.get(far)).max(0.0);
    let main_start = if edge.is_near() {
        strip.start(axis) + strip.extent(axis)
    } else {
        strip.start(axis) - size
    };

    match axis {
        Orientation::Horizontal => Rect::new(main_start, cross_start, size, cross_len),
        Orientation::Vertical => Rect::new(cross_start, main_start, cross_len, size),
    }
}

impl LayoutSnapshot {
    /// Topmost layer under `point`.
    #[must_use]
    pub fn layer_at(&self, point: Point) -> Layer {
        if self.windows.values().any(|rect| rect.contains(point)) {
            Layer::Floating
        } else if self.flyout.is_some_and(|rect| rect.contains(point)) {
            Layer::Flyout
        } else {
            Layer::Docked
        }
    }
}

impl Model {
    pub(crate) fn flyout_rect(&self, snapshot: &LayoutSnapshot) -> Option<Rect> {
        let flyout = self.flyout.as_ref()?;
        let border = self.nodes.get(&flyout.border)?.as_border()?;
        let geometry = snapshot.borders.get(&border.id)?;
        Some(flyout_geometry(
            border.location,
            border.attrs.size,
            snapshot.bounds,
            geometry.strip,
            snapshot.insets,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn left_flyout_defaults_to_quarter_width() {
        let insets = Insets::new(30.0, 0.0, 30.0, 30.0);
        let strip = Rect::new(0.0, 30.0, 30.0, 740.0);
        let rect = flyout_geometry(Edge::Left, None, BOUNDS, strip, insets);
        assert_eq!(rect, Rect::new(30.0, 30.0, 250.0, 740.0));
    }

    #[test]
    fn size_is_capped_at_half() {
        let insets = Insets::new(0.0, 0.0, 0.0, 30.0);
        let strip = Rect::new(0.0, 0.0, 30.0, 800.0);
        let rect = flyout_geometry(Edge::Left, Some(900.0), BOUNDS, strip, insets);
        assert_eq!(rect.width, 500.0);
    }

    #[test]
    fn far_edges_grow_inwards() {
        let insets = Insets::new(0.0, 30.0, 30.0, 0.0);
        let right = flyout_geometry(
            Edge::Right,
            Some(200.0),
            BOUNDS,
            Rect::new(970.0, 0.0, 30.0, 770.0),
            insets,
        );
        assert_eq!(right, Rect::new(770.0, 0.0, 200.0, 770.0));

        let bottom = flyout_geometry(
            Edge::Bottom,
            Some(100.0),
            BOUNDS,
            Rect::new(0.0, 770.0, 1000.0, 30.0),
            insets,
        );
        assert_eq!(bottom, Rect::new(0.0, 670.0, 970.0, 100.0));
    }

    #[test]
    fn layers_are_ordered() {
        assert!(Layer::Docked < Layer::Flyout);
        assert!(Layer::Flyout < Layer::Floating);
    }

    #[test]
    fn snapshot_carries_open_flyout() {
        let mut model = Model::from_value(json!({
            "layout": {"type": "row", "children": [{"type": "tabset", "children": [{"type": "tab"}]}]},
            "borders": [{"id": "west", "location": "left", "dockState": "collapsed",
                         "children": [{"type": "tab", "id": "tools"}]}]
        }))
        .unwrap();
        model.flyout = Some(Flyout {
            border: NodeId::from("west"),
            tab: NodeId::from("tools"),
        });
        let layout = model.compute_layout(BOUNDS);
        let rect = layout.flyout.unwrap();
        assert_eq!(rect, Rect::new(30.0, 0.0, 250.0, 800.0));
        assert_eq!(layout.layer_at(Point::new(100.0, 100.0)), Layer::Flyout);
        assert_eq!(layout.layer_at(Point::new(600.0, 100.0)), Layer::Docked);
    }
}
