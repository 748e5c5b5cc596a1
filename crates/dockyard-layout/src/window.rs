//! Floating window geometry: move, resize, z-order.

use dockyard_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{ActionError, LayoutError};
use crate::model::Model;
use crate::node::NodeId;

/// Pixels of a window that must stay inside the layout on each axis.
pub const MIN_VIEWPORT_VISIBILITY: f64 = 40.0;
pub const MIN_WIDTH: f64 = 120.0;
pub const MIN_HEIGHT: f64 = 80.0;

/// Default grip thickness for [`classify_resize_handle`].
pub const RESIZE_GRIP_INSET: f64 = 6.0;

/// Edge or corner a resize drag starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeHandle {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// `Some(false)` for the left side, `Some(true)` for the right side.
    const fn horizontal(self) -> Option<bool> {
        match self {
            Self::Left | Self::TopLeft | Self::BottomLeft => Some(false),
            Self::Right | Self::TopRight | Self::BottomRight => Some(true),
            Self::Top | Self::Bottom => None,
        }
    }

    /// `Some(false)` for the top side, `Some(true)` for the bottom side.
    const fn vertical(self) -> Option<bool> {
        match self {
            Self::Top | Self::TopLeft | Self::TopRight => Some(false),
            Self::Bottom | Self::BottomLeft | Self::BottomRight => Some(true),
            Self::Left | Self::Right => None,
        }
    }
}

/// Which handle of `rect`, if any, lies under `pointer`.
#[must_use]
pub fn classify_resize_handle(rect: Rect, pointer: Point, inset: f64) -> Option<ResizeHandle> {
    let inset = inset.max(0.5);
    let (left, right, top, bottom) = (rect.x, rect.right(), rect.y, rect.bottom());
    if pointer.x < left - inset
        || pointer.x > right + inset
        || pointer.y < top - inset
        || pointer.y > bottom + inset
    {
        return None;
    }

    let near_left = (pointer.x - left).abs() <= inset;
    let near_right = (pointer.x - right).abs() <= inset;
    let near_top = (pointer.y - top).abs() <= inset;
    let near_bottom = (pointer.y - bottom).abs() <= inset;

    match (near_left, near_right, near_top, near_bottom) {
        (true, false, true, false) => Some(ResizeHandle::TopLeft),
        (false, true, true, false) => Some(ResizeHandle::TopRight),
        (true, false, false, true) => Some(ResizeHandle::BottomLeft),
        (false, true, false, true) => Some(ResizeHandle::BottomRight),
        (true, false, false, false) => Some(ResizeHandle::Left),
        (false, true, false, false) => Some(ResizeHandle::Right),
        (false, false, true, false) => Some(ResizeHandle::Top),
        (false, false, false, true) => Some(ResizeHandle::Bottom),
        _ => None,
    }
}

fn clamp_axis(start: f64, length: f64, bounds_start: f64, bounds_length: f64) -> f64 {
    let visible = MIN_VIEWPORT_VISIBILITY.min(length);
    let lo = bounds_start - length + visible;
    let hi = bounds_start + bounds_length - visible;
    if hi < lo { lo } else { start.clamp(lo, hi) }
}

/// Keep at least [`MIN_VIEWPORT_VISIBILITY`] pixels of `rect` inside
/// `bounds` on both axes. Size is untouched.
#[must_use]
pub fn clamp_position(rect: Rect, bounds: Rect) -> Rect {
    Rect {
        x: clamp_axis(rect.x, rect.width, bounds.x, bounds.width),
        y: clamp_axis(rect.y, rect.height, bounds.y, bounds.height),
        ..rect
    }
}

/// `start` translated by the pointer delta, then clamped.
#[must_use]
pub fn moved_rect(start: Rect, dx: f64, dy: f64, bounds: Option<Rect>) -> Rect {
    let rect = Rect {
        x: start.x + dx,
        y: start.y + dy,
        ..start
    };
    bounds.map_or(rect, |bounds| clamp_position(rect, bounds))
}

/// `start` resized from `handle` by the pointer delta.
///
/// Far edges only change the size. Near edges move the position so the
/// opposite edge stays put.
#[must_use]
pub fn resized_rect(start: Rect, handle: ResizeHandle, dx: f64, dy: f64) -> Rect {
    let mut rect = start;
    match handle.horizontal() {
        Some(true) => rect.width = (start.width + dx).max(MIN_WIDTH),
        Some(false) => {
            rect.width = (start.width - dx).max(MIN_WIDTH);
            rect.x = start.right() - rect.width;
        }
        None => {}
    }
    match handle.vertical() {
        Some(true) => rect.height = (start.height + dy).max(MIN_HEIGHT),
        Some(false) => {
            rect.height = (start.height - dy).max(MIN_HEIGHT);
            rect.y = start.bottom() - rect.height;
        }
        None => {}
    }
    rect
}

/// Normalize a requested window rect: minimum size, then visibility.
#[must_use]
pub fn constrain_rect(rect: Rect, bounds: Option<Rect>) -> Rect {
    let rect = Rect {
        width: rect.width.max(MIN_WIDTH),
        height: rect.height.max(MIN_HEIGHT),
        ..rect
    };
    bounds.map_or(rect, |bounds| clamp_position(rect, bounds))
}

fn finite(rect: &Rect) -> bool {
    [rect.x, rect.y, rect.width, rect.height]
        .iter()
        .all(|v| v.is_finite())
}

impl Model {
    fn layout_bounds(&self) -> Option<Rect> {
        self.last_layout.as_ref().map(|layout| layout.bounds)
    }

    /// Where a newly floated tab lands when no rect is given.
    #[must_use]
    pub fn default_float_rect(&self) -> Rect {
        let (width, height) = (self.config.float_default_width, self.config.float_default_height);
        match self.layout_bounds() {
            Some(bounds) => {
                let center = bounds.center();
                Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
            }
            None => Rect::new(0.0, 0.0, width, height),
        }
    }

    pub(crate) fn float_rect(&self, requested: Option<Rect>) -> Result<Rect, ActionError> {
        match requested {
            Some(rect) if !finite(&rect) => Err(ActionError::NoEffect),
            Some(rect) => Ok(constrain_rect(rect, self.layout_bounds())),
            None => Ok(constrain_rect(self.default_float_rect(), self.layout_bounds())),
        }
    }

    /// Move `window` to the front.
    pub(crate) fn raise_window(&mut self, window: &NodeId) -> bool {
        let Some(position) = self.z_order.iter().position(|id| id == window) else {
            return false;
        };
        if position + 1 == self.z_order.len() {
            return false;
        }
        let id = self.z_order.remove(position);
        self.z_order.push(id);
        true
    }

    pub(crate) fn apply_move_window(&mut self, window: &NodeId, x: f64, y: f64) -> Result<(), ActionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ActionError::NoEffect);
        }
        let bounds = self.layout_bounds();
        let current = self.window(window)?.rect;
        let rect = moved_rect(current, x - current.x, y - current.y, bounds);
        if rect == current {
            return Err(ActionError::NoEffect);
        }
        self.window_mut(window)?.rect = rect;
        Ok(())
    }

    pub(crate) fn apply_resize_window(&mut self, window: &NodeId, rect: Rect) -> Result<(), ActionError> {
        if !finite(&rect) {
            return Err(ActionError::NoEffect);
        }
        let rect = constrain_rect(rect, self.layout_bounds());
        let node = self.window_mut(window)?;
        if node.rect == rect {
            return Err(ActionError::NoEffect);
        }
        node.rect = rect;
        Ok(())
    }

    pub(crate) fn apply_focus_window(&mut self, window: &NodeId) -> Result<(), ActionError> {
        self.window(window)?;
        if !self.raise_window(window) {
            return Err(ActionError::NoEffect);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Move,
    Resize(ResizeHandle),
}

/// One move or resize gesture on a floating window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDrag {
    window: NodeId,
    gesture: Gesture,
    origin: Point,
    start: Rect,
}

impl WindowDrag {
    fn begin(model: &Model, window: NodeId, gesture: Gesture, origin: Point) -> Result<Self, LayoutError> {
        let start = model
            .windows()
            .find(|node| node.id == window)
            .map(|node| node.rect)
            .ok_or_else(|| LayoutError::UnknownWindow { id: window.clone() })?;
        Ok(Self {
            window,
            gesture,
            origin,
            start,
        })
    }

    pub fn start_move(model: &Model, window: NodeId, origin: Point) -> Result<Self, LayoutError> {
        Self::begin(model, window, Gesture::Move, origin)
    }

    pub fn start_resize(
        model: &Model,
        window: NodeId,
        handle: ResizeHandle,
        origin: Point,
    ) -> Result<Self, LayoutError> {
        Self::begin(model, window, Gesture::Resize(handle), origin)
    }

    #[must_use]
    pub fn window(&self) -> &NodeId {
        &self.window
    }

    /// Action for the pointer at `pointer`, clamped against `bounds`.
    #[must_use]
    pub fn update(&self, pointer: Point, bounds: Option<Rect>) -> Action {
        let (dx, dy) = (pointer.x - self.origin.x, pointer.y - self.origin.y);
        match self.gesture {
            Gesture::Move => {
                let rect = moved_rect(self.start, dx, dy, bounds);
                Action::MoveWindow {
                    window: self.window.clone(),
                    x: rect.x,
                    y: rect.y,
                }
            }
            Gesture::Resize(handle) => Action::ResizeWindow {
                window: self.window.clone(),
                rect: resized_rect(self.start, handle, dx, dy),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn handles_classify_edges_and_corners() {
        let rect = Rect::new(100.0, 100.0, 200.0, 150.0);
        let at = |x, y| classify_resize_handle(rect, Point::new(x, y), 4.0);
        assert_eq!(at(100.0, 100.0), Some(ResizeHandle::TopLeft));
        assert_eq!(at(300.0, 250.0), Some(ResizeHandle::BottomRight));
        assert_eq!(at(200.0, 102.0), Some(ResizeHandle::Top));
        assert_eq!(at(298.0, 180.0), Some(ResizeHandle::Right));
        assert_eq!(at(200.0, 180.0), None);
        assert_eq!(at(50.0, 50.0), None);
    }

    #[test]
    fn move_keeps_a_sliver_visible() {
        let start = Rect::new(100.0, 100.0, 200.0, 150.0);
        let far_left = moved_rect(start, -1000.0, 0.0, Some(BOUNDS));
        assert_eq!(far_left.x, -160.0);
        let far_down = moved_rect(start, 0.0, 5000.0, Some(BOUNDS));
        assert_eq!(far_down.y, 760.0);
        assert_eq!(moved_rect(start, 10.0, 20.0, Some(BOUNDS)), Rect::new(110.0, 120.0, 200.0, 150.0));
    }

    #[test]
    fn far_edge_resize_only_grows() {
        let start = Rect::new(100.0, 100.0, 200.0, 150.0);
        let rect = resized_rect(start, ResizeHandle::BottomRight, 30.0, 40.0);
        assert_eq!(rect, Rect::new(100.0, 100.0, 230.0, 190.0));
    }

    #[test]
    fn near_edge_resize_pins_opposite_edge() {
        let start = Rect::new(100.0, 100.0, 200.0, 150.0);
        let rect = resized_rect(start, ResizeHandle::TopLeft, 30.0, -20.0);
        assert_eq!(rect, Rect::new(130.0, 80.0, 170.0, 170.0));

        let clamped = resized_rect(start, ResizeHandle::Left, 500.0, 0.0);
        assert_eq!(clamped.width, MIN_WIDTH);
        assert_eq!(clamped.right(), start.right());
    }

    fn floating() -> Model {
        Model::from_value(json!({
            "layout": {"type": "row", "children": [{"type": "tabset", "children": [{"type": "tab"}]}]},
            "windows": [
                {"id": "w1", "rect": {"x": 10, "y": 10, "width": 300, "height": 200}, "zOrder": 0,
                 "children": [{"type": "tab", "id": "f1"}]},
                {"id": "w2", "rect": {"x": 50, "y": 50, "width": 300, "height": 200}, "zOrder": 1,
                 "children": [{"type": "tab", "id": "f2"}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn focus_raises_to_front() {
        let mut model = floating();
        let w1 = NodeId::from("w1");
        model.apply_focus_window(&w1).unwrap();
        assert_eq!(model.z_order(), &[NodeId::from("w2"), w1.clone()]);
        assert!(matches!(model.apply_focus_window(&w1), Err(ActionError::NoEffect)));
    }

    #[test]
    fn default_rect_centres_in_layout() {
        let mut model = floating();
        assert_eq!(model.default_float_rect(), Rect::new(0.0, 0.0, 400.0, 300.0));
        model.update_layout(BOUNDS);
        assert_eq!(model.default_float_rect(), Rect::new(300.0, 250.0, 400.0, 300.0));
    }

    #[test]
    fn resize_action_enforces_minimum() {
        let mut model = floating();
        let w1 = NodeId::from("w1");
        model
            .apply_resize_window(&w1, Rect::new(10.0, 10.0, 20.0, 20.0))
            .unwrap();
        let rect = model.windows().next().unwrap().rect;
        assert_eq!(rect, Rect::new(10.0, 10.0, MIN_WIDTH, MIN_HEIGHT));
    }

    #[test]
    fn drag_session_emits_move() {
        let mut model = floating();
        model.update_layout(BOUNDS);
        let drag = WindowDrag::start_move(&model, NodeId::from("w1"), Point::new(20.0, 20.0)).unwrap();
        assert_eq!(
            drag.update(Point::new(70.0, 45.0), Some(BOUNDS)),
            Action::MoveWindow {
                window: NodeId::from("w1"),
                x: 60.0,
                y: 35.0,
            }
        );
        assert!(WindowDrag::start_move(&model, NodeId::from("nope"), Point::new(0.0, 0.0)).is_err());
    }
}
