//! Drag and drop targeting.
//!
//! Hit-testing runs against the last computed [`LayoutSnapshot`] in a fixed
//! priority: floating windows front to back, the open flyout, border strips,
//! the edges of the root area, then tabsets. A candidate is then checked
//! against drag/drop policy, the no-op rule, and an optional caller supplied
//! validator. A rejected drop yields no target, which is an expected result
//! rather than an error.

use dockyard_core::{Edge, Orientation, Point, Rect};

use crate::action::{Action, DropLocation};
use crate::error::ActionError;
use crate::json::TabJson;
use crate::layout::LayoutSnapshot;
use crate::model::Model;
use crate::node::{Node, NodeId};

/// Fraction of a target's width/height that counts as an edge zone.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.25;

/// Caller hook consulted for every candidate drop.
pub type DropValidator = dyn Fn(&Model, &DragSubject, &NodeId, DropLocation) -> bool;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSubject {
    Tab(NodeId),
    TabSet(NodeId),
    /// A tab that does not exist yet, such as one dragged in from outside
    /// the layout.
    NewTab(TabJson),
}

impl DragSubject {
    #[must_use]
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Tab(id) | Self::TabSet(id) => Some(id),
            Self::NewTab(_) => None,
        }
    }
}

/// A resolved place to drop the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub node: NodeId,
    pub location: DropLocation,
    /// Insertion index for tab-strip drops.
    pub index: Option<usize>,
    /// Where to draw the drop indicator.
    pub outline: Rect,
}

impl DropTarget {
    /// The action that performs this drop.
    #[must_use]
    pub fn into_action(self, subject: &DragSubject) -> Action {
        match subject {
            DragSubject::Tab(node) | DragSubject::TabSet(node) => Action::MoveNode {
                node: node.clone(),
                to: self.node,
                location: self.location,
                index: self.index,
                select: None,
            },
            DragSubject::NewTab(json) => Action::AddNode {
                json: json.clone(),
                to: self.node,
                location: self.location,
                index: self.index,
                select: None,
            },
        }
    }
}

/// Splits a rect into four edge zones and a center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZoneDetector {
    pub edge_threshold: f64,
}

impl Default for DropZoneDetector {
    fn default() -> Self {
        Self {
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

impl DropZoneDetector {
    #[must_use]
    pub fn with_edge_threshold(threshold: f64) -> Self {
        Self {
            edge_threshold: threshold.clamp(0.0, 0.5),
        }
    }

    /// Zone of `rect` under `point`. Left and right win over top and bottom.
    #[must_use]
    pub fn detect_zone(&self, point: Point, rect: Rect) -> Option<DropLocation> {
        let (rel_x, rel_y) = rect.relative(point)?;
        let t = self.edge_threshold;
        Some(if rel_x < t {
            DropLocation::Left
        } else if rel_x > 1.0 - t {
            DropLocation::Right
        } else if rel_y < t {
            DropLocation::Top
        } else if rel_y > 1.0 - t {
            DropLocation::Bottom
        } else {
            DropLocation::Center
        })
    }

    /// Outline of the area a drop into `zone` of `rect` would occupy.
    #[must_use]
    pub fn preview_bounds(&self, zone: DropLocation, rect: Rect) -> Rect {
        match zone.edge() {
            Some(edge) => {
                let axis = edge.orientation();
                rect.split_edge(edge, rect.extent(axis) / 2.0).0
            }
            None => rect,
        }
    }
}

/// Insertion index for a point over a strip of `count` equal headers.
fn header_index(strip: Rect, axis: Orientation, point: Point, count: usize) -> usize {
    let extent = strip.extent(axis);
    if count == 0 || extent <= 0.0 {
        return count;
    }
    let rel = ((point.along(axis) - strip.start(axis)) / extent).clamp(0.0, 1.0);
    ((rel * count as f64 + 0.5).floor() as usize).min(count)
}

/// Root edge within `threshold` pixels of `point`, if any.
fn root_edge(root: Rect, point: Point, threshold: f64) -> Option<Edge> {
    if !root.contains(point) {
        return None;
    }
    [
        (Edge::Left, point.x - root.x),
        (Edge::Right, root.right() - point.x),
        (Edge::Top, point.y - root.y),
        (Edge::Bottom, root.bottom() - point.y),
    ]
    .into_iter()
    .find(|(_, distance)| *distance < threshold)
    .map(|(edge, _)| edge)
}

impl Model {
    /// Whether `subject` may be dragged at all.
    pub fn check_draggable(&self, subject: &DragSubject) -> Result<(), ActionError> {
        let (id, enabled) = match subject {
            DragSubject::Tab(id) => (id, self.tab(id)?.enable_drag(&self.config)),
            DragSubject::TabSet(id) => (id, self.tabset(id)?.enable_drag(&self.config)),
            DragSubject::NewTab(_) => return Ok(()),
        };
        if !enabled {
            return Err(ActionError::Disabled {
                id: id.clone(),
                feature: "drag",
            });
        }
        Ok(())
    }

    fn hit_test(&self, layout: &LayoutSnapshot, point: Point, detector: &DropZoneDetector) -> Option<DropTarget> {
        for window in self.z_order.iter().rev() {
            if let Some(rect) = layout.windows.get(window).filter(|rect| rect.contains(point)) {
                return Some(DropTarget {
                    node: window.clone(),
                    location: DropLocation::Center,
                    index: None,
                    outline: *rect,
                });
            }
        }

        if let (Some(flyout), Some(rect)) = (self.flyout.as_ref(), layout.flyout) {
            if rect.contains(point) {
                return Some(DropTarget {
                    node: flyout.border.clone(),
                    location: DropLocation::Center,
                    index: None,
                    outline: rect,
                });
            }
        }

        for border in self.borders() {
            let Some(geometry) = layout.borders.get(&border.id) else {
                continue;
            };
            if !geometry.strip.contains(point) {
                continue;
            }
            let index = geometry.bar.contains(point).then(|| {
                header_index(
                    geometry.bar,
                    border.location.orientation().flip(),
                    point,
                    border.children.len(),
                )
            });
            return Some(DropTarget {
                node: border.id.clone(),
                location: DropLocation::Center,
                index,
                outline: geometry.strip,
            });
        }

        if self.config.enable_edge_dock {
            if let Some(edge) = root_edge(layout.root, point, self.config.edge_dock_threshold) {
                let location = DropLocation::from_edge(edge);
                return Some(DropTarget {
                    node: self.root.clone(),
                    location,
                    index: None,
                    outline: detector.preview_bounds(location, layout.root),
                });
            }
        }

        let (id, geometry) = layout
            .tabsets
            .iter()
            .find(|(_, geometry)| geometry.rect.contains(point))?;
        let tabset = self.nodes.get(id)?.as_tabset()?;
        if let Some(strip) = geometry.strip.filter(|strip| strip.contains(point)) {
            return Some(DropTarget {
                node: id.clone(),
                location: DropLocation::Center,
                index: Some(header_index(
                    strip,
                    Orientation::Horizontal,
                    point,
                    tabset.children.len(),
                )),
                outline: geometry.rect,
            });
        }
        let mut location = detector.detect_zone(point, geometry.content)?;
        if location != DropLocation::Center && !tabset.enable_divide(&self.config) {
            location = DropLocation::Center;
        }
        Some(DropTarget {
            node: id.clone(),
            location,
            index: None,
            outline: detector.preview_bounds(location, geometry.rect),
        })
    }

    fn accepts_drop(&self, target: &DropTarget) -> bool {
        match self.nodes.get(&target.node) {
            Some(Node::TabSet(tabset)) => tabset.enable_drop(&self.config),
            Some(Node::Border(border)) => border.enable_drop(&self.config),
            Some(Node::Window(_) | Node::Row(_)) => true,
            _ => false,
        }
    }

    fn changes_layout(&self, subject: &DragSubject, target: &DropTarget) -> bool {
        match subject {
            DragSubject::Tab(tab) => !self
                .is_noop_tab_move(tab, &target.node, target.location, target.index)
                .unwrap_or(true),
            DragSubject::TabSet(tabset) => {
                if *tabset == target.node {
                    return false;
                }
                let sole_root_child = self
                    .row(&self.root)
                    .is_ok_and(|root| root.children.len() == 1 && root.children[0] == *tabset);
                !(target.node == self.root && sole_root_child)
            }
            DragSubject::NewTab(_) => true,
        }
    }

    /// Where `subject` would land if dropped at `point`, or `None` when the
    /// drop is not allowed.
    #[must_use]
    pub fn find_drop_target(
        &self,
        layout: &LayoutSnapshot,
        subject: &DragSubject,
        point: Point,
        validator: Option<&DropValidator>,
    ) -> Option<DropTarget> {
        if self.check_draggable(subject).is_err() {
            return None;
        }
        let target = self.hit_test(layout, point, &DropZoneDetector::default())?;

        let rejected = if !self.accepts_drop(&target) {
            Some("drop disabled")
        } else if !self.changes_layout(subject, &target) {
            Some("no effect")
        } else if validator.is_some_and(|validate| !validate(self, subject, &target.node, target.location)) {
            Some("validator")
        } else {
            None
        };

        if let Some(reason) = rejected {
            tracing::trace!(
                target: "dockyard.drag",
                node = %target.node,
                location = %target.location,
                reason,
                "drop rejected"
            );
            return None;
        }
        Some(target)
    }
}

/// One tab or tabset drag, from pointer-down to drop or cancel.
#[derive(Debug, Clone)]
pub struct TabDrag {
    subject: DragSubject,
    target: Option<DropTarget>,
}

impl TabDrag {
    /// Begin dragging `subject`. Fails when dragging is disabled for it.
    pub fn start(model: &Model, subject: DragSubject) -> Result<Self, ActionError> {
        model.check_draggable(&subject)?;
        tracing::trace!(target: "dockyard.drag", subject = ?subject.node(), "drag started");
        Ok(Self {
            subject,
            target: None,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &DragSubject {
        &self.subject
    }

    /// Current preview target.
    #[must_use]
    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Re-target for the pointer at `point`.
    pub fn update(
        &mut self,
        model: &Model,
        layout: &LayoutSnapshot,
        point: Point,
        validator: Option<&DropValidator>,
    ) -> Option<&DropTarget> {
        self.target = model.find_drop_target(layout, &self.subject, point, validator);
        self.target.as_ref()
    }

    /// End the drag. Yields the action to dispatch when over a valid target.
    #[must_use]
    pub fn finish(self) -> Option<Action> {
        let subject = self.subject;
        self.target.map(|target| target.into_action(&subject))
    }

    /// Abandon the drag without changing anything.
    pub fn cancel(self) {
        tracing::trace!(target: "dockyard.drag", subject = ?self.subject.node(), "drag cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn model() -> (Model, LayoutSnapshot) {
        let model = Model::from_value(json!({
            "global": {"splitterSize": 0},
            "layout": {"type": "row", "id": "root", "children": [
                {"type": "tabset", "id": "ts1", "children": [
                    {"type": "tab", "id": "a"}, {"type": "tab", "id": "b"}
                ]},
                {"type": "tabset", "id": "ts2", "children": [{"type": "tab", "id": "c"}]}
            ]}
        }))
        .unwrap();
        let layout = model.compute_layout(BOUNDS);
        (model, layout)
    }

    fn tab(id: &str) -> DragSubject {
        DragSubject::Tab(NodeId::from(id))
    }

    #[test]
    fn zones_prefer_left_and_right() {
        let detector = DropZoneDetector::default();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(detector.detect_zone(Point::new(10.0, 10.0), rect), Some(DropLocation::Left));
        assert_eq!(detector.detect_zone(Point::new(50.0, 90.0), rect), Some(DropLocation::Bottom));
        assert_eq!(detector.detect_zone(Point::new(50.0, 50.0), rect), Some(DropLocation::Center));
        assert_eq!(detector.detect_zone(Point::new(150.0, 50.0), rect), None);
        assert_eq!(
            detector.preview_bounds(DropLocation::Right, rect),
            Rect::new(50.0, 0.0, 50.0, 100.0)
        );
    }

    #[test]
    fn content_center_and_edge() {
        let (model, layout) = model();
        let target = model
            .find_drop_target(&layout, &tab("a"), Point::new(600.0, 300.0), None)
            .unwrap();
        assert_eq!((target.node.as_str(), target.location), ("ts2", DropLocation::Center));

        let target = model
            .find_drop_target(&layout, &tab("a"), Point::new(420.0, 300.0), None)
            .unwrap();
        assert_eq!((target.node.as_str(), target.location), ("ts2", DropLocation::Left));
        assert_eq!(target.outline, Rect::new(400.0, 0.0, 200.0, 600.0));
    }

    #[test]
    fn strip_hit_computes_insertion_index() {
        let (model, layout) = model();
        let target = model
            .find_drop_target(&layout, &tab("c"), Point::new(100.0, 10.0), None)
            .unwrap();
        assert_eq!(target.node.as_str(), "ts1");
        assert_eq!(target.location, DropLocation::Center);
        assert_eq!(target.index, Some(1));
    }

    #[test]
    fn dropping_on_own_sole_tabset_is_rejected() {
        let (model, layout) = model();
        assert!(model
            .find_drop_target(&layout, &tab("c"), Point::new(420.0, 300.0), None)
            .is_none());
        assert!(model
            .find_drop_target(&layout, &tab("c"), Point::new(600.0, 300.0), None)
            .is_none());
    }

    #[test]
    fn divide_disabled_downgrades_to_center() {
        let (mut model, _) = model();
        model
            .do_action(&Action::UpdateNodeAttributes {
                node: NodeId::from("ts2"),
                attributes: json!({"enableDivide": false}).as_object().unwrap().clone(),
            })
            .unwrap();
        let layout = model.compute_layout(BOUNDS);
        let target = model
            .find_drop_target(&layout, &tab("a"), Point::new(420.0, 300.0), None)
            .unwrap();
        assert_eq!(target.location, DropLocation::Center);
    }

    #[test]
    fn drop_disabled_target_is_rejected() {
        let (mut model, _) = model();
        model
            .do_action(&Action::UpdateNodeAttributes {
                node: NodeId::from("ts2"),
                attributes: json!({"enableDrop": false}).as_object().unwrap().clone(),
            })
            .unwrap();
        let layout = model.compute_layout(BOUNDS);
        assert!(model
            .find_drop_target(&layout, &tab("a"), Point::new(600.0, 300.0), None)
            .is_none());
    }

    #[test]
    fn root_edges_take_priority_over_tabsets() {
        let (model, layout) = model();
        let target = model
            .find_drop_target(&layout, &tab("a"), Point::new(3.0, 300.0), None)
            .unwrap();
        assert_eq!(target.node.as_str(), "root");
        assert_eq!(target.location, DropLocation::Left);
    }

    #[test]
    fn validator_can_veto() {
        let (model, layout) = model();
        let deny_ts2 = |_: &Model, _: &DragSubject, node: &NodeId, _: DropLocation| node.as_str() != "ts2";
        assert!(model
            .find_drop_target(&layout, &tab("a"), Point::new(600.0, 300.0), Some(&deny_ts2))
            .is_none());
        assert!(model
            .find_drop_target(&layout, &tab("c"), Point::new(200.0, 300.0), Some(&deny_ts2))
            .is_some());
    }

    #[test]
    fn windows_are_hit_first() {
        let (mut model, _) = model();
        model
            .do_action(&Action::FloatTab {
                tab: NodeId::from("b"),
                rect: Some(Rect::new(500.0, 100.0, 200.0, 150.0)),
            })
            .unwrap();
        let layout = model.compute_layout(BOUNDS);
        let window = model.windows().next().unwrap().id.clone();
        let target = model
            .find_drop_target(&layout, &tab("a"), Point::new(600.0, 150.0), None)
            .unwrap();
        assert_eq!(target.node, window);
        assert_eq!(target.location, DropLocation::Center);
    }

    #[test]
    fn session_produces_move_action() {
        let (model, layout) = model();
        let mut drag = TabDrag::start(&model, tab("a")).unwrap();
        assert!(drag.update(&model, &layout, Point::new(600.0, 300.0), None).is_some());
        assert_eq!(
            drag.finish(),
            Some(Action::MoveNode {
                node: NodeId::from("a"),
                to: NodeId::from("ts2"),
                location: DropLocation::Center,
                index: None,
                select: None,
            })
        );

        let mut drag = TabDrag::start(&model, tab("c")).unwrap();
        assert!(drag.update(&model, &layout, Point::new(600.0, 300.0), None).is_none());
        assert_eq!(drag.finish(), None);
    }

    #[test]
    fn new_tab_drop_adds_node() {
        let (model, layout) = model();
        let subject = DragSubject::NewTab(TabJson::new("Log", "log"));
        let target = model
            .find_drop_target(&layout, &subject, Point::new(200.0, 300.0), None)
            .unwrap();
        assert!(matches!(target.into_action(&subject), Action::AddNode { .. }));
    }

    #[test]
    fn drag_disabled_tab_cannot_start() {
        let (mut model, _) = model();
        model
            .do_action(&Action::UpdateNodeAttributes {
                node: NodeId::from("a"),
                attributes: json!({"enableDrag": false}).as_object().unwrap().clone(),
            })
            .unwrap();
        assert!(matches!(
            TabDrag::start(&model, tab("a")),
            Err(ActionError::Disabled { feature: "drag", .. })
        ));
    }
}
