//! End-to-end behaviour of common layout edits.

use dockyard_core::{Edge, Orientation, Point, Rect};
use dockyard_layout::{
    Action, ActionError, DockState, DragSubject, DropLocation, LayoutStore, Model, NodeId, SplitterDrag,
    SplitterTarget,
};
use serde_json::json;

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn two_halves() -> Model {
    Model::from_value(json!({
        "global": {"splitterSize": 0},
        "layout": {"type": "row", "id": "root", "children": [
            {"type": "tabset", "id": "left", "weight": 50, "children": [{"type": "tab", "id": "a"}]},
            {"type": "tabset", "id": "right", "weight": 50, "children": [{"type": "tab", "id": "b"}]}
        ]}
    }))
    .unwrap()
}

fn weight(model: &Model, node: &str) -> f64 {
    model.get_node_by_id(node).and_then(|n| n.weight()).unwrap()
}

#[test]
fn splitter_drag_matches_explicit_weights() {
    let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);

    let mut dragged = two_halves();
    dragged.update_layout(bounds);
    let drag = SplitterDrag::start(
        &dragged,
        SplitterTarget::Row { row: id("root"), index: 0 },
        Point::new(400.0, 300.0),
    )
    .unwrap();
    let action = drag.update(&dragged, Point::new(300.0, 300.0)).unwrap();
    dragged.do_action(&action).unwrap();
    assert!((weight(&dragged, "left") - 37.5).abs() < 1e-6);
    assert!((weight(&dragged, "right") - 62.5).abs() < 1e-6);

    let mut explicit = two_halves();
    explicit
        .do_action(&Action::adjust_weights("root", vec![37.5, 62.5], Orientation::Horizontal))
        .unwrap();

    let a = dragged.compute_layout(bounds);
    let b = explicit.compute_layout(bounds);
    for tabset in ["left", "right"] {
        let (ra, rb) = (a.tabset(tabset).unwrap().rect, b.tabset(tabset).unwrap().rect);
        assert!((ra.x - rb.x).abs() < 1e-6 && (ra.width - rb.width).abs() < 1e-6, "{tabset}");
    }
    assert!((a.tabset("left").unwrap().rect.width - 300.0).abs() < 1e-6);
}

fn three_tabs(selected: usize) -> Model {
    Model::from_value(json!({
        "layout": {"type": "row", "children": [
            {"type": "tabset", "id": "ts", "selected": selected, "children": [
                {"type": "tab", "id": "A"}, {"type": "tab", "id": "B"}, {"type": "tab", "id": "C"}
            ]}
        ]}
    }))
    .unwrap()
}

#[test]
fn deleting_selected_middle_tab_selects_previous() {
    let mut model = three_tabs(1);
    model.do_action(&Action::delete_tab("B")).unwrap();
    let ts = model.get_node_by_id("ts").unwrap();
    assert_eq!(ts.children(), &[id("A"), id("C")]);
    assert_eq!(ts.selected(), Some(0));
}

#[test]
fn deleting_selected_first_tab_selects_next() {
    let mut model = three_tabs(0);
    model.do_action(&Action::delete_tab("A")).unwrap();
    let ts = model.get_node_by_id("ts").unwrap();
    assert_eq!(ts.children(), &[id("B"), id("C")]);
    assert_eq!(ts.selected(), Some(0));
}

#[test]
fn emptying_a_border_hides_it_and_refilling_expands_it() {
    let mut model = Model::from_value(json!({
        "layout": {"type": "row", "children": [
            {"type": "tabset", "id": "main", "children": [{"type": "tab", "id": "doc"}]}
        ]},
        "borders": [{"id": "west", "location": "left", "selected": 0, "dockState": "expanded",
                     "children": [{"type": "tab", "id": "tools"}]}]
    }))
    .unwrap();

    model
        .do_action(&Action::move_node("tools", "main", DropLocation::Center))
        .unwrap();
    let west = model.border(Edge::Left).unwrap();
    assert!(west.visible_tabs.is_empty());
    assert_eq!(west.dock_state(), DockState::Hidden);

    model
        .do_action(&Action::move_node("tools", "west", DropLocation::Center))
        .unwrap();
    let west = model.border(Edge::Left).unwrap();
    assert_eq!(west.dock_state(), DockState::Expanded);
    assert_eq!(west.selected_tab(), Some(&id("tools")));
    assert_eq!(west.visible_tabs, vec![0]);
    model.validate().unwrap();
}

#[test]
fn floating_and_closing_the_only_tab() {
    let mut model = Model::from_value(json!({
        "layout": {"type": "row", "children": [
            {"type": "tabset", "id": "ts", "children": [{"type": "tab", "id": "a"}, {"type": "tab", "id": "b"}]}
        ]}
    }))
    .unwrap();

    model.do_action(&Action::float_tab("a")).unwrap();
    assert_eq!(model.get_node_by_id("ts").unwrap().children(), &[id("b")]);
    let windows: Vec<_> = model.windows().collect();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].children, vec![id("a")]);
    assert_eq!(windows[0].selected, Some(0));

    model.do_action(&Action::delete_tab("a")).unwrap();
    assert_eq!(model.windows().count(), 0);
    assert!(model.z_order().is_empty());
    model.validate().unwrap();
}

#[test]
fn tiled_border_survives_json_round_trip() {
    let model = Model::from_value(json!({
        "layout": {"type": "row", "children": [{"type": "tabset", "children": []}]},
        "borders": [{"id": "south", "location": "bottom", "selected": 2, "visibleTabs": [0, 2],
                     "children": [{"type": "tab", "id": "t0"}, {"type": "tab", "id": "t1"}, {"type": "tab", "id": "t2"}]}]
    }))
    .unwrap();

    let reloaded = Model::from_json(&model.to_json().unwrap()).unwrap();
    let south = reloaded.border(Edge::Bottom).unwrap();
    assert_eq!(south.visible_tabs, vec![0, 2]);
    assert_eq!(south.tile_weights.len(), 2);
    assert!(reloaded.structurally_eq(&model));
}

#[test]
fn collapsing_twice_is_idempotent() {
    let mut model = Model::from_value(json!({
        "layout": {"type": "row", "children": [{"type": "tabset", "children": []}]},
        "borders": [{"id": "east", "location": "right", "children": [{"type": "tab"}]}]
    }))
    .unwrap();
    model
        .do_action(&Action::set_dock_state("east", DockState::Collapsed))
        .unwrap();
    let once = model.to_value().unwrap();
    model
        .do_action(&Action::set_dock_state("east", DockState::Collapsed))
        .unwrap();
    assert_eq!(model.border(Edge::Right).unwrap().dock_state(), DockState::Collapsed);
    assert_eq!(model.to_value().unwrap(), once);
}

fn east_border(selected: usize, visible: &[usize]) -> Model {
    Model::from_value(json!({
        "layout": {"type": "row", "children": [{"type": "tabset", "children": []}]},
        "borders": [{"id": "east", "location": "right", "selected": selected, "visibleTabs": visible,
                     "children": [{"type": "tab", "id": "e0"}, {"type": "tab", "id": "e1"}, {"type": "tab", "id": "e2"}]}]
    }))
    .unwrap()
}

#[test]
fn border_selection_survives_dock_state_changes() {
    for (selected, visible) in [(1, vec![1]), (2, vec![0, 2])] {
        let mut model = east_border(selected, &visible);
        let weights = model.border(Edge::Right).unwrap().tile_weights.clone();
        for state in [DockState::Collapsed, DockState::Hidden, DockState::Expanded] {
            model
                .do_action(&Action::set_dock_state("east", state))
                .unwrap();
            let east = model.border(Edge::Right).unwrap();
            assert_eq!(east.dock_state(), state);
            assert_eq!(east.selected, Some(selected), "{state:?}");
            assert_eq!(east.visible_tabs, visible, "{state:?}");
            assert_eq!(east.tile_weights, weights, "{state:?}");
        }
        model.validate().unwrap();
    }
}

#[test]
fn moving_the_only_tab_to_a_root_edge_changes_nothing() {
    let mut store = LayoutStore::new(
        Model::from_value(json!({
            "layout": {"type": "row", "id": "root", "children": [
                {"type": "tabset", "id": "ts", "children": [{"type": "tab", "id": "a"}]}
            ]}
        }))
        .unwrap(),
    );
    let before = store.model().to_value().unwrap();
    for location in [DropLocation::Left, DropLocation::Right, DropLocation::Top, DropLocation::Bottom] {
        assert!(matches!(
            store.dispatch(Action::move_node("a", "root", location)),
            Err(ActionError::NoEffect)
        ));
    }
    assert_eq!(store.model().to_value().unwrap(), before);

    store.update_layout(Rect::new(0.0, 0.0, 800.0, 600.0));
    let subject = DragSubject::Tab(id("a"));
    assert!(store.find_drop_target(&subject, Point::new(798.0, 300.0)).is_none());
}

#[test]
fn unknown_node_leaves_store_untouched() {
    let mut store = LayoutStore::new(two_halves());
    let before = store.model().to_value().unwrap();
    assert!(store.dispatch(Action::delete_tab("ghost")).is_err());
    assert_eq!(store.model().to_value().unwrap(), before);
    assert_eq!(store.model().revision(), 0);
}

#[test]
fn dragging_to_root_edge_adds_a_column() {
    let mut store = LayoutStore::new(two_halves());
    store.update_layout(Rect::new(0.0, 0.0, 800.0, 600.0));
    let subject = DragSubject::Tab(id("a"));

    let target = store.find_drop_target(&subject, Point::new(798.0, 300.0)).unwrap();
    assert_eq!(target.node, id("root"));
    assert_eq!(target.location, DropLocation::Right);
    store.dispatch(target.into_action(&subject)).unwrap();

    let root = store.model().root().unwrap();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0], id("right"));
    let last = store.model().get_node_by_id(root.children[1].as_str()).unwrap();
    assert_eq!(last.children(), &[id("a")]);
    store.model().validate().unwrap();
}
