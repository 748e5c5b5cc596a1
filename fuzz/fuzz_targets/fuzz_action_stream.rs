#![no_main]

use arbitrary::Arbitrary;
use dockyard_core::{Orientation, Point, Rect};
use dockyard_layout::{Action, DockState, DragSubject, DropLocation, Model, NodeId, TabJson};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

const BOUNDS: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

#[derive(Debug, Arbitrary)]
enum Op {
    Select(u8),
    Delete(u8),
    Move { tab: u8, to: u8, location: u8 },
    Float(u8),
    Weights { row: u8, weights: Vec<u16> },
    DockState { border: u8, state: u8 },
    SplitBorder { border: u8, tab: u8 },
    Maximize(u8),
    CloseWindow(u8),
    Add { to: u8, location: u8 },
    Drop { tab: u8, x: u16, y: u16 },
}

const LOCATIONS: [DropLocation; 5] = [
    DropLocation::Center,
    DropLocation::Top,
    DropLocation::Bottom,
    DropLocation::Left,
    DropLocation::Right,
];

fn pick(ids: &[NodeId], index: u8) -> NodeId {
    ids.get(usize::from(index) % ids.len().max(1))
        .cloned()
        .unwrap_or_else(|| NodeId::from("missing"))
}

fn initial() -> Model {
    Model::from_value(json!({
        "layout": {"type": "row", "id": "root", "children": [
            {"type": "tabset", "id": "ts1", "children": [{"type": "tab", "id": "a"}, {"type": "tab", "id": "b"}]},
            {"type": "row", "children": [
                {"type": "tabset", "id": "ts2", "children": [{"type": "tab", "id": "c"}]},
                {"type": "tabset", "id": "ts3", "children": [{"type": "tab", "id": "d"}]}
            ]}
        ]},
        "borders": [
            {"id": "west", "location": "left", "selected": 0, "children": [{"type": "tab", "id": "e"}]},
            {"id": "east", "location": "right", "children": [{"type": "tab", "id": "f"}, {"type": "tab", "id": "g"}]}
        ]
    }))
    .expect("seed layout")
}

fuzz_target!(|ops: Vec<Op>| {
    let mut model = initial();
    for op in ops.into_iter().take(256) {
        let layout = model.update_layout(BOUNDS).clone();
        let tabs = model.tab_ids();
        let tabsets = model.tabsets();
        let borders: Vec<NodeId> = model.borders().map(|b| b.id.clone()).collect();
        let windows: Vec<NodeId> = model.windows().map(|w| w.id.clone()).collect();

        let action = match op {
            Op::Select(t) => Some(Action::select_tab(pick(&tabs, t))),
            Op::Delete(t) => Some(Action::delete_tab(pick(&tabs, t))),
            Op::Move { tab, to, location } => {
                let mut targets = tabsets.clone();
                targets.extend(borders.iter().cloned());
                targets.extend(windows.iter().cloned());
                targets.push(model.root_id().clone());
                Some(Action::move_node(
                    pick(&tabs, tab),
                    pick(&targets, to),
                    LOCATIONS[usize::from(location) % LOCATIONS.len()],
                ))
            }
            Op::Float(t) => Some(Action::float_tab(pick(&tabs, t))),
            Op::Weights { row, weights } => {
                let rows: Vec<NodeId> = model
                    .nodes()
                    .filter(|n| n.as_row().is_some())
                    .map(|n| n.id().clone())
                    .collect();
                let row = pick(&rows, row);
                let orientation = model.orientation_of(&row).unwrap_or(Orientation::Horizontal);
                Some(Action::adjust_weights(
                    row,
                    weights.into_iter().map(f64::from).collect(),
                    orientation,
                ))
            }
            Op::DockState { border, state } => {
                let state = [DockState::Expanded, DockState::Collapsed, DockState::Hidden][usize::from(state) % 3];
                Some(Action::set_dock_state(pick(&borders, border), state))
            }
            Op::SplitBorder { border, tab } => Some(Action::SplitBorderTab {
                border: pick(&borders, border),
                tab: pick(&tabs, tab),
            }),
            Op::Maximize(t) => Some(Action::MaximizeToggle {
                tabset: pick(&tabsets, t),
            }),
            Op::CloseWindow(w) => Some(Action::CloseWindow {
                window: pick(&windows, w),
            }),
            Op::Add { to, location } => Some(Action::add_node(
                TabJson::new("fuzz", "fuzz"),
                pick(&tabsets, to),
                LOCATIONS[usize::from(location) % LOCATIONS.len()],
            )),
            Op::Drop { tab, x, y } => {
                let subject = DragSubject::Tab(pick(&tabs, tab));
                let point = Point::new(f64::from(x % 1280), f64::from(y % 720));
                model
                    .find_drop_target(&layout, &subject, point, None)
                    .map(|target| target.into_action(&subject))
            }
        };

        let Some(action) = action else { continue };
        let before = model.to_value().expect("serialize");
        if model.do_action(&action).is_err() {
            assert_eq!(model.to_value().expect("serialize"), before, "rejected action mutated the model");
        }
        model.validate().expect("model stays valid");
    }
});
