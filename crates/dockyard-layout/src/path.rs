//! Hierarchical node paths.
//!
//! Paths are derived from tree position, so they stay stable as long as the
//! structure does: `/` is the root row, `/r1/ts0/tb2` is the third tab of the
//! first tabset inside the second child row, `/border/left/tb0` is a border
//! tab and `/window/0/tb1` a tab in the first floating window.

use dockyard_core::Edge;

use crate::model::Model;
use crate::node::{Node, NodeId};

fn join(base: &str, segment: &str) -> String {
    if base == "/" {
        format!("/{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

fn parse_index(segment: &str, prefix: &str) -> Option<usize> {
    segment.strip_prefix(prefix)?.parse().ok()
}

impl Model {
    /// Path of `id`, or `None` for unknown or detached nodes.
    #[must_use]
    pub fn path_of(&self, id: &NodeId) -> Option<String> {
        match self.nodes.get(id)? {
            Node::Row(row) if row.id == self.root => Some("/".to_owned()),
            Node::Border(border) => Some(format!("/border/{}", border.location)),
            Node::Window(window) => {
                let index = self.windows.iter().position(|w| *w == window.id)?;
                Some(format!("/window/{index}"))
            }
            node => {
                let parent = node.parent()?;
                let index = self.nodes.get(parent)?.children().iter().position(|c| c == id)?;
                let segment = match node {
                    Node::Row(_) => format!("r{index}"),
                    Node::TabSet(_) => format!("ts{index}"),
                    _ => format!("tb{index}"),
                };
                Some(join(&self.path_of(parent)?, &segment))
            }
        }
    }

    /// Resolve a path produced by [`Model::path_of`].
    #[must_use]
    pub fn node_by_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.strip_prefix('/')?.split('/').filter(|s| !s.is_empty());
        let mut current = match segments.clone().next() {
            None => return self.nodes.get(&self.root),
            Some("border") => {
                segments.next();
                let edge = Edge::parse(segments.next()?)?;
                self.borders
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .find(|node| node.as_border().is_some_and(|b| b.location == edge))?
            }
            Some("window") => {
                segments.next();
                let index: usize = segments.next()?.parse().ok()?;
                self.nodes.get(self.windows.get(index)?)?
            }
            Some(_) => self.nodes.get(&self.root)?,
        };

        for segment in segments {
            let (index, tab_segment) = if let Some(i) = parse_index(segment, "tb") {
                (i, true)
            } else if let Some(i) = parse_index(segment, "ts").or_else(|| parse_index(segment, "r")) {
                (i, false)
            } else {
                return None;
            };
            let child = self.nodes.get(current.children().get(index)?)?;
            let matches = match child {
                Node::Tab(_) => tab_segment,
                Node::TabSet(_) => segment.starts_with("ts"),
                Node::Row(_) => segment.starts_with('r'),
                _ => false,
            };
            if !matches {
                return None;
            }
            current = child;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Model {
        Model::from_value(json!({
            "layout": {"type": "row", "id": "root", "children": [
                {"type": "tabset", "id": "ts1", "children": [{"type": "tab", "id": "a"}]},
                {"type": "row", "id": "inner", "children": [
                    {"type": "tabset", "id": "ts2", "children": [
                        {"type": "tab", "id": "b"},
                        {"type": "tab", "id": "c"},
                        {"type": "tab", "id": "d"}
                    ]},
                    {"type": "tabset", "id": "ts3", "children": [{"type": "tab", "id": "e"}]}
                ]}
            ]},
            "borders": [{"id": "west", "location": "left", "children": [{"type": "tab", "id": "tools"}]}]
        }))
        .unwrap()
    }

    #[test]
    fn paths_follow_tree_position() {
        let model = model();
        let path = |id: &str| model.path_of(&NodeId::from(id)).unwrap();
        assert_eq!(path("root"), "/");
        assert_eq!(path("ts1"), "/ts0");
        assert_eq!(path("inner"), "/r1");
        assert_eq!(path("d"), "/r1/ts0/tb2");
        assert_eq!(path("tools"), "/border/left/tb0");
        assert_eq!(model.path_of(&NodeId::from("missing")), None);
    }

    #[test]
    fn every_path_resolves_back() {
        let model = model();
        for node in model.nodes() {
            let path = model.path_of(node.id()).unwrap();
            assert_eq!(model.node_by_path(&path).map(Node::id), Some(node.id()), "{path}");
        }
    }

    #[test]
    fn window_paths_use_creation_order() {
        let mut model = model();
        model
            .do_action(&crate::action::Action::FloatTab {
                tab: NodeId::from("c"),
                rect: None,
            })
            .unwrap();
        assert_eq!(model.path_of(&NodeId::from("c")).unwrap(), "/window/0/tb0");
        assert_eq!(model.path_of(&NodeId::from("d")).unwrap(), "/r1/ts0/tb1");
    }

    #[test]
    fn malformed_paths_resolve_to_nothing() {
        let model = model();
        assert!(model.node_by_path("r1").is_none());
        assert!(model.node_by_path("/ts1").is_none());
        assert!(model.node_by_path("/r0").is_none());
        assert!(model.node_by_path("/border/top").is_none());
        assert!(model.node_by_path("/window/0").is_none());
        assert!(model.node_by_path("/x3").is_none());
    }
}
