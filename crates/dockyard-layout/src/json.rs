//! Persisted layout document.
//!
//! ```json
//! {
//!   "global": { "splitterSize": 8 },
//!   "layout": { "type": "row", "children": [ { "type": "tabset", "children": [...] } ] },
//!   "borders": [ { "location": "left", "children": [...] } ],
//!   "windows": [ { "rect": {...}, "zOrder": 0, "children": [...] } ]
//! }
//! ```
//!
//! Unknown keys at every level are kept and written back, so documents
//! produced by newer versions survive a load/save cycle.

use dockyard_core::{Edge, Rect};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GlobalConfig;
use crate::error::{ActionError, ModelError};
use crate::model::Model;
use crate::node::{
    BorderAttributes, BorderNode, Node, NodeId, RowAttributes, RowNode, TabAttributes, TabNode,
    TabSetAttributes, TabSetNode, WindowAttributes, WindowNode,
};

/// Keys that only actions may change.
pub const RESERVED_ATTRIBUTES: [&str; 10] = [
    "id",
    "type",
    "children",
    "selected",
    "visibleTabs",
    "tileWeights",
    "location",
    "maximized",
    "active",
    "zOrder",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default)]
    pub global: GlobalConfig,
    pub layout: LayoutChildJson,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<BorderJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowJson>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// A docked child of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutChildJson {
    Row(RowJson),
    Tabset(TabSetJson),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(flatten)]
    pub attrs: RowAttributes,
    #[serde(default)]
    pub children: Vec<LayoutChildJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSetJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub maximized: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub active: bool,
    #[serde(flatten)]
    pub attrs: TabSetAttributes,
    #[serde(default)]
    pub children: Vec<TabJson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabTag {
    #[default]
    Tab,
}

/// A tab definition, also the payload of `addNode`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabJson {
    #[serde(rename = "type", default)]
    pub tag: TabTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(flatten)]
    pub attrs: TabAttributes,
}

impl TabJson {
    /// A tab with a display name and component key.
    #[must_use]
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            tag: TabTag::Tab,
            id: None,
            attrs: TabAttributes {
                name: name.into(),
                component: Some(component.into()),
                ..TabAttributes::default()
            },
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderTag {
    #[default]
    Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderJson {
    #[serde(rename = "type", default)]
    pub tag: BorderTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub location: Edge,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_tabs: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_weights: Option<Vec<f64>>,
    #[serde(flatten)]
    pub attrs: BorderAttributes,
    #[serde(default)]
    pub children: Vec<TabJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<i64>,
    /// Rank in the back-to-front stacking order.
    #[serde(default)]
    pub z_order: usize,
    #[serde(flatten)]
    pub attrs: WindowAttributes,
    #[serde(default)]
    pub children: Vec<TabJson>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Ids named explicitly anywhere in a document. Duplicates are fatal.
fn collect_ids(doc: &LayoutDocument) -> Result<FxHashSet<NodeId>, ModelError> {
    fn claim(ids: &mut FxHashSet<NodeId>, id: Option<&NodeId>) -> Result<(), ModelError> {
        match id {
            Some(id) if !ids.insert(id.clone()) => Err(ModelError::DuplicateId { id: id.clone() }),
            _ => Ok(()),
        }
    }
    fn walk(ids: &mut FxHashSet<NodeId>, child: &LayoutChildJson) -> Result<(), ModelError> {
        match child {
            LayoutChildJson::Row(row) => {
                claim(ids, row.id.as_ref())?;
                for child in &row.children {
                    walk(ids, child)?;
                }
            }
            LayoutChildJson::Tabset(tabset) => {
                claim(ids, tabset.id.as_ref())?;
                for tab in &tabset.children {
                    claim(ids, tab.id.as_ref())?;
                }
            }
        }
        Ok(())
    }

    let mut ids = FxHashSet::default();
    walk(&mut ids, &doc.layout)?;
    for border in &doc.borders {
        claim(&mut ids, border.id.as_ref())?;
        for tab in &border.children {
            claim(&mut ids, tab.id.as_ref())?;
        }
    }
    for window in &doc.windows {
        claim(&mut ids, window.id.as_ref())?;
        for tab in &window.children {
            claim(&mut ids, tab.id.as_ref())?;
        }
    }
    Ok(ids)
}

struct Loader {
    model: Model,
    reserved: FxHashSet<NodeId>,
}

impl Loader {
    fn id_for(&mut self, explicit: Option<NodeId>) -> NodeId {
        if let Some(id) = explicit {
            return id;
        }
        loop {
            let id = self.model.alloc_id();
            if !self.reserved.contains(&id) {
                return id;
            }
        }
    }

    fn tabs(&mut self, container: &NodeId, tabs: Vec<TabJson>) -> Vec<NodeId> {
        tabs.into_iter()
            .map(|tab| {
                let id = self.id_for(tab.id);
                self.model.nodes.insert(
                    id.clone(),
                    Node::Tab(TabNode {
                        id: id.clone(),
                        parent: Some(container.clone()),
                        attrs: tab.attrs,
                    }),
                );
                id
            })
            .collect()
    }

    fn row(&mut self, row: RowJson, parent: Option<NodeId>) -> Result<NodeId, ModelError> {
        let id = self.id_for(row.id);
        let mut children = Vec::with_capacity(row.children.len());
        for child in row.children {
            children.push(self.child(child, &id)?);
        }
        self.model.nodes.insert(
            id.clone(),
            Node::Row(RowNode {
                id: id.clone(),
                parent,
                children,
                attrs: row.attrs,
            }),
        );
        Ok(id)
    }

    fn child(&mut self, child: LayoutChildJson, parent: &NodeId) -> Result<NodeId, ModelError> {
        match child {
            LayoutChildJson::Row(row) => self.row(row, Some(parent.clone())),
            LayoutChildJson::Tabset(tabset) => {
                let id = self.id_for(tabset.id);
                let children = self.tabs(&id, tabset.children);
                let selected = tab_selection(&id, tabset.selected, children.len())?;
                if tabset.maximized {
                    self.model.maximized_tabset = Some(id.clone());
                }
                if tabset.active {
                    self.model.active_tabset = Some(id.clone());
                }
                self.model.nodes.insert(
                    id.clone(),
                    Node::TabSet(TabSetNode {
                        id: id.clone(),
                        parent: Some(parent.clone()),
                        children,
                        selected,
                        attrs: tabset.attrs,
                    }),
                );
                Ok(id)
            }
        }
    }

    fn border(&mut self, border: BorderJson) -> Result<NodeId, ModelError> {
        let id = self.id_for(border.id);
        let children = self.tabs(&id, border.children);
        let count = children.len();
        let selected = match border.selected {
            Some(index) if index >= 0 => {
                let index = index as usize;
                if index >= count {
                    return Err(ModelError::InvalidSelection {
                        id,
                        selected: index as i64,
                        count,
                    });
                }
                Some(index)
            }
            _ => None,
        };
        let visible_tabs = match border.visible_tabs {
            Some(visible) => visible,
            None => selected.into_iter().collect(),
        };
        let selected = selected.or_else(|| visible_tabs.first().copied());
        let mut node = BorderNode {
            id: id.clone(),
            location: border.location,
            children,
            selected,
            visible_tabs,
            tile_weights: border.tile_weights.unwrap_or_default(),
            attrs: border.attrs,
        };
        node.reconcile_tile_weights();
        self.model.nodes.insert(id.clone(), Node::Border(node));
        Ok(id)
    }

    fn window(&mut self, window: WindowJson) -> Result<NodeId, ModelError> {
        let id = self.id_for(window.id);
        let children = self.tabs(&id, window.children);
        let selected = tab_selection(&id, window.selected, children.len())?;
        self.model.nodes.insert(
            id.clone(),
            Node::Window(WindowNode {
                id: id.clone(),
                children,
                selected,
                rect: window.rect,
                attrs: window.attrs,
            }),
        );
        Ok(id)
    }
}

/// Tabsets and windows always show a tab when they have one.
fn tab_selection(id: &NodeId, selected: Option<i64>, count: usize) -> Result<Option<usize>, ModelError> {
    if count == 0 {
        return Ok(None);
    }
    let index = selected.unwrap_or(0).max(0) as usize;
    if index >= count {
        return Err(ModelError::InvalidSelection {
            id: id.clone(),
            selected: index as i64,
            count,
        });
    }
    Ok(Some(index))
}

impl Model {
    /// Parse and validate a layout document.
    ///
    /// Fails closed: any error means no model.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let doc: LayoutDocument = serde_json::from_str(json).inspect_err(|err| {
            tracing::warn!(target: "dockyard.model", error = %err, "malformed layout document");
        })?;
        Self::from_document(doc)
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let doc: LayoutDocument = serde_json::from_value(value)?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: LayoutDocument) -> Result<Self, ModelError> {
        let reserved = collect_ids(&doc)?;
        let mut loader = Loader {
            model: Model::empty(doc.global),
            reserved,
        };
        loader.model.extensions = doc.extensions;

        let root = match doc.layout {
            LayoutChildJson::Row(row) => loader.row(row, None)?,
            LayoutChildJson::Tabset(tabset) => {
                return Err(ModelError::RootNotRow {
                    id: tabset.id.unwrap_or_else(|| NodeId::from("layout")),
                });
            }
        };
        loader.model.root = root;

        for border in doc.borders {
            let id = loader.border(border)?;
            loader.model.borders.push(id);
        }

        let mut ranked = Vec::with_capacity(doc.windows.len());
        for window in doc.windows {
            let rank = window.z_order;
            let id = loader.window(window)?;
            loader.model.windows.push(id.clone());
            ranked.push((rank, id));
        }
        ranked.sort_by_key(|(rank, _)| *rank);
        loader.model.z_order = ranked.into_iter().map(|(_, id)| id).collect();

        let mut model = loader.model;
        model.normalize_rows()?;
        if model.root().is_some_and(|root| root.children.is_empty()) {
            let root = model.root.clone();
            model
                .collapse_row(&root)
                .map_err(|_| ModelError::EmptyContainer { id: root.clone() })?;
        }
        model.validate().inspect_err(|err| {
            tracing::warn!(target: "dockyard.model", error = %err, "layout document rejected");
        })?;
        tracing::debug!(
            target: "dockyard.model",
            nodes = model.nodes.len(),
            borders = model.borders.len(),
            windows = model.windows.len(),
            "layout loaded"
        );
        Ok(model)
    }

    /// Hoist single-child rows a hand-written document may contain.
    fn normalize_rows(&mut self) -> Result<(), ModelError> {
        loop {
            let degenerate = self
                .nodes
                .values()
                .filter_map(Node::as_row)
                .find(|row| {
                    row.id != self.root && row.children.len() < 2 && self.depth_of(&row.id).is_some()
                })
                .map(|row| row.id.clone());
            let Some(row) = degenerate else {
                return Ok(());
            };
            let count = self.row(&row).map_or(0, |node| node.children.len());
            self.collapse_row(&row)
                .map_err(|_| ModelError::DegenerateRow { id: row.clone(), count })?;
        }
    }

    /// Snapshot the model as a document.
    #[must_use]
    pub fn to_document(&self) -> LayoutDocument {
        let layout = self.row_json(&self.root);
        let borders = self
            .borders()
            .map(|border| BorderJson {
                tag: BorderTag::Border,
                id: Some(border.id.clone()),
                location: border.location,
                selected: border.selected.map(|index| index as i64),
                visible_tabs: (!border.visible_tabs.is_empty()).then(|| border.visible_tabs.clone()),
                tile_weights: border
                    .is_tiled()
                    .then(|| border.tile_weights.clone()),
                attrs: border.attrs.clone(),
                children: self.tab_json(&border.children),
            })
            .collect();
        let windows = self
            .windows()
            .map(|window| WindowJson {
                id: Some(window.id.clone()),
                rect: window.rect,
                selected: window.selected.map(|index| index as i64),
                z_order: self
                    .z_order
                    .iter()
                    .position(|id| id == &window.id)
                    .unwrap_or_default(),
                attrs: window.attrs.clone(),
                children: self.tab_json(&window.children),
            })
            .collect();
        LayoutDocument {
            global: self.config.clone(),
            layout,
            borders,
            windows,
            extensions: self.extensions.clone(),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.to_document())
    }

    /// Pretty-printed document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    fn row_json(&self, id: &NodeId) -> LayoutChildJson {
        match self.nodes.get(id) {
            Some(Node::Row(row)) => LayoutChildJson::Row(RowJson {
                id: Some(row.id.clone()),
                attrs: row.attrs.clone(),
                children: row.children.iter().map(|child| self.row_json(child)).collect(),
            }),
            Some(Node::TabSet(tabset)) => LayoutChildJson::Tabset(TabSetJson {
                id: Some(tabset.id.clone()),
                selected: tabset.selected.map(|index| index as i64),
                maximized: self.maximized_tabset.as_ref() == Some(id),
                active: self.active_tabset.as_ref() == Some(id),
                attrs: tabset.attrs.clone(),
                children: self.tab_json(&tabset.children),
            }),
            _ => LayoutChildJson::Row(RowJson {
                id: Some(id.clone()),
                attrs: RowAttributes::default(),
                children: Vec::new(),
            }),
        }
    }

    fn tab_json(&self, tabs: &[NodeId]) -> Vec<TabJson> {
        tabs.iter()
            .filter_map(|id| self.nodes.get(id).and_then(Node::as_tab))
            .map(|tab| TabJson {
                tag: TabTag::Tab,
                id: Some(tab.id.clone()),
                attrs: tab.attrs.clone(),
            })
            .collect()
    }

    /// Merge `patch` into a node's attributes through serde so type errors
    /// are caught before anything changes.
    pub(crate) fn merged_attributes(
        &self,
        id: &NodeId,
        patch: &Map<String, Value>,
    ) -> Result<Node, ActionError> {
        if let Some(key) = patch
            .keys()
            .find(|key| RESERVED_ATTRIBUTES.contains(&key.as_str()))
        {
            return Err(ActionError::ReservedAttribute { key: key.clone() });
        }
        let mut node = self.node(id)?.clone();
        match &mut node {
            Node::Row(row) => row.attrs = merge(&row.attrs, patch)?,
            Node::TabSet(tabset) => tabset.attrs = merge(&tabset.attrs, patch)?,
            Node::Tab(tab) => tab.attrs = merge(&tab.attrs, patch)?,
            Node::Border(border) => border.attrs = merge(&border.attrs, patch)?,
            Node::Window(window) => {
                if let Some(rect) = patch.get("rect") {
                    window.rect = serde_json::from_value(rect.clone())
                        .map_err(ActionError::InvalidAttributes)?;
                    let mut rest = patch.clone();
                    let _ = rest.remove("rect");
                    window.attrs = merge(&window.attrs, &rest)?;
                } else {
                    window.attrs = merge(&window.attrs, patch)?;
                }
            }
        }
        Ok(node)
    }
}

fn merge<T>(attrs: &T, patch: &Map<String, Value>) -> Result<T, ActionError>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut value = serde_json::to_value(attrs).map_err(ActionError::InvalidAttributes)?;
    if let Value::Object(target) = &mut value {
        for (key, patch_value) in patch {
            if patch_value.is_null() {
                let _ = target.remove(key);
            } else {
                let _ = target.insert(key.clone(), patch_value.clone());
            }
        }
    }
    serde_json::from_value(value).map_err(ActionError::InvalidAttributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "global": {"splitterSize": 6},
            "layout": {
                "type": "row",
                "id": "root",
                "children": [
                    {"type": "tabset", "id": "ts0", "weight": 30, "children": [
                        {"type": "tab", "id": "a", "name": "A", "component": "text"}
                    ]},
                    {"type": "tabset", "id": "ts1", "weight": 70, "selected": 1, "children": [
                        {"type": "tab", "id": "b", "name": "B"},
                        {"type": "tab", "id": "c", "name": "C", "config": {"k": [1, 2]}}
                    ]}
                ]
            },
            "borders": [
                {"type": "border", "location": "left", "selected": 0, "children": [
                    {"type": "tab", "id": "l0", "name": "L0"}
                ]}
            ],
            "appVersion": "3.1"
        })
    }

    #[test]
    fn loads_sample() {
        let model = Model::from_value(sample()).unwrap();
        assert_eq!(model.splitter_size(), 6.0);
        assert_eq!(model.tabset(&NodeId::from("ts1")).unwrap().selected, Some(1));
        let left = model.border(Edge::Left).unwrap();
        assert_eq!(left.visible_tabs, vec![0]);
        assert_eq!(left.tile_weights, vec![1.0]);
        assert_eq!(model.extensions().get("appVersion"), Some(&json!("3.1")));
    }

    #[test]
    fn round_trip_is_stable() {
        let model = Model::from_value(sample()).unwrap();
        let first = model.to_value().unwrap();
        let reloaded = Model::from_value(first.clone()).unwrap();
        assert_eq!(reloaded.to_value().unwrap(), first);
        assert!(model.structurally_eq(&reloaded));
    }

    #[test]
    fn missing_ids_are_allocated() {
        let model = Model::from_value(json!({
            "layout": {"type": "row", "children": [
                {"type": "tabset", "children": [{"type": "tab", "name": "x"}]}
            ]}
        }))
        .unwrap();
        assert!(model.nodes().all(|node| node.id().as_str().starts_with('#')));
        model.validate().unwrap();
    }

    #[test]
    fn allocated_ids_avoid_explicit_ones() {
        let model = Model::from_value(json!({
            "layout": {"type": "row", "children": [
                {"type": "tabset", "id": "#0", "children": [{"type": "tab", "name": "x"}]}
            ]}
        }))
        .unwrap();
        assert_eq!(model.node_count(), 3);
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = Model::from_value(json!({
            "layout": {"type": "row", "children": [
                {"type": "tabset", "id": "x", "children": [{"type": "tab", "id": "x"}]}
            ]}
        }))
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { .. }));
    }

    #[test]
    fn malformed_json_fails_closed() {
        assert!(matches!(Model::from_json("{\"layout\":"), Err(ModelError::Json(_))));
    }

    #[test]
    fn tabset_root_is_rejected() {
        let err = Model::from_value(json!({"layout": {"type": "tabset", "children": []}})).unwrap_err();
        assert!(matches!(err, ModelError::RootNotRow { .. }));
    }

    #[test]
    fn degenerate_rows_are_hoisted_on_load() {
        let model = Model::from_value(json!({
            "layout": {"type": "row", "id": "root", "children": [
                {"type": "tabset", "id": "a", "children": []},
                {"type": "row", "id": "lonely", "weight": 40, "children": [
                    {"type": "tabset", "id": "b", "children": []}
                ]}
            ]}
        }))
        .unwrap();
        assert!(model.get_node_by_id("lonely").is_none());
        assert_eq!(model.weight_of(&NodeId::from("b")), 40.0);
    }

    #[test]
    fn bad_selection_fails() {
        let err = Model::from_value(json!({
            "layout": {"type": "row", "children": [
                {"type": "tabset", "selected": 4, "children": [{"type": "tab"}]}
            ]}
        }))
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidSelection { selected: 4, count: 1, .. }));
    }

    #[test]
    fn merge_rejects_reserved_keys() {
        let model = Model::from_value(sample()).unwrap();
        let mut patch = Map::new();
        patch.insert("children".into(), json!([]));
        let err = model.merged_attributes(&NodeId::from("a"), &patch).unwrap_err();
        assert!(matches!(err, ActionError::ReservedAttribute { key } if key == "children"));
    }

    #[test]
    fn merge_checks_types() {
        let model = Model::from_value(sample()).unwrap();
        let mut patch = Map::new();
        patch.insert("enableClose".into(), json!("nope"));
        let err = model.merged_attributes(&NodeId::from("a"), &patch).unwrap_err();
        assert!(matches!(err, ActionError::InvalidAttributes(_)));

        let mut patch = Map::new();
        patch.insert("enableClose".into(), json!(false));
        patch.insert("badge".into(), json!(3));
        let Node::Tab(tab) = model.merged_attributes(&NodeId::from("a"), &patch).unwrap() else {
            panic!("expected a tab");
        };
        assert_eq!(tab.attrs.enable_close, Some(false));
        assert_eq!(tab.attrs.extra.get("badge"), Some(&json!(3)));
    }
}
