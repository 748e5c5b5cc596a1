#![forbid(unsafe_code)]

//! Docking layout model.
//!
//! # Role in dockyard
//! `dockyard-layout` owns the tree of rows, tabsets, tabs, borders and
//! floating windows, and every rule for changing it. Rendering is left to the
//! host: it feeds pointer input in, reads [`LayoutSnapshot`] geometry out, and
//! dispatches [`Action`]s.
//!
//! # Primary responsibilities
//! - **Model**: arena of nodes with parent/child links and a validator.
//! - **Actions**: atomic, serializable mutations with policy checks.
//! - **Geometry**: row splitting, border strips, windows and the flyout.
//! - **Interaction**: splitter and window drags, drop targeting.
//! - **Persistence**: the JSON document format and node paths.
//! - **Store**: interception, observers and per-tab host content.
//!
//! # Example
//! ```
//! use dockyard_core::{Point, Rect};
//! use dockyard_layout::{DragSubject, LayoutStore, Model, NodeId};
//!
//! let model = Model::from_json(r#"{
//!     "layout": {"type": "row", "children": [
//!         {"type": "tabset", "id": "left", "children": [{"type": "tab", "id": "a"}, {"type": "tab", "id": "b"}]},
//!         {"type": "tabset", "id": "right", "children": [{"type": "tab", "id": "c"}]}
//!     ]}
//! }"#).unwrap();
//! let mut store = LayoutStore::new(model);
//! store.update_layout(Rect::new(0.0, 0.0, 800.0, 600.0));
//!
//! let subject = DragSubject::Tab(NodeId::from("a"));
//! let target = store.find_drop_target(&subject, Point::new(600.0, 300.0)).unwrap();
//! store.dispatch(target.into_action(&subject)).unwrap();
//! assert_eq!(store.model().get_node_by_id("right").unwrap().children().len(), 2);
//! ```

pub mod action;
mod apply;
pub mod config;
mod dock;
pub mod drop;
pub mod error;
pub mod flyout;
pub mod json;
pub mod layout;
pub mod model;
pub mod node;
mod path;
pub mod splitter;
pub mod store;
pub mod window;

pub use action::{Action, ActionKind, DropLocation};
pub use config::GlobalConfig;
pub use drop::{DragSubject, DropTarget, DropValidator, DropZoneDetector, TabDrag};
pub use error::{ActionError, LayoutError, ModelError};
pub use flyout::{Flyout, Layer};
pub use json::{LayoutDocument, TabJson};
pub use layout::{BorderGeometry, LayoutSnapshot, RowGeometry, TabSetGeometry};
pub use model::Model;
pub use node::{
    BorderNode, CloseType, DockState, Node, NodeId, NodeKind, RowNode, TabLocation, TabNode,
    TabSetNode, WindowNode,
};
pub use splitter::{SplitterDrag, SplitterInitials, SplitterTarget};
pub use store::{DispatchOutcome, LayoutStore, SubscriptionId};
pub use window::{ResizeHandle, WindowDrag};
