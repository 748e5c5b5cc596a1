//! Model owner with interception, observers, and per-tab content.
//!
//! [`LayoutStore`] is the entry point a host UI talks to. Every change goes
//! through [`LayoutStore::dispatch`]: the interceptor may rewrite or swallow
//! the action, the model applies it atomically, and observers are notified
//! in subscription order. An observer that panics is logged and skipped; the
//! committed change and the remaining observers are unaffected.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use dockyard_core::{Point, Rect};
use rustc_hash::FxHashMap;

use crate::action::{Action, DropLocation};
use crate::drop::{DragSubject, DropTarget, DropValidator, TabDrag};
use crate::error::ActionError;
use crate::layout::LayoutSnapshot;
use crate::model::Model;
use crate::node::{NodeId, TabNode};

/// Rewrites an action before it is applied. `None` swallows it.
pub type Interceptor = Box<dyn FnMut(Action) -> Option<Action>>;

/// Called after every applied action.
pub type Observer = Box<dyn FnMut(&Model, &Action)>;

/// Builds host content for a tab the first time it is requested.
pub type ContentFactory = Box<dyn Fn(&TabNode) -> Box<dyn Any>>;

/// Handle returned by [`LayoutStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Result of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The action changed the model; `revision` is the new model revision.
    Applied { revision: u64 },
    /// The interceptor dropped the action.
    Swallowed,
}

struct ObserverEntry {
    id: SubscriptionId,
    callback: Observer,
}

pub struct LayoutStore {
    model: Model,
    interceptor: Option<Interceptor>,
    validator: Option<Box<DropValidator>>,
    observers: Vec<ObserverEntry>,
    next_subscription: u64,
    factory: Option<ContentFactory>,
    content: FxHashMap<NodeId, Box<dyn Any>>,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("revision", &self.model.revision())
            .field("interceptor", &self.interceptor.is_some())
            .field("validator", &self.validator.is_some())
            .field("observers", &self.observers.len())
            .field("content", &self.content.len())
            .finish_non_exhaustive()
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(Model::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}

impl LayoutStore {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self {
            model,
            interceptor: None,
            validator: None,
            observers: Vec::new(),
            next_subscription: 0,
            factory: None,
            content: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub fn into_model(self) -> Model {
        self.model
    }

    pub fn set_interceptor(&mut self, interceptor: impl FnMut(Action) -> Option<Action> + 'static) {
        self.interceptor = Some(Box::new(interceptor));
    }

    pub fn clear_interceptor(&mut self) {
        self.interceptor = None;
    }

    pub fn set_drop_validator(
        &mut self,
        validator: impl Fn(&Model, &DragSubject, &NodeId, DropLocation) -> bool + 'static,
    ) {
        self.validator = Some(Box::new(validator));
    }

    pub fn clear_drop_validator(&mut self) {
        self.validator = None;
    }

    /// Register an observer. Observers run in subscription order.
    pub fn subscribe(&mut self, observer: impl FnMut(&Model, &Action) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push(ObserverEntry {
            id,
            callback: Box::new(observer),
        });
        id
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|entry| entry.id != id);
        self.observers.len() != before
    }

    pub fn set_factory(&mut self, factory: impl Fn(&TabNode) -> Box<dyn Any> + 'static) {
        self.factory = Some(Box::new(factory));
    }

    /// Content for `tab`, built by the factory on first access.
    pub fn content(&mut self, tab: &NodeId) -> Option<&mut dyn Any> {
        if !self.content.contains_key(tab) {
            let node = self.model.get_node_by_id(tab.as_str())?.as_tab()?;
            let value = (self.factory.as_ref()?)(node);
            self.content.insert(tab.clone(), value);
        }
        self.content.get_mut(tab).map(|value| &mut **value)
    }

    /// Content already built for `tab`, without invoking the factory.
    #[must_use]
    pub fn cached_content(&self, tab: &NodeId) -> Option<&dyn Any> {
        self.content.get(tab).map(|value| &**value)
    }

    fn prune_content(&mut self) {
        let model = &self.model;
        self.content
            .retain(|id, _| model.get_node_by_id(id.as_str()).is_some_and(|node| node.as_tab().is_some()));
    }

    /// Run `action` through the interceptor, the model, and the observers.
    pub fn dispatch(&mut self, action: Action) -> Result<DispatchOutcome, ActionError> {
        let action = match self.interceptor.as_mut() {
            Some(intercept) => match intercept(action) {
                Some(action) => action,
                None => {
                    tracing::trace!(target: "dockyard.store", "action swallowed by interceptor");
                    return Ok(DispatchOutcome::Swallowed);
                }
            },
            None => action,
        };

        self.model.do_action(&action)?;
        self.prune_content();

        for entry in &mut self.observers {
            let model = &self.model;
            let result = catch_unwind(AssertUnwindSafe(|| (entry.callback)(model, &action)));
            if let Err(payload) = result {
                tracing::error!(
                    target: "dockyard.store",
                    subscription = entry.id.0,
                    kind = %action.kind(),
                    panic = panic_message(payload.as_ref()),
                    "observer panicked"
                );
            }
        }

        Ok(DispatchOutcome::Applied {
            revision: self.model.revision(),
        })
    }

    /// Compute and remember the layout for `bounds`.
    pub fn update_layout(&mut self, bounds: Rect) -> &LayoutSnapshot {
        self.model.update_layout(bounds)
    }

    /// Drop target under `point` in the last computed layout.
    #[must_use]
    pub fn find_drop_target(&self, subject: &DragSubject, point: Point) -> Option<DropTarget> {
        let layout = self.model.last_layout()?;
        self.model
            .find_drop_target(layout, subject, point, self.validator.as_deref())
    }

    /// Begin a drag session for `subject`.
    pub fn start_drag(&self, subject: DragSubject) -> Result<TabDrag, ActionError> {
        TabDrag::start(&self.model, subject)
    }

    /// Re-target `drag` for the pointer at `point`.
    pub fn update_drag<'a>(&self, drag: &'a mut TabDrag, point: Point) -> Option<&'a DropTarget> {
        let layout = self.model.last_layout()?;
        drag.update(&self.model, layout, point, self.validator.as_deref())
    }

    /// Finish `drag`, dispatching the drop if it landed on a valid target.
    pub fn finish_drag(&mut self, drag: TabDrag) -> Result<Option<DispatchOutcome>, ActionError> {
        drag.finish().map(|action| self.dispatch(action)).transpose()
    }
}
