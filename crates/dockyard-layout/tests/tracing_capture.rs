//! Diagnostics emitted while dispatching.

use std::sync::{Arc, Mutex};

use dockyard_layout::{Action, DispatchOutcome, LayoutStore, Model};
use serde_json::json;
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Clone, PartialEq)]
struct Captured {
    target: String,
    level: Level,
    message: String,
}

#[derive(Default)]
struct CaptureState {
    events: Vec<Captured>,
    spans: Vec<String>,
}

struct CaptureLayer {
    state: Arc<Mutex<CaptureState>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, _id: &tracing::Id, _ctx: Context<'_, S>) {
        self.state
            .lock()
            .expect("capture lock")
            .spans
            .push(attrs.metadata().name().to_owned());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: String,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = value.to_owned();
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}").trim_matches('"').to_owned();
                }
            }
        }
        let mut msg = Msg { message: String::new() };
        event.record(&mut msg);
        let metadata = event.metadata();
        self.state.lock().expect("capture lock").events.push(Captured {
            target: metadata.target().to_owned(),
            level: *metadata.level(),
            message: msg.message,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Arc<Mutex<CaptureState>>) {
    let state = Arc::new(Mutex::new(CaptureState::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        state: Arc::clone(&state),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, state)
}

fn store() -> LayoutStore {
    LayoutStore::new(
        Model::from_value(json!({
            "layout": {"type": "row", "children": [
                {"type": "tabset", "id": "ts", "children": [
                    {"type": "tab", "id": "a"}, {"type": "tab", "id": "b"}
                ]}
            ]}
        }))
        .unwrap(),
    )
}

fn has(state: &CaptureState, target: &str, level: Level, message: &str) -> bool {
    state
        .events
        .iter()
        .any(|e| e.target == target && e.level == level && e.message == message)
}

#[test]
fn observer_panic_is_logged_and_isolated() {
    let mut store = store();
    let delivered = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&delivered);
    store.subscribe(|_, _| panic!("boom"));
    store.subscribe(move |_, _| *counter.lock().expect("counter lock") += 1);

    let (outcome, state) = capture(|| store.dispatch(Action::select_tab("b")));
    assert_eq!(outcome.unwrap(), DispatchOutcome::Applied { revision: 1 });
    assert_eq!(*delivered.lock().expect("counter lock"), 1);

    let state = state.lock().expect("capture lock");
    assert!(has(&state, "dockyard.store", Level::ERROR, "observer panicked"));
    assert!(has(&state, "dockyard.action", Level::DEBUG, "action applied"));
    assert!(state.spans.iter().any(|name| name == "dockyard.dispatch"));
}

#[test]
fn rejections_are_debug_not_errors() {
    let mut store = store();
    let (outcome, state) = capture(|| store.dispatch(Action::delete_tab("ghost")));
    assert!(outcome.is_err());
    let state = state.lock().expect("capture lock");
    assert!(has(&state, "dockyard.action", Level::DEBUG, "action rejected"));
    assert!(state.events.iter().all(|e| e.level != Level::ERROR));
}

#[test]
fn swallowed_actions_are_traced() {
    let mut store = store();
    store.set_interceptor(|_| None);
    let (outcome, state) = capture(|| store.dispatch(Action::select_tab("b")));
    assert_eq!(outcome.unwrap(), DispatchOutcome::Swallowed);
    let state = state.lock().expect("capture lock");
    assert!(has(&state, "dockyard.store", Level::TRACE, "action swallowed by interceptor"));
    assert!(!state.spans.iter().any(|name| name == "dockyard.dispatch"));
}

#[test]
fn malformed_documents_warn() {
    let (result, state) = capture(|| Model::from_json("{\"layout\": 3"));
    assert!(result.is_err());
    let state = state.lock().expect("capture lock");
    assert!(state
        .events
        .iter()
        .any(|e| e.target == "dockyard.model" && e.level == Level::WARN));
}
