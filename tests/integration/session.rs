//! Full session tests

use std::sync::Arc;
use std::time::Duration;

use eventscope_capture::{CatalogBuilder, KindId, RaisedEvent, TargetScope};
use eventscope_foundation::{Element, EventArgs, Inspectable, Payload, RenderError};
use eventscope_trace::{
    InspectionTarget, Presenter, Selectable, SubtreeMembership, TraceConfig, TraceEntry,
    TraceHooks, TraceSession,
};
use parking_lot::Mutex;

use crate::init_logging;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Recorder {
    admitted: Mutex<Vec<String>>,
    inspected: Mutex<Vec<String>>,
}

impl Presenter for Recorder {
    fn entry_admitted(&self, entry: &TraceEntry) {
        self.admitted.lock().push(entry.args_type().to_string());
    }

    fn on_inspect(&self, target: &InspectionTarget) {
        let name = match target {
            InspectionTarget::Handler(handler) => handler.type_name().to_string(),
            InspectionTarget::Args(args) => args.type_name().to_string(),
        };
        self.inspected.lock().push(name);
    }
}

fn printer(object: &dyn Inspectable) -> Result<String, RenderError> {
    Ok(object.type_name().to_string())
}

/// Window > (Panel > Button), plus the tool's own window under the root.
struct Desktop {
    root: Arc<Element>,
    panel: Arc<Element>,
    button: Arc<Element>,
    tool: Arc<Element>,
}

impl Desktop {
    fn new() -> Self {
        let root = Element::new("Window");
        let panel = Element::new("StackPanel");
        let button = Element::new("Button");
        let tool = Element::named("SnoopWindow", "snoop");
        root.append_child(&panel);
        panel.append_child(&button);
        root.append_child(&tool);
        Self {
            root,
            panel,
            button,
            tool,
        }
    }
}

fn mouse_args() -> Payload {
    EventArgs::new("MouseButtonEventArgs").into_payload()
}

fn raise(session: &TraceSession, identifier: &str, event: impl FnOnce(KindId) -> RaisedEvent) {
    let kind = session.catalog().find(identifier).unwrap().id();
    session.scope().raise(event(kind));
}

#[test]
fn standard_session_end_to_end() {
    init_logging();
    let desktop = Desktop::new();
    let recorder = Arc::new(Recorder::default());
    let hooks = TraceHooks::new()
        .with_membership(SubtreeMembership::new(&desktop.tool))
        .with_presenter(recorder.clone());
    let session = TraceSession::standard(
        &TraceConfig::default(),
        TargetScope::new(Arc::clone(&desktop.root)),
        hooks,
    )
    .unwrap();

    assert!(session.trackers().get("Keyboard.KeyDown").unwrap().is_enabled());
    assert!(!session.trackers().get("Mouse.MouseMove").unwrap().is_enabled());

    raise(&session, "Keyboard.KeyDown", |kind| {
        let args = EventArgs::new("KeyEventArgs")
            .with_field("Key", "A")
            .into_payload();
        RaisedEvent::new(kind, &desktop.button, args).handled_by(&desktop.panel)
    });
    raise(&session, "Mouse.MouseMove", |kind| {
        RaisedEvent::new(kind, &desktop.button, EventArgs::new("MouseEventArgs").into_payload())
    });
    raise(&session, "Mouse.MouseDown", |kind| {
        RaisedEvent::new(kind, &desktop.tool, mouse_args())
    });

    let text = session
        .query(|log| {
            log.select_all();
            log.export_selected(&printer)
        })
        .unwrap()
        .recv_timeout(WAIT)
        .unwrap();

    assert_eq!(
        text,
        "KeyEventArgs handled by StackPanel (true):\n\
         \x20   Handled By:\n\
         \x20       StackPanel\n\
         \x20   Args:\n\
         \x20       KeyEventArgs\n"
    );
    assert_eq!(*recorder.admitted.lock(), vec!["KeyEventArgs"]);
    assert_eq!(session.stats().discarded, 1);
}

#[test]
fn selecting_route_stops_inspects_handlers() {
    init_logging();
    let desktop = Desktop::new();
    let recorder = Arc::new(Recorder::default());
    let session = TraceSession::start(
        &TraceConfig::new().with_default_enabled(["Mouse.MouseUp"]),
        CatalogBuilder::default().declare("Mouse", "MouseUp"),
        TargetScope::new(Arc::clone(&desktop.root)),
        TraceHooks::new().with_presenter(recorder.clone()),
    )
    .unwrap();

    raise(&session, "Mouse.MouseUp", |kind| {
        RaisedEvent::new(kind, &desktop.button, mouse_args())
    });

    let route = session
        .query(|log| {
            let id = log.buffer().newest_id().unwrap();
            let stops = log.buffer().get(id).unwrap().route().len();
            log.inspect(Selectable::Event(id)).unwrap();
            for index in 0..stops {
                log.inspect(Selectable::Stop { entry: id, index }).unwrap();
            }
            stops
        })
        .unwrap()
        .recv_timeout(WAIT)
        .unwrap();

    assert_eq!(route, 3);
    assert_eq!(
        *recorder.inspected.lock(),
        vec!["MouseButtonEventArgs", "Button", "StackPanel", "Window"]
    );
}

#[test]
fn toggling_trackers_at_runtime() {
    init_logging();
    let desktop = Desktop::new();
    let mut session = TraceSession::start(
        &TraceConfig::new().with_default_enabled(Vec::<String>::new()),
        CatalogBuilder::default().declare("Mouse", "MouseUp"),
        TargetScope::new(Arc::clone(&desktop.root)),
        TraceHooks::new(),
    )
    .unwrap();

    let event = |kind| RaisedEvent::new(kind, &desktop.button, mouse_args());
    raise(&session, "Mouse.MouseUp", event);
    session.set_enabled("Mouse.MouseUp", true).unwrap();
    raise(&session, "Mouse.MouseUp", event);
    session.trackers_mut().disable_all();
    raise(&session, "Mouse.MouseUp", event);

    assert!(session.set_enabled("Mouse.Missing", true).is_err());

    let log = session.shutdown().unwrap();
    assert_eq!(log.buffer().len(), 1);
}

#[test]
fn capacity_zero_through_session() {
    init_logging();
    let desktop = Desktop::new();
    let session = TraceSession::start(
        &TraceConfig::new().with_default_enabled(["Mouse.MouseUp"]),
        CatalogBuilder::default().declare("Mouse", "MouseUp"),
        TargetScope::new(Arc::clone(&desktop.root)),
        TraceHooks::new(),
    )
    .unwrap();
    let event = |kind| RaisedEvent::new(kind, &desktop.button, mouse_args());

    raise(&session, "Mouse.MouseUp", event);
    session.set_capacity(-10).unwrap();
    for _ in 0..5 {
        raise(&session, "Mouse.MouseUp", event);
    }

    let log = session.shutdown().unwrap();
    assert!(log.buffer().is_empty());
    assert_eq!(log.buffer().capacity(), 0);
    assert_eq!(log.stats().admitted, 6);
}

#[test]
fn dropping_a_session_detaches_trackers() {
    init_logging();
    let desktop = Desktop::new();
    let scope = TargetScope::new(Arc::clone(&desktop.root));
    let session = TraceSession::start(
        &TraceConfig::new().with_default_enabled(["Mouse.MouseUp"]),
        CatalogBuilder::default().declare("Mouse", "MouseUp"),
        Arc::clone(&scope),
        TraceHooks::new(),
    )
    .unwrap();
    let kind = session.catalog().find("Mouse.MouseUp").unwrap().id();

    drop(session);
    assert_eq!(scope.listener_count(kind), 0);
    assert_eq!(scope.raise(RaisedEvent::new(kind, &desktop.button, mouse_args())), 0);
}
