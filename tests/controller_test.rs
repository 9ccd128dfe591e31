//! Session controller tests against the in-memory store and mock streams

use std::sync::Arc;
use std::time::Duration;

use muxdeck::remote::{InMemoryStore, SessionRecord};
use muxdeck::session::{
    ControllerEvent, ControllerSettings, ControllerState, NoticeLevel, SessionController,
};
use muxdeck::surface::{Geometry, Palette, Theme, normalize_line_endings};
use muxdeck::transport::mock::ConnectionLogEntry;
use muxdeck::transport::{
    ConnectionStatus, InboundFrame, MockConnector, OutboundFrame, TransportEvent,
};
use tokio::time::timeout;

fn records(ids: &[&str]) -> Vec<SessionRecord> {
    ids.iter()
        .map(|id| SessionRecord::new(*id, format!("Session {}", id)))
        .collect()
}

async fn start(store: &InMemoryStore, connector: &MockConnector) -> SessionController {
    let mut controller = SessionController::start(
        Arc::new(store.clone()),
        Arc::new(connector.clone()),
        ControllerSettings::default(),
    )
    .await;
    settle(&mut controller).await;
    controller
}

/// Apply completions until nothing arrives for a short while
async fn settle(controller: &mut SessionController) {
    while let Ok(Some(event)) = timeout(Duration::from_millis(50), controller.next_event()).await {
        controller.handle_event(event);
    }
}

fn output(content: &str) -> InboundFrame {
    InboundFrame::Output {
        content: content.to_string(),
    }
}

fn contents(controller: &SessionController) -> String {
    controller
        .surface()
        .map(|surface| surface.contents())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_create_send_receive_toggle_delete() {
    let store = InMemoryStore::new();
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));
    assert!(controller.directory().is_empty());

    controller.create_session();
    settle(&mut controller).await;

    assert_eq!(controller.directory().len(), 1);
    let id = controller.directory().records()[0].id.clone();
    assert_eq!(controller.active_session(), Some(id.as_str()));
    assert_eq!(controller.state(), ControllerState::Bound);
    assert_eq!(connector.open_count(), 1);
    assert!(controller.surface().is_some());

    let binding = controller.binding_id().unwrap();
    assert!(controller.send_input("ls"));
    assert_eq!(
        connector.sent(binding),
        vec![OutboundFrame::Input {
            content: "ls".to_string()
        }]
    );

    assert!(connector.push_frame(binding, output("a.txt\nb.txt\n")));
    settle(&mut controller).await;
    assert_eq!(normalize_line_endings("a.txt\n"), "a.txt\r\n");
    // bare newlines would leave b.txt indented under the end of a.txt
    assert!(contents(&controller).contains("a.txt\nb.txt"));
    assert!(contents(&controller).contains("User: ls"));

    assert_eq!(controller.toggle_theme(), Theme::Light);
    settle(&mut controller).await;
    assert_eq!(controller.theme(), Theme::Light);
    assert_eq!(store.theme_writes(), vec![Theme::Light]);
    let surface = controller.surface().unwrap();
    assert_eq!(surface.palette(), &Palette::LIGHT);
    assert!(surface.contents().contains("a.txt"));

    controller.delete_session(&id);
    settle(&mut controller).await;
    assert!(controller.directory().is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(controller.surface().is_none());
    assert_eq!(connector.open_count(), 0);
    assert!(store.sessions().is_empty());
}

#[tokio::test]
async fn test_at_most_one_binding() {
    let store = InMemoryStore::with_sessions(records(&["a", "b", "c"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));

    for id in ["a", "b", "c", "a", "c"] {
        assert!(controller.select_session(id));
        assert!(connector.open_count() <= 1);
    }
    settle(&mut controller).await;
    assert_eq!(connector.open_count(), 1);
    assert_eq!(connector.latest_binding("c"), controller.binding_id());

    // every open after the first is preceded by the close of the previous binding
    let log = connector.log();
    assert_eq!(log.len(), 9);
    for pair in log[1..].chunks(2) {
        match pair {
            [
                ConnectionLogEntry::Closed { binding: closed, .. },
                ConnectionLogEntry::Opened { binding: opened, .. },
            ] => assert!(closed < opened),
            other => panic!("unexpected connection order: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_no_cross_talk_between_bindings() {
    let store = InMemoryStore::with_sessions(records(&["a", "b"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));

    controller.select_session("a");
    settle(&mut controller).await;
    let first_a = controller.binding_id().unwrap();
    connector.push_frame(first_a, output("from-a\n"));
    settle(&mut controller).await;
    assert!(contents(&controller).contains("from-a"));

    controller.select_session("b");
    settle(&mut controller).await;
    let b = controller.binding_id().unwrap();

    // the old stream is closed and its sink cancelled
    assert!(!connector.push_frame(first_a, output("late-a\n")));
    // a completion already in flight for the old binding is discarded
    controller.handle_event(ControllerEvent::Transport {
        binding: first_a,
        event: TransportEvent::Frame(output("late-a\n")),
    });
    connector.push_frame(b, output("from-b\n"));
    settle(&mut controller).await;
    assert!(contents(&controller).contains("from-b"));
    assert!(!contents(&controller).contains("from-a"));
    assert!(!contents(&controller).contains("late-a"));

    controller.select_session("a");
    settle(&mut controller).await;
    assert_ne!(controller.binding_id(), Some(first_a));
    controller.handle_event(ControllerEvent::Transport {
        binding: b,
        event: TransportEvent::Frame(output("late-b\n")),
    });
    assert!(!contents(&controller).contains("from-b"));
    assert!(!contents(&controller).contains("late-b"));
    assert!(!contents(&controller).contains("from-a"));
}

#[tokio::test]
async fn test_cycle_on_empty_and_single_directory() {
    let connector = MockConnector::new();
    let mut controller = start(&InMemoryStore::new(), &connector).await;
    assert!(!controller.cycle_next());
    assert!(!controller.cycle_previous());
    assert_eq!(controller.state(), ControllerState::Idle);

    let store = InMemoryStore::with_sessions(records(&["only"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.select_session("only");
    assert!(!controller.cycle_next());
    assert!(!controller.cycle_previous());
    assert_eq!(controller.active_session(), Some("only"));
    assert_eq!(connector.log().len(), 1);
}

#[tokio::test]
async fn test_cycle_visits_every_session() {
    let store = InMemoryStore::with_sessions(records(&["a", "b", "c"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.select_session("a");

    let mut visited = Vec::new();
    for _ in 0..3 {
        assert!(controller.cycle_next());
        visited.push(controller.active_session().unwrap().to_string());
    }
    assert_eq!(visited, vec!["b", "c", "a"]);

    let mut visited = Vec::new();
    for _ in 0..3 {
        assert!(controller.cycle_previous());
        visited.push(controller.active_session().unwrap().to_string());
    }
    assert_eq!(visited, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_deleting_other_session_keeps_binding() {
    let store = InMemoryStore::with_sessions(records(&["a", "b"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.select_session("a");
    let binding = controller.binding_id();

    controller.delete_session("b");
    settle(&mut controller).await;
    assert_eq!(controller.directory().len(), 1);
    assert_eq!(controller.binding_id(), binding);
    assert_eq!(controller.state(), ControllerState::Bound);
}

#[tokio::test]
async fn test_send_input_noops() {
    let store = InMemoryStore::with_sessions(records(&["a", "b"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;

    assert!(!controller.send_input("ls"));

    controller.select_session("a");
    assert!(!controller.send_input(""));
    assert!(!controller.send_input("   "));
    assert!(connector.sent_to("a").is_empty());

    connector.start_disconnected(true);
    controller.select_session("b");
    assert!(!controller.send_input("ls"));
    assert!(connector.sent_to("b").is_empty());
    assert_eq!(controller.state(), ControllerState::Bound);
}

#[tokio::test]
async fn test_frames_buffer_until_container_is_ready() {
    let store = InMemoryStore::with_sessions(records(&["a"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;

    controller.select_session("a");
    let binding = controller.binding_id().unwrap();
    connector.push_frame(binding, output("one\n"));
    connector.push_frame(binding, output("two\n"));
    // both attach attempts run and fail without a container
    settle(&mut controller).await;

    assert!(controller.surface().is_none());
    assert_eq!(controller.pending_frames(), 2);

    controller.container_ready(Geometry::new(80, 24));
    assert_eq!(controller.pending_frames(), 0);
    assert!(contents(&controller).contains("one\ntwo"));
}

#[tokio::test]
async fn test_error_frame_keeps_connection_open() {
    let store = InMemoryStore::with_sessions(records(&["a"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));
    controller.select_session("a");
    let binding = controller.binding_id().unwrap();

    connector.push_frame(
        binding,
        InboundFrame::Error {
            content: "agent crashed".to_string(),
        },
    );
    settle(&mut controller).await;

    assert!(contents(&controller).contains("[error] agent crashed"));
    assert_eq!(
        controller.connection_status(),
        Some(ConnectionStatus::Connected)
    );
    assert!(controller.send_input("retry"));
}

#[tokio::test]
async fn test_create_does_not_steal_a_newer_selection() {
    let store = InMemoryStore::with_sessions(records(&["a", "b"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.select_session("a");

    controller.create_session();
    controller.select_session("b");
    settle(&mut controller).await;

    assert_eq!(controller.directory().len(), 3);
    assert_eq!(controller.active_session(), Some("b"));
}

#[tokio::test]
async fn test_theme_loaded_from_store() {
    let store = InMemoryStore::new().with_theme(Theme::Light);
    let connector = MockConnector::new();
    let controller = start(&store, &connector).await;
    assert_eq!(controller.theme(), Theme::Light);
}

#[tokio::test]
async fn test_store_failures_become_notices() {
    let store = InMemoryStore::with_sessions(records(&["a"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));
    controller.select_session("a");
    settle(&mut controller).await;
    controller.drain_notices();

    store.set_failing(true);
    controller.create_session();
    controller.toggle_theme();
    settle(&mut controller).await;

    let notices = controller.drain_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));

    // nothing changed locally
    assert_eq!(controller.directory().len(), 1);
    assert_eq!(controller.active_session(), Some("a"));
    assert_eq!(controller.theme(), Theme::Dark);
    assert_eq!(controller.preferences().requested(), Theme::Dark);
    assert_eq!(controller.surface().unwrap().palette(), &Palette::DARK);
}

#[tokio::test]
async fn test_listing_older_than_local_change_is_discarded() {
    let store = InMemoryStore::with_sessions(records(&["a", "b"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));

    let before_create = store.sessions();
    let ticket = controller.list_sessions();
    controller.create_session();
    settle(&mut controller).await;
    let created = controller.active_session().unwrap().to_string();

    // the listing was answered before the create but arrives after it
    controller.handle_event(ControllerEvent::SessionsListed {
        ticket,
        result: Ok(before_create),
    });
    assert_eq!(controller.directory().len(), 3);
    assert!(controller.directory().contains(&created));
    assert_eq!(controller.state(), ControllerState::Bound);

    let before_changes = store.sessions();
    let ticket = controller.list_sessions();
    controller.delete_session("a");
    controller.rename_session("b", "build");
    settle(&mut controller).await;

    controller.handle_event(ControllerEvent::SessionsListed {
        ticket,
        result: Ok(before_changes),
    });
    assert!(!controller.directory().contains("a"));
    assert_eq!(controller.directory().get("b").unwrap().name, "build");

    // a fresh listing is applied as usual
    controller.list_sessions();
    settle(&mut controller).await;
    assert_eq!(controller.directory().records().to_vec(), store.sessions());
}

#[tokio::test]
async fn test_theme_follows_last_acknowledged_write() {
    let store = InMemoryStore::with_sessions(records(&["a"]));
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;
    controller.container_ready(Geometry::new(80, 24));
    controller.select_session("a");
    settle(&mut controller).await;
    controller.drain_notices();

    assert_eq!(controller.toggle_theme(), Theme::Light);
    // the first write reaches the store before it starts failing
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.set_failing(true);
    assert_eq!(controller.toggle_theme(), Theme::Dark);
    settle(&mut controller).await;

    assert_eq!(store.theme_writes(), vec![Theme::Light]);
    assert_eq!(controller.theme(), Theme::Light);
    assert_eq!(controller.preferences().requested(), Theme::Light);
    assert!(!controller.preferences().is_writing());
    assert_eq!(controller.surface().unwrap().palette(), &Palette::LIGHT);

    let notices = controller.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_rapid_toggles_settle_on_last_request() {
    let store = InMemoryStore::new();
    let connector = MockConnector::new();
    let mut controller = start(&store, &connector).await;

    controller.toggle_theme();
    controller.toggle_theme();
    controller.toggle_theme();
    settle(&mut controller).await;

    // one write in flight at a time; the middle request was superseded
    assert_eq!(store.theme_writes(), vec![Theme::Light]);
    assert_eq!(controller.theme(), Theme::Light);
}
