use playground_core::{
    update, AppState, Command, ConnectionId, Effect, Msg, SessionStatus, StatusSnapshot,
    StreamMode, ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    playground_logging::initialize_for_tests();
}

fn connect(state: AppState, token: &str, mode: StreamMode) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ConnectRequested {
            token: token.to_string(),
            mode,
        },
    )
}

fn connected(mode: StreamMode) -> (AppState, ConnectionId) {
    let (state, effects) = connect(AppState::new(), "secret", mode);
    let connection = match effects.as_slice() {
        [Effect::OpenConnection { connection, .. }] => *connection,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(state, Msg::TransportOpened { connection });
    assert_eq!(state.view().session, SessionStatus::Connected);
    (state, connection)
}

fn frame(connection: ConnectionId) -> Msg {
    Msg::TransportMessage {
        connection,
        raw: json!({
            "type": "browser_frame",
            "frame": "AAAA",
            "current_url": "https://example.com",
            "job_uuid": "J1",
            "job_status": "RUNNING",
        })
        .to_string(),
    }
}

#[test]
fn connect_emits_open_and_moves_to_connecting() {
    init_logging();
    let (mut state, effects) = connect(AppState::new(), "secret", StreamMode::Playground);

    assert_eq!(
        effects,
        vec![Effect::OpenConnection {
            connection: 1,
            mode: StreamMode::Playground,
            token: "secret".to_string(),
        }]
    );
    assert_eq!(state.view().session, SessionStatus::Connecting);
    assert!(!state.view().can_send);
    assert!(state.consume_dirty());
}

#[test]
fn connect_with_empty_token_is_rejected() {
    init_logging();
    let (state, effects) = connect(AppState::new(), "", StreamMode::Playground);

    assert_eq!(effects, vec![Effect::Rejected(ValidationError::EmptyToken)]);
    assert_eq!(state.view().session, SessionStatus::Disconnected);
}

#[test]
fn second_connect_is_rejected_while_active() {
    init_logging();
    let (state, _) = connect(AppState::new(), "secret", StreamMode::Playground);
    let (state, effects) = connect(state, "secret", StreamMode::Playground);
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::AlreadyActive)]);

    let (state, _) = update(state, Msg::TransportOpened { connection: 1 });
    let (_state, effects) = connect(state, "secret", StreamMode::LiveView);
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::AlreadyActive)]);
}

#[test]
fn commands_are_rejected_unless_connected() {
    init_logging();
    let mut state = AppState::new();
    let (next, _) = update(state, Msg::AddTaskClicked);
    state = next;

    for command in [
        Command::LoadTasks,
        Command::RunAllTasks,
        Command::RunTask,
        Command::Stop,
        Command::Pause,
        Command::Resume,
        Command::Restart,
    ] {
        let (next, effects) = update(state, Msg::CommandIssued(command));
        assert_eq!(effects, vec![Effect::Rejected(ValidationError::NotConnected)]);
        state = next;
    }

    // Still not connected while the handshake is pending.
    let (state, _) = connect(state, "secret", StreamMode::Playground);
    let (_state, effects) = update(state, Msg::CommandIssued(Command::Stop));
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::NotConnected)]);
}

#[test]
fn not_connected_wins_over_empty_registry() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::CommandIssued(Command::RunAllTasks));
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::NotConnected)]);
}

#[test]
fn connected_commands_become_sends() {
    init_logging();
    let (state, connection) = connected(StreamMode::Playground);

    let (state, effects) = update(state, Msg::CommandIssued(Command::RunAllTasks));
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::EmptyRegistry)]);

    let (state, _) = update(state, Msg::AddTaskClicked);
    let (_state, effects) = update(state, Msg::CommandIssued(Command::Pause));
    let [Effect::Send {
        connection: sent_on,
        payload,
    }] = effects.as_slice()
    else {
        panic!("expected a single send, got {effects:?}");
    };
    assert_eq!(*sent_on, connection);
    let payload: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(payload, json!({ "COMMAND": "C2S_PAUSE" }));
}

#[test]
fn disconnect_clears_display_but_keeps_tasks() {
    init_logging();
    let (state, connection) = connected(StreamMode::Playground);
    let (state, _) = update(state, Msg::AddTaskClicked);
    let (state, _) = update(state, frame(connection));
    assert_eq!(state.view().current_url, "https://example.com");

    let (state, effects) = update(state, Msg::DisconnectRequested);
    assert_eq!(effects, vec![Effect::CloseConnection { connection }]);

    let view = state.view();
    assert_eq!(view.session, SessionStatus::Disconnected);
    assert_eq!(view.current_url, "");
    assert!(view.frame.is_none());
    assert_eq!(view.metadata, StatusSnapshot::default());
    assert_eq!(view.tasks.len(), 1);

    let (_state, effects) = update(state, Msg::DisconnectRequested);
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::NotConnected)]);
}

#[test]
fn transport_close_and_error_reset_session() {
    init_logging();
    for failure in [true, false] {
        let (state, connection) = connected(StreamMode::Playground);
        let (state, _) = update(state, Msg::AddTaskClicked);
        let (state, _) = update(state, frame(connection));
        let tasks_before = state.registry().clone();

        let msg = if failure {
            Msg::TransportFailed {
                connection,
                message: "connection reset".to_string(),
            }
        } else {
            Msg::TransportClosed { connection }
        };
        let (state, effects) = update(state, msg);

        assert!(effects.is_empty());
        let view = state.view();
        assert_eq!(view.session, SessionStatus::Disconnected);
        assert_eq!(view.current_url, "");
        assert!(view.frame.is_none());
        assert_eq!(view.metadata, StatusSnapshot::default());
        assert_eq!(view.frames_received, 0);
        assert_eq!(state.registry(), &tasks_before);
        assert_eq!(
            view.last_error.as_deref(),
            failure.then_some("connection reset")
        );
    }
}

#[test]
fn late_events_from_old_connection_do_not_affect_new_session() {
    init_logging();
    let (state, old) = connected(StreamMode::Playground);
    let (state, _) = update(state, Msg::DisconnectRequested);
    let (state, effects) = connect(state, "secret", StreamMode::Playground);
    let [Effect::OpenConnection { connection: new, .. }] = effects.as_slice() else {
        panic!("expected open, got {effects:?}");
    };
    let new = *new;
    assert_ne!(old, new);

    let (state, _) = update(state, Msg::TransportClosed { connection: old });
    assert_eq!(state.view().session, SessionStatus::Connecting);

    let (state, _) = update(state, Msg::TransportOpened { connection: new });
    let (state, _) = update(state, frame(old));
    assert_eq!(state.view().frames_received, 0);

    let (state, _) = update(state, frame(new));
    assert_eq!(state.view().frames_received, 1);
    assert_eq!(state.view().session, SessionStatus::Connected);
}

#[test]
fn events_for_unknown_connections_are_silent() {
    init_logging();
    let (state, connection) = connected(StreamMode::Playground);
    let (mut state, _) = update(state, Msg::AddTaskClicked);
    state.consume_dirty();
    let stranger = connection + 41;

    for msg in [
        frame(stranger),
        Msg::TransportOpened {
            connection: stranger,
        },
        Msg::TransportClosed {
            connection: stranger,
        },
        Msg::TransportFailed {
            connection: stranger,
            message: "reset".to_string(),
        },
    ] {
        let before = state.clone();
        let (next, effects) = update(state, msg);
        assert!(effects.is_empty());
        assert_eq!(next, before);
        state = next;
    }

    // Nothing is current before the first connect.
    let idle = AppState::new();
    let (next, effects) = update(idle.clone(), frame(1));
    assert!(effects.is_empty());
    assert_eq!(next, idle);
}

#[test]
fn malformed_messages_do_not_change_anything() {
    init_logging();
    let (state, connection) = connected(StreamMode::Playground);
    let (state, _) = update(state, Msg::AddTaskClicked);
    let (mut state, _) = update(state, frame(connection));
    state.consume_dirty();
    let before = state.clone();

    let (mut state, effects) = update(
        state,
        Msg::TransportMessage {
            connection,
            raw: "{definitely not json".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}

#[test]
fn live_view_watches_jobs_and_refuses_task_commands() {
    init_logging();
    let (state, connection) = connected(StreamMode::LiveView);

    let (state, effects) = update(state, Msg::CommandIssued(Command::Stop));
    assert_eq!(
        effects,
        vec![Effect::Rejected(ValidationError::WrongMode {
            mode: StreamMode::LiveView
        })]
    );

    let (_state, effects) = update(
        state,
        Msg::CommandIssued(Command::WatchJob {
            job_uuid: "J1".to_string(),
        }),
    );
    let [Effect::Send {
        connection: sent_on,
        payload,
    }] = effects.as_slice()
    else {
        panic!("expected a single send, got {effects:?}");
    };
    assert_eq!(*sent_on, connection);
    let payload: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(payload, json!({ "COMMAND": "C2S_CONNECT", "JOB_UUID": "J1" }));
}
