use playground_logging::{pg_debug, pg_info};

use crate::{encode_command, AppState, Command, Effect, Msg, ValidationError};

/// Pure update function: applies a message to state and returns any effects.
///
/// This is the playground controller. Operator intents and transport events
/// both arrive here, one at a time, so every transition runs to completion
/// before the next message is looked at.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConnectRequested { token, mode } => {
            let connection = state.peek_connection();
            match state.session_mut().connect(&token, mode, connection) {
                Ok(()) => {
                    state.commit_connection();
                    state.clear_display();
                    state.mark_dirty();
                    vec![Effect::OpenConnection {
                        connection,
                        mode,
                        token,
                    }]
                }
                Err(err) => rejected(err),
            }
        }
        Msg::DisconnectRequested => match state.session_mut().disconnect() {
            Ok(connection) => {
                state.clear_display();
                state.mark_dirty();
                vec![Effect::CloseConnection { connection }]
            }
            Err(err) => rejected(err),
        },
        Msg::AddTaskClicked => {
            let uuid = state.registry_mut().add_task();
            pg_debug!("added task {uuid}");
            state.mark_dirty();
            Vec::new()
        }
        Msg::TaskTitleEdited { uuid, title } => {
            match state.registry_mut().update_task(&uuid, &title) {
                Ok(true) => {
                    state.mark_dirty();
                    Vec::new()
                }
                Ok(false) => Vec::new(),
                Err(err) => rejected(err),
            }
        }
        Msg::DeleteTaskClicked { uuid } => {
            if state.registry_mut().delete_task(&uuid) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TaskSelected { uuid } => {
            if state.registry_mut().select_task(&uuid) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CommandIssued(command) => match prepare_send(&state, &command) {
            Ok(effect) => vec![effect],
            Err(err) => rejected(err),
        },
        Msg::TransportOpened { connection } => {
            if state.session_mut().on_open(connection) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TransportMessage { connection, raw } => {
            if state.session().is_live(connection) {
                if state.merge_message(&raw).changed_state() {
                    state.mark_dirty();
                }
            } else {
                pg_debug!("dropping message from inactive connection {connection}");
            }
            Vec::new()
        }
        Msg::TransportClosed { connection } => {
            if state.session_mut().on_close(connection) {
                state.clear_display();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TransportFailed {
            connection,
            message,
        } => {
            if state.session_mut().on_error(connection, &message) {
                state.clear_display();
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

// Connection first: nothing is encoded while the session is not connected.
fn prepare_send(state: &AppState, command: &Command) -> Result<Effect, ValidationError> {
    let connection = state.session().ensure_connected()?;
    let message = encode_command(command, state.registry(), state.session().mode())?;
    let payload = message
        .to_json()
        .map_err(|err| ValidationError::Encode(err.to_string()))?;
    pg_info!("sending {:?} on connection {connection}", message.command);
    Ok(Effect::Send {
        connection,
        payload,
    })
}

fn rejected(err: ValidationError) -> Vec<Effect> {
    pg_info!("rejected: {err}");
    vec![Effect::Rejected(err)]
}
