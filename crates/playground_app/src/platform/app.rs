use std::sync::mpsc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use playground_core::{update, AppState, Effect, Msg, SessionStatus};
use playground_logging::{pg_debug, pg_info};

use super::config::{AppConfig, Args};
use super::console::{self, Input, HELP};
use super::effects::EffectRunner;
use super::render::Renderer;

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::resolve(Args::parse())?;
    playground_logging::initialize(config.log, LevelFilter::Info);
    pg_info!(
        "playground starting: server={} mode={}",
        config.endpoint.base(),
        config.mode
    );

    let (tx, rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config.endpoint.clone(), config.connect.clone(), tx.clone())
        .context("starting transport engine")?;
    let mut renderer =
        Renderer::new(config.frames_dir.clone()).context("starting frame writer")?;
    console::spawn_reader(tx.clone()).context("starting console reader")?;

    println!("{HELP}");
    if config.connect_on_start {
        let _ = tx.send(Input::Connect {
            token: None,
            mode: None,
        });
    }
    drop(tx);

    let mut state = AppState::new();
    renderer.render(&state.view());

    while let Ok(input) = rx.recv() {
        let msg = match input {
            Input::Msg(msg) => msg,
            Input::Connect { token, mode } => connect_msg(&config, token, mode),
            Input::Show => {
                renderer.show(&state.view());
                continue;
            }
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Quit => {
                if matches!(
                    state.session().status(),
                    SessionStatus::Connected | SessionStatus::Connecting
                ) {
                    state = dispatch(state, Msg::DisconnectRequested, &runner, &mut renderer);
                }
                break;
            }
        };
        state = dispatch(state, msg, &runner, &mut renderer);
    }

    runner.shutdown();
    renderer.finish();
    pg_info!("playground exiting");
    Ok(())
}

/// Fills what the operator left out from the configuration.
fn connect_msg(
    config: &AppConfig,
    token: Option<String>,
    mode: Option<playground_core::StreamMode>,
) -> Msg {
    Msg::ConnectRequested {
        token: token.or_else(|| config.token.clone()).unwrap_or_default(),
        mode: mode.unwrap_or(config.mode),
    }
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    renderer: &mut Renderer,
) -> AppState {
    pg_debug!("dispatch {}", msg_label(&msg));
    let (mut state, effects) = update(state, msg);
    for effect in effects {
        match effect {
            Effect::Rejected(err) => renderer.rejected(&err),
            other => runner.run(other),
        }
    }
    if state.consume_dirty() {
        renderer.render(&state.view());
    }
    state
}

// Transport messages carry whole frames; keep them out of the log.
fn msg_label(msg: &Msg) -> String {
    match msg {
        Msg::TransportMessage { connection, raw } => {
            format!("TransportMessage connection={connection} bytes={}", raw.len())
        }
        Msg::ConnectRequested { mode, .. } => format!("ConnectRequested mode={mode}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::StreamMode;
    use playground_engine::{ConnectSettings, Endpoint};
    use playground_logging::LogDestination;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn config(token: Option<&str>) -> AppConfig {
        AppConfig {
            endpoint: Endpoint::default(),
            mode: StreamMode::LiveView,
            token: token.map(str::to_string),
            frames_dir: PathBuf::from("frames"),
            log: LogDestination::Terminal,
            connect_on_start: false,
            connect: ConnectSettings::default(),
        }
    }

    #[test]
    fn connect_falls_back_to_configured_token_and_mode() {
        assert_eq!(
            connect_msg(&config(Some("cfg")), None, None),
            Msg::ConnectRequested {
                token: "cfg".into(),
                mode: StreamMode::LiveView,
            }
        );
    }

    #[test]
    fn explicit_connect_arguments_win() {
        assert_eq!(
            connect_msg(
                &config(Some("cfg")),
                Some("typed".into()),
                Some(StreamMode::Playground)
            ),
            Msg::ConnectRequested {
                token: "typed".into(),
                mode: StreamMode::Playground,
            }
        );
    }

    #[test]
    fn missing_token_is_left_for_the_controller_to_reject() {
        assert_eq!(
            connect_msg(&config(None), None, None),
            Msg::ConnectRequested {
                token: String::new(),
                mode: StreamMode::LiveView,
            }
        );
    }

    #[test]
    fn tokens_and_frames_stay_out_of_dispatch_logs() {
        let label = msg_label(&Msg::ConnectRequested {
            token: "secret".into(),
            mode: StreamMode::Playground,
        });
        assert!(!label.contains("secret"), "{label}");
        assert_eq!(
            msg_label(&Msg::TransportMessage {
                connection: 2,
                raw: "x".repeat(10),
            }),
            "TransportMessage connection=2 bytes=10"
        );
    }
}
