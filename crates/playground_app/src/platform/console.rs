use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use playground_core::{Command, Msg, StreamMode, TaskUuid};
use playground_logging::{pg_info, pg_warn};

/// Everything the dispatch loop can be fed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    /// Connect, filling blanks from the configuration.
    Connect {
        token: Option<String>,
        mode: Option<StreamMode>,
    },
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("unknown command {0:?} (try `help`)")]
    UnknownCommand(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

pub const HELP: &str = "\
commands:
  connect [token] [live|playground]   open a session
  disconnect                          close the session
  add                                 add a task
  rename <uuid> <title>               rename a task
  delete <uuid>                       delete a task
  select <uuid>                       select a task
  load | run-all | run                send the task list / run all / run selected
  stop | pause | resume | restart     execution control
  watch <job-uuid>                    live view: follow a job
  show                                print the current state
  help | quit";

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>, ConsoleError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "connect" => parse_connect(rest),
        "disconnect" => Input::Msg(Msg::DisconnectRequested),
        "add" => Input::Msg(Msg::AddTaskClicked),
        "rename" => {
            let (uuid, title) = rest
                .split_once(char::is_whitespace)
                .map(|(uuid, title)| (uuid, title.trim()))
                .unwrap_or((rest, ""));
            Input::Msg(Msg::TaskTitleEdited {
                uuid: required_uuid("rename", uuid)?,
                title: title.to_string(),
            })
        }
        "delete" => Input::Msg(Msg::DeleteTaskClicked {
            uuid: required_uuid("delete", rest)?,
        }),
        "select" => Input::Msg(Msg::TaskSelected {
            uuid: required_uuid("select", rest)?,
        }),
        "load" => command(Command::LoadTasks),
        "run-all" => command(Command::RunAllTasks),
        "run" => command(Command::RunTask),
        "stop" => command(Command::Stop),
        "pause" => command(Command::Pause),
        "resume" => command(Command::Resume),
        "restart" => command(Command::Restart),
        "watch" => {
            if rest.is_empty() {
                return Err(ConsoleError::MissingArgument {
                    command: "watch",
                    argument: "a job uuid",
                });
            }
            command(Command::WatchJob {
                job_uuid: rest.to_string(),
            })
        }
        "show" | "tasks" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => return Err(ConsoleError::UnknownCommand(word.to_string())),
    };
    Ok(Some(input))
}

fn parse_connect(rest: &str) -> Input {
    let mut token = None;
    let mut mode = None;
    for word in rest.split_whitespace() {
        match word {
            "live" => mode = Some(StreamMode::LiveView),
            "playground" => mode = Some(StreamMode::Playground),
            other => token = Some(other.to_string()),
        }
    }
    Input::Connect { token, mode }
}

fn required_uuid(command: &'static str, raw: &str) -> Result<TaskUuid, ConsoleError> {
    if raw.is_empty() {
        return Err(ConsoleError::MissingArgument {
            command,
            argument: "a task uuid",
        });
    }
    Ok(TaskUuid::from(raw))
}

fn command(command: Command) -> Input {
    Input::Msg(Msg::CommandIssued(command))
}

/// Reads stdin line by line until EOF, then asks the loop to quit.
pub fn spawn_reader(tx: mpsc::Sender<Input>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        pg_warn!("console: stdin read failed: {err}");
                        break;
                    }
                };
                match parse_line(&line) {
                    Ok(Some(input)) => {
                        if tx.send(input).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => println!("? {err}"),
                }
            }
            pg_info!("console: input closed");
            let _ = tx.send(Input::Quit);
        })
}
