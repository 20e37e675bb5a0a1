use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use playground_core::StreamMode;
use playground_engine::{ConnectSettings, Endpoint, DEFAULT_BASE_URL};
use playground_logging::LogDestination;
use serde::{Deserialize, Serialize};

const DEFAULT_FRAMES_DIR: &str = "frames";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeArg {
    Playground,
    Live,
}

impl From<ModeArg> for StreamMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Playground => StreamMode::Playground,
            ModeArg::Live => StreamMode::LiveView,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(log: LogArg) -> Self {
        match log {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

/// Remote-control console for the browser automation backend.
#[derive(Debug, Default, Parser)]
#[command(name = "playground", version)]
pub struct Args {
    /// RON file with defaults for any of the options below.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base WebSocket URL of the backend.
    #[arg(long)]
    pub server: Option<String>,
    /// Endpoint to talk to.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Access token sent as the `token` query parameter.
    #[arg(long, env = "PLAYGROUND_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Directory that receives the latest frame image.
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,
    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogArg>,
    /// Connect as soon as the console starts.
    #[arg(long)]
    pub connect: bool,
}

/// Same knobs as [`Args`], loaded from the `--config` file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<String>,
    pub mode: Option<ModeArg>,
    pub token: Option<String>,
    pub frames_dir: Option<PathBuf>,
    pub log: Option<LogArg>,
    pub max_message_bytes: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: Endpoint,
    pub mode: StreamMode,
    pub token: Option<String>,
    pub frames_dir: PathBuf,
    pub log: LogDestination,
    pub connect_on_start: bool,
    pub connect: ConnectSettings,
}

impl AppConfig {
    pub fn resolve(args: Args) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Flags win over the file, the file wins over defaults.
    pub fn merge(args: Args, file: FileConfig) -> anyhow::Result<Self> {
        let server = args
            .server
            .or(file.server)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let endpoint = Endpoint::parse(&server).context("invalid --server")?;

        Ok(Self {
            endpoint,
            mode: args
                .mode
                .or(file.mode)
                .map(StreamMode::from)
                .unwrap_or_default(),
            token: args.token.or(file.token).filter(|token| !token.is_empty()),
            frames_dir: args
                .frames_dir
                .or(file.frames_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMES_DIR)),
            log: args.log.or(file.log).map(Into::into).unwrap_or(LogDestination::File),
            connect_on_start: args.connect,
            connect: ConnectSettings {
                max_message_bytes: file.max_message_bytes,
            },
        })
    }
}
