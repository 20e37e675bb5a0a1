use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use chrono::Local;
use playground_core::{AppViewModel, Frame, SessionStatus, ValidationError};
use playground_engine::FrameStore;
use playground_logging::{pg_debug, pg_error, pg_warn};

/// Console output plus the on-disk copy of the latest frame.
pub struct Renderer {
    frames: FrameWriter,
    last_frames: u64,
    last_summary: Option<String>,
}

impl Renderer {
    pub fn new(frames_dir: PathBuf) -> io::Result<Self> {
        Ok(Self {
            frames: FrameWriter::spawn(FrameStore::new(frames_dir))?,
            last_frames: 0,
            last_summary: None,
        })
    }

    /// Called after every dirty update.
    pub fn render(&mut self, view: &AppViewModel) {
        self.queue_frame(view);

        let line = summary(view);
        if self.last_summary.as_deref() != Some(line.as_str()) {
            println!("[{}] {line}", Local::now().format("%H:%M:%S"));
            self.last_summary = Some(line);
        }
    }

    pub fn show(&self, view: &AppViewModel) {
        for line in describe(view) {
            println!("{line}");
        }
    }

    pub fn rejected(&self, err: &ValidationError) {
        println!("! {err}");
    }

    /// Waits for the frame writer to store whatever is still queued.
    pub fn finish(self) {
        self.frames.finish();
    }

    /// Hands a newly received frame to the writer thread.
    fn queue_frame(&mut self, view: &AppViewModel) -> bool {
        // The counter restarts from zero with every session.
        if view.frames_received < self.last_frames {
            self.last_frames = 0;
        }
        if view.frames_received == self.last_frames {
            return false;
        }
        self.last_frames = view.frames_received;

        match view.frame.as_ref().filter(|frame| frame.has_image()) {
            Some(frame) => self.frames.queue(view.frames_received, frame.clone()),
            None => false,
        }
    }
}

/// Decodes and stores frames off the dispatch loop. When frames arrive
/// faster than the disk keeps up, only the newest queued one is written.
struct FrameWriter {
    tx: mpsc::Sender<(u64, Frame)>,
    worker: thread::JoinHandle<()>,
}

impl FrameWriter {
    fn spawn(store: FrameStore) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<(u64, Frame)>();
        let worker = thread::Builder::new()
            .name("frame-writer".to_string())
            .spawn(move || {
                while let Ok(mut pending) = rx.recv() {
                    while let Ok(newer) = rx.try_recv() {
                        pending = newer;
                    }
                    let (number, frame) = pending;
                    write_frame(&store, number, &frame);
                }
            })?;
        Ok(Self { tx, worker })
    }

    fn queue(&self, number: u64, frame: Frame) -> bool {
        self.tx.send((number, frame)).is_ok()
    }

    fn finish(self) {
        drop(self.tx);
        if self.worker.join().is_err() {
            pg_error!("frame writer panicked");
        }
    }
}

fn write_frame(store: &FrameStore, number: u64, frame: &Frame) {
    match frame.image_bytes() {
        Ok(bytes) => match store.store(&bytes) {
            Ok(path) => pg_debug!("frame {number} -> {}", path.display()),
            Err(err) => pg_error!("storing frame in {} failed: {err}", store.dir().display()),
        },
        Err(err) => pg_warn!("frame {number} is not valid base64: {err}"),
    }
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Disconnected => "disconnected",
        SessionStatus::Connecting => "connecting",
        SessionStatus::Connected => "connected",
        SessionStatus::Error => "error",
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// One-line state summary; printed only when it changes.
pub fn summary(view: &AppViewModel) -> String {
    let mut line = format!(
        "{} ({}) | tasks {}",
        status_label(view.session),
        view.mode,
        view.tasks.len()
    );
    if let Some(error) = &view.last_error {
        line.push_str(&format!(" | last error: {error}"));
    }
    if view.session == SessionStatus::Connected {
        let meta = &view.metadata;
        line.push_str(&format!(
            " | job {} {} | task {} {} | {}",
            or_dash(&meta.job_uuid),
            or_dash(&meta.job_status),
            or_dash(&meta.task_uuid),
            or_dash(&meta.task_status),
            or_dash(&view.current_url)
        ));
    }
    if let Some(ack) = &view.last_ack {
        let detail = if ack.error.is_empty() {
            &ack.message
        } else {
            &ack.error
        };
        line.push_str(&format!(" | ack {}", ack.code));
        if !detail.is_empty() {
            line.push_str(&format!(": {detail}"));
        }
    }
    line
}

/// Full multi-line dump used by `show`.
pub fn describe(view: &AppViewModel) -> Vec<String> {
    let meta = &view.metadata;
    let mut lines = vec![
        format!("session : {} ({})", status_label(view.session), view.mode),
        format!("url     : {}", or_dash(&view.current_url)),
        format!("frames  : {}", view.frames_received),
        format!(
            "job     : {} [{}]",
            or_dash(&meta.job_uuid),
            or_dash(&meta.job_status)
        ),
        format!(
            "case    : {} [{}]",
            or_dash(&meta.case_uuid),
            or_dash(&meta.case_status)
        ),
        format!(
            "task    : {} [{}] {}",
            or_dash(&meta.task_uuid),
            or_dash(&meta.task_status),
            meta.task_title
        )
        .trim_end()
        .to_string(),
    ];
    if let Some(error) = &view.last_error {
        lines.push(format!("error   : {error}"));
    }
    if view.tasks.is_empty() {
        lines.push("tasks   : none (use `add`)".to_string());
    } else {
        lines.push("tasks   :".to_string());
        for row in &view.tasks {
            let marker = if row.selected { '*' } else { ' ' };
            lines.push(format!(
                "  {marker} {} [{}] {}",
                row.uuid,
                row.status,
                or_dash(&row.title)
            ));
        }
    }
    lines
}
