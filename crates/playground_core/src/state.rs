use crate::merge::{self, DisplayState, MergeOutcome};
use crate::view_model::{AppViewModel, TaskRowView};
use crate::{ConnectionId, Session, SessionStatus, TaskRegistry};

/// Everything the controller owns: session, tasks, and what is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    session: Session,
    registry: TaskRegistry,
    display: DisplayState,
    next_connection: ConnectionId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            registry: TaskRegistry::default(),
            display: DisplayState::default(),
            next_connection: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let selected = self.registry.selected().cloned();
        AppViewModel {
            session: self.session.status(),
            mode: self.session.mode(),
            last_error: self.session.last_error().map(ToOwned::to_owned),
            tasks: self
                .registry
                .tasks()
                .iter()
                .map(|task| TaskRowView {
                    uuid: task.uuid.clone(),
                    title: task.title.clone(),
                    status: task.status.clone(),
                    selected: selected.as_ref() == Some(&task.uuid),
                })
                .collect(),
            selected,
            frame: self.display.frame.clone(),
            current_url: self.display.current_url().to_string(),
            metadata: self.display.metadata.clone(),
            last_ack: self.display.last_ack.clone(),
            frames_received: self.display.frames_received,
            can_send: self.session.status() == SessionStatus::Connected,
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn registry_mut(&mut self) -> &mut TaskRegistry {
        &mut self.registry
    }

    /// Id the next successful connect will use.
    pub(crate) fn peek_connection(&self) -> ConnectionId {
        self.next_connection
    }

    pub(crate) fn commit_connection(&mut self) {
        self.next_connection += 1;
    }

    pub(crate) fn clear_display(&mut self) {
        self.display.clear();
    }

    pub(crate) fn merge_message(&mut self, raw: &str) -> MergeOutcome {
        merge::on_message(raw, &mut self.display, &mut self.registry)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
