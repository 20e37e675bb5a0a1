use std::fmt;

use playground_logging::pg_debug;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Status assigned to a freshly authored task.
pub const DEFAULT_TASK_STATUS: &str = "Pending";

/// Client-assigned task identifier. Never reused or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUuid(String);

impl TaskUuid {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskUuid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub uuid: TaskUuid,
    pub title: String,
    pub status: String,
    /// Reserved for execution parameters; always `None` for now.
    pub payload: Option<serde_json::Value>,
}

/// One entry of `ALL_TASK_DATA` in outbound commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskData {
    pub uuid: TaskUuid,
    pub title: String,
    pub data: Option<serde_json::Value>,
}

/// Ordered collection of locally authored tasks plus the current selection.
///
/// Insertion order is the only order. Lookups are linear scans, which is
/// fine for the handful of tasks an operator authors by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    selected: Option<TaskUuid>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task titled after its position and selects it if nothing
    /// was selected.
    pub fn add_task(&mut self) -> TaskUuid {
        let uuid = TaskUuid::generate();
        let title = format!("Task {}", self.tasks.len() + 1);
        self.tasks.push(Task {
            uuid: uuid.clone(),
            title,
            status: DEFAULT_TASK_STATUS.to_string(),
            payload: None,
        });
        if self.selected.is_none() {
            self.selected = Some(uuid.clone());
        }
        uuid
    }

    /// Renames a task. Returns `Ok(false)` when no task has `uuid`; a blank
    /// title is rejected and the previous title kept.
    pub fn update_task(&mut self, uuid: &TaskUuid, title: &str) -> Result<bool, ValidationError> {
        let Some(task) = self.tasks.iter_mut().find(|task| &task.uuid == uuid) else {
            pg_debug!("update_task: unknown task {}", uuid);
            return Ok(false);
        };
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        task.title = trimmed.to_string();
        Ok(true)
    }

    /// Removes a task. When the selected task goes away the first remaining
    /// task (if any) becomes selected.
    pub fn delete_task(&mut self, uuid: &TaskUuid) -> bool {
        let Some(index) = self.position(uuid.as_str()) else {
            pg_debug!("delete_task: unknown task {}", uuid);
            return false;
        };
        self.tasks.remove(index);
        if self.selected.as_ref() == Some(uuid) {
            self.selected = self.tasks.first().map(|task| task.uuid.clone());
        }
        true
    }

    /// Selects an existing task; unknown uuids leave the selection alone.
    pub fn select_task(&mut self, uuid: &TaskUuid) -> bool {
        if self.position(uuid.as_str()).is_none() {
            pg_debug!("select_task: unknown task {}", uuid);
            return false;
        }
        self.selected = Some(uuid.clone());
        true
    }

    /// Overwrites the status of the task whose uuid equals `uuid`.
    pub(crate) fn apply_status(&mut self, uuid: &str, status: &str) -> bool {
        match self.position(uuid) {
            Some(index) => {
                self.tasks[index].status = status.to_string();
                true
            }
            None => false,
        }
    }

    /// Command payload view of all tasks, in insertion order.
    pub fn snapshot(&self) -> Vec<TaskData> {
        self.tasks
            .iter()
            .map(|task| TaskData {
                uuid: task.uuid.clone(),
                title: task.title.clone(),
                data: task.payload.clone(),
            })
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, uuid: &TaskUuid) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.uuid == uuid)
    }

    pub fn selected(&self) -> Option<&TaskUuid> {
        self.selected.as_ref()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn position(&self, uuid: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.uuid.as_str() == uuid)
    }
}
