use super::domain::TaskInstance;
use super::schedule::ScheduleAnchors;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Everything a user has chosen or edited, as stored between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistState {
    #[serde(default)]
    pub selected_scenarios: Vec<String>,
    #[serde(default)]
    pub anchors: ScheduleAnchors,
    #[serde(default)]
    pub tasks: Vec<TaskInstance>,
}

/// Overlays saved user edits onto a freshly generated list.
///
/// Tasks are matched by id. Only user-owned fields are copied; structure
/// (title, category, dependencies, priority) always comes from the fresh
/// list. Saved tasks marked `user_created` that the fresh list does not know
/// about are appended verbatim, in saved order. A `user_created` task whose
/// id collides with a generated one is kept verbatim in its place.
pub fn overlay_saved(fresh: Vec<TaskInstance>, saved: &[TaskInstance]) -> Vec<TaskInstance> {
    let saved_by_id: HashMap<&str, &TaskInstance> = saved
        .iter()
        .map(|task| (task.id.as_str(), task))
        .collect();

    let mut merged: Vec<TaskInstance> = fresh
        .into_iter()
        .map(|mut task| {
            if let Some(edits) = saved_by_id.get(task.id.as_str()) {
                if edits.user_created {
                    warn!(task = %task.id, "user task shadows a generated task with the same id");
                    return (*edits).clone();
                }
                task.status = edits.status;
                task.due_date = edits.due_date;
                task.due_date_locked = edits.due_date_locked;
                task.completed_date = edits.completed_date;
                task.assigned_to = edits.assigned_to.clone();
                task.notes = edits.notes.clone();
                task.contacts = edits.contacts.clone();
                task.documents = edits.documents.clone();
                task.custom_fields = edits.custom_fields.clone();
            }
            task
        })
        .collect();

    let known: HashSet<String> = merged.iter().map(|task| task.id.clone()).collect();
    merged.extend(
        saved
            .iter()
            .filter(|task| task.user_created && !known.contains(&task.id))
            .cloned(),
    );

    merged
}

/// Storage port for checklist state. The core never calls it; sessions do,
/// once per recompute.
pub trait ChecklistStore: Send + Sync {
    fn load(&self) -> Result<Option<ChecklistState>, StoreError>;
    fn save(&self, state: &ChecklistState) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access checklist state at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checklist state is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("checklist store unavailable: {0}")]
    Unavailable(String),
}

/// Keeps state as a pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ChecklistStore for JsonFileStore {
    fn load(&self) -> Result<Option<ChecklistState>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, state: &ChecklistState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let body = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, body).map_err(|err| self.io_error(err))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryChecklistStore {
    state: Arc<Mutex<Option<ChecklistState>>>,
}

impl InMemoryChecklistStore {
    pub fn with_state(state: ChecklistState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(state))),
        }
    }

    pub fn snapshot(&self) -> Option<ChecklistState> {
        self.state.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ChecklistStore for InMemoryChecklistStore {
    fn load(&self) -> Result<Option<ChecklistState>, StoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("state mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, state: &ChecklistState) -> Result<(), StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("state mutex poisoned".to_string()))?;
        *guard = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::closing::domain::{Contact, TaskStatus};
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn task(id: &str, title: &str) -> TaskInstance {
        TaskInstance {
            id: id.to_string(),
            title: title.to_string(),
            ..TaskInstance::default()
        }
    }

    #[test]
    fn overlay_keeps_user_fields_and_fresh_structure() {
        let fresh = vec![task("home-inspection", "Schedule Home Inspection")];

        let mut saved = task("home-inspection", "Old Title");
        saved.set_status(TaskStatus::Completed, Some(date(2025, 2, 3)));
        saved.lock_due_date(date(2025, 2, 2));
        saved.assigned_to = Some("buyer".to_string());
        saved.notes = Some("Inspector: Dana".to_string());
        saved.contacts = vec![Contact {
            name: "Dana".to_string(),
            role: Some("Inspector".to_string()),
            ..Contact::default()
        }];
        saved.documents = vec!["report.pdf".to_string()];
        saved
            .custom_fields
            .insert("fee".to_string(), json!(450));

        let merged = overlay_saved(fresh, &[saved]);

        assert_eq!(merged.len(), 1);
        let task = &merged[0];
        assert_eq!(task.title, "Schedule Home Inspection");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_date, Some(date(2025, 2, 3)));
        assert_eq!(task.due_date, Some(date(2025, 2, 2)));
        assert!(task.due_date_locked);
        assert_eq!(task.assigned_to.as_deref(), Some("buyer"));
        assert_eq!(task.contacts.len(), 1);
        assert_eq!(task.documents, vec!["report.pdf".to_string()]);
        assert_eq!(task.custom_fields.get("fee"), Some(&json!(450)));
    }

    #[test]
    fn user_created_tasks_survive_and_stale_generated_tasks_drop() {
        let fresh = vec![task("a", "A")];
        let mut custom = task("custom-1", "Call the HOA");
        custom.user_created = true;
        let stale = task("scenario-rate_lock", "Lock Interest Rate");

        let merged = overlay_saved(fresh, &[stale, custom.clone()]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], custom);
    }

    #[test]
    fn user_created_task_is_never_absorbed_by_a_generated_one() {
        let fresh = vec![task("scenario-appraisal", "Order Lender Appraisal")];
        let mut mine = task("scenario-appraisal", "My own appraisal reminder");
        mine.user_created = true;

        let merged = overlay_saved(fresh, &[mine.clone()]);
        assert_eq!(merged, vec![mine.clone()]);

        let merged = overlay_saved(Vec::new(), &[mine.clone()]);
        assert_eq!(merged, vec![mine]);
    }

    #[test]
    fn in_memory_store_round_trips_state() {
        let store = InMemoryChecklistStore::default();
        assert!(store.load().expect("load").is_none());

        let state = ChecklistState {
            selected_scenarios: vec!["fha".to_string()],
            ..ChecklistState::default()
        };
        store.save(&state).expect("save");
        assert_eq!(store.snapshot(), Some(state));
    }
}
