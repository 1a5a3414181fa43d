use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Checklist sections, in the order a transaction moves through them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Search,
    Offer,
    Contract,
    #[default]
    Diligence,
    PreClosing,
    Closing,
    PostClosing,
}

impl Category {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Search,
            Self::Offer,
            Self::Contract,
            Self::Diligence,
            Self::PreClosing,
            Self::Closing,
            Self::PostClosing,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Offer => "Offer",
            Self::Contract => "Contract",
            Self::Diligence => "Due Diligence",
            Self::PreClosing => "Pre-Closing",
            Self::Closing => "Closing",
            Self::PostClosing => "Post-Closing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Financing,
    Legal,
    Inspection,
    Title,
    Insurance,
    Walkthrough,
    Moving,
}

impl Subcategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Financing => "Financing",
            Self::Legal => "Legal",
            Self::Inspection => "Inspection",
            Self::Title => "Title",
            Self::Insurance => "Insurance",
            Self::Walkthrough => "Walkthrough",
            Self::Moving => "Moving",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const fn from_required(required: bool) -> Self {
        if required {
            Self::High
        } else {
            Self::Medium
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Stored lifecycle of a task. `Overdue` is never stored; see [`DisplayStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Upcoming,
    #[serde(alias = "active")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Upcoming,
    InProgress,
    Completed,
    Overdue,
}

impl DisplayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Runtime form of a checklist task.
///
/// Ids are stable across recomputation: baseline tasks use their template key
/// and catalogue tasks a namespaced declaration id. Saved edits are matched
/// back onto a freshly generated list by this id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Subcategory>,
    #[serde(default)]
    pub required: bool,
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date_locked: bool,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub user_created: bool,
}

impl TaskInstance {
    pub fn display_status(&self, today: NaiveDate) -> DisplayStatus {
        match self.status {
            TaskStatus::Completed => DisplayStatus::Completed,
            _ if self.due_date.is_some_and(|due| due < today) => DisplayStatus::Overdue,
            TaskStatus::InProgress => DisplayStatus::InProgress,
            TaskStatus::Upcoming => DisplayStatus::Upcoming,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.display_status(today) == DisplayStatus::Overdue
    }

    /// A date picked by the user. Locked dates survive anchor changes.
    pub fn lock_due_date(&mut self, due_date: NaiveDate) {
        self.due_date = Some(due_date);
        self.due_date_locked = true;
    }

    /// Hands the date back to the scheduler.
    pub fn clear_due_date(&mut self) {
        self.due_date = None;
        self.due_date_locked = false;
    }

    pub fn set_status(&mut self, status: TaskStatus, completed_on: Option<NaiveDate>) {
        self.status = status;
        self.completed_date = match status {
            TaskStatus::Completed => completed_on,
            _ => None,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    TaskNotFound(String),
    DuplicateTask(String),
    ReservedTaskId(String),
}

impl fmt::Display for ChecklistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistError::TaskNotFound(id) => write!(f, "task with id {} not found", id),
            ChecklistError::DuplicateTask(id) => write!(f, "task with id {} already exists", id),
            ChecklistError::ReservedTaskId(id) => {
                write!(f, "task id {} is reserved for generated tasks", id)
            }
        }
    }
}

impl std::error::Error for ChecklistError {}
