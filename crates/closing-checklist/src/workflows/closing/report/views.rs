use super::super::domain::{Category, DisplayStatus, Priority};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryProgressEntry {
    pub category: Category,
    pub category_label: &'static str,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshotView {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub category_label: &'static str,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub status: DisplayStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistReportSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_pct: f32,
    pub category_progress: Vec<CategoryProgressEntry>,
    pub overdue_tasks: Vec<TaskSnapshotView>,
    pub upcoming_tasks: Vec<TaskSnapshotView>,
}
