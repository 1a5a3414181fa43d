use super::super::domain::{Category, DisplayStatus, Priority, TaskInstance, TaskStatus};
use super::views::{CategoryProgressEntry, ChecklistReportSummary, TaskSnapshotView};
use chrono::NaiveDate;
use std::collections::HashMap;

/// How many upcoming tasks a report lists.
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct CategoryProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct ChecklistReport {
    pub category_progress: HashMap<Category, CategoryProgress>,
    pub overdue_tasks: Vec<TaskSnapshot>,
    pub upcoming_tasks: Vec<TaskSnapshot>,
}

impl ChecklistReport {
    pub fn build(tasks: &[TaskInstance], today: NaiveDate) -> Self {
        let mut report = ChecklistReport::default();

        for task in tasks {
            let progress = report.category_progress.entry(task.category).or_default();
            progress.total += 1;
            if task.status == TaskStatus::Completed {
                progress.completed += 1;
            }

            let Some(due_date) = task.due_date else {
                continue;
            };
            match task.display_status(today) {
                DisplayStatus::Overdue => report
                    .overdue_tasks
                    .push(TaskSnapshot::capture(task, due_date, today)),
                DisplayStatus::Upcoming | DisplayStatus::InProgress => report
                    .upcoming_tasks
                    .push(TaskSnapshot::capture(task, due_date, today)),
                DisplayStatus::Completed => {}
            }
        }

        report.overdue_tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        report.upcoming_tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        report.upcoming_tasks.truncate(UPCOMING_LIMIT);

        report
    }

    pub fn total(&self) -> usize {
        self.category_progress.values().map(|p| p.total).sum()
    }

    pub fn completed(&self) -> usize {
        self.category_progress.values().map(|p| p.completed).sum()
    }

    pub fn summary(&self) -> ChecklistReportSummary {
        let category_progress = Category::ordered()
            .into_iter()
            .filter_map(|category| {
                self.category_progress
                    .get(&category)
                    .map(|progress| CategoryProgressEntry {
                        category,
                        category_label: category.label(),
                        completed: progress.completed,
                        total: progress.total,
                    })
            })
            .collect();

        let total_tasks = self.total();
        let completed_tasks = self.completed();
        let completion_pct = if total_tasks == 0 {
            0.0
        } else {
            (completed_tasks as f32 / total_tasks as f32) * 100.0
        };

        ChecklistReportSummary {
            total_tasks,
            completed_tasks,
            completion_pct,
            category_progress,
            overdue_tasks: self.overdue_tasks.iter().map(TaskSnapshot::to_view).collect(),
            upcoming_tasks: self.upcoming_tasks.iter().map(TaskSnapshot::to_view).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub status: DisplayStatus,
    pub assigned_to: Option<String>,
}

impl TaskSnapshot {
    fn capture(task: &TaskInstance, due_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            category: task.category,
            priority: task.priority,
            due_date,
            status: task.display_status(today),
            assigned_to: task.assigned_to.clone(),
        }
    }

    pub fn to_view(&self) -> TaskSnapshotView {
        TaskSnapshotView {
            id: self.id.clone(),
            title: self.title.clone(),
            category: self.category,
            category_label: self.category.label(),
            priority: self.priority,
            due_date: self.due_date,
            status: self.status,
            status_label: self.status.label(),
            assigned_to: self.assigned_to.clone(),
        }
    }
}
