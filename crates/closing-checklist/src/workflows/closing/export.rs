use super::domain::TaskInstance;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Category")]
    category: &'static str,
    #[serde(rename = "Subcategory")]
    subcategory: &'static str,
    #[serde(rename = "Priority")]
    priority: &'static str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Due Date")]
    due_date: String,
    #[serde(rename = "Locked")]
    locked: bool,
    #[serde(rename = "Depends On")]
    dependencies: String,
}

impl<'a> ExportRow<'a> {
    fn from_task(task: &'a TaskInstance) -> Self {
        Self {
            id: &task.id,
            title: &task.title,
            category: task.category.label(),
            subcategory: task.subcategory.map(|sub| sub.label()).unwrap_or_default(),
            priority: task.priority.label(),
            status: task.status.label(),
            due_date: task
                .due_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            locked: task.due_date_locked,
            dependencies: task.dependencies.join(";"),
        }
    }
}

/// One CSV row per task, with a header, in the order given.
pub fn write_csv<W: Write>(tasks: &[TaskInstance], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for task in tasks {
        csv_writer.serialize(ExportRow::from_task(task))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::closing::domain::{Category, Subcategory};
    use chrono::NaiveDate;

    #[test]
    fn rows_carry_labels_dates_and_dependencies() {
        let mut task = TaskInstance {
            id: "scenario-rate_lock".to_string(),
            title: "Lock Interest Rate".to_string(),
            category: Category::Diligence,
            subcategory: Some(Subcategory::Financing),
            dependencies: vec!["scenario-loan_application".to_string(), "open-escrow".to_string()],
            ..TaskInstance::default()
        };
        task.lock_due_date(NaiveDate::from_ymd_opt(2025, 2, 6).expect("valid date"));

        let mut buffer = Vec::new();
        write_csv(&[task], &mut buffer).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("ID,Title,Category,Subcategory,Priority,Status,Due Date,Locked,Depends On")
        );
        assert_eq!(
            lines.next(),
            Some("scenario-rate_lock,Lock Interest Rate,Due Diligence,Financing,Medium,Upcoming,2025-02-06,true,scenario-loan_application;open-escrow")
        );
        assert_eq!(lines.next(), None);
    }
}
