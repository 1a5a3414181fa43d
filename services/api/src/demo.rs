use crate::infra::{load_catalogue, load_planner, today};
use chrono::{Duration, NaiveDate};
use clap::{Args, ValueEnum};
use closing_checklist::config::{AppConfig, CatalogueConfig};
use closing_checklist::error::AppError;
use closing_checklist::workflows::closing::export::write_csv;
use closing_checklist::workflows::closing::{
    validate, BaselineGenerator, Category, Checklist, ChecklistInputs, ChecklistPlanner,
    ChecklistSession, DisplayStatus, InMemoryChecklistStore, JsonFileStore, ScheduleAnchors,
    TaskInstance, TaskStatus,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Scenario key; repeat the flag or separate keys with commas
    #[arg(long = "scenario", value_delimiter = ',')]
    pub(crate) scenarios: Vec<String>,
    /// Offer acceptance date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) accepted: Option<NaiveDate>,
    /// Closing date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) closing: Option<NaiveDate>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// JSON state file; saved edits are applied and the result written back
    #[arg(long)]
    pub(crate) state: Option<PathBuf>,
    /// Catalogue document to use instead of the built-in one
    #[arg(long)]
    pub(crate) catalogue: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogueValidateArgs {
    /// Catalogue document (defaults to the configured or built-in catalogue)
    #[arg(long)]
    pub(crate) path: Option<PathBuf>,
    /// Exit with an error when any issue is found
    #[arg(long)]
    pub(crate) strict: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scenario keys for the sample purchase (defaults to fha, condo, pre_1978)
    #[arg(long = "scenario", value_delimiter = ',')]
    pub(crate) scenarios: Vec<String>,
    /// Override the demo's starting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print every task, not just the summary
    #[arg(long)]
    pub(crate) list_tasks: bool,
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let GenerateArgs {
        scenarios,
        accepted,
        closing,
        today: requested_today,
        format,
        state,
        catalogue,
    } = args;

    let config = AppConfig::load()?;
    let planner = load_planner(&CatalogueConfig {
        path: catalogue.or(config.catalogue.path),
        strict: config.catalogue.strict,
    })?;
    let today = requested_today.unwrap_or_else(today);

    let (selected, checklist) = match state.or(config.storage.state_path) {
        Some(path) => {
            let mut session = ChecklistSession::load(&planner, JsonFileStore::new(path), today)?;
            if !scenarios.is_empty() {
                session.select_scenarios(scenarios)?;
            }
            if accepted.is_some() || closing.is_some() {
                let current = session.state().anchors;
                session.update_anchors(ScheduleAnchors {
                    offer_accepted_date: accepted.or(current.offer_accepted_date),
                    closing_date: closing.or(current.closing_date),
                })?;
            }
            (
                session.state().selected_scenarios.clone(),
                session.checklist().clone(),
            )
        }
        None => {
            let inputs = ChecklistInputs::new(scenarios.clone(), today).with_anchors(
                ScheduleAnchors {
                    offer_accepted_date: accepted,
                    closing_date: closing,
                },
            );
            (scenarios, planner.compute(&inputs))
        }
    };

    match format {
        OutputFormat::Text => {
            render_checklist(&selected, &checklist, today, true);
        }
        OutputFormat::Json => {
            let body = json!({
                "today": today,
                "scenarios": selected,
                "report": checklist.report(today).summary(),
                "tasks": checklist.tasks(),
            });
            let rendered =
                serde_json::to_string_pretty(&body).map_err(|err| AppError::Io(err.into()))?;
            println!("{rendered}");
        }
        OutputFormat::Csv => {
            write_csv(checklist.tasks(), std::io::stdout().lock())?;
        }
    }

    Ok(())
}

pub(crate) fn run_list_scenarios() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalogue = load_catalogue(config.catalogue.path.as_deref())?;

    for group in catalogue.group_order() {
        let modules = catalogue.modules_in(group);
        if modules.is_empty() {
            continue;
        }
        println!("{}", group.label());
        for module in modules {
            match &module.notes {
                Some(notes) => println!("  - {}: {}", module.key, notes),
                None => println!("  - {}", module.key),
            }
        }
    }

    Ok(())
}

pub(crate) fn run_catalogue_validate(args: CatalogueValidateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.path.or(config.catalogue.path);
    let catalogue = load_catalogue(path.as_deref())?;
    let report = validate(&catalogue, &BaselineGenerator::standard().generate());

    let source = path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in catalogue".to_string());

    if report.is_clean() {
        println!(
            "{}: no issues ({} scenarios, {} task declarations)",
            source,
            catalogue.scenario_keys().len(),
            catalogue.declarations().count()
        );
        return Ok(());
    }

    println!("{}: {} issue(s)", source, report.issues.len());
    for issue in &report.issues {
        println!("- {}", issue);
    }

    if args.strict {
        report.into_strict()?;
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        scenarios,
        today: requested_today,
        list_tasks,
    } = args;

    let scenarios = if scenarios.is_empty() {
        vec!["fha".to_string(), "condo".to_string(), "pre_1978".to_string()]
    } else {
        scenarios
    };
    let today = requested_today.unwrap_or_else(today);
    let accepted = today;
    let closing = today + Duration::days(30);

    let planner = ChecklistPlanner::standard()?;
    let mut session = ChecklistSession::load(&planner, InMemoryChecklistStore::default(), today)?;

    println!("Closing checklist demo");
    session.select_scenarios(scenarios.clone())?;
    session.update_anchors(ScheduleAnchors {
        offer_accepted_date: Some(accepted),
        closing_date: Some(closing),
    })?;
    println!(
        "Offer accepted {} | closing {} | {} tasks for {}",
        accepted,
        closing,
        session.checklist().len(),
        scenarios.join(", ")
    );

    if session.checklist().task("scenario-earnest_money_deposit").is_some() {
        session.set_status("scenario-earnest_money_deposit", TaskStatus::Completed, Some(today))?;
        println!("- Earnest money deposited");
    }

    let inspection_day = today + Duration::days(6);
    session.set_due_date("home-inspection", inspection_day)?;
    println!("- Home inspection booked for {} (locked)", inspection_day);

    let movers = session.add_custom_task(TaskInstance {
        title: "Reserve freight elevator for move-in".to_string(),
        category: Category::PostClosing,
        due_date: Some(closing + Duration::days(1)),
        ..TaskInstance::default()
    })?;
    println!("- Added custom task {}", movers);

    let walkthrough_before = due_of(session.checklist(), "final-walkthrough");
    let delayed = closing + Duration::days(7);
    session.update_anchors(ScheduleAnchors {
        offer_accepted_date: Some(accepted),
        closing_date: Some(delayed),
    })?;
    println!(
        "\nClosing pushed to {}: final walkthrough {} -> {}, home inspection stays {}",
        delayed,
        format_due(walkthrough_before),
        format_due(due_of(session.checklist(), "final-walkthrough")),
        format_due(due_of(session.checklist(), "home-inspection")),
    );

    println!();
    render_checklist(&scenarios, session.checklist(), today, list_tasks);
    Ok(())
}

fn due_of(checklist: &Checklist, task_id: &str) -> Option<NaiveDate> {
    checklist.task(task_id).and_then(|task| task.due_date)
}

fn format_due(date: Option<NaiveDate>) -> String {
    date.map(|date| date.to_string())
        .unwrap_or_else(|| "unscheduled".to_string())
}

pub(crate) fn render_checklist(
    scenarios: &[String],
    checklist: &Checklist,
    today: NaiveDate,
    list_tasks: bool,
) {
    let summary = checklist.report(today).summary();

    println!("Closing checklist (evaluated {})", today);
    if scenarios.is_empty() {
        println!("Scenarios: none selected");
    } else {
        println!("Scenarios: {}", scenarios.join(", "));
    }
    println!(
        "Progress: {}/{} tasks ({:.0}%)",
        summary.completed_tasks, summary.total_tasks, summary.completion_pct
    );

    println!("\nBy category");
    for progress in &summary.category_progress {
        println!(
            "- {}: {}/{} completed",
            progress.category_label, progress.completed, progress.total
        );
    }

    if summary.overdue_tasks.is_empty() {
        println!("\nOverdue tasks: none");
    } else {
        println!("\nOverdue tasks");
        for task in &summary.overdue_tasks {
            println!("- {} ({}), due {}", task.title, task.category_label, task.due_date);
        }
    }

    if !summary.upcoming_tasks.is_empty() {
        println!("\nComing up");
        for task in &summary.upcoming_tasks {
            println!(
                "- {} ({}), due {}, {}",
                task.title, task.category_label, task.due_date, task.status_label
            );
        }
    }

    if !list_tasks {
        return;
    }

    for category in Category::ordered() {
        let tasks: Vec<&TaskInstance> = checklist
            .tasks()
            .iter()
            .filter(|task| task.category == category)
            .collect();
        if tasks.is_empty() {
            continue;
        }

        println!("\n{}", category.label());
        for task in tasks {
            let marker = match task.display_status(today) {
                DisplayStatus::Completed => "[x]",
                DisplayStatus::Overdue => "[!]",
                DisplayStatus::InProgress => "[~]",
                DisplayStatus::Upcoming => "[ ]",
            };
            let lock = if task.due_date_locked { ", locked" } else { "" };
            println!(
                "{} {} (due {}{}, {})",
                marker,
                task.title,
                format_due(task.due_date),
                lock,
                task.priority.label()
            );
        }
    }
}
