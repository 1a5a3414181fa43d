use chrono::{Duration, NaiveDate};
use closing_checklist::workflows::closing::sequence;
use closing_checklist::workflows::closing::{
    ChecklistInputs, ChecklistPlanner, ChecklistSession, InMemoryChecklistStore, ScheduleAnchors,
    TaskInstance,
};
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn planner() -> ChecklistPlanner {
    ChecklistPlanner::standard().expect("standard planner")
}

fn anchors(accepted: NaiveDate, closing: NaiveDate) -> ScheduleAnchors {
    ScheduleAnchors {
        offer_accepted_date: Some(accepted),
        closing_date: Some(closing),
    }
}

#[test]
fn day_before_closing_tasks_land_on_the_nineteenth() {
    let planner = planner();
    let inputs = ChecklistInputs::new(vec!["conv_mortgage".to_string()], date(2025, 2, 1))
        .with_anchors(anchors(date(2025, 2, 1), date(2025, 3, 20)));
    let checklist = planner.compute(&inputs);

    let walkthrough = checklist.task("final-walkthrough").expect("walkthrough");
    assert_eq!(walkthrough.due_date, Some(date(2025, 3, 19)));

    let settlement = checklist
        .task("scenario-settlement_statement_review")
        .expect("settlement review");
    assert_eq!(settlement.due_date, Some(date(2025, 3, 19)));

    let loan = checklist
        .task("scenario-loan_application")
        .expect("loan application");
    assert_eq!(loan.due_date, Some(date(2025, 2, 4)));
}

#[test]
fn locked_dates_survive_anchor_changes() {
    let planner = planner();
    let today = date(2025, 2, 1);
    let mut session =
        ChecklistSession::load(&planner, InMemoryChecklistStore::default(), today).expect("load");

    session
        .select_scenarios(vec!["fha".to_string()])
        .expect("select");
    session
        .update_anchors(anchors(today, date(2025, 3, 20)))
        .expect("anchors");
    session
        .set_due_date("home-inspection", date(2025, 2, 9))
        .expect("lock");

    let before: HashMap<String, Option<NaiveDate>> = session
        .checklist()
        .tasks()
        .iter()
        .map(|task| (task.id.clone(), task.due_date))
        .collect();

    session
        .update_anchors(anchors(today, date(2025, 3, 27)))
        .expect("move closing");

    let inspection = session.checklist().task("home-inspection").expect("inspection");
    assert_eq!(inspection.due_date, Some(date(2025, 2, 9)));
    assert!(inspection.due_date_locked);

    let walkthrough = session.checklist().task("final-walkthrough").expect("walkthrough");
    let previous = before["final-walkthrough"].expect("scheduled before");
    assert_eq!(walkthrough.due_date, Some(previous + Duration::days(7)));

    session
        .clear_due_date("home-inspection")
        .expect("unlock");
    let inspection = session.checklist().task("home-inspection").expect("inspection");
    assert!(!inspection.due_date_locked);
    assert_ne!(inspection.due_date, Some(date(2025, 2, 9)));
    assert!(inspection.due_date.is_some());
}

#[test]
fn computed_order_puts_prerequisites_first() {
    let planner = planner();
    let inputs = ChecklistInputs::new(
        [
            "fha_203k",
            "multi_family",
            "short_sale",
            "lien_on_title",
            "well_septic",
            "exchange_1031",
            "foreign_seller",
            "extended_close",
        ]
        .iter()
        .map(|key| key.to_string())
        .collect(),
        date(2025, 2, 1),
    )
    .with_anchors(anchors(date(2025, 2, 1), date(2025, 3, 20)));
    let checklist = planner.compute(&inputs);

    let positions: HashMap<&str, usize> = checklist
        .tasks()
        .iter()
        .enumerate()
        .map(|(index, task)| (task.id.as_str(), index))
        .collect();

    for (index, task) in checklist.tasks().iter().enumerate() {
        for dependency in &task.dependencies {
            if let Some(&prerequisite) = positions.get(dependency.as_str()) {
                assert!(
                    prerequisite < index,
                    "{} should come after {}",
                    task.id,
                    dependency
                );
            }
        }
    }
}

#[test]
fn two_task_cycle_keeps_both_tasks() {
    let task = |id: &str, dependency: &str| TaskInstance {
        id: id.to_string(),
        title: id.to_string(),
        dependencies: vec![dependency.to_string()],
        ..TaskInstance::default()
    };

    let ordered = sequence::order(vec![task("a", "b"), task("b", "a")]);
    let ids: Vec<&str> = ordered.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}
