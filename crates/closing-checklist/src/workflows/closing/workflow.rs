use super::baseline::BaselineGenerator;
use super::catalogue::{validate, CatalogueError, CatalogueReport, ScenarioCatalogue};
use super::compiler::{instance_id, SCENARIO_ID_PREFIX};
use super::domain::{ChecklistError, TaskInstance, TaskStatus};
use super::merge::ScenarioMergeEngine;
use super::persistence::{overlay_saved, ChecklistState, ChecklistStore, StoreError};
use super::report::ChecklistReport;
use super::schedule::{recompute_due_dates, ScheduleAnchors, ScheduleRules};
use super::sequence;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// Everything a single recompute depends on.
#[derive(Debug, Clone)]
pub struct ChecklistInputs {
    pub selected_scenarios: Vec<String>,
    pub anchors: ScheduleAnchors,
    pub saved_tasks: Vec<TaskInstance>,
    pub today: NaiveDate,
}

impl ChecklistInputs {
    pub fn new(selected_scenarios: Vec<String>, today: NaiveDate) -> Self {
        Self {
            selected_scenarios,
            anchors: ScheduleAnchors::default(),
            saved_tasks: Vec::new(),
            today,
        }
    }

    pub fn with_anchors(mut self, anchors: ScheduleAnchors) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn with_saved_tasks(mut self, saved_tasks: Vec<TaskInstance>) -> Self {
        self.saved_tasks = saved_tasks;
        self
    }
}

/// Catalogue plus baseline, fixed for the life of the process.
#[derive(Debug)]
pub struct ChecklistPlanner {
    catalogue: ScenarioCatalogue,
    baseline: BaselineGenerator,
    rules: ScheduleRules,
}

impl ChecklistPlanner {
    pub fn new(catalogue: ScenarioCatalogue, baseline: BaselineGenerator) -> Self {
        let rules = baseline.schedule_rules();
        Self {
            catalogue,
            baseline,
            rules,
        }
    }

    pub fn standard() -> Result<Self, CatalogueError> {
        Ok(Self::new(
            ScenarioCatalogue::standard()?,
            BaselineGenerator::standard(),
        ))
    }

    pub fn catalogue(&self) -> &ScenarioCatalogue {
        &self.catalogue
    }

    pub fn baseline(&self) -> &BaselineGenerator {
        &self.baseline
    }

    /// True for ids the generator can emit: baseline keys and anything in
    /// the `scenario-` namespace.
    pub fn is_generated_id(&self, id: &str) -> bool {
        id.starts_with(SCENARIO_ID_PREFIX)
            || self.baseline.templates().iter().any(|template| template.key == id)
            || self
                .catalogue
                .declarations()
                .any(|decl| instance_id(&decl.id) == id)
    }

    pub fn validate(&self) -> CatalogueReport {
        validate(&self.catalogue, &self.baseline.generate())
    }

    /// merge, overlay saved edits, schedule, sequence. Saved edits go on
    /// before scheduling so unlocked saved dates still follow the anchors.
    pub fn compute(&self, inputs: &ChecklistInputs) -> Checklist {
        let engine = ScenarioMergeEngine::new(&self.catalogue);
        let merged = engine.merge(&self.baseline.generate(), &inputs.selected_scenarios);
        let mut tasks = overlay_saved(merged, &inputs.saved_tasks);

        let rescheduled =
            recompute_due_dates(&mut tasks, &self.rules, &inputs.anchors, inputs.today);
        let tasks = sequence::order(tasks);

        debug!(
            scenarios = inputs.selected_scenarios.len(),
            tasks = tasks.len(),
            rescheduled,
            "checklist computed"
        );

        Checklist { tasks }
    }
}

/// A computed, display-ordered task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Checklist {
    tasks: Vec<TaskInstance>,
}

impl Checklist {
    pub fn tasks(&self) -> &[TaskInstance] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<TaskInstance> {
        self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&TaskInstance> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn report(&self, today: NaiveDate) -> ChecklistReport {
        ChecklistReport::build(&self.tasks, today)
    }
}

#[derive(Debug)]
pub enum SessionError {
    Checklist(ChecklistError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Checklist(err) => write!(f, "{}", err),
            SessionError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Checklist(err) => Some(err),
            SessionError::Store(err) => Some(err),
        }
    }
}

impl From<ChecklistError> for SessionError {
    fn from(value: ChecklistError) -> Self {
        SessionError::Checklist(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        SessionError::Store(value)
    }
}

/// One user's checklist backed by a store. Every mutation recomputes the
/// whole list and saves it once.
pub struct ChecklistSession<'p, S: ChecklistStore> {
    planner: &'p ChecklistPlanner,
    store: S,
    state: ChecklistState,
    checklist: Checklist,
    today: NaiveDate,
}

impl<'p, S: ChecklistStore> ChecklistSession<'p, S> {
    /// Restores saved state (or starts empty) and computes without saving.
    pub fn load(planner: &'p ChecklistPlanner, store: S, today: NaiveDate) -> Result<Self, SessionError> {
        let state = store.load()?.unwrap_or_default();
        let mut session = Self {
            planner,
            store,
            state,
            checklist: Checklist::default(),
            today,
        };
        session.refresh();
        info!(
            scenarios = session.state.selected_scenarios.len(),
            tasks = session.checklist.len(),
            "checklist session loaded"
        );
        Ok(session)
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn state(&self) -> &ChecklistState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) -> Result<(), SessionError> {
        self.today = today;
        self.commit()
    }

    pub fn select_scenarios(&mut self, keys: Vec<String>) -> Result<(), SessionError> {
        self.state.selected_scenarios = keys;
        self.commit()
    }

    pub fn update_anchors(&mut self, anchors: ScheduleAnchors) -> Result<(), SessionError> {
        self.state.anchors = anchors;
        self.commit()
    }

    /// `Completed` records `completed_on`, or today when none is given.
    pub fn set_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        completed_on: Option<NaiveDate>,
    ) -> Result<(), SessionError> {
        let today = self.today;
        let task = self.task_mut(task_id)?;
        task.set_status(status, completed_on.or(Some(today)));
        self.commit()
    }

    pub fn set_due_date(&mut self, task_id: &str, due_date: NaiveDate) -> Result<(), SessionError> {
        self.task_mut(task_id)?.lock_due_date(due_date);
        self.commit()
    }

    pub fn clear_due_date(&mut self, task_id: &str) -> Result<(), SessionError> {
        self.task_mut(task_id)?.clear_due_date();
        self.commit()
    }

    pub fn set_notes(&mut self, task_id: &str, notes: Option<String>) -> Result<(), SessionError> {
        self.task_mut(task_id)?.notes = notes;
        self.commit()
    }

    /// Adds a user task and returns its id. An empty id gets the next free
    /// `custom-N`; a given due date is locked so scheduling leaves it alone.
    /// Ids the generator owns are refused.
    pub fn add_custom_task(&mut self, mut task: TaskInstance) -> Result<String, SessionError> {
        if task.id.is_empty() {
            task.id = self.next_custom_id();
        } else if self.planner.is_generated_id(&task.id) {
            return Err(ChecklistError::ReservedTaskId(task.id).into());
        } else if self.state.tasks.iter().any(|existing| existing.id == task.id) {
            return Err(ChecklistError::DuplicateTask(task.id).into());
        }

        task.user_created = true;
        if let Some(due) = task.due_date {
            task.lock_due_date(due);
        }

        let id = task.id.clone();
        self.state.tasks.push(task);
        self.commit()?;
        Ok(id)
    }

    /// Only user-created tasks can be removed; generated ones come back on
    /// the next recompute.
    pub fn remove_custom_task(&mut self, task_id: &str) -> Result<(), SessionError> {
        let position = self
            .state
            .tasks
            .iter()
            .position(|task| task.id == task_id && task.user_created)
            .ok_or_else(|| ChecklistError::TaskNotFound(task_id.to_owned()))?;
        self.state.tasks.remove(position);
        self.commit()
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut TaskInstance, ChecklistError> {
        self.state
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| ChecklistError::TaskNotFound(task_id.to_owned()))
    }

    fn next_custom_id(&self) -> String {
        let mut n = self.state.tasks.len() + 1;
        loop {
            let candidate = format!("{CUSTOM_ID_PREFIX}{n}");
            if !self.state.tasks.iter().any(|task| task.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn refresh(&mut self) {
        let inputs = ChecklistInputs {
            selected_scenarios: self.state.selected_scenarios.clone(),
            anchors: self.state.anchors,
            saved_tasks: std::mem::take(&mut self.state.tasks),
            today: self.today,
        };
        self.checklist = self.planner.compute(&inputs);
        self.state.tasks = self.checklist.tasks().to_vec();
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        self.refresh();
        self.store.save(&self.state)?;
        Ok(())
    }
}
