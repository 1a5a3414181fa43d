//! Scenario-driven closing checklist: a catalogue of scenario modules merged
//! onto a baseline task list, scheduled from transaction anchors and ordered
//! by dependency.

pub mod baseline;
pub mod catalogue;
pub mod compiler;
pub mod domain;
pub mod export;
pub mod merge;
pub mod persistence;
pub mod report;
pub mod resolver;
pub mod schedule;
pub mod sequence;
mod workflow;

pub use baseline::{BaselineGenerator, BaselineTaskTemplate};
pub use catalogue::{
    validate, CatalogueError, CatalogueIssue, CatalogueReport, ScenarioCatalogue, ScenarioGroupId,
};
pub use domain::{
    Category, ChecklistError, Contact, DisplayStatus, Priority, Subcategory, TaskInstance,
    TaskStatus,
};
pub use merge::ScenarioMergeEngine;
pub use persistence::{
    overlay_saved, ChecklistState, ChecklistStore, InMemoryChecklistStore, JsonFileStore,
    StoreError,
};
pub use report::ChecklistReport;
pub use schedule::{Anchor, ScheduleAnchors, ScheduleRule, ScheduleRules};
pub use workflow::{
    Checklist, ChecklistInputs, ChecklistPlanner, ChecklistSession, SessionError,
    CUSTOM_ID_PREFIX,
};
