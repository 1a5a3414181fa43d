use chrono::{Local, NaiveDate};
use closing_checklist::config::CatalogueConfig;
use closing_checklist::error::AppError;
use closing_checklist::workflows::closing::{
    validate, BaselineGenerator, ChecklistPlanner, ScenarioCatalogue,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) planner: Arc<ChecklistPlanner>,
}

/// Loads the configured catalogue (or the built-in one), logs its integrity
/// issues and, in strict mode, refuses a catalogue that has any.
pub(crate) fn load_planner(config: &CatalogueConfig) -> Result<ChecklistPlanner, AppError> {
    let catalogue = load_catalogue(config.path.as_deref())?;
    let baseline = BaselineGenerator::standard();

    let report = validate(&catalogue, &baseline.generate());
    report.log();
    if config.strict {
        report.into_strict()?;
    }

    info!(
        scenarios = catalogue.scenario_keys().len(),
        baseline_tasks = baseline.templates().len(),
        "scenario catalogue loaded"
    );
    Ok(ChecklistPlanner::new(catalogue, baseline))
}

pub(crate) fn load_catalogue(path: Option<&Path>) -> Result<ScenarioCatalogue, AppError> {
    let catalogue = match path {
        Some(path) => ScenarioCatalogue::from_path(path)?,
        None => ScenarioCatalogue::standard()?,
    };
    Ok(catalogue)
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
