use crate::infra::{deserialize_optional_date, today, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use closing_checklist::error::AppError;
use closing_checklist::workflows::closing::report::views::ChecklistReportSummary;
use closing_checklist::workflows::closing::{
    ChecklistInputs, ScenarioGroupId, ScheduleAnchors, TaskInstance,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct ChecklistRequest {
    #[serde(default)]
    pub(crate) scenarios: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) offer_accepted_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) closing_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) saved_tasks: Vec<TaskInstance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChecklistResponse {
    pub(crate) today: NaiveDate,
    pub(crate) scenarios: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) unknown_scenarios: Vec<String>,
    pub(crate) report: ChecklistReportSummary,
    pub(crate) tasks: Vec<TaskInstance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScenarioGroupView {
    pub(crate) id: ScenarioGroupId,
    pub(crate) label: &'static str,
    pub(crate) scenarios: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScenarioListing {
    pub(crate) groups: Vec<ScenarioGroupView>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/scenarios", get(scenarios_endpoint))
        .route("/api/v1/checklist", post(checklist_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (status, Json(json!({ "status": label })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scenarios_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<ScenarioListing> {
    let catalogue = state.planner.catalogue();
    let groups = catalogue
        .group_order()
        .into_iter()
        .map(|group| ScenarioGroupView {
            id: group,
            label: group.label(),
            scenarios: catalogue
                .modules_in(group)
                .iter()
                .map(|module| module.key.clone())
                .collect(),
        })
        .filter(|view| !view.scenarios.is_empty())
        .collect();

    Json(ScenarioListing { groups })
}

pub(crate) async fn checklist_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ChecklistRequest>,
) -> Result<Json<ChecklistResponse>, AppError> {
    let ChecklistRequest {
        scenarios,
        offer_accepted_date,
        closing_date,
        today: requested_today,
        saved_tasks,
    } = payload;

    if let (Some(accepted), Some(closing)) = (offer_accepted_date, closing_date) {
        if closing < accepted {
            return Err(AppError::InvalidInput(format!(
                "closing date {closing} is before offer acceptance {accepted}"
            )));
        }
    }

    let today = requested_today.unwrap_or_else(today);
    let catalogue = state.planner.catalogue();
    let unknown_scenarios = scenarios
        .iter()
        .filter(|key| catalogue.group_of(key).is_none())
        .cloned()
        .collect();

    let inputs = ChecklistInputs::new(scenarios.clone(), today)
        .with_anchors(ScheduleAnchors {
            offer_accepted_date,
            closing_date,
        })
        .with_saved_tasks(saved_tasks);
    let checklist = state.planner.compute(&inputs);
    let report = checklist.report(today).summary();

    Ok(Json(ChecklistResponse {
        today,
        scenarios,
        unknown_scenarios,
        report,
        tasks: checklist.into_tasks(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_support;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn request(scenarios: &[&str]) -> ChecklistRequest {
        ChecklistRequest {
            scenarios: scenarios.iter().map(|key| key.to_string()).collect(),
            offer_accepted_date: Some(date(2025, 2, 1)),
            closing_date: Some(date(2025, 3, 20)),
            today: Some(date(2025, 2, 10)),
            saved_tasks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn checklist_endpoint_merges_and_schedules() {
        let state = test_support::state(true);
        let Json(body) = checklist_endpoint(Extension(state), Json(request(&["fha", "condo"])))
            .await
            .expect("checklist builds");

        let appraisal = body
            .tasks
            .iter()
            .find(|task| task.id == "scenario-appraisal")
            .expect("appraisal present");
        assert!(appraisal.required);

        let walkthrough = body
            .tasks
            .iter()
            .find(|task| task.id == "final-walkthrough")
            .expect("walkthrough present");
        assert_eq!(walkthrough.due_date, Some(date(2025, 3, 19)));

        assert!(body.unknown_scenarios.is_empty());
        assert_eq!(body.report.total_tasks, body.tasks.len());
    }

    #[tokio::test]
    async fn checklist_endpoint_reports_unknown_scenarios() {
        let state = test_support::state(true);
        let Json(body) = checklist_endpoint(Extension(state), Json(request(&["cash", "yacht"])))
            .await
            .expect("checklist builds");

        assert_eq!(body.unknown_scenarios, vec!["yacht".to_string()]);
        assert!(body.tasks.iter().all(|task| task.id != "scenario-loan_application"));
    }

    #[tokio::test]
    async fn checklist_endpoint_rejects_inverted_anchors() {
        let state = test_support::state(true);
        let mut payload = request(&[]);
        payload.closing_date = Some(date(2025, 1, 1));

        let response = checklist_endpoint(Extension(state), Json(payload))
            .await
            .expect_err("inverted anchors rejected")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = router(test_support::state(false))
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn scenarios_route_lists_groups_in_merge_order() {
        let response = router(test_support::state(true))
            .oneshot(
                Request::get("/api/v1/scenarios")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let listing: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        let groups = listing["groups"].as_array().expect("groups array");
        assert_eq!(groups[0]["id"], "financing");
        assert!(groups[0]["scenarios"]
            .as_array()
            .expect("scenario keys")
            .iter()
            .any(|key| key == "fha"));
    }

    #[tokio::test]
    async fn checklist_route_parses_dates() {
        let body = json!({
            "scenarios": ["cash"],
            "offer_accepted_date": "2025-02-01",
            "closing_date": "2025-03-20",
            "today": "2025-02-10"
        });
        let response = router(test_support::state(true))
            .oneshot(
                Request::post("/api/v1/checklist")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["today"], "2025-02-10");
        assert!(payload["tasks"].as_array().is_some_and(|tasks| !tasks.is_empty()));
    }
}
