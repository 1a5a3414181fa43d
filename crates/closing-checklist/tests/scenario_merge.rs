use closing_checklist::workflows::closing::{
    BaselineGenerator, Priority, ScenarioCatalogue, ScenarioMergeEngine, TaskInstance,
};

fn catalogue() -> ScenarioCatalogue {
    ScenarioCatalogue::standard().expect("standard catalogue parses")
}

fn keys(selected: &[&str]) -> Vec<String> {
    selected.iter().map(|key| key.to_string()).collect()
}

fn merge(catalogue: &ScenarioCatalogue, selected: &[&str]) -> Vec<TaskInstance> {
    let baseline = BaselineGenerator::standard().generate();
    ScenarioMergeEngine::new(catalogue).merge(&baseline, &keys(selected))
}

fn position(tasks: &[TaskInstance], id: &str) -> Option<usize> {
    tasks.iter().position(|task| task.id == id)
}

fn find<'a>(tasks: &'a [TaskInstance], id: &str) -> &'a TaskInstance {
    tasks
        .iter()
        .find(|task| task.id == id)
        .unwrap_or_else(|| panic!("{id} present"))
}

#[test]
fn fha_purchase_requires_the_appraisal_and_adds_fha_paperwork() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["fha"]);

    let appraisal = find(&tasks, "scenario-appraisal");
    assert!(appraisal.required);
    assert_eq!(appraisal.priority, Priority::High);
    assert_eq!(
        appraisal.dependencies,
        vec!["scenario-loan_application".to_string()]
    );
    assert!(appraisal.tags.iter().any(|tag| tag == "scenario"));

    assert!(position(&tasks, "scenario-fha_amendatory_clause").is_some());
    assert!(position(&tasks, "scenario-fha_minimum_property_standards").is_some());
    assert!(position(&tasks, "scenario-loan_application").is_some());
    assert!(position(&tasks, "scenario-review_closing_disclosure").is_some());
}

#[test]
fn no_selection_keeps_the_inspection_and_hides_the_appraisal() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &[]);

    assert!(position(&tasks, "scenario-appraisal").is_none());
    assert!(position(&tasks, "home-inspection").is_some());
    assert!(position(&tasks, "scenario-loan_application").is_none());
}

#[test]
fn merging_twice_changes_nothing() {
    let catalogue = catalogue();
    let selected = keys(&["fha", "condo", "lien_on_title", "extended_close", "as_is"]);
    let engine = ScenarioMergeEngine::new(&catalogue);
    let baseline = BaselineGenerator::standard().generate();

    let once = engine.merge(&baseline, &selected);
    assert_eq!(once, engine.merge(&baseline, &selected));
    assert_eq!(once, engine.merge(&once, &selected));
}

#[test]
fn selection_order_does_not_matter() {
    let catalogue = catalogue();
    let forward = merge(&catalogue, &["cash", "condo", "pre_1978", "rent_back", "quick_close"]);
    let shuffled = merge(&catalogue, &["quick_close", "pre_1978", "cash", "rent_back", "condo"]);
    assert_eq!(forward, shuffled);
}

#[test]
fn fha_and_cash_merge_the_same_in_either_order() {
    let catalogue = catalogue();
    let forward = merge(&catalogue, &["fha", "cash"]);
    let reversed = merge(&catalogue, &["cash", "fha"]);
    assert_eq!(forward, reversed);

    assert!(position(&forward, "scenario-loan_application").is_none());
    assert!(position(&forward, "scenario-rate_lock").is_none());
    assert!(position(&forward, "scenario-fha_amendatory_clause").is_some());
    assert!(!find(&forward, "scenario-appraisal").required);
}

#[test]
fn inherited_tasks_land_before_the_childs_own() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["fha_203k"]);

    let loan = position(&tasks, "scenario-loan_application").expect("conventional tasks inherited");
    let fha = position(&tasks, "scenario-fha_amendatory_clause").expect("fha tasks inherited");
    let renovation =
        position(&tasks, "scenario-renovation_contractor_bids").expect("own tasks added");
    assert!(loan < fha && fha < renovation);

    let loan_count = tasks
        .iter()
        .filter(|task| task.id == "scenario-loan_application")
        .count();
    assert_eq!(loan_count, 1, "diamond inheritance contributes once");
}

#[test]
fn cash_conflict_rules_beat_financing_modules() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["cash", "conv_mortgage", "extended_close"]);

    for removed in [
        "scenario-loan_application",
        "scenario-rate_lock",
        "scenario-loan_conditions",
        "scenario-clear_to_close",
        "scenario-extended_lock_fee",
    ] {
        assert!(position(&tasks, removed).is_none(), "{removed} should be gone");
    }

    let appraisal = find(&tasks, "scenario-appraisal");
    assert!(!appraisal.required);
    assert!(position(&tasks, "scenario-proof_of_funds_verification").is_some());
}

#[test]
fn land_purchase_drops_structure_inspections() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["land"]);

    assert!(position(&tasks, "home-inspection").is_none());
    assert!(position(&tasks, "radon-test").is_none());
    assert!(position(&tasks, "scenario-perc_test").is_some());
}

#[test]
fn as_is_softens_the_baseline_inspection() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["as_is"]);

    let inspection = find(&tasks, "home-inspection");
    assert_eq!(inspection.title, "Informational Home Inspection (As-Is)");
    assert!(!inspection.required);
}

#[test]
fn condo_and_townhouse_share_one_hoa_review() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["condo", "townhouse"]);

    let hoa = tasks
        .iter()
        .filter(|task| task.id == "scenario-hoa_document_review")
        .count();
    assert_eq!(hoa, 1);
}

#[test]
fn unknown_scenarios_are_ignored() {
    let catalogue = catalogue();
    assert_eq!(
        merge(&catalogue, &["fha", "houseboat"]),
        merge(&catalogue, &["fha"])
    );
}

#[test]
fn cash_only_purchase_hides_lender_tasks() {
    let catalogue = catalogue();
    let tasks = merge(&catalogue, &["cash"]);

    assert!(position(&tasks, "scenario-appraisal").is_none());
    assert!(position(&tasks, "scenario-review_closing_disclosure").is_none());
    assert!(position(&tasks, "scenario-seller_concession_tracking").is_none());
}
