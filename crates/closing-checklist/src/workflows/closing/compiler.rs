use super::catalogue::{Phase, TaskDeclaration};
use super::domain::{Category, Priority, Subcategory, TaskInstance};

/// Namespace for instances compiled from catalogue declarations. Baseline ids
/// are kebab-case, so the prefix keeps the two id spaces apart.
pub const SCENARIO_ID_PREFIX: &str = "scenario-";

pub const SCENARIO_TAG: &str = "scenario";

const PHASE_PLACEMENT: &[(Phase, Category, Option<Subcategory>)] = &[
    (Phase::Search, Category::Search, None),
    (Phase::Offer, Category::Offer, None),
    (Phase::Contract, Category::Contract, Some(Subcategory::Legal)),
    (Phase::Legal, Category::Contract, Some(Subcategory::Legal)),
    (Phase::Financing, Category::Diligence, Some(Subcategory::Financing)),
    (Phase::Inspection, Category::Diligence, Some(Subcategory::Inspection)),
    (Phase::Title, Category::Diligence, Some(Subcategory::Title)),
    (Phase::Insurance, Category::PreClosing, Some(Subcategory::Insurance)),
    (Phase::PreClosing, Category::PreClosing, None),
    (Phase::Closing, Category::Closing, None),
    (Phase::PostClosing, Category::PostClosing, None),
];

/// Where a phase lands in the checklist. Phases without a table entry go to
/// due diligence with no subcategory.
pub fn placement(phase: Phase) -> (Category, Option<Subcategory>) {
    PHASE_PLACEMENT
        .iter()
        .find(|(candidate, _, _)| *candidate == phase)
        .map(|(_, category, subcategory)| (*category, *subcategory))
        .unwrap_or((Category::Diligence, None))
}

pub fn instance_id(declaration_id: &str) -> String {
    format!("{SCENARIO_ID_PREFIX}{declaration_id}")
}

/// Inverse of [`instance_id`]; baseline ids come back unchanged.
pub fn declaration_id(instance_id: &str) -> &str {
    instance_id
        .strip_prefix(SCENARIO_ID_PREFIX)
        .unwrap_or(instance_id)
}

pub fn compile(decl: &TaskDeclaration) -> TaskInstance {
    let (category, subcategory) = placement(decl.phase);

    TaskInstance {
        id: instance_id(&decl.id),
        title: decl.title.clone(),
        description: decl.guidance.clone().unwrap_or_default(),
        category,
        subcategory,
        required: decl.required,
        priority: Priority::from_required(decl.required),
        dependencies: decl.depends_on.iter().map(|dep| instance_id(dep)).collect(),
        tags: vec![SCENARIO_TAG.to_string()],
        ..TaskInstance::default()
    }
}
