use super::compiler::declaration_id;
use super::domain::TaskInstance;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Today,
    Acceptance,
    Closing,
}

impl Anchor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Acceptance => "Offer Accepted",
            Self::Closing => "Closing",
        }
    }
}

/// Reference dates the transaction is scheduled against. Missing dates fall
/// back to today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAnchors {
    #[serde(default)]
    pub offer_accepted_date: Option<NaiveDate>,
    #[serde(default)]
    pub closing_date: Option<NaiveDate>,
}

impl ScheduleAnchors {
    pub fn date_for(&self, anchor: Anchor) -> Option<NaiveDate> {
        match anchor {
            Anchor::Today => None,
            Anchor::Acceptance => self.offer_accepted_date,
            Anchor::Closing => self.closing_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub anchor: Anchor,
    pub offset_days: i64,
}

impl ScheduleRule {
    pub const fn new(anchor: Anchor, offset_days: i64) -> Self {
        Self {
            anchor,
            offset_days,
        }
    }

    pub const fn from_today(offset_days: i64) -> Self {
        Self::new(Anchor::Today, offset_days)
    }

    pub const fn after_acceptance(offset_days: i64) -> Self {
        Self::new(Anchor::Acceptance, offset_days)
    }

    pub const fn from_closing(offset_days: i64) -> Self {
        Self::new(Anchor::Closing, offset_days)
    }
}

pub type ScheduleRules = HashMap<String, ScheduleRule>;

/// Offsets for catalogue tasks, keyed by declaration id.
const DEFAULT_OFFSETS: &[(&str, ScheduleRule)] = &[
    ("proof_of_funds_verification", ScheduleRule::from_today(1)),
    ("earnest_money_deposit", ScheduleRule::after_acceptance(2)),
    ("fha_amendatory_clause", ScheduleRule::after_acceptance(1)),
    ("va_amendatory_clause", ScheduleRule::after_acceptance(1)),
    ("short_sale_addendum", ScheduleRule::after_acceptance(1)),
    ("bank_addendum", ScheduleRule::after_acceptance(1)),
    ("lead_paint_disclosure", ScheduleRule::after_acceptance(1)),
    ("loan_application", ScheduleRule::after_acceptance(3)),
    ("va_certificate_of_eligibility", ScheduleRule::after_acceptance(3)),
    ("usda_property_eligibility", ScheduleRule::after_acceptance(2)),
    ("usda_income_eligibility", ScheduleRule::after_acceptance(3)),
    ("rate_lock", ScheduleRule::after_acceptance(5)),
    ("hoa_document_review", ScheduleRule::after_acceptance(5)),
    ("title_search", ScheduleRule::after_acceptance(7)),
    ("zoning_verification", ScheduleRule::after_acceptance(7)),
    ("well_water_test", ScheduleRule::after_acceptance(7)),
    ("septic_inspection", ScheduleRule::after_acceptance(7)),
    ("va_pest_inspection", ScheduleRule::after_acceptance(7)),
    ("appraisal", ScheduleRule::after_acceptance(14)),
    ("fha_minimum_property_standards", ScheduleRule::after_acceptance(14)),
    ("boundary_survey", ScheduleRule::after_acceptance(21)),
    ("exchange_identification_deadline", ScheduleRule::from_today(45)),
    ("home_sale_contingency", ScheduleRule::after_acceptance(30)),
    ("loan_conditions", ScheduleRule::from_closing(-10)),
    ("homeowners_insurance_binder", ScheduleRule::from_closing(-10)),
    ("lien_payoff_letters", ScheduleRule::from_closing(-7)),
    ("firpta_withholding", ScheduleRule::from_closing(-5)),
    ("clear_to_close", ScheduleRule::from_closing(-3)),
    ("review_closing_disclosure", ScheduleRule::from_closing(-3)),
    ("rent_back_agreement", ScheduleRule::from_closing(-3)),
    ("wire_fraud_verification", ScheduleRule::from_closing(-2)),
    ("settlement_statement_review", ScheduleRule::from_closing(-1)),
    ("builder_warranty_registration", ScheduleRule::from_closing(14)),
];

/// Fallback rule for a task id when no explicit rule exists. Namespaced
/// catalogue ids are looked up by their declaration id.
pub fn default_rule(task_id: &str) -> Option<ScheduleRule> {
    let key = declaration_id(task_id);
    DEFAULT_OFFSETS
        .iter()
        .find(|(id, _)| *id == key)
        .map(|(_, rule)| *rule)
}

/// Anchor date (or today when the anchor is unset) shifted by the rule's
/// signed offset. An offset that overflows the calendar leaves the base date.
pub fn compute_due_date(
    rule: &ScheduleRule,
    anchors: &ScheduleAnchors,
    today: NaiveDate,
) -> NaiveDate {
    let base = anchors.date_for(rule.anchor).unwrap_or(today);
    Duration::try_days(rule.offset_days)
        .and_then(|offset| base.checked_add_signed(offset))
        .unwrap_or(base)
}

/// Refreshes due dates from the anchors. Locked tasks are never touched;
/// tasks with neither an explicit nor a default rule keep their date.
/// Returns how many tasks were rescheduled.
pub fn recompute_due_dates(
    tasks: &mut [TaskInstance],
    rules: &ScheduleRules,
    anchors: &ScheduleAnchors,
    today: NaiveDate,
) -> usize {
    let mut updated = 0;

    for task in tasks.iter_mut() {
        if task.due_date_locked {
            continue;
        }

        let Some(rule) = rules.get(&task.id).copied().or_else(|| default_rule(&task.id)) else {
            continue;
        };

        let due = compute_due_date(&rule, anchors, today);
        if task.due_date != Some(due) {
            task.due_date = Some(due);
            updated += 1;
        }
    }

    debug!(updated, "due dates recomputed");
    updated
}
