mod validation;

pub use validation::{validate, CatalogueIssue, CatalogueReport};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const STANDARD_CATALOGUE: &str = include_str!("standard.json");

/// Families of buyer/property/seller circumstances a scenario key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioGroupId {
    Financing,
    PropertyType,
    SellerCircumstance,
    LegalTitle,
    ConditionEnvironment,
    ContractStructures,
    Regulatory,
    Timing,
}

impl ScenarioGroupId {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Financing,
            Self::PropertyType,
            Self::SellerCircumstance,
            Self::LegalTitle,
            Self::ConditionEnvironment,
            Self::ContractStructures,
            Self::Regulatory,
            Self::Timing,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Financing => "Financing",
            Self::PropertyType => "Property Type",
            Self::SellerCircumstance => "Seller Circumstance",
            Self::LegalTitle => "Legal & Title",
            Self::ConditionEnvironment => "Condition & Environment",
            Self::ContractStructures => "Contract Structures",
            Self::Regulatory => "Regulatory",
            Self::Timing => "Timing",
        }
    }
}

/// Abstract phase a catalogue task belongs to. The compiler maps it onto a
/// concrete category/subcategory pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Search,
    Offer,
    Contract,
    Diligence,
    Financing,
    Inspection,
    Title,
    Insurance,
    Legal,
    PreClosing,
    Closing,
    PostClosing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub id: Phase,
    pub label: String,
}

/// Predicate over the selected scenario keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleIf {
    #[serde(default)]
    pub any_scenarios: Vec<String>,
}

impl VisibleIf {
    /// An empty `any_scenarios` list never matches.
    pub fn matches(&self, selected: &[String]) -> bool {
        self.any_scenarios
            .iter()
            .any(|key| selected.iter().any(|chosen| chosen == key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDeclaration {
    pub id: String,
    pub title: String,
    pub phase: Phase,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibleIf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl TaskDeclaration {
    pub fn is_visible(&self, selected: &[String]) -> bool {
        self.visible_if
            .as_ref()
            .map_or(true, |predicate| predicate.matches(selected))
    }
}

/// Field patch applied to an existing task. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibleIf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioModule {
    pub key: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub adds: Vec<TaskDeclaration>,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioGroup {
    pub id: ScenarioGroupId,
    #[serde(default)]
    pub modules: Vec<ScenarioModule>,
}

/// Hard rule applied after every add and override has landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    #[serde(rename = "if")]
    pub if_selected: String,
    #[serde(default)]
    pub then_remove: Vec<String>,
    #[serde(default)]
    pub then_set: Vec<OverrideRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRules {
    #[serde(default)]
    pub group_order: Vec<ScenarioGroupId>,
    #[serde(default)]
    pub conflicts: Vec<ConflictRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCatalogue {
    #[serde(default)]
    pub phases: Vec<PhaseDefinition>,
    #[serde(default)]
    pub base_tasks: Vec<TaskDeclaration>,
    #[serde(default)]
    pub groups: Vec<ScenarioGroup>,
    #[serde(default)]
    pub scenario_keys: Vec<String>,
    #[serde(default)]
    pub merge_rules: MergeRules,
}

impl ScenarioCatalogue {
    /// The catalogue shipped with the crate.
    pub fn standard() -> Result<Self, CatalogueError> {
        Self::from_json_str(STANDARD_CATALOGUE)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogueError> {
        serde_json::from_str(raw).map_err(CatalogueError::Parse)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Group evaluation order; falls back to the canonical order when the
    /// document leaves it out.
    pub fn group_order(&self) -> Vec<ScenarioGroupId> {
        if self.merge_rules.group_order.is_empty() {
            ScenarioGroupId::ordered().to_vec()
        } else {
            self.merge_rules.group_order.clone()
        }
    }

    pub fn modules_in(&self, group: ScenarioGroupId) -> &[ScenarioModule] {
        self.groups
            .iter()
            .find(|candidate| candidate.id == group)
            .map(|found| found.modules.as_slice())
            .unwrap_or(&[])
    }

    pub fn module(&self, group: ScenarioGroupId, key: &str) -> Option<&ScenarioModule> {
        self.modules_in(group)
            .iter()
            .find(|module| module.key == key)
    }

    pub fn group_of(&self, key: &str) -> Option<ScenarioGroupId> {
        self.groups
            .iter()
            .find(|group| group.modules.iter().any(|module| module.key == key))
            .map(|group| group.id)
    }

    pub fn scenario_keys(&self) -> &[String] {
        &self.scenario_keys
    }

    /// Every declaration in the document: base tasks first, then module adds
    /// in group and module order.
    pub fn declarations(&self) -> impl Iterator<Item = &TaskDeclaration> {
        self.base_tasks.iter().chain(
            self.groups
                .iter()
                .flat_map(|group| group.modules.iter())
                .flat_map(|module| module.adds.iter()),
        )
    }

    pub fn phase_label(&self, phase: Phase) -> Option<&str> {
        self.phases
            .iter()
            .find(|definition| definition.id == phase)
            .map(|definition| definition.label.as_str())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let parsed = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(match parsed {
        Some(OneOrMany::One(key)) => vec![key],
        Some(OneOrMany::Many(keys)) => keys,
        None => Vec::new(),
    })
}

#[derive(Debug)]
pub enum CatalogueError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Integrity(Vec<CatalogueIssue>),
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueError::Io { path, source } => {
                write!(f, "failed to read catalogue {}: {}", path.display(), source)
            }
            CatalogueError::Parse(err) => write!(f, "invalid catalogue document: {}", err),
            CatalogueError::Integrity(issues) => {
                write!(f, "catalogue failed strict validation with {} issue(s)", issues.len())?;
                for issue in issues {
                    write!(f, "; {}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CatalogueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogueError::Io { source, .. } => Some(source),
            CatalogueError::Parse(err) => Some(err),
            CatalogueError::Integrity(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalogue_parses_every_group() {
        let catalogue = ScenarioCatalogue::standard().expect("standard catalogue parses");

        for group in ScenarioGroupId::ordered() {
            assert!(
                !catalogue.modules_in(group).is_empty(),
                "{} should declare at least one module",
                group.label()
            );
        }
        assert_eq!(catalogue.group_order(), ScenarioGroupId::ordered().to_vec());
        assert_eq!(catalogue.group_of("fha"), Some(ScenarioGroupId::Financing));
        assert_eq!(catalogue.group_of("condo"), Some(ScenarioGroupId::PropertyType));
    }

    #[test]
    fn inherits_accepts_single_key_or_list() {
        let raw = r#"{
            "groups": [{
                "id": "financing",
                "modules": [
                    { "key": "a" },
                    { "key": "b", "inherits": "a" },
                    { "key": "c", "inherits": ["a", "b"] }
                ]
            }]
        }"#;
        let catalogue = ScenarioCatalogue::from_json_str(raw).expect("catalogue parses");
        let modules = catalogue.modules_in(ScenarioGroupId::Financing);

        assert!(modules[0].inherits.is_empty());
        assert_eq!(modules[1].inherits, vec!["a".to_string()]);
        assert_eq!(modules[2].inherits, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn empty_visibility_list_never_matches() {
        let predicate = VisibleIf::default();
        assert!(!predicate.matches(&["fha".to_string()]));

        let predicate = VisibleIf {
            any_scenarios: vec!["fha".to_string(), "va".to_string()],
        };
        assert!(predicate.matches(&["va".to_string()]));
        assert!(!predicate.matches(&[]));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = ScenarioCatalogue::from_json_str("{ \"groups\": 4 }").expect_err("rejects");
        assert!(matches!(err, CatalogueError::Parse(_)));
    }
}
