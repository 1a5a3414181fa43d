use super::{CatalogueError, ScenarioCatalogue, ScenarioGroup, ScenarioGroupId, ScenarioModule};
use crate::workflows::closing::compiler::{compile, instance_id};
use crate::workflows::closing::domain::TaskInstance;
use crate::workflows::closing::merge::find_target;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// Authoring mistake found by [`validate`]. None of these stop a merge; the
/// affected contribution simply resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueIssue {
    UnknownParent {
        group: ScenarioGroupId,
        module: String,
        parent: String,
    },
    InheritanceCycle {
        group: ScenarioGroupId,
        path: Vec<String>,
    },
    DuplicateModuleKey {
        group: ScenarioGroupId,
        key: String,
    },
    ConflictingDeclaration {
        id: String,
    },
    DanglingDependency {
        task_id: String,
        dependency: String,
    },
    DanglingOverride {
        source: String,
        task_id: String,
    },
    DanglingRemoval {
        scenario: String,
        task_id: String,
    },
    UnknownConflictScenario {
        key: String,
    },
    UnlistedModule {
        group: ScenarioGroupId,
        key: String,
    },
    UnknownScenarioKey {
        key: String,
    },
}

impl fmt::Display for CatalogueIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueIssue::UnknownParent {
                group,
                module,
                parent,
            } => write!(
                f,
                "{} module '{}' inherits unknown module '{}'",
                group.label(),
                module,
                parent
            ),
            CatalogueIssue::InheritanceCycle { group, path } => write!(
                f,
                "{} inheritance cycle: {} -> {}",
                group.label(),
                path.join(" -> "),
                path.first().map(String::as_str).unwrap_or_default()
            ),
            CatalogueIssue::DuplicateModuleKey { group, key } => {
                write!(f, "{} declares module '{}' more than once", group.label(), key)
            }
            CatalogueIssue::ConflictingDeclaration { id } => {
                write!(f, "task '{}' is declared with different contents", id)
            }
            CatalogueIssue::DanglingDependency {
                task_id,
                dependency,
            } => write!(f, "task '{}' depends on undeclared task '{}'", task_id, dependency),
            CatalogueIssue::DanglingOverride { source, task_id } => write!(
                f,
                "override in '{}' targets '{}', which matches no task",
                source, task_id
            ),
            CatalogueIssue::DanglingRemoval { scenario, task_id } => write!(
                f,
                "conflict rule for '{}' removes '{}', which matches no task",
                scenario, task_id
            ),
            CatalogueIssue::UnknownConflictScenario { key } => {
                write!(f, "conflict rule keyed on unknown scenario '{}'", key)
            }
            CatalogueIssue::UnlistedModule { group, key } => write!(
                f,
                "{} module '{}' is missing from the scenario key list",
                group.label(),
                key
            ),
            CatalogueIssue::UnknownScenarioKey { key } => {
                write!(f, "scenario key '{}' has no module", key)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueReport {
    pub issues: Vec<CatalogueIssue>,
}

impl CatalogueReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn log(&self) {
        for issue in &self.issues {
            warn!(%issue, "catalogue integrity issue");
        }
    }

    /// Opt-in strict mode for authoring tools.
    pub fn into_strict(self) -> Result<(), CatalogueError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(CatalogueError::Integrity(self.issues))
        }
    }
}

/// Integrity pass over a catalogue, run once at load time. `baseline` is the
/// task list the catalogue is merged with, so overrides and removals aimed at
/// baseline tasks count as resolved.
pub fn validate(catalogue: &ScenarioCatalogue, baseline: &[TaskInstance]) -> CatalogueReport {
    let mut issues = Vec::new();

    for group in &catalogue.groups {
        check_group_structure(group, &mut issues);
    }

    check_declarations(catalogue, &mut issues);
    check_targets(catalogue, baseline, &mut issues);
    check_scenario_keys(catalogue, &mut issues);

    CatalogueReport { issues }
}

fn check_group_structure(group: &ScenarioGroup, issues: &mut Vec<CatalogueIssue>) {
    let mut modules: HashMap<&str, &ScenarioModule> = HashMap::new();
    for module in &group.modules {
        if modules.insert(module.key.as_str(), module).is_some() {
            issues.push(CatalogueIssue::DuplicateModuleKey {
                group: group.id,
                key: module.key.clone(),
            });
        }
    }

    for module in &group.modules {
        for parent in &module.inherits {
            if !modules.contains_key(parent.as_str()) {
                issues.push(CatalogueIssue::UnknownParent {
                    group: group.id,
                    module: module.key.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut walk = CycleWalk {
        modules: &modules,
        stack: Vec::new(),
        finished: HashSet::new(),
        seen: HashSet::new(),
        cycles: Vec::new(),
    };
    for module in &group.modules {
        walk.visit(module.key.as_str());
    }
    issues.extend(walk.cycles.into_iter().map(|path| CatalogueIssue::InheritanceCycle {
        group: group.id,
        path,
    }));
}

struct CycleWalk<'a, 'm> {
    modules: &'m HashMap<&'a str, &'a ScenarioModule>,
    stack: Vec<&'a str>,
    finished: HashSet<&'a str>,
    seen: HashSet<Vec<String>>,
    cycles: Vec<Vec<String>>,
}

impl<'a, 'm> CycleWalk<'a, 'm> {
    fn visit(&mut self, key: &'a str) {
        if let Some(start) = self.stack.iter().position(|entry| *entry == key) {
            let path: Vec<String> = self.stack[start..].iter().map(|k| k.to_string()).collect();
            let mut members = path.clone();
            members.sort();
            if self.seen.insert(members) {
                self.cycles.push(path);
            }
            return;
        }
        if self.finished.contains(key) {
            return;
        }
        let Some(module) = self.modules.get(key).copied() else {
            return;
        };

        self.stack.push(key);
        for parent in &module.inherits {
            self.visit(parent.as_str());
        }
        self.stack.pop();
        self.finished.insert(key);
    }
}

fn check_declarations(catalogue: &ScenarioCatalogue, issues: &mut Vec<CatalogueIssue>) {
    let mut declared = HashMap::new();
    let mut reported = HashSet::new();

    for decl in catalogue.declarations() {
        match declared.get(decl.id.as_str()) {
            Some(existing) if *existing != decl && reported.insert(decl.id.clone()) => {
                issues.push(CatalogueIssue::ConflictingDeclaration {
                    id: decl.id.clone(),
                });
            }
            Some(_) => {}
            None => {
                declared.insert(decl.id.as_str(), decl);
            }
        }
    }

    for decl in catalogue.declarations() {
        for dependency in &decl.depends_on {
            if !declared.contains_key(dependency.as_str()) {
                issues.push(CatalogueIssue::DanglingDependency {
                    task_id: decl.id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
}

fn check_targets(
    catalogue: &ScenarioCatalogue,
    baseline: &[TaskInstance],
    issues: &mut Vec<CatalogueIssue>,
) {
    let mut candidates = baseline.to_vec();
    candidates.extend(catalogue.declarations().map(compile));

    for group in &catalogue.groups {
        for module in &group.modules {
            for rule in &module.overrides {
                if find_target(&candidates, &rule.task_id).is_none() {
                    issues.push(CatalogueIssue::DanglingOverride {
                        source: module.key.clone(),
                        task_id: rule.task_id.clone(),
                    });
                }
            }
        }
    }

    for conflict in &catalogue.merge_rules.conflicts {
        for target in &conflict.then_remove {
            let namespaced = instance_id(target);
            let known = candidates
                .iter()
                .any(|task| task.id == *target || task.id == namespaced);
            if !known {
                issues.push(CatalogueIssue::DanglingRemoval {
                    scenario: conflict.if_selected.clone(),
                    task_id: target.clone(),
                });
            }
        }
        for rule in &conflict.then_set {
            if find_target(&candidates, &rule.task_id).is_none() {
                issues.push(CatalogueIssue::DanglingOverride {
                    source: conflict.if_selected.clone(),
                    task_id: rule.task_id.clone(),
                });
            }
        }
    }
}

fn check_scenario_keys(catalogue: &ScenarioCatalogue, issues: &mut Vec<CatalogueIssue>) {
    let listed: HashSet<&str> = catalogue.scenario_keys.iter().map(String::as_str).collect();

    for group in &catalogue.groups {
        for module in &group.modules {
            if !listed.contains(module.key.as_str()) {
                issues.push(CatalogueIssue::UnlistedModule {
                    group: group.id,
                    key: module.key.clone(),
                });
            }
        }
    }

    for key in &catalogue.scenario_keys {
        if catalogue.group_of(key).is_none() {
            issues.push(CatalogueIssue::UnknownScenarioKey { key: key.clone() });
        }
    }

    for conflict in &catalogue.merge_rules.conflicts {
        if catalogue.group_of(&conflict.if_selected).is_none() {
            issues.push(CatalogueIssue::UnknownConflictScenario {
                key: conflict.if_selected.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::closing::baseline::BaselineGenerator;

    #[test]
    fn standard_catalogue_is_clean_against_the_baseline() {
        let catalogue = ScenarioCatalogue::standard().expect("standard catalogue parses");
        let baseline = BaselineGenerator::standard().generate();

        let report = validate(&catalogue, &baseline);
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
        assert!(report.into_strict().is_ok());
    }

    #[test]
    fn broken_catalogue_reports_every_issue_kind() {
        let raw = r#"{
            "base_tasks": [
                { "id": "dup", "title": "Dup", "phase": "offer" },
                { "id": "dup", "title": "Dup but different", "phase": "offer" },
                { "id": "needs", "title": "Needs", "phase": "offer", "depends_on": ["ghost"] }
            ],
            "groups": [{
                "id": "financing",
                "modules": [
                    { "key": "x", "inherits": "y" },
                    { "key": "y", "inherits": "x" },
                    { "key": "z", "inherits": "missing",
                      "overrides": [{ "task_id": "nowhere_to_be_found" }] },
                    { "key": "z" }
                ]
            }],
            "scenario_keys": ["x", "y", "phantom"],
            "merge_rules": {
                "conflicts": [{ "if": "nobody", "then_remove": ["nothing"] }]
            }
        }"#;
        let catalogue = ScenarioCatalogue::from_json_str(raw).expect("fixture parses");
        let report = validate(&catalogue, &[]);

        let has = |predicate: &dyn Fn(&CatalogueIssue) -> bool| report.issues.iter().any(predicate);
        assert!(has(&|issue| matches!(issue, CatalogueIssue::DuplicateModuleKey { key, .. } if key == "z")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::UnknownParent { parent, .. } if parent == "missing")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::InheritanceCycle { path, .. } if path.len() == 2)));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::ConflictingDeclaration { id } if id == "dup")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::DanglingDependency { dependency, .. } if dependency == "ghost")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::DanglingOverride { task_id, .. } if task_id == "nowhere_to_be_found")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::DanglingRemoval { task_id, .. } if task_id == "nothing")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::UnknownConflictScenario { key } if key == "nobody")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::UnlistedModule { key, .. } if key == "z")));
        assert!(has(&|issue| matches!(issue, CatalogueIssue::UnknownScenarioKey { key } if key == "phantom")));

        let cycles = report
            .issues
            .iter()
            .filter(|issue| matches!(issue, CatalogueIssue::InheritanceCycle { .. }))
            .count();
        assert_eq!(cycles, 1);

        let err = report.into_strict().expect_err("strict mode rejects");
        assert!(err.to_string().contains("strict validation"));
    }
}
