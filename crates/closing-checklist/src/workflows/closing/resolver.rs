use super::catalogue::{OverrideRule, ScenarioCatalogue, ScenarioGroupId, TaskDeclaration};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Flattened contributions of a module and everything it inherits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub adds: Vec<TaskDeclaration>,
    pub overrides: Vec<OverrideRule>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.overrides.is_empty()
    }

    pub(crate) fn extend(&mut self, other: Resolution) {
        self.adds.extend(other.adds);
        self.overrides.extend(other.overrides);
    }
}

/// Resolves `inherits` chains within a group.
///
/// The visited set lives as long as the resolver, so a module reached twice
/// (diamond inheritance, a cycle, or a parent that is also selected on its
/// own) contributes exactly once per resolver. Parents always land before
/// the child's own adds and overrides.
#[derive(Debug)]
pub struct ModuleResolver<'a> {
    catalogue: &'a ScenarioCatalogue,
    visited: HashSet<(ScenarioGroupId, String)>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(catalogue: &'a ScenarioCatalogue) -> Self {
        Self {
            catalogue,
            visited: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, group: ScenarioGroupId, key: &str) -> Resolution {
        let mut resolution = Resolution::default();
        self.resolve_into(group, key, &mut resolution);
        resolution
    }

    fn resolve_into(&mut self, group: ScenarioGroupId, key: &str, out: &mut Resolution) {
        if !self.visited.insert((group, key.to_string())) {
            debug!(?group, key, "module already resolved in this pass");
            return;
        }

        let catalogue = self.catalogue;
        let Some(module) = catalogue.module(group, key) else {
            warn!(?group, key, "unknown scenario module; contributing nothing");
            return;
        };

        for parent in &module.inherits {
            self.resolve_into(group, parent, out);
        }

        out.extend(Resolution {
            adds: module.adds.clone(),
            overrides: module.overrides.clone(),
        });
    }
}

/// One-shot resolution with a fresh visited set.
pub fn resolve(catalogue: &ScenarioCatalogue, group: ScenarioGroupId, key: &str) -> Resolution {
    ModuleResolver::new(catalogue).resolve(group, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> ScenarioCatalogue {
        let raw = r#"{
            "groups": [{
                "id": "financing",
                "modules": [
                    { "key": "a", "adds": [{ "id": "task_a", "title": "A", "phase": "financing" }],
                      "overrides": [{ "task_id": "shared", "title": "from a" }] },
                    { "key": "b", "inherits": "a",
                      "adds": [{ "id": "task_b", "title": "B", "phase": "financing" }] },
                    { "key": "c", "inherits": "b",
                      "adds": [{ "id": "task_c", "title": "C", "phase": "financing" }],
                      "overrides": [{ "task_id": "shared", "title": "from c" }] },
                    { "key": "d", "inherits": ["b", "a"],
                      "adds": [{ "id": "task_d", "title": "D", "phase": "financing" }] },
                    { "key": "loop_x", "inherits": "loop_y",
                      "adds": [{ "id": "task_x", "title": "X", "phase": "financing" }] },
                    { "key": "loop_y", "inherits": "loop_x",
                      "adds": [{ "id": "task_y", "title": "Y", "phase": "financing" }] },
                    { "key": "orphan", "inherits": "missing",
                      "adds": [{ "id": "task_orphan", "title": "O", "phase": "financing" }] }
                ]
            }]
        }"#;
        ScenarioCatalogue::from_json_str(raw).expect("fixture parses")
    }

    fn add_ids(resolution: &Resolution) -> Vec<&str> {
        resolution.adds.iter().map(|decl| decl.id.as_str()).collect()
    }

    #[test]
    fn parents_resolve_before_children() {
        let catalogue = catalogue();
        let resolution = resolve(&catalogue, ScenarioGroupId::Financing, "c");

        assert_eq!(add_ids(&resolution), vec!["task_a", "task_b", "task_c"]);
        let titles: Vec<_> = resolution
            .overrides
            .iter()
            .filter_map(|rule| rule.title.as_deref())
            .collect();
        assert_eq!(titles, vec!["from a", "from c"]);
    }

    #[test]
    fn diamond_inheritance_contributes_once() {
        let catalogue = catalogue();
        let resolution = resolve(&catalogue, ScenarioGroupId::Financing, "d");
        assert_eq!(add_ids(&resolution), vec!["task_a", "task_b", "task_d"]);
    }

    #[test]
    fn cycles_terminate() {
        let catalogue = catalogue();
        let resolution = resolve(&catalogue, ScenarioGroupId::Financing, "loop_x");
        assert_eq!(add_ids(&resolution), vec!["task_y", "task_x"]);
    }

    #[test]
    fn unknown_keys_contribute_nothing() {
        let catalogue = catalogue();
        assert!(resolve(&catalogue, ScenarioGroupId::Financing, "nope").is_empty());
        assert!(resolve(&catalogue, ScenarioGroupId::Timing, "a").is_empty());

        let orphan = resolve(&catalogue, ScenarioGroupId::Financing, "orphan");
        assert_eq!(add_ids(&orphan), vec!["task_orphan"]);
    }

    #[test]
    fn shared_resolver_skips_modules_already_applied() {
        let catalogue = catalogue();
        let mut resolver = ModuleResolver::new(&catalogue);

        let first = resolver.resolve(ScenarioGroupId::Financing, "a");
        let second = resolver.resolve(ScenarioGroupId::Financing, "c");

        assert_eq!(add_ids(&first), vec!["task_a"]);
        assert_eq!(add_ids(&second), vec!["task_b", "task_c"]);
    }
}
