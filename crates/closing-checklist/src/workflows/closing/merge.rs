use super::catalogue::{OverrideRule, ScenarioCatalogue};
use super::compiler::{compile, instance_id, placement};
use super::domain::{Priority, TaskInstance};
use super::resolver::{ModuleResolver, Resolution};
use tracing::{debug, warn};

/// Merges the baseline with the catalogue tasks for a scenario selection.
///
/// The pass is batched: every add from every selected module lands first,
/// then every override, then the conflict rules. Group order comes from the
/// catalogue's merge rules and module order from the catalogue itself, so the
/// order of `selected` never changes the result.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioMergeEngine<'a> {
    catalogue: &'a ScenarioCatalogue,
}

impl<'a> ScenarioMergeEngine<'a> {
    pub fn new(catalogue: &'a ScenarioCatalogue) -> Self {
        Self { catalogue }
    }

    pub fn merge(&self, baseline: &[TaskInstance], selected: &[String]) -> Vec<TaskInstance> {
        self.warn_unknown(selected);

        let mut tasks = baseline.to_vec();

        for decl in &self.catalogue.base_tasks {
            if decl.is_visible(selected) {
                insert_unique(&mut tasks, compile(decl));
            }
        }

        let collected = self.collect(selected);

        for decl in &collected.adds {
            if decl.is_visible(selected) {
                insert_unique(&mut tasks, compile(decl));
            }
        }

        for rule in &collected.overrides {
            apply_override(&mut tasks, rule);
        }

        let mut removed: Vec<&str> = Vec::new();
        for conflict in &self.catalogue.merge_rules.conflicts {
            if !is_selected(selected, &conflict.if_selected) {
                continue;
            }

            let before = tasks.len();
            tasks.retain(|task| {
                !conflict
                    .then_remove
                    .iter()
                    .any(|target| is_exact_target(target, task))
            });
            removed.extend(conflict.then_remove.iter().map(String::as_str));
            debug!(
                scenario = %conflict.if_selected,
                removed = before - tasks.len(),
                "conflict rule applied"
            );

            for rule in &conflict.then_set {
                if removed.contains(&rule.task_id.as_str()) {
                    debug!(target = %rule.task_id, "override target removed by a conflict rule; skipping");
                    continue;
                }
                apply_override(&mut tasks, rule);
            }
        }

        tasks
    }

    /// Adds and overrides of every selected module, in group order and then
    /// catalogue module order.
    pub fn collect(&self, selected: &[String]) -> Resolution {
        let mut resolver = ModuleResolver::new(self.catalogue);
        let mut collected = Resolution::default();

        for group in self.catalogue.group_order() {
            for module in self.catalogue.modules_in(group) {
                if is_selected(selected, &module.key) {
                    collected.extend(resolver.resolve(group, &module.key));
                }
            }
        }

        collected
    }

    fn warn_unknown(&self, selected: &[String]) {
        for key in selected {
            if self.catalogue.group_of(key).is_none() {
                warn!(key = %key, "selected scenario has no catalogue module; ignoring");
            }
        }
    }
}

fn is_selected(selected: &[String], key: &str) -> bool {
    selected.iter().any(|chosen| chosen == key)
}

/// Inserts unless the id or the exact title is already taken. The first
/// insert keeps its base fields.
fn insert_unique(tasks: &mut Vec<TaskInstance>, task: TaskInstance) {
    let taken = tasks
        .iter()
        .any(|existing| existing.id == task.id || existing.title == task.title);
    if taken {
        debug!(task = %task.id, "task already present; skipping add");
        return;
    }
    tasks.push(task);
}

fn is_exact_target(target: &str, task: &TaskInstance) -> bool {
    task.id == target || task.id == instance_id(target)
}

/// Locates the task an override or removal refers to.
///
/// Exact id (raw or namespaced) wins. Otherwise the target id, with
/// underscores turned into spaces, is matched case-insensitively as a
/// substring of task titles and the first hit is taken, so `home_inspection`
/// reaches the baseline `home-inspection` task. Ambiguous when several titles
/// share the phrase. A conflict `then_set` naming an id that a `then_remove`
/// already dropped in the same merge is skipped before it gets here, so the
/// fallback cannot land on an unrelated task.
pub fn find_target(tasks: &[TaskInstance], target: &str) -> Option<usize> {
    if let Some(index) = tasks.iter().position(|task| is_exact_target(target, task)) {
        return Some(index);
    }

    let needle = target.replace('_', " ").to_lowercase();
    if needle.trim().is_empty() {
        return None;
    }

    tasks
        .iter()
        .position(|task| task.title.to_lowercase().contains(&needle))
}

/// Patches the fields the rule sets. Missing targets are a no-op.
pub fn apply_override(tasks: &mut [TaskInstance], rule: &OverrideRule) {
    let Some(index) = find_target(tasks, &rule.task_id) else {
        debug!(target = %rule.task_id, "override target not present; skipping");
        return;
    };

    let task = &mut tasks[index];

    if let Some(title) = &rule.title {
        task.title = title.clone();
    }
    if let Some(required) = rule.required {
        task.required = required;
        task.priority = Priority::from_required(required);
    }
    if let Some(phase) = rule.phase {
        let (category, subcategory) = placement(phase);
        task.category = category;
        task.subcategory = subcategory;
    }
    if rule.visible_if.is_some() {
        debug!(target = %rule.task_id, "visibility overrides do not apply to instances");
    }
}
