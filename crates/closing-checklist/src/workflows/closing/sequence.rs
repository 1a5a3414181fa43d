use super::domain::TaskInstance;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Display order for `tasks` as positions into the slice.
///
/// Kahn's algorithm over the dependency edges whose prerequisite is in the
/// slice; edges to tasks outside it are ignored. The ready queue is seeded in
/// input order, which keeps unrelated tasks where the author put them. Tasks
/// caught in a cycle are appended in input order.
pub fn ordered_indices(tasks: &[TaskInstance]) -> Vec<usize> {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        position.entry(task.id.as_str()).or_insert(index);
    }

    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];

    for (index, task) in tasks.iter().enumerate() {
        let mut seen = HashSet::new();
        for dependency in &task.dependencies {
            let Some(&prerequisite) = position.get(dependency.as_str()) else {
                continue;
            };
            if prerequisite == index || !seen.insert(prerequisite) {
                continue;
            }
            in_degree[index] += 1;
            dependents[prerequisite].push(index);
        }
    }

    let mut ready: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| index)
        .collect();

    let mut ordered = Vec::with_capacity(tasks.len());
    let mut emitted = vec![false; tasks.len()];

    while let Some(index) = ready.pop_front() {
        ordered.push(index);
        emitted[index] = true;
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if ordered.len() < tasks.len() {
        debug!(
            unresolved = tasks.len() - ordered.len(),
            "dependency cycle; appending remaining tasks in original order"
        );
        ordered.extend((0..tasks.len()).filter(|index| !emitted[*index]));
    }

    ordered
}

/// Reorders tasks so in-set prerequisites come first. Never fails; see
/// [`ordered_indices`].
pub fn order(tasks: Vec<TaskInstance>) -> Vec<TaskInstance> {
    let indices = ordered_indices(&tasks);
    let mut slots: Vec<Option<TaskInstance>> = tasks.into_iter().map(Some).collect();
    indices
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}
