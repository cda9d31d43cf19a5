// src/dag/graph.rs

use std::collections::BTreeMap;

use crate::dag::plan::Plan;
use crate::tasks::TaskKind;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must succeed before this one can run.
    deps: Vec<TaskKind>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskKind>,
}

/// Adjacency view of a validated [`Plan`], used for scheduling.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<TaskKind, DagNode>,
}

impl DagGraph {
    /// Build a DAG from a plan.
    ///
    /// Assumes the plan passed [`Plan::validate`].
    pub fn from_plan(plan: &Plan) -> Self {
        let mut nodes: BTreeMap<TaskKind, DagNode> = plan
            .steps()
            .iter()
            .map(|step| {
                (
                    step.task,
                    DagNode {
                        deps: step.after.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for step in plan.steps() {
            for dep in &step.after {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(step.task);
                }
            }
        }

        Self { nodes }
    }

    /// All tasks, in [`TaskKind`] order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskKind> + '_ {
        self.nodes.keys().copied()
    }

    pub fn contains(&self, task: TaskKind) -> bool {
        self.nodes.contains_key(&task)
    }

    pub fn dependencies_of(&self, task: TaskKind) -> &[TaskKind] {
        self.nodes
            .get(&task)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependents_of(&self, task: TaskKind) -> &[TaskKind] {
        self.nodes
            .get(&task)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
