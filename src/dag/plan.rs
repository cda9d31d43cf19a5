// src/dag/plan.rs

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::tasks::TaskKind;

/// One node of a plan: a task and the tasks that must succeed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub task: TaskKind,
    pub after: Vec<TaskKind>,
}

/// The task graph for one invocation.
///
/// | Invocation | Steps |
/// |---|---|
/// | `build` / `default` | `clean`, then every transform `after = [clean]` |
/// | single task | that task alone |
/// | `watch` | the three watched transforms, no dependencies |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn build() -> Self {
        let mut steps = vec![PlanStep {
            task: TaskKind::Clean,
            after: Vec::new(),
        }];
        steps.extend(TaskKind::TRANSFORMS.iter().map(|&task| PlanStep {
            task,
            after: vec![TaskKind::Clean],
        }));
        Self { steps }
    }

    pub fn single(task: TaskKind) -> Self {
        Self {
            steps: vec![PlanStep {
                task,
                after: Vec::new(),
            }],
        }
    }

    /// Tasks that file changes can re-run. Nothing runs until a change.
    pub fn watch_targets() -> Self {
        let steps = [TaskKind::MainCss, TaskKind::Scripts, TaskKind::Html]
            .into_iter()
            .map(|task| PlanStep {
                task,
                after: Vec::new(),
            })
            .collect();
        Self { steps }
    }

    /// Construct a plan from explicit steps. Call [`Plan::validate`] before
    /// scheduling it.
    pub fn from_steps(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn contains(&self, task: TaskKind) -> bool {
        self.steps.iter().any(|s| s.task == task)
    }

    /// Steps with no dependencies.
    pub fn roots(&self) -> Vec<TaskKind> {
        self.steps
            .iter()
            .filter(|s| s.after.is_empty())
            .map(|s| s.task)
            .collect()
    }

    /// Check that every dependency is part of the plan and that there are no
    /// cycles.
    pub fn validate(&self) -> Result<()> {
        self.topo_order().map(|_| ())
    }

    /// Tasks in an order where each one follows all of its dependencies.
    pub fn topo_order(&self) -> Result<Vec<TaskKind>> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<TaskKind, ()> = DiGraphMap::new();

        for step in &self.steps {
            graph.add_node(step.task);
        }

        for step in &self.steps {
            for &dep in &step.after {
                if !self.contains(dep) {
                    return Err(anyhow!(
                        "task '{}' depends on '{}', which is not part of this plan",
                        step.task,
                        dep
                    ));
                }
                graph.add_edge(dep, step.task, ());
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            anyhow!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            )
        })
    }
}
