// src/dag/graph.rs

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::dag::task_info::TaskDescriptor;
use crate::dag::tracker::TaskStateTracker;
use crate::engine::TaskName;
use crate::errors::{Result, WaverunError};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct dependencies, as declared (may name unknown tasks).
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskName>,
}

/// In-memory task graph keyed by task name.
///
/// Nothing here is validated up front: cycles and references to unknown
/// tasks are legal inputs, and [`DagGraph::diagnose`] explains them when a
/// run stalls.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: HashMap<TaskName, DagNode>,
    /// Declaration order, used to keep output stable.
    order: Vec<TaskName>,
}

/// `task` waits on `dependency`, which will never complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedEdge {
    pub task: TaskName,
    pub dependency: TaskName,
}

impl fmt::Display for BlockedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.task, self.dependency)
    }
}

/// Why a set of tasks can never become ready.
///
/// Tasks that are only transitively stuck (they wait on a task listed
/// here) do not get an entry of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StallDiagnosis {
    /// Dependency cycles among the stuck tasks, each in declaration order.
    pub cycles: Vec<Vec<TaskName>>,
    /// Dependencies that name a task not in the task list.
    pub missing: Vec<BlockedEdge>,
    /// Dependencies on a task that failed in this run.
    pub blocked_by_failure: Vec<BlockedEdge>,
}

impl StallDiagnosis {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.missing.is_empty() && self.blocked_by_failure.is_empty()
    }
}

impl DagGraph {
    /// Build the graph from descriptors.
    ///
    /// If a name appears more than once, the first descriptor wins.
    pub fn from_descriptors(tasks: &[TaskDescriptor]) -> Self {
        let mut nodes: HashMap<TaskName, DagNode> = HashMap::new();
        let mut order = Vec::new();

        for task in tasks {
            if nodes.contains_key(task.name()) {
                continue;
            }
            order.push(task.name().to_string());
            nodes.insert(
                task.name().to_string(),
                DagNode {
                    deps: task.depends_on().to_vec(),
                    dependents: Vec::new(),
                },
            );
        }

        for name in &order {
            let deps = nodes
                .get(name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Self { nodes, order }
    }

    /// All task names in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate dependencies of a task, as declared.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// `root` plus everything it transitively depends on, in declaration
    /// order. Unknown dependencies are not followed.
    pub fn dependency_closure(&self, root: &str) -> Result<Vec<TaskName>> {
        if !self.contains(root) {
            return Err(WaverunError::TaskNotFound(root.to_string()));
        }

        let mut stack = vec![root.to_string()];
        let mut visited: HashSet<TaskName> = HashSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            for dep in self.dependencies_of(&name) {
                if self.contains(dep) {
                    stack.push(dep.clone());
                }
            }
        }

        Ok(self
            .order
            .iter()
            .filter(|name| visited.contains(*name))
            .cloned()
            .collect())
    }

    /// A dependency-respecting order over the known tasks, or `None` if the
    /// graph has a cycle. Edges to unknown tasks are ignored.
    pub fn topological_order(&self) -> Option<Vec<TaskName>> {
        let graph = self.dependency_graph(|_| true);
        toposort(&graph, None)
            .ok()
            .map(|order| order.into_iter().map(str::to_string).collect())
    }

    /// Explain why `stuck` can never become ready given `tracker`.
    pub fn diagnose(&self, stuck: &[TaskName], tracker: &TaskStateTracker) -> StallDiagnosis {
        let stuck_set: HashSet<&str> = stuck.iter().map(String::as_str).collect();
        let graph = self.dependency_graph(|name| stuck_set.contains(name));

        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut cycles: Vec<Vec<TaskName>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_by_key(|name| position.get(name).copied().unwrap_or(usize::MAX));
                scc.into_iter().map(str::to_string).collect()
            })
            .collect();
        cycles.sort_by_key(|scc: &Vec<TaskName>| {
            position.get(scc[0].as_str()).copied().unwrap_or(usize::MAX)
        });

        let mut missing = Vec::new();
        let mut blocked_by_failure = Vec::new();

        for name in self.order.iter().filter(|n| stuck_set.contains(n.as_str())) {
            for dep in self.dependencies_of(name) {
                let edge = || BlockedEdge {
                    task: name.clone(),
                    dependency: dep.clone(),
                };
                if !self.contains(dep) {
                    missing.push(edge());
                } else if tracker.is_failed(dep) {
                    blocked_by_failure.push(edge());
                }
            }
        }

        StallDiagnosis {
            cycles,
            missing,
            blocked_by_failure,
        }
    }

    /// Edge direction: dep -> task, restricted to known nodes accepted by
    /// `include`.
    fn dependency_graph(&self, include: impl Fn(&str) -> bool) -> DiGraphMap<&str, ()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.order.iter().filter(|n| include(n)) {
            graph.add_node(name.as_str());
        }

        for name in self.order.iter().filter(|n| include(n)) {
            for dep in self.dependencies_of(name) {
                if self.contains(dep) && include(dep) {
                    graph.add_edge(dep.as_str(), name.as_str(), ());
                }
            }
        }

        graph
    }
}
