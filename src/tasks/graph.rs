// src/tasks/graph.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::errors::{AssetflowError, Result};
use crate::tasks::registry::{TaskDef, TaskRegistry};

/// Dependency view over a [`TaskRegistry`].
///
/// Edge direction: member -> parent. For `build:assets = [build:css, ...]`
/// we add `build:css -> build:assets`.
#[derive(Debug)]
pub struct TaskGraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> TaskGraph<'a> {
    pub fn from_registry(registry: &'a TaskRegistry) -> Self {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for (name, _) in registry.iter() {
            graph.add_node(name);
        }

        for (name, def) in registry.iter() {
            for member in def.members() {
                graph.add_edge(member.as_str(), name, ());
            }
        }

        Self { graph }
    }

    /// Topological order, leaves first. Fails on a cycle.
    pub fn topological_order(&self) -> Result<Vec<&'a str>> {
        toposort(&self.graph, None).map_err(|cycle| {
            AssetflowError::TaskCycle(cycle.node_id().to_string())
        })
    }

    /// Direct members of `name`, in no particular order.
    pub fn members(&self, name: &'a str) -> Vec<&'a str> {
        if !self.graph.contains_node(name) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(name, Direction::Incoming)
            .collect()
    }

    /// All leaf (unit) tasks reachable from `name`, sorted and deduplicated.
    pub fn leaf_units(&self, registry: &TaskRegistry, name: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut stack = vec![name];
        let mut seen = std::collections::HashSet::new();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            match registry.get(current) {
                Some(TaskDef::Unit(_)) => out.push(current),
                Some(_) => stack.extend(self.members(current)),
                None => {}
            }
        }

        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoxFuture;

    fn noop() -> BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn leaves_come_before_parents() {
        let mut reg = TaskRegistry::new();
        reg.register("a", noop).unwrap();
        reg.register("b", noop).unwrap();
        reg.register_composite("ab", &["a", "b"]).unwrap();
        reg.register_sequence("all", &["ab", "a"]).unwrap();

        let graph = TaskGraph::from_registry(&reg);
        let order = graph.topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|x| *x == n).unwrap();
        assert!(pos("a") < pos("ab"));
        assert!(pos("ab") < pos("all"));
        assert_eq!(graph.leaf_units(&reg, "all"), vec!["a", "b"]);

        let mut members = graph.members("ab");
        members.sort_unstable();
        assert_eq!(members, vec!["a", "b"]);
        assert!(graph.members("nope").is_empty());
    }

    #[test]
    fn cycle_is_reported() {
        let mut reg = TaskRegistry::new();
        reg.register_sequence("x", &["y"]).unwrap();
        reg.register_sequence("y", &["x"]).unwrap();

        let err = TaskGraph::from_registry(&reg)
            .topological_order()
            .unwrap_err();
        let AssetflowError::TaskCycle(task) = &err else {
            panic!("expected a cycle error, got {err:?}");
        };
        assert!(task == "x" || task == "y", "payload is the task name: {task:?}");
        assert_eq!(err.to_string().matches("ycle detected").count(), 1);
    }
}
