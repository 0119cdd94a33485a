//! Dependency checks for a hand-ordered plan.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{PlanEntry, PlanError};

/// Reject duplicate names, unknown dependencies, cycles, and any library
/// listed before something it depends on.
pub(super) fn validate(entries: &[PlanEntry]) -> Result<(), PlanError> {
  let mut graph: DiGraph<&str, ()> = DiGraph::new();
  let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
  let mut position: HashMap<&str, usize> = HashMap::new();

  for (index, entry) in entries.iter().enumerate() {
    let name = entry.spec.name.as_str();
    if nodes.contains_key(name) {
      return Err(PlanError::DuplicateLibrary(name.to_string()));
    }
    nodes.insert(name, graph.add_node(name));
    position.insert(name, index);
  }

  // Edges run from dependency to dependent.
  for entry in entries {
    let name = entry.spec.name.as_str();
    for dep in &entry.spec.depends_on {
      let Some(&from) = nodes.get(dep.as_str()) else {
        return Err(PlanError::UnknownDependency {
          library: name.to_string(),
          dependency: dep.clone(),
        });
      };
      graph.add_edge(from, nodes[name], ());
    }
  }

  toposort(&graph, None).map_err(|cycle| PlanError::CycleDetected(graph[cycle.node_id()].to_string()))?;

  for entry in entries {
    let name = entry.spec.name.as_str();
    for dep in &entry.spec.depends_on {
      if position[dep.as_str()] > position[name] {
        return Err(PlanError::OutOfOrder {
          library: name.to_string(),
          dependency: dep.clone(),
        });
      }
    }
  }

  Ok(())
}
