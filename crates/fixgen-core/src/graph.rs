use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::registry::ClassRegistry;

/// Summary of the class reference graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Dependency order of classes, or the classes caught in reference cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceGraphReport {
    pub summary: ReferenceGraphSummary,
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

impl ReferenceGraphReport {
    pub fn has_cycle(&self) -> bool {
        self.cycle.is_some()
    }
}

/// Build a deterministic report of which classes embed which.
///
/// Referenced classes come before the classes that embed them. Self
/// references count as cycles.
pub fn build_reference_graph_report(registry: &ClassRegistry) -> ReferenceGraphReport {
    let graph = build_adjacency(registry);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = ReferenceGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => ReferenceGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => ReferenceGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Edges point from a referenced class to every class that embeds it.
fn build_adjacency(registry: &ClassRegistry) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for class in registry.iter() {
        graph.entry(class.name.clone()).or_default();
        for field in &class.fields {
            if let Some(target) = registry.resolve(field) {
                graph
                    .entry(target.name.clone())
                    .or_default()
                    .insert(class.name.clone());
            }
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<&str, usize> =
        graph.keys().map(|node| (node.as_str(), 0)).collect();
    for targets in graph.values() {
        for target in targets {
            *indegree.entry(target.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| *node)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.to_string());
        if let Some(targets) = graph.get(node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target.as_str()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(target.as_str());
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(node, _)| node.to_string())
            .collect())
    }
}
