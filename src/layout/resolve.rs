use std::collections::{HashMap, HashSet};

use crate::error::FlowError;
use crate::model::NodeKind;

use super::reader::PipelineIndex;

/// Node-to-node edge after chasing flow chains and pipeline boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEdge {
    pub source: String,
    pub target: String,
}

/// Resolved edge set for the whole document: a flat list for rendering and
/// an insertion-ordered adjacency for traversal. Target order within one
/// source follows flow declaration order, which is what keeps the layering
/// deterministic.
#[derive(Debug, Default)]
pub struct ResolvedEdges {
    pub edges: Vec<ResolvedEdge>,
    pub adjacency: HashMap<String, Vec<String>>,
}

impl ResolvedEdges {
    pub fn targets_of(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn push(&mut self, seen: &mut HashSet<(String, String)>, source: String, target: String) {
        if source == target {
            return;
        }
        if !seen.insert((source.clone(), target.clone())) {
            return;
        }
        self.adjacency
            .entry(source.clone())
            .or_default()
            .push(target.clone());
        self.edges.push(ResolvedEdge { source, target });
    }
}

/// Converts the raw flow list into fully resolved node-to-node edges.
/// Flows may point at other flows (gateway chaining) and at nested pipeline
/// boundaries; edges whose endpoints resolve to nothing are dropped with a
/// warning — a partial diagram beats a hard failure in a read-only view.
pub fn resolve(index: &PipelineIndex) -> ResolvedEdges {
    let mut resolved = ResolvedEdges::default();
    let mut seen = HashSet::new();

    for flow_id in &index.flow_order {
        let flow = &index.flows_by_id[flow_id];
        let Some(source) = resolve_source(index, &flow.source) else {
            drop_edge(flow_id, &flow.source);
            continue;
        };
        let Some(target) = resolve_target(index, &flow.target) else {
            drop_edge(flow_id, &flow.target);
            continue;
        };
        resolved.push(&mut seen, source, target);
    }

    // Every sub-process also connects straight to the first node(s) after
    // its internal start event, keeping a continuous outgoing edge visible
    // whether or not the interior is expanded.
    for node in index.nodes() {
        if node.kind != NodeKind::SubProcess {
            continue;
        }
        let Some(start_id) = index.boundary.start_of_activity(&node.id) else {
            continue;
        };
        let Some(start) = index.get(start_id) else {
            continue;
        };
        for flow_id in &start.outgoing {
            let Some(flow) = index.flows_by_id.get(flow_id) else {
                continue;
            };
            if let Some(target) = resolve_target(index, &flow.target) {
                resolved.push(&mut seen, node.id.clone(), target);
            }
        }
    }

    resolved
}

/// Chases a source reference to the nearest enclosing real node. A source
/// that lands on a nested pipeline's start event is redirected to the
/// owning sub-process activity, so the rendered edge goes into the
/// collapsed box rather than its invisible interior marker.
fn resolve_source(index: &PipelineIndex, raw: &str) -> Option<String> {
    let mut current = raw;
    let mut visited: HashSet<&str> = HashSet::new();
    loop {
        if let Some(node) = index.get(current) {
            if node.kind == NodeKind::StartEvent && node.parent.is_some() {
                return index
                    .boundary
                    .activity_of_start(current)
                    .map(str::to_string);
            }
            return Some(current.to_string());
        }
        let flow = index.flows_by_id.get(current)?;
        if !visited.insert(current) {
            return None;
        }
        current = &flow.source;
    }
}

fn resolve_target(index: &PipelineIndex, raw: &str) -> Option<String> {
    let mut current = raw;
    let mut visited: HashSet<&str> = HashSet::new();
    loop {
        if index.get(current).is_some() {
            return Some(current.to_string());
        }
        let flow = index.flows_by_id.get(current)?;
        if !visited.insert(current) {
            return None;
        }
        current = &flow.target;
    }
}

fn drop_edge(flow_id: &str, endpoint: &str) {
    let err = FlowError::UnresolvedEdge {
        flow_id: flow_id.to_string(),
        endpoint: endpoint.to_string(),
    };
    tracing::warn!(%err, "dropping unresolvable flow edge");
}
