use std::collections::{BTreeSet, HashSet};

use crate::model::NodeKind;

use super::reader::PipelineIndex;
use super::resolve::ResolvedEdges;
use super::types::LayoutNode;

/// Breadth-first layering of the resolved graph starting at the top-level
/// start event. The outer index of the result is the column, rendered left
/// to right; each column holds the nodes of one horizontal band. A node
/// reachable from several columns keeps the column that discovered it
/// first, which gives diamond-shaped gateway patterns a stable layering.
pub fn assign_levels(
    index: &PipelineIndex,
    resolved: &ResolvedEdges,
    expanded: &BTreeSet<String>,
) -> Vec<Vec<LayoutNode>> {
    let seeds = if index.get(&index.root_start).is_some() {
        vec![index.root_start.clone()]
    } else {
        Vec::new()
    };
    layer_scope(index, resolved, expanded, None, seeds)
}

/// Layers one scope: the top level (`scope == None`) or the interior of one
/// sub-process. Targets owned by a different scope are ignored here; nested
/// start/end markers never appear inside an interior.
fn layer_scope(
    index: &PipelineIndex,
    resolved: &ResolvedEdges,
    expanded: &BTreeSet<String>,
    scope: Option<&str>,
    seeds: Vec<String>,
) -> Vec<Vec<LayoutNode>> {
    let mut columns: Vec<Vec<LayoutNode>> = Vec::new();
    let mut seen: HashSet<String> = seeds.iter().cloned().collect();
    let mut current = seeds;

    while !current.is_empty() {
        let level = columns.len();
        let mut next: Vec<String> = Vec::new();
        for id in &current {
            for target in resolved.targets_of(id) {
                let Some(node) = index.get(target) else {
                    continue;
                };
                if node.parent.as_deref() != scope {
                    continue;
                }
                if scope.is_some() && index.start_end_ids.contains(target) {
                    continue;
                }
                if seen.insert(target.clone()) {
                    next.push(target.clone());
                }
            }
        }

        let mut column = Vec::with_capacity(current.len());
        for (row, id) in current.iter().enumerate() {
            let Some(data) = index.get(id) else {
                continue;
            };
            let is_expand = data.kind == NodeKind::SubProcess && expanded.contains(id);
            let mut node = LayoutNode::new(data.clone(), level, row, is_expand);
            if is_expand {
                node.children = layer_scope(
                    index,
                    resolved,
                    expanded,
                    Some(id),
                    entry_seeds(index, resolved, id),
                );
            }
            column.push(node);
        }
        columns.push(column);
        current = next;
    }

    columns
}

/// First real nodes of a sub-process interior: the resolved targets of the
/// sub-process box that it owns, markers excluded.
fn entry_seeds(index: &PipelineIndex, resolved: &ResolvedEdges, sp_id: &str) -> Vec<String> {
    let mut seeds: Vec<String> = Vec::new();
    for target in resolved.targets_of(sp_id) {
        let Some(node) = index.get(target) else {
            continue;
        };
        if node.parent.as_deref() != Some(sp_id) {
            continue;
        }
        if index.start_end_ids.contains(target) {
            continue;
        }
        if !seeds.iter().any(|s| s == target) {
            seeds.push(target.clone());
        }
    }
    seeds
}
