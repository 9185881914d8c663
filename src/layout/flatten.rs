use std::collections::{HashMap, HashSet};

use super::resolve::ResolvedEdges;
use super::types::{Layout, LayoutEdge, LayoutNode};

/// Produces the render-facing output: every visible node exactly once, in
/// depth-first column order with expanded interiors spliced right after
/// their parent, plus the edges whose endpoints both survived into the
/// visible set, with concrete pixel endpoints.
pub fn flatten(
    columns: Vec<Vec<LayoutNode>>,
    resolved: &ResolvedEdges,
    extent: (f32, f32),
) -> Layout {
    let mut nodes: Vec<LayoutNode> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    flatten_columns(columns, &mut nodes, &mut seen);

    let mut frames: HashMap<&str, (f32, f32, f32, f32)> = HashMap::new();
    for node in &nodes {
        frames
            .entry(node.id.as_str())
            .or_insert((node.x, node.y, node.width, node.height));
    }

    let mut edges = Vec::with_capacity(resolved.edges.len());
    for edge in &resolved.edges {
        let (Some(&source), Some(&target)) = (
            frames.get(edge.source.as_str()),
            frames.get(edge.target.as_str()),
        ) else {
            continue;
        };
        edges.push(connect(&edge.source, &edge.target, source, target));
    }

    Layout {
        nodes,
        edges,
        width: extent.0,
        height: extent.1,
    }
}

fn flatten_columns(
    columns: Vec<Vec<LayoutNode>>,
    out: &mut Vec<LayoutNode>,
    seen: &mut HashSet<String>,
) {
    for column in columns {
        for node in column {
            let interior = if node.is_expand {
                node.children.clone()
            } else {
                Vec::new()
            };
            if seen.insert(node.id.clone()) {
                out.push(node);
            }
            flatten_columns(interior, out, seen);
        }
    }
}

/// Edge endpoints from the final frames. A target strictly to the right of
/// the source box is entered from the side; otherwise the edge runs from
/// the source's bottom into the target's top (same column band, or a parent
/// box into its expanded interior).
fn connect(
    source_id: &str,
    target_id: &str,
    source: (f32, f32, f32, f32),
    target: (f32, f32, f32, f32),
) -> LayoutEdge {
    let (sx, sy, sw, sh) = source;
    let (tx, ty, tw, th) = target;
    let lateral = tx >= sx + sw;
    let (start, end) = if lateral {
        ((sx + sw, sy + sh / 2.0), (tx, ty + th / 2.0))
    } else {
        ((sx + sw / 2.0, sy + sh), (tx + tw / 2.0, ty))
    };
    LayoutEdge {
        source: source_id.to_string(),
        target: target_id.to_string(),
        start,
        end,
        lateral,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::coords::compute_coordinates;
    use crate::layout::levels::assign_levels;
    use crate::layout::reader::read;
    use crate::layout::resolve::resolve;
    use crate::model::{Activity, Pipeline};

    fn run(pipeline: &Pipeline, expanded: &BTreeSet<String>) -> Layout {
        let index = read(pipeline, &[]).unwrap();
        let resolved = resolve(&index);
        let mut columns = assign_levels(&index, &resolved, expanded);
        let extent = compute_coordinates(&mut columns, &LayoutConfig::default());
        flatten(columns, &resolved, extent)
    }

    fn sub_process_pipeline() -> Pipeline {
        let mut nested = Pipeline::new("p_sub", "sub_start", "sub_end");
        nested.add_activity(Activity::service("act_x", "X"));
        nested.connect("sf1", "sub_start", "act_x");
        nested.connect("sf2", "act_x", "sub_end");
        let mut pipeline = Pipeline::new("p", "start", "end");
        pipeline.add_activity(Activity::sub_process("sp", "Nested", nested));
        pipeline.connect("f1", "start", "sp");
        pipeline.connect("f2", "sp", "end");
        pipeline
    }

    #[test]
    fn collapsed_interior_stays_hidden() {
        let layout = run(&sub_process_pipeline(), &BTreeSet::new());
        let ids: Vec<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "sp", "end"]);
        assert!(!layout.edges.iter().any(|e| e.target == "act_x"));
    }

    #[test]
    fn expanded_interior_splices_after_parent() {
        let expanded: BTreeSet<String> = ["sp".to_string()].into();
        let layout = run(&sub_process_pipeline(), &expanded);
        let ids: Vec<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "sp", "act_x", "end"]);
        let entry = layout
            .edges
            .iter()
            .find(|e| e.source == "sp" && e.target == "act_x")
            .expect("interior entry edge");
        // Parent box into its interior runs downward, not sideways.
        assert!(!entry.lateral);
        assert_eq!(entry.start.1, {
            let sp = layout.nodes.iter().find(|n| n.id == "sp").unwrap();
            sp.y + sp.height
        });
    }

    #[test]
    fn lateral_edges_attach_to_box_sides() {
        let layout = run(&sub_process_pipeline(), &BTreeSet::new());
        let edge = layout
            .edges
            .iter()
            .find(|e| e.source == "start" && e.target == "sp")
            .unwrap();
        assert!(edge.lateral);
        let start_node = layout.nodes.iter().find(|n| n.id == "start").unwrap();
        assert_eq!(edge.start.0, start_node.x + start_node.width);
        assert_eq!(edge.start.1, start_node.y + start_node.height / 2.0);
    }
}
