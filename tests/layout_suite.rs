use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use taskflow_layout::model::{NodeKind, Todo};
use taskflow_layout::{FlowLayoutEngine, Layout, LayoutConfig, Pipeline, compute_layout};

fn load_fixture(name: &str) -> Pipeline {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path).expect("fixture read failed");
    serde_json::from_str(&raw).expect("fixture parse failed")
}

fn layout_fixture(name: &str, expanded: &BTreeSet<String>) -> Layout {
    let pipeline = load_fixture(name);
    compute_layout(&pipeline, &[], expanded, &LayoutConfig::default()).expect("layout failed")
}

fn assert_layout_sane(layout: &Layout, fixture: &str) {
    let mut ids = HashSet::new();
    for node in &layout.nodes {
        assert!(ids.insert(node.id.as_str()), "{fixture}: duplicate node {}", node.id);
        assert!(node.width > 0.0 && node.height > 0.0, "{fixture}: unsized {}", node.id);
    }

    // The end marker clears every other top-level box.
    let end = layout
        .nodes
        .iter()
        .find(|n| n.data.kind == NodeKind::EndEvent && n.parent.is_none())
        .unwrap_or_else(|| panic!("{fixture}: no end event"));
    for node in &layout.nodes {
        if node.parent.is_none() && node.id != end.id {
            assert!(
                end.x >= node.x + node.width,
                "{fixture}: end marker left of {}",
                node.id
            );
        }
    }

    // Nodes sharing a column band never overlap vertically.
    let mut bands: HashMap<(Option<&str>, usize), Vec<(f32, f32)>> = HashMap::new();
    for node in &layout.nodes {
        bands
            .entry((node.parent.as_deref(), node.level))
            .or_default()
            .push((node.y, node.y + node.height));
    }
    for ((parent, level), ranges) in bands {
        for (i, a) in ranges.iter().enumerate() {
            for b in ranges.iter().skip(i + 1) {
                assert!(
                    a.1 <= b.0 || b.1 <= a.0,
                    "{fixture}: overlap in column {level} of {parent:?}"
                );
            }
        }
    }

    // Every kept edge connects visible nodes.
    for edge in &layout.edges {
        assert!(ids.contains(edge.source.as_str()), "{fixture}: dangling edge source");
        assert!(ids.contains(edge.target.as_str()), "{fixture}: dangling edge target");
    }

    assert!(layout.width > 0.0 && layout.height > 0.0, "{fixture}: empty extent");
}

#[test]
fn layout_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "linear.json",
        "parallel.json",
        "subprocess.json",
        "conditional.json",
        "chained_flows.json",
    ];

    for fixture in candidates {
        let layout = layout_fixture(fixture, &BTreeSet::new());
        assert_layout_sane(&layout, fixture);

        // Same input, same bytes.
        let again = layout_fixture(fixture, &BTreeSet::new());
        assert_eq!(layout, again, "{fixture}: layout not deterministic");
    }
}

#[test]
fn levels_increase_along_every_edge() {
    for fixture in ["linear.json", "parallel.json", "conditional.json"] {
        let layout = layout_fixture(fixture, &BTreeSet::new());
        let level_of: HashMap<&str, usize> = layout
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.level))
            .collect();
        for edge in &layout.edges {
            assert!(
                level_of[edge.target.as_str()] > level_of[edge.source.as_str()],
                "{fixture}: edge {} -> {} does not advance",
                edge.source,
                edge.target
            );
        }
    }
}

#[test]
fn parallel_gateway_fans_out_and_reconverges() {
    let layout = layout_fixture("parallel.json", &BTreeSet::new());
    let leaving = layout.edges.iter().filter(|e| e.source == "gw_fork").count();
    let arriving = layout.edges.iter().filter(|e| e.target == "gw_join").count();
    assert_eq!(leaving, 3);
    assert_eq!(arriving, 3);

    let pairs: HashSet<(&str, &str)> = layout
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs.len(), layout.edges.len(), "duplicate (source,target) pair");

    // The three branches share a column and stack without touching.
    let branches: Vec<_> = layout
        .nodes
        .iter()
        .filter(|n| n.id.starts_with("act_dump_"))
        .collect();
    assert_eq!(branches.len(), 3);
    assert!(branches.windows(2).all(|w| w[0].level == w[1].level));
}

#[test]
fn sub_process_hides_and_reveals_its_interior() {
    let layout = layout_fixture("subprocess.json", &BTreeSet::new());
    assert!(layout.nodes.iter().any(|n| n.id == "sp_backup"));
    assert!(layout.nodes.iter().all(|n| n.id != "act_snapshot"));

    let expanded: BTreeSet<String> = ["sp_backup".to_string()].into();
    let layout = layout_fixture("subprocess.json", &expanded);
    let snapshot = layout
        .nodes
        .iter()
        .find(|n| n.id == "act_snapshot")
        .expect("interior node visible when expanded");
    assert_eq!(snapshot.parent.as_deref(), Some("sp_backup"));
    assert!(
        layout
            .edges
            .iter()
            .any(|e| e.source == "sp_backup" && e.target == "act_snapshot")
    );
    // The nested start/end markers never render.
    assert!(layout.nodes.iter().all(|n| n.id != "sub_start_1"));
    assert!(layout.nodes.iter().all(|n| n.id != "sub_end_1"));
    assert_layout_sane(&layout, "subprocess.json (expanded)");
}

#[test]
fn collapse_then_expand_is_a_no_op() {
    let pipeline = load_fixture("subprocess.json");
    let mut engine = FlowLayoutEngine::new(pipeline, LayoutConfig::default()).unwrap();
    let first = engine.expand("sp_backup").unwrap();
    engine.collapse("sp_backup").unwrap();
    let second = engine.expand("sp_backup").unwrap();
    assert_eq!(first, second);
}

#[test]
fn chained_flows_resolve_and_dangling_edges_drop() {
    let layout = layout_fixture("chained_flows.json", &BTreeSet::new());
    assert!(
        layout
            .edges
            .iter()
            .any(|e| e.source == "act_one" && e.target == "act_two")
    );
    assert!(layout.edges.iter().all(|e| e.target != "node_missing"));
}

#[test]
fn pending_todos_badge_their_nodes() {
    let pipeline = load_fixture("linear.json");
    let todos = vec![Todo::pending("todo_77", "act_install")];
    let layout = compute_layout(
        &pipeline,
        &todos,
        &BTreeSet::new(),
        &LayoutConfig::default(),
    )
    .unwrap();
    let node = layout.nodes.iter().find(|n| n.id == "act_install").unwrap();
    assert_eq!(node.data.todo_id.as_deref(), Some("todo_77"));
}
