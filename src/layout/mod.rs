pub(crate) mod coords;
pub(crate) mod flatten;
pub(crate) mod levels;
pub mod reader;
pub mod resolve;
pub(crate) mod types;

pub use reader::{PipelineIndex, SubProcessBoundary, read};
pub use resolve::{ResolvedEdge, ResolvedEdges, resolve};
pub use types::{Layout, LayoutEdge, LayoutNode};

use std::collections::{BTreeSet, HashSet};

use crate::config::LayoutConfig;
use crate::error::FlowError;
use crate::model::{NodeKind, Pipeline, Todo};

/// One full layout pass: index the document, resolve edges, layer, place,
/// flatten. Pure over its inputs — the pipeline is never mutated, and the
/// same inputs yield bit-identical coordinates.
pub fn compute_layout(
    pipeline: &Pipeline,
    todos: &[Todo],
    expanded: &BTreeSet<String>,
    config: &LayoutConfig,
) -> Result<Layout, FlowError> {
    let index = reader::read(pipeline, todos)?;
    let resolved = resolve::resolve(&index);
    let mut columns = levels::assign_levels(&index, &resolved, expanded);
    let extent = coords::compute_coordinates(&mut columns, config);
    let layout = flatten::flatten(columns, &resolved, extent);
    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        "layout pass complete"
    );
    Ok(layout)
}

/// Stateful engine for one diagram: owns a read-only pipeline snapshot, the
/// pending todos, and the expand-state. Expand/collapse toggles re-run the
/// full pass; there is no partial relayout and no internal locking — a
/// caller sharing one engine across tasks serializes the calls.
pub struct FlowLayoutEngine {
    pipeline: Pipeline,
    todos: Vec<Todo>,
    expanded: BTreeSet<String>,
    sub_processes: HashSet<String>,
    config: LayoutConfig,
}

impl FlowLayoutEngine {
    /// Validates the document up front (duplicate ids, missing start/end)
    /// so later toggles can only fail on genuinely new input.
    pub fn new(pipeline: Pipeline, config: LayoutConfig) -> Result<Self, FlowError> {
        let index = reader::read(&pipeline, &[])?;
        let sub_processes = index
            .nodes()
            .filter(|node| node.kind == NodeKind::SubProcess)
            .map(|node| node.id.clone())
            .collect();
        Ok(Self {
            pipeline,
            todos: Vec::new(),
            expanded: BTreeSet::new(),
            sub_processes,
            config,
        })
    }

    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    /// Flips the expand-state of one sub-process. Ids that do not name a
    /// sub-process are ignored and reported as `false`.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        if !self.sub_processes.contains(id) {
            return false;
        }
        if expanded {
            self.expanded.insert(id.to_string());
        } else {
            self.expanded.remove(id);
        }
        true
    }

    pub fn expand(&mut self, id: &str) -> Result<Layout, FlowError> {
        self.set_expanded(id, true);
        self.layout()
    }

    pub fn collapse(&mut self, id: &str) -> Result<Layout, FlowError> {
        self.set_expanded(id, false);
        self.layout()
    }

    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn layout(&self) -> Result<Layout, FlowError> {
        compute_layout(&self.pipeline, &self.todos, &self.expanded, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activity, Gateway, NodeStatus, Pipeline};

    fn diamond() -> Pipeline {
        let mut pipeline = Pipeline::new("p", "start", "end");
        pipeline.add_activity(Activity::service("act_a", "A").with_status(NodeStatus::Created));
        pipeline.add_activity(Activity::service("act_b", "B").with_status(NodeStatus::Created));
        pipeline.add_activity(Activity::service("act_c", "C").with_status(NodeStatus::Created));
        pipeline.add_gateway(Gateway::parallel("gw_fork"));
        pipeline.add_gateway(Gateway::converge("gw_join"));
        pipeline.connect("f1", "start", "act_a");
        pipeline.connect("f2", "act_a", "gw_fork");
        pipeline.connect("f3", "gw_fork", "act_b");
        pipeline.connect("f4", "gw_fork", "act_c");
        pipeline.connect("f5", "act_b", "gw_join");
        pipeline.connect("f6", "act_c", "gw_join");
        pipeline.connect("f7", "gw_join", "end");
        pipeline
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
    fn diamond_layout_counts_and_bands() {
        let mut engine =
            FlowLayoutEngine::new(diamond(), LayoutConfig::default()).unwrap();
        let layout = engine.layout().unwrap();
        assert_eq!(layout.nodes.len(), 7);
        assert_eq!(layout.edges.len(), 7);
        // set_expanded on a non-sub-process is a no-op.
        assert!(!engine.set_expanded("act_a", true));
        assert!(engine.expanded().is_empty());

        let b = layout.nodes.iter().find(|n| n.id == "act_b").unwrap();
        let c = layout.nodes.iter().find(|n| n.id == "act_c").unwrap();
        assert_eq!(b.level, c.level);
        assert!(c.y >= b.y + b.height || b.y >= c.y + c.height);
        let join = layout.nodes.iter().find(|n| n.id == "gw_join").unwrap();
        assert_eq!(join.level, b.level + 1);
    }

    #[test]
    fn collapse_then_expand_round_trips() {
        let mut engine =
            FlowLayoutEngine::new(sub_process_pipeline(), LayoutConfig::default()).unwrap();
        let expanded_once = engine.expand("sp").unwrap();
        engine.collapse("sp").unwrap();
        let expanded_again = engine.expand("sp").unwrap();
        assert_eq!(expanded_once, expanded_again);
    }

    #[test]
    fn repeated_layouts_are_bit_identical() {
        let engine =
            FlowLayoutEngine::new(diamond(), LayoutConfig::default()).unwrap();
        let first = engine.layout().unwrap();
        let second = engine.layout().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expanded_interior_is_visible_and_tagged() {
        let mut engine =
            FlowLayoutEngine::new(sub_process_pipeline(), LayoutConfig::default()).unwrap();
        let collapsed = engine.layout().unwrap();
        assert!(collapsed.nodes.iter().all(|n| n.id != "act_x"));

        let expanded = engine.expand("sp").unwrap();
        let x = expanded.nodes.iter().find(|n| n.id == "act_x").unwrap();
        assert_eq!(x.parent.as_deref(), Some("sp"));
        assert!(
            expanded
                .edges
                .iter()
                .any(|e| e.source == "sp" && e.target == "act_x")
        );
    }
}
