use serde::Serialize;

use crate::model::FlowNode;

/// Positioned node, rebuilt from scratch on every layout pass. `level` is
/// the column inside the node's own scope (top level or one sub-process
/// interior), `index` the row within that column. `children` is populated
/// column-major only for sub-processes present in the expand-state.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub data: FlowNode,
    pub level: usize,
    pub index: usize,
    /// Owning sub-process activity id; `None` at top level. An id link
    /// rather than a back-reference — the nesting is a strict ownership
    /// tree.
    pub parent: Option<String>,
    pub children: Vec<Vec<LayoutNode>>,
    pub is_expand: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutNode {
    pub(crate) fn new(data: FlowNode, level: usize, index: usize, is_expand: bool) -> Self {
        Self {
            id: data.id.clone(),
            parent: data.parent.clone(),
            data,
            level,
            index,
            children: Vec::new(),
            is_expand,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Renderable edge with concrete endpoints computed from the final node
/// coordinates. `lateral` edges leave the source's right side and enter the
/// target's left side; the rest run bottom-to-top (same column band, or a
/// parent box into its expanded interior).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub lateral: bool,
}

/// Output of one layout pass: the flattened visible node list, the visible
/// edge set, and the overall extent the renderer should reserve.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f32,
    pub height: f32,
}
