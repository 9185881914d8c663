use crate::config::LayoutConfig;
use crate::model::NodeKind;

use super::types::LayoutNode;

/// Assigns concrete coordinates to every node in place and returns the
/// overall extent. Columns advance left to right by the widest subtree in
/// the previous column; rows stack below the previous sibling's deepest
/// descendant, so siblings never overlap even with unequal subtree depths.
pub fn compute_coordinates(columns: &mut [Vec<LayoutNode>], config: &LayoutConfig) -> (f32, f32) {
    let (width, height) = place_columns(columns, 0.0, 0.0, config);
    let width = pin_end_event(columns, width, config);
    (width, height)
}

pub(crate) fn node_size(kind: NodeKind, config: &LayoutConfig) -> (f32, f32) {
    match kind {
        NodeKind::ServiceActivity | NodeKind::SubProcess => (config.node_width, config.node_height),
        NodeKind::StartEvent | NodeKind::EndEvent => (config.event_size, config.event_size),
        NodeKind::ParallelGateway
        | NodeKind::ConvergeGateway
        | NodeKind::ConditionalParallelGateway => (config.gateway_size, config.gateway_size),
    }
}

fn place_columns(
    columns: &mut [Vec<LayoutNode>],
    origin_x: f32,
    origin_y: f32,
    config: &LayoutConfig,
) -> (f32, f32) {
    let mut col_x = origin_x;
    let mut max_right = origin_x;
    let mut max_bottom = origin_y;

    for column in columns.iter_mut() {
        for node in column.iter_mut() {
            let (width, height) = node_size(node.data.kind, config);
            node.width = width;
            node.height = height;
        }
        let col_width = column.iter().map(|n| n.width).fold(0.0, f32::max);

        let mut cursor_y = origin_y;
        let mut col_right = col_x + col_width;
        for node in column.iter_mut() {
            // Round nodes center against the widest box of the column;
            // gateways get the extra leftward nudge so fan edges meet at
            // their center.
            node.x = if node.data.kind.is_round() {
                col_x + (col_width - node.width) / 2.0
            } else {
                col_x
            };
            if node.data.kind.is_gateway() {
                node.x -= config.gateway_nudge;
            }
            node.y = cursor_y;

            let mut subtree_right = node.x + node.width;
            let mut subtree_bottom = node.y + node.height;
            if node.is_expand && !node.children.is_empty() {
                let (right, bottom) = place_columns(
                    &mut node.children,
                    node.x + config.child_offset,
                    node.y + node.height + config.vertical_sep,
                    config,
                );
                subtree_right = subtree_right.max(right);
                subtree_bottom = subtree_bottom.max(bottom);
            }

            cursor_y = subtree_bottom + config.vertical_sep;
            col_right = col_right.max(subtree_right);
            max_bottom = max_bottom.max(subtree_bottom);
        }

        max_right = max_right.max(col_right);
        col_x = col_right + config.horizontal_sep;
    }

    (max_right, max_bottom)
}

/// The terminal end marker always renders to the right of every other
/// top-level node, no matter how many parallel branches exist.
fn pin_end_event(columns: &mut [Vec<LayoutNode>], width: f32, config: &LayoutConfig) -> f32 {
    let mut max_right: f32 = 0.0;
    let mut has_end = false;
    for column in columns.iter() {
        for node in column {
            if node.data.kind == NodeKind::EndEvent {
                has_end = true;
            } else {
                max_right = max_right.max(node.x + node.width);
            }
        }
    }
    if !has_end {
        return width;
    }

    let pinned_x = max_right + config.horizontal_sep + config.end_pin_extra;
    for column in columns.iter_mut() {
        for node in column.iter_mut() {
            if node.data.kind == NodeKind::EndEvent {
                node.x = node.x.max(pinned_x);
                return width.max(node.x + node.width);
            }
        }
    }
    width
}
