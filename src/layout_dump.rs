use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::Layout;

/// Serializable mirror of a computed layout, the shape the CLI emits and
/// external renderers consume.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub status: String,
    pub level: usize,
    pub index: usize,
    pub parent: Option<String>,
    pub expanded: bool,
    pub todo: bool,
    pub skip: bool,
    pub retry: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub lateral: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: format!("{:?}", node.data.kind),
                name: node.data.name.clone(),
                status: format!("{:?}", node.data.status),
                level: node.level,
                index: node.index,
                parent: node.parent.clone(),
                expanded: node.is_expand,
                todo: node.data.todo_id.is_some(),
                skip: node.data.skip,
                retry: node.data.retry,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                start: [edge.start.0, edge.start.1],
                end: [edge.end.0, edge.end.1],
                lateral: edge.lateral,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
