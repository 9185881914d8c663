//! Static cluster-topology diagrams: instances grouped under role groups,
//! with inter-group edges. A much simpler sibling of the flow layout built
//! on the same layered-column primitives — no nesting, no expand-state.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::layout::LayoutEdge;
use crate::model::NodeStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceNode {
    pub id: String,
    /// Usually an `ip:port` address.
    pub label: String,
    #[serde(default)]
    pub status: NodeStatus,
}

/// One role group (e.g. proxies, masters, replicas) and its member
/// instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleGroup {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub instances: Vec<InstanceNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTopology {
    pub groups: Vec<RoleGroup>,
    #[serde(default)]
    pub edges: Vec<GroupEdge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceLayout {
    pub id: String,
    pub label: String,
    pub status: NodeStatus,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Positioned role group box; height grows with the member count.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    pub id: String,
    pub label: String,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub instances: Vec<InstanceLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyLayout {
    pub groups: Vec<GroupLayout>,
    pub edges: Vec<LayoutEdge>,
    pub width: f32,
    pub height: f32,
}

/// Lays out a topology: groups without incoming edges seed column 0, the
/// rest follow by graph distance (first-discovery wins), disconnected
/// groups trail in a final column. Same spacing constants as the flow
/// layout.
pub fn compute_topology_layout(topology: &ClusterTopology, config: &LayoutConfig) -> TopologyLayout {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for edge in &topology.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        has_incoming.insert(edge.target.as_str());
    }

    let known: HashSet<&str> = topology.groups.iter().map(|g| g.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = topology
        .groups
        .iter()
        .map(|g| g.id.as_str())
        .filter(|id| !has_incoming.contains(id))
        .collect();
    seen.extend(current.iter().copied());

    while !current.is_empty() {
        let mut next: Vec<&str> = Vec::new();
        for id in &current {
            for &target in adjacency.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                if known.contains(target) && seen.insert(target) {
                    next.push(target);
                }
            }
        }
        columns.push(current);
        current = next;
    }
    let stranded: Vec<&str> = topology
        .groups
        .iter()
        .map(|g| g.id.as_str())
        .filter(|id| !seen.contains(id))
        .collect();
    if !stranded.is_empty() {
        columns.push(stranded);
    }

    let by_id: HashMap<&str, &RoleGroup> =
        topology.groups.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut groups: Vec<GroupLayout> = Vec::new();
    let mut col_x = 0.0f32;
    let mut max_bottom = 0.0f32;
    for (level, column) in columns.iter().enumerate() {
        let mut cursor_y = 0.0f32;
        for id in column {
            let group = by_id[id];
            let header = config.node_height;
            let pad = config.group_padding;
            let height =
                header + group.instances.len() as f32 * config.instance_row_height + pad * 2.0;
            let mut instances = Vec::with_capacity(group.instances.len());
            for (row, instance) in group.instances.iter().enumerate() {
                instances.push(InstanceLayout {
                    id: instance.id.clone(),
                    label: instance.label.clone(),
                    status: instance.status,
                    x: col_x + pad,
                    y: cursor_y + header + pad + row as f32 * config.instance_row_height,
                    width: config.node_width - pad * 2.0,
                    height: config.instance_row_height,
                });
            }
            groups.push(GroupLayout {
                id: group.id.clone(),
                label: group.label.clone(),
                level,
                x: col_x,
                y: cursor_y,
                width: config.node_width,
                height,
                instances,
            });
            cursor_y += height + config.vertical_sep;
            max_bottom = max_bottom.max(cursor_y - config.vertical_sep);
        }
        col_x += config.node_width + config.horizontal_sep;
    }
    let width = if columns.is_empty() {
        0.0
    } else {
        col_x - config.horizontal_sep
    };

    let frames: HashMap<&str, (f32, f32, f32, f32)> = groups
        .iter()
        .map(|g| (g.id.as_str(), (g.x, g.y, g.width, g.height)))
        .collect();
    let mut edges = Vec::with_capacity(topology.edges.len());
    let mut dedup: HashSet<(&str, &str)> = HashSet::new();
    for edge in &topology.edges {
        if !dedup.insert((edge.source.as_str(), edge.target.as_str())) {
            continue;
        }
        let (Some(&(sx, sy, sw, sh)), Some(&(tx, ty, tw, th))) = (
            frames.get(edge.source.as_str()),
            frames.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let lateral = tx >= sx + sw;
        let (start, end) = if lateral {
            ((sx + sw, sy + sh / 2.0), (tx, ty + th / 2.0))
        } else {
            ((sx + sw / 2.0, sy + sh), (tx + tw / 2.0, ty))
        };
        edges.push(LayoutEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            start,
            end,
            lateral,
        });
    }

    TopologyLayout {
        groups,
        edges,
        width,
        height: max_bottom,
    }
}
