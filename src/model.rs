use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Execution status reported by the task orchestration backend. Nodes that
/// have not started yet arrive with an empty string (or no field at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    Created,
    Running,
    Finished,
    Failed,
    Revoked,
    #[default]
    #[serde(rename = "")]
    Pending,
}

impl NodeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Revoked)
    }
}

/// One outgoing flow id or a list of them. Gateways fan out to several
/// flows; everything else carries a single id, and the wire format uses a
/// bare string in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowRefs {
    One(String),
    Many(Vec<String>),
}

impl FlowRefs {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(id) => std::slice::from_ref(id).iter().map(String::as_str),
            Self::Many(ids) => ids.as_slice().iter().map(String::as_str),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(id) => id.is_empty(),
            Self::Many(ids) => ids.is_empty(),
        }
    }

    pub fn push(&mut self, id: String) {
        match self {
            Self::One(first) => {
                *self = Self::Many(vec![std::mem::take(first), id]);
            }
            Self::Many(ids) => ids.push(id),
        }
    }
}

impl Default for FlowRefs {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Start or end event marker of one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub outgoing: FlowRefs,
}

impl Event {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            status: NodeStatus::default(),
            outgoing: FlowRefs::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    ServiceActivity,
    SubProcess,
}

/// A task node. `SubProcess` activities exclusively own their nested
/// pipeline; dropping the activity drops the whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<u64>,
    #[serde(default)]
    pub outgoing: FlowRefs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Box<Pipeline>>,
}

impl Activity {
    pub fn service(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: ActivityKind::ServiceActivity,
            status: NodeStatus::default(),
            skip: false,
            retry: 0,
            started_at: None,
            updated_at: None,
            outgoing: FlowRefs::default(),
            pipeline: None,
        }
    }

    pub fn sub_process(id: &str, name: &str, pipeline: Pipeline) -> Self {
        Self {
            kind: ActivityKind::SubProcess,
            pipeline: Some(Box::new(pipeline)),
            ..Self::service(id, name)
        }
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayKind {
    ParallelGateway,
    ConvergeGateway,
    ConditionalParallelGateway,
}

/// Branching or joining control node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: GatewayKind,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub outgoing: FlowRefs,
}

impl Gateway {
    pub fn new(id: &str, kind: GatewayKind) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            kind,
            status: NodeStatus::default(),
            outgoing: FlowRefs::default(),
        }
    }

    pub fn parallel(id: &str) -> Self {
        Self::new(id, GatewayKind::ParallelGateway)
    }

    pub fn converge(id: &str) -> Self {
        Self::new(id, GatewayKind::ConvergeGateway)
    }

    pub fn conditional(id: &str) -> Self {
        Self::new(id, GatewayKind::ConditionalParallelGateway)
    }
}

/// Directed edge reference. `source`/`target` usually name a node, but the
/// backend sometimes chains flows through gateways, in which case they name
/// another flow and the resolver has to chase the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Tree-shaped execution plan. Nested pipelines live inside `SubProcess`
/// activities; node and flow ids are unique across the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub start_event: Event,
    pub end_event: Event,
    #[serde(default)]
    pub activities: BTreeMap<String, Activity>,
    #[serde(default)]
    pub gateways: BTreeMap<String, Gateway>,
    #[serde(default)]
    pub flows: BTreeMap<String, Flow>,
}

impl Pipeline {
    pub fn new(id: &str, start_id: &str, end_id: &str) -> Self {
        Self {
            id: id.to_string(),
            start_event: Event::new(start_id),
            end_event: Event::new(end_id),
            activities: BTreeMap::new(),
            gateways: BTreeMap::new(),
            flows: BTreeMap::new(),
        }
    }

    pub fn add_activity(&mut self, activity: Activity) -> &mut Self {
        self.activities.insert(activity.id.clone(), activity);
        self
    }

    pub fn add_gateway(&mut self, gateway: Gateway) -> &mut Self {
        self.gateways.insert(gateway.id.clone(), gateway);
        self
    }

    /// Inserts a flow and records it on the source node's outgoing list when
    /// the source names a node in this pipeline.
    pub fn connect(&mut self, flow_id: &str, source: &str, target: &str) -> &mut Self {
        self.flows.insert(
            flow_id.to_string(),
            Flow {
                id: flow_id.to_string(),
                source: source.to_string(),
                target: target.to_string(),
            },
        );
        if let Some(outgoing) = self.outgoing_of_mut(source) {
            outgoing.push(flow_id.to_string());
        }
        self
    }

    fn outgoing_of_mut(&mut self, node_id: &str) -> Option<&mut FlowRefs> {
        if self.start_event.id == node_id {
            return Some(&mut self.start_event.outgoing);
        }
        if let Some(activity) = self.activities.get_mut(node_id) {
            return Some(&mut activity.outgoing);
        }
        self.gateways.get_mut(node_id).map(|g| &mut g.outgoing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Pending,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoContext {
    pub node_id: String,
}

/// Pending manual-approval marker. At most one open todo per running node
/// matters to layout; it only changes the node's badge, never its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub context: TodoContext,
    pub status: TodoStatus,
}

impl Todo {
    pub fn pending(id: &str, node_id: &str) -> Self {
        Self {
            id: id.to_string(),
            context: TodoContext {
                node_id: node_id.to_string(),
            },
            status: TodoStatus::Pending,
        }
    }
}

/// Node kind after normalization, exhaustively matched by the layout
/// stages: round narrow shapes for events and gateways, boxes for
/// activities, fan-out for parallel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    ServiceActivity,
    SubProcess,
    ParallelGateway,
    ConvergeGateway,
    ConditionalParallelGateway,
}

impl NodeKind {
    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            Self::ParallelGateway | Self::ConvergeGateway | Self::ConditionalParallelGateway
        )
    }

    pub fn is_event(self) -> bool {
        matches!(self, Self::StartEvent | Self::EndEvent)
    }

    pub fn is_round(self) -> bool {
        self.is_gateway() || self.is_event()
    }

    /// Fixed display label for marker and gateway nodes; activities keep
    /// the name the backend gave them.
    pub fn display_label(self) -> Option<&'static str> {
        match self {
            Self::StartEvent => Some("Start"),
            Self::EndEvent => Some("End"),
            Self::ParallelGateway => Some("Parallel Gateway"),
            Self::ConvergeGateway => Some("Convergence Gateway"),
            Self::ConditionalParallelGateway => Some("Conditional Parallel Gateway"),
            Self::ServiceActivity | Self::SubProcess => None,
        }
    }
}

/// Normalized node produced by the model reader: one flat record per node
/// at any nesting depth, annotated with execution status, the owning
/// sub-process (`parent`), and the pending-approval badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub status: NodeStatus,
    pub skip: bool,
    pub retry: u32,
    pub started_at: Option<u64>,
    pub updated_at: Option<u64>,
    pub outgoing: Vec<String>,
    pub todo_id: Option<String>,
    pub parent: Option<String>,
}
