use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::FlowError;
use crate::model::{Activity, ActivityKind, Event, FlowNode, NodeKind, Pipeline, Todo, TodoStatus};

/// Bidirectional mapping between a sub-process activity and the start event
/// of its nested pipeline, used to splice nested layouts into the parent.
#[derive(Debug, Default, Clone)]
pub struct SubProcessBoundary {
    start_to_activity: HashMap<String, String>,
    activity_to_start: HashMap<String, String>,
}

impl SubProcessBoundary {
    pub fn activity_of_start(&self, start_id: &str) -> Option<&str> {
        self.start_to_activity.get(start_id).map(String::as_str)
    }

    pub fn start_of_activity(&self, activity_id: &str) -> Option<&str> {
        self.activity_to_start.get(activity_id).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FlowEndpoints {
    pub source: String,
    pub target: String,
}

/// Flat index over one pipeline document: every node at every nesting depth
/// keyed by id, document order preserved, start/end markers flagged, and
/// every flow collected for the edge resolver.
#[derive(Debug, Default)]
pub struct PipelineIndex {
    order: Vec<String>,
    nodes_by_id: BTreeMap<String, FlowNode>,
    pub(crate) start_end_ids: HashSet<String>,
    pub(crate) boundary: SubProcessBoundary,
    pub(crate) flows_by_id: HashMap<String, FlowEndpoints>,
    pub(crate) flow_order: Vec<String>,
    /// Id of the outermost start event.
    pub root_start: String,
    /// Id of the outermost end event.
    pub root_end: String,
}

impl PipelineIndex {
    pub fn get(&self, id: &str) -> Option<&FlowNode> {
        self.nodes_by_id.get(id)
    }

    /// Nodes in document order: start event, activities (each sub-process
    /// followed by its interior), gateways, end event.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.order.iter().filter_map(|id| self.nodes_by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn boundary(&self) -> &SubProcessBoundary {
        &self.boundary
    }

    fn insert(&mut self, node: FlowNode) -> Result<(), FlowError> {
        if self.nodes_by_id.contains_key(&node.id) {
            return Err(FlowError::DuplicateNodeId(node.id));
        }
        self.order.push(node.id.clone());
        self.nodes_by_id.insert(node.id.clone(), node);
        Ok(())
    }
}

/// Normalizes a raw pipeline document into the flat node/flow index and
/// annotates nodes with their pending-approval badge. Fails fast on
/// duplicate node ids and on pipelines without usable start/end events.
pub fn read(pipeline: &Pipeline, todos: &[Todo]) -> Result<PipelineIndex, FlowError> {
    let mut index = PipelineIndex {
        root_start: pipeline.start_event.id.clone(),
        root_end: pipeline.end_event.id.clone(),
        ..PipelineIndex::default()
    };
    walk(pipeline, None, &mut index)?;

    for todo in todos {
        if todo.status != TodoStatus::Pending {
            continue;
        }
        if let Some(node) = index.nodes_by_id.get_mut(&todo.context.node_id) {
            node.todo_id = Some(todo.id.clone());
        }
    }

    Ok(index)
}

fn walk(
    pipeline: &Pipeline,
    parent: Option<&str>,
    index: &mut PipelineIndex,
) -> Result<(), FlowError> {
    if pipeline.start_event.id.is_empty() || pipeline.end_event.id.is_empty() {
        return Err(FlowError::MalformedPipeline(pipeline.id.clone()));
    }

    index.insert(event_node(&pipeline.start_event, NodeKind::StartEvent, parent))?;
    index.start_end_ids.insert(pipeline.start_event.id.clone());

    for activity in pipeline.activities.values() {
        index.insert(activity_node(activity, parent))?;
        if activity.kind == ActivityKind::SubProcess {
            let Some(nested) = activity.pipeline.as_deref() else {
                return Err(FlowError::MalformedPipeline(activity.id.clone()));
            };
            index
                .boundary
                .start_to_activity
                .insert(nested.start_event.id.clone(), activity.id.clone());
            index
                .boundary
                .activity_to_start
                .insert(activity.id.clone(), nested.start_event.id.clone());
            walk(nested, Some(&activity.id), index)?;
        }
    }

    for gateway in pipeline.gateways.values() {
        let kind = match gateway.kind {
            crate::model::GatewayKind::ParallelGateway => NodeKind::ParallelGateway,
            crate::model::GatewayKind::ConvergeGateway => NodeKind::ConvergeGateway,
            crate::model::GatewayKind::ConditionalParallelGateway => {
                NodeKind::ConditionalParallelGateway
            }
        };
        index.insert(FlowNode {
            id: gateway.id.clone(),
            kind,
            name: kind
                .display_label()
                .unwrap_or_default()
                .to_string(),
            status: gateway.status,
            skip: false,
            retry: 0,
            started_at: None,
            updated_at: None,
            outgoing: gateway.outgoing.iter().map(str::to_string).collect(),
            todo_id: None,
            parent: parent.map(str::to_string),
        })?;
    }

    index.insert(event_node(&pipeline.end_event, NodeKind::EndEvent, parent))?;
    index.start_end_ids.insert(pipeline.end_event.id.clone());

    for flow in pipeline.flows.values() {
        index.flows_by_id.insert(
            flow.id.clone(),
            FlowEndpoints {
                source: flow.source.clone(),
                target: flow.target.clone(),
            },
        );
        index.flow_order.push(flow.id.clone());
    }

    Ok(())
}

fn event_node(event: &Event, kind: NodeKind, parent: Option<&str>) -> FlowNode {
    FlowNode {
        id: event.id.clone(),
        kind,
        name: kind.display_label().unwrap_or_default().to_string(),
        status: event.status,
        skip: false,
        retry: 0,
        started_at: None,
        updated_at: None,
        outgoing: event.outgoing.iter().map(str::to_string).collect(),
        todo_id: None,
        parent: parent.map(str::to_string),
    }
}

fn activity_node(activity: &Activity, parent: Option<&str>) -> FlowNode {
    let kind = match activity.kind {
        ActivityKind::ServiceActivity => NodeKind::ServiceActivity,
        ActivityKind::SubProcess => NodeKind::SubProcess,
    };
    FlowNode {
        id: activity.id.clone(),
        kind,
        name: activity.name.clone(),
        status: activity.status,
        skip: activity.skip,
        retry: activity.retry,
        started_at: activity.started_at,
        updated_at: activity.updated_at,
        outgoing: activity.outgoing.iter().map(str::to_string).collect(),
        todo_id: None,
        parent: parent.map(str::to_string),
    }
}
