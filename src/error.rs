use thiserror::Error;

/// Errors raised while indexing and laying out a pipeline document.
///
/// `DuplicateNodeId` and `MalformedPipeline` are fatal: the layout pass
/// aborts and the caller decides what to show. `UnresolvedEdge` is
/// recoverable — the edge resolver drops the offending edge, logs it, and
/// keeps rendering the rest of the graph.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    #[error("node id '{0}' appears more than once across the pipeline document")]
    DuplicateNodeId(String),

    #[error("pipeline '{0}' is missing a start or end event")]
    MalformedPipeline(String),

    #[error("flow '{flow_id}' endpoint '{endpoint}' does not resolve to any node")]
    UnresolvedEdge { flow_id: String, endpoint: String },
}
