//! Engine error taxonomy.

use miette::Diagnostic;
use serde_json::{json, Value};
use thiserror::Error;

use crate::func::CompileError;
use crate::types::{NodeId, Pipe};

/// Errors surfaced by graph mutation and execution.
///
/// The first four variants are wire-visible through [`to_value`](Self::to_value);
/// the remainder are host-side conditions that never leave the process in
/// normal operation but serialize in the same shape for uniformity.
#[derive(Debug, Error, Diagnostic)]
pub enum DflowError {
    /// A pipe referenced a node id absent from the graph.
    #[error("broken pipe: {pipe}")]
    #[diagnostic(
        code(dflow::broken_pipe),
        help("add both endpoint nodes before connecting them")
    )]
    BrokenPipe { pipe: Pipe },

    /// A callable or sub-graph failed; execution stops at this node.
    #[error("node {node_id} ({node_name}) failed: {message}")]
    #[diagnostic(code(dflow::node_execution))]
    NodeExecution {
        node_id: NodeId,
        node_name: String,
        message: String,
    },

    #[error("node not found: {node_id}")]
    #[diagnostic(code(dflow::node_not_found))]
    NodeNotFound { node_id: NodeId },

    /// The name is already bound to a callable, template, or I/O marker.
    #[error("node name already in use: {node_name}")]
    #[diagnostic(code(dflow::node_override))]
    NodeOverride { node_name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(code(dflow::serde_json))]
    Serde(#[from] serde_json::Error),

    /// The synchronous entry point was called on a graph with async nodes.
    #[error("graph '{name}' has async nodes; use the async run entry point")]
    #[diagnostic(
        code(dflow::has_async_nodes),
        help("check has_async_nodes() before choosing run_sync()")
    )]
    HasAsyncNodes { name: String },
}

impl DflowError {
    /// Wire-visible shape: `{errorName, …payload}`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            DflowError::BrokenPipe { pipe } => json!({
                "errorName": "DflowErrorBrokenPipe",
                "pipe": pipe,
            }),
            DflowError::NodeExecution {
                node_id,
                node_name,
                message,
            } => json!({
                "errorName": "DflowErrorNodeExecution",
                "nodeId": node_id,
                "nodeName": node_name,
                "nodeErrorMessage": message,
            }),
            DflowError::NodeNotFound { node_id } => json!({
                "errorName": "DflowErrorNodeNotFound",
                "nodeId": node_id,
            }),
            DflowError::NodeOverride { node_name } => json!({
                "errorName": "DflowErrorNodeOverride",
                "nodeName": node_name,
            }),
            DflowError::Compile(error) => json!({
                "errorName": "DflowErrorCompile",
                "message": error.to_string(),
            }),
            DflowError::Serde(error) => json!({
                "errorName": "DflowErrorSerde",
                "message": error.to_string(),
            }),
            DflowError::HasAsyncNodes { name } => json!({
                "errorName": "DflowErrorHasAsyncNodes",
                "graphName": name,
            }),
        }
    }
}
