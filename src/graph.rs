//! The lossless persistence form of a graph.
//!
//! A [`Graph`] value is the accepted input to engine construction, the
//! payload of a sub-graph template, and the emitted output of
//! serialization. [`GraphPatch`] and [`GraphDeletion`] are the bulk
//! insertion and deletion payloads.

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, Pin, Pipe};

/// A `(id, name)` node association.
///
/// The name need not be bound at the time the node is added; it resolves
/// at run time to a callable, a sub-graph template, or an I/O marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: NodeId,
    pub name: String,
}

impl NodeDef {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        NodeDef {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Serializable graph value.
///
/// Round-trips losslessly through serde provided no pipe uses a
/// non-canonical `(node_id, 0)` pin; such pins canonicalize to the bare
/// node id.
///
/// # Examples
///
/// ```rust
/// use dflow::graph::Graph;
///
/// let template = Graph::named("double-it")
///     .with_args(["input"])
///     .with_outs(["output"])
///     .with_node("input", "input")
///     .with_node("d", "double")
///     .with_node("output", "output")
///     .with_pipe("input", "d")
///     .with_pipe("d", "output");
///
/// let json = serde_json::to_string(&template).unwrap();
/// let back: Graph = serde_json::from_str(&json).unwrap();
/// assert_eq!(back, template);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub name: String,
    /// Formal argument names, in position order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Formal output names, in position order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outs: Option<Vec<String>>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub pipes: Vec<Pipe>,
}

impl Graph {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Graph {
            name: name.into(),
            ..Graph::default()
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_outs<I, S>(mut self, outs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outs = Some(outs.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_node(mut self, id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        self.nodes.push(NodeDef::new(id, name));
        self
    }

    #[must_use]
    pub fn with_pipe(mut self, from: impl Into<Pin>, to: impl Into<Pin>) -> Self {
        self.pipes.push(Pipe::new(from, to));
        self
    }
}

/// Bulk-insertion payload: nodes are inserted first, then pipes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPatch {
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub pipes: Vec<Pipe>,
}

/// Bulk-deletion payload. Pipes are addressed by their target pin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDeletion {
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub pipes: Vec<Pin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_parts() {
        let graph = Graph::named("g")
            .with_node("a", "one")
            .with_node("b", "two")
            .with_pipe("a", ("b", 1));
        assert_eq!(graph.name, "g");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.pipes, vec![Pipe::new("a", ("b", 1))]);
        assert!(graph.args.is_none());
        assert!(graph.outs.is_none());
    }

    #[test]
    fn absent_lists_are_omitted_from_json() {
        let json = serde_json::to_string(&Graph::named("g")).unwrap();
        assert!(!json.contains("args"));
        assert!(!json.contains("outs"));
    }

    #[test]
    fn patch_fields_default() {
        let patch: GraphPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.nodes.is_empty());
        assert!(patch.pipes.is_empty());
    }
}
