//! Optional petgraph compatibility layer.
//!
//! Converts an engine's nodes and pipes into a petgraph
//! [`DiGraph`](petgraph::graph::DiGraph), enabling petgraph's algorithm
//! library for analysis and DOT visualization. Pipe positions are erased:
//! two pins on the same node pair collapse to parallel edges.
//!
//! Only available with the `petgraph-compat` feature:
//!
//! ```toml
//! [dependencies]
//! dflow = { version = "0.1", features = ["petgraph-compat"] }
//! ```

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::engine::Dflow;
use crate::types::NodeId;

/// A petgraph-compatible directed graph; node weights are dflow node ids.
pub type DflowDiGraph = DiGraph<NodeId, ()>;

/// Mapping from node id to petgraph index, for lookups in the converted
/// graph.
pub type NodeIndexMap = FxHashMap<NodeId, NodeIndex>;

/// Result of converting an engine's topology to petgraph form.
#[derive(Debug, Clone)]
pub struct PetgraphConversion {
    pub graph: DflowDiGraph,
    pub indices: NodeIndexMap,
}

impl Dflow {
    /// Convert this engine's topology into a petgraph directed graph.
    #[must_use]
    pub fn to_petgraph(&self) -> PetgraphConversion {
        let mut graph = DiGraph::new();
        let mut indices = NodeIndexMap::default();
        for node in self.nodes() {
            indices.insert(node.id.clone(), graph.add_node(node.id.clone()));
        }
        for pipe in self.pipes() {
            let (source, target) = pipe.node_ids();
            if let (Some(&from), Some(&to)) = (indices.get(source), indices.get(target)) {
                graph.add_edge(from, to, ());
            }
        }
        PetgraphConversion { graph, indices }
    }

    /// Export the topology in DOT format for visualization.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let conversion = self.to_petgraph();
        format!(
            "{:?}",
            Dot::with_config(&conversion.graph, &[Config::EdgeNoLabel])
        )
    }

    /// Cycle check backed by petgraph; agrees with the scheduler's
    /// infinite-level classification.
    #[must_use]
    pub fn is_cyclic_petgraph(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_petgraph().graph)
    }
}
