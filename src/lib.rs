//! ```text
//! Graph (persistence form) ──► Dflow::from_graph ──► run() / run_sync()
//!                                    │                     │
//!   set_func / set_node_func ────────┤                     ├─► scheduler: levels + stable order
//!   set_node_graph (templates) ──────┤                     ├─► dispatcher: sync / async callables
//!   set_node_arg / set_node_out ─────┘                     └─► sub-graph instances (inject, run, extract)
//! ```
//!
//! Dflow is a minimal dataflow programming engine. A program is a directed
//! graph of named nodes connected by pipes; each run executes every node
//! once in dependency order, feeding inputs from upstream outputs and
//! recording results in a per-engine output cache. A node's name resolves
//! to a callable (sync or async), a sub-graph template executed recursively
//! with its own argument and output mapping, or an I/O marker inside such a
//! template.
//!
//! The engine never compiles code itself; user source is turned into
//! callables by a [`FuncCompiler`](func::FuncCompiler) collaborator, with
//! the callable variant chosen by a lightweight textual heuristic.

pub mod engine;
pub mod errors;
pub mod func;
pub mod graph;
#[cfg(feature = "petgraph-compat")]
pub mod petgraph_compat;
pub mod scheduler;
pub mod types;
