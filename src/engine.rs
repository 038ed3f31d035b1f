//! The dflow engine: graph store, node dispatcher, sub-graph executor, and
//! the whole-run driver.
//!
//! A [`Dflow`] instance owns every table of one graph: the node list, the
//! pipe map (keyed by target pin id), the callable and template bindings,
//! the I/O-marker set, the context map, the output cache, and the arena of
//! lazily materialized sub-graph instances. A run executes each node once
//! in level order; execution is single-threaded and cooperative, suspending
//! only when an async callable is dispatched.

use futures_util::future::BoxFuture;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::errors::DflowError;
use crate::func::{CompileError, FuncCompiler, FuncKind, NodeFunc, NodeFuncDef};
use crate::graph::{Graph, GraphDeletion, GraphPatch, NodeDef};
use crate::scheduler::sorted_by_level;
use crate::types::{NodeId, Pin, PinId, Pipe};

/// Lifecycle of an engine instance across runs.
///
/// `Failed` is terminal for the run that produced it only; the instance
/// stays usable and the next run starts from a cleared cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Constructed,
    Ready,
    Running,
    Completed,
    Failed,
}

/// A dataflow graph engine.
///
/// # Examples
///
/// ```rust
/// use dflow::engine::Dflow;
/// use dflow::func::NodeFunc;
/// use dflow::types::Pipe;
/// use serde_json::json;
///
/// # fn main() -> Result<(), dflow::errors::DflowError> {
/// let mut engine = Dflow::new("halve");
/// engine.set_func("two", NodeFunc::sync(0, |_, _| Ok(json!(2.0))), None)?;
/// engine.set_func(
///     "halve",
///     NodeFunc::sync(1, |args, _| {
///         Ok(json!(args[0].as_f64().unwrap_or_default() / 2.0))
///     }),
///     None,
/// )?;
/// engine.add_node("two", "a");
/// engine.add_node("halve", "b");
/// engine.add_pipe(Pipe::new("a", "b"))?;
/// engine.run_sync()?;
/// assert_eq!(engine.output("b"), Some(&json!(1.0)));
/// # Ok(())
/// # }
/// ```
pub struct Dflow {
    name: String,
    /// Formal argument names of this graph, in declaration order.
    args: Vec<String>,
    /// Formal output names of this graph, in declaration order.
    outs: Vec<String>,
    /// Nodes in insertion order; schedule ties keep this order.
    nodes: Vec<NodeDef>,
    /// Target pin id -> source pin id.
    pipes: FxHashMap<PinId, PinId>,
    funcs: FxHashMap<String, NodeFunc>,
    /// Declared argument names per bound name; output markers carry
    /// the single-element `["out"]` list.
    arg_names: FxHashMap<String, Vec<String>>,
    /// Sub-graph templates by name.
    graphs: FxHashMap<String, Graph>,
    /// Names registered as formal arguments or outputs of this graph.
    io_names: FxHashSet<String>,
    /// Receivers by node id or name, resolved at dispatch time.
    contexts: FxHashMap<String, Value>,
    /// Output values by pin id, cleared per run.
    cache: FxHashMap<PinId, Value>,
    /// Sub-graph instances by owning node id, materialized lazily.
    children: FxHashMap<NodeId, Box<Dflow>>,
    compiler: Option<Arc<dyn FuncCompiler>>,
    status: RunStatus,
}

impl Dflow {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Dflow {
            name: name.into(),
            args: Vec::new(),
            outs: Vec::new(),
            nodes: Vec::new(),
            pipes: FxHashMap::default(),
            funcs: FxHashMap::default(),
            arg_names: FxHashMap::default(),
            graphs: FxHashMap::default(),
            io_names: FxHashSet::default(),
            contexts: FxHashMap::default(),
            cache: FxHashMap::default(),
            children: FxHashMap::default(),
            compiler: None,
            status: RunStatus::Constructed,
        }
    }

    /// Attach the code-to-callable compiler used by
    /// [`set_node_func`](Self::set_node_func).
    #[must_use]
    pub fn with_compiler(mut self, compiler: Arc<dyn FuncCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Build an engine from its persistence form: `args`/`outs` become the
    /// graph's I/O markers, then nodes and pipes are inserted.
    pub fn from_graph(graph: &Graph) -> Result<Self, DflowError> {
        let mut engine = Dflow::new(graph.name.clone());
        for arg in graph.args.iter().flatten() {
            engine.set_node_arg(arg.clone())?;
        }
        for out in graph.outs.iter().flatten() {
            engine.set_node_out(out.clone())?;
        }
        engine.insert(&GraphPatch {
            nodes: graph.nodes.clone(),
            pipes: graph.pipes.clone(),
        })?;
        Ok(engine)
    }

    /// Build an engine from the JSON persistence form.
    pub fn from_json(json: &str) -> Result<Self, DflowError> {
        let graph: Graph = serde_json::from_str(json)?;
        Dflow::from_graph(&graph)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    /// Pipes in a stable order (sorted by target pin id).
    #[must_use]
    pub fn pipes(&self) -> Vec<Pipe> {
        let mut targets: Vec<&PinId> = self.pipes.keys().collect();
        targets.sort();
        targets
            .into_iter()
            .map(|to| Pipe {
                from: Pin::decode(&self.pipes[to]),
                to: Pin::decode(to),
            })
            .collect()
    }

    #[must_use]
    pub fn output_cache(&self) -> &FxHashMap<PinId, Value> {
        &self.cache
    }

    /// Position-0 output of a node, if the last run produced one.
    #[must_use]
    pub fn output(&self, node_id: &str) -> Option<&Value> {
        self.cache.get(node_id)
    }

    #[must_use]
    pub fn output_at(&self, pin: &Pin) -> Option<&Value> {
        self.cache.get(&pin.encode())
    }

    /// Variant of the callable bound under `name`, if any.
    #[must_use]
    pub fn func_kind(&self, name: &str) -> Option<FuncKind> {
        self.funcs.get(name).map(NodeFunc::kind)
    }

    /// Declared argument names for a bound name.
    #[must_use]
    pub fn func_args(&self, name: &str) -> Option<&[String]> {
        self.arg_names.get(name).map(Vec::as_slice)
    }

    /// Sub-graph instance bound to `node_id`, once a run has materialized
    /// it.
    #[must_use]
    pub fn child(&self, node_id: &str) -> Option<&Dflow> {
        self.children.get(node_id).map(AsRef::as_ref)
    }

    /// True when any bound callable would suspend the driver. Sub-graph
    /// instances inherit their callables from this table, so the scan
    /// covers nested graphs as well.
    #[must_use]
    pub fn has_async_nodes(&self) -> bool {
        self.funcs.values().any(NodeFunc::is_async)
    }

    /// Insert a `(id, name)` node; an existing node with the same id is
    /// rebound to the new name. The name need not be bound yet.
    pub fn add_node(&mut self, name: impl Into<String>, id: impl Into<NodeId>) -> NodeId {
        let id = id.into();
        let name = name.into();
        match self.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => node.name = name,
            None => self.nodes.push(NodeDef::new(id.clone(), name)),
        }
        id
    }

    /// Remove a node and every pipe referencing it on either endpoint.
    pub fn del_node(&mut self, id: &str) {
        self.nodes.retain(|node| node.id != id);
        self.pipes.retain(|to, from| {
            Pin::decode(to).node_id() != id && Pin::decode(from).node_id() != id
        });
    }

    /// Connect an output pin to an input pin. A later pipe into the same
    /// input pin overwrites the earlier one.
    pub fn add_pipe(&mut self, pipe: Pipe) -> Result<(), DflowError> {
        let (source, target) = pipe.node_ids();
        if !self.has_node(source) || !self.has_node(target) {
            return Err(DflowError::BrokenPipe { pipe });
        }
        self.pipes.insert(pipe.to.encode(), pipe.from.encode());
        Ok(())
    }

    /// Remove the pipe feeding `to`.
    pub fn del_pipe(&mut self, to: &Pin) {
        self.pipes.remove(&to.encode());
    }

    /// Bulk insertion: nodes first, then pipes. A failing pipe propagates
    /// after the earlier insertions have landed.
    pub fn insert(&mut self, patch: &GraphPatch) -> Result<(), DflowError> {
        for node in &patch.nodes {
            self.add_node(node.name.clone(), node.id.clone());
        }
        for pipe in &patch.pipes {
            self.add_pipe(pipe.clone())?;
        }
        if self.status == RunStatus::Constructed {
            self.status = RunStatus::Ready;
        }
        Ok(())
    }

    /// Atomic bulk deletion: listed nodes go first, then every pipe left
    /// with a missing endpoint is collected, and the listed pipes plus
    /// that collected set are removed. Returns everything removed.
    pub fn delete(&mut self, deletion: &GraphDeletion) -> Graph {
        let doomed: FxHashSet<&str> = deletion.nodes.iter().map(String::as_str).collect();
        let mut removed_nodes = Vec::new();
        self.nodes.retain(|node| {
            if doomed.contains(node.id.as_str()) {
                removed_nodes.push(node.clone());
                false
            } else {
                true
            }
        });

        let listed: FxHashSet<PinId> = deletion.pipes.iter().map(Pin::encode).collect();
        let mut targets: Vec<PinId> = self.pipes.keys().cloned().collect();
        targets.sort();
        let mut removed_pipes = Vec::new();
        for to in targets {
            let from = self.pipes[&to].clone();
            let orphaned = !self.has_node(Pin::decode(&to).node_id())
                || !self.has_node(Pin::decode(&from).node_id());
            if orphaned || listed.contains(&to) {
                self.pipes.remove(&to);
                removed_pipes.push(Pipe {
                    from: Pin::decode(&from),
                    to: Pin::decode(&to),
                });
            }
        }

        Graph {
            name: self.name.clone(),
            args: None,
            outs: None,
            nodes: removed_nodes,
            pipes: removed_pipes,
        }
    }

    /// Compile `code` and bind the result under `def.name`, selecting the
    /// compiler factory with [`FuncKind::classify`] on the joined body.
    pub fn set_node_func(&mut self, def: &NodeFuncDef) -> Result<(), DflowError> {
        self.assert_free_for_func(&def.name)?;
        let compiler = self
            .compiler
            .as_ref()
            .ok_or_else(|| CompileError::msg("no compiler configured"))?
            .clone();
        let args = def.args.clone().unwrap_or_default();
        let body = def.code.join();
        let arity = args.len();
        let func = match FuncKind::classify(&body) {
            FuncKind::Sync => NodeFunc::Sync {
                arity,
                call: compiler.compile_func(&args, &body)?,
            },
            FuncKind::Async => NodeFunc::Async {
                arity,
                call: compiler.compile_async_func(&args, &body)?,
            },
            FuncKind::Generator => NodeFunc::Generator {
                arity,
                call: compiler.compile_generator_func(&args, &body)?,
            },
            FuncKind::AsyncGenerator => NodeFunc::AsyncGenerator {
                arity,
                call: compiler.compile_async_generator_func(&args, &body)?,
            },
        };
        self.arg_names.insert(def.name.clone(), args);
        self.funcs.insert(def.name.clone(), func);
        Ok(())
    }

    /// Bind an already-compiled callable. With `args` omitted and a
    /// declared arity `n > 0`, the names `arg0..arg{n-1}` are synthesized.
    pub fn set_func(
        &mut self,
        name: impl Into<String>,
        func: NodeFunc,
        args: Option<Vec<String>>,
    ) -> Result<(), DflowError> {
        let name = name.into();
        self.assert_free_for_func(&name)?;
        let args = match args {
            Some(args) => args,
            None => (0..func.arity()).map(|i| format!("arg{i}")).collect(),
        };
        self.arg_names.insert(name.clone(), args);
        self.funcs.insert(name, func);
        Ok(())
    }

    /// Register `name` as a formal argument of this graph. Nodes carrying
    /// the name act as input markers inside a sub-graph instance.
    pub fn set_node_arg(&mut self, name: impl Into<String>) -> Result<(), DflowError> {
        let name = name.into();
        self.assert_free_for_marker(&name)?;
        self.io_names.insert(name.clone());
        self.args.push(name);
        Ok(())
    }

    /// Register `name` as a formal output of this graph. Output-marker
    /// nodes take a single `out` input at position 0.
    pub fn set_node_out(&mut self, name: impl Into<String>) -> Result<(), DflowError> {
        let name = name.into();
        self.assert_free_for_marker(&name)?;
        self.io_names.insert(name.clone());
        self.arg_names
            .insert(name.clone(), vec!["out".to_string()]);
        self.outs.push(name);
        Ok(())
    }

    /// Register a sub-graph template under its name. Instances materialize
    /// lazily, once per node bound to the name.
    pub fn set_node_graph(&mut self, graph: Graph) -> Result<(), DflowError> {
        self.assert_free_for_graph(&graph.name)?;
        self.arg_names
            .insert(graph.name.clone(), graph.args.clone().unwrap_or_default());
        self.graphs.insert(graph.name.clone(), graph);
        Ok(())
    }

    /// Receiver handed to callables at dispatch time, keyed by node id or
    /// name; node id wins when both are present.
    pub fn set_context(&mut self, key: impl Into<String>, value: Value) {
        self.contexts.insert(key.into(), value);
    }

    /// The unique pipe feeding `target`, if any.
    #[must_use]
    pub fn pipe_of_target(&self, target: &Pin) -> Option<Pipe> {
        let to = target.encode();
        self.pipes.get(&to).map(|from| Pipe {
            from: Pin::decode(from),
            to: Pin::decode(&to),
        })
    }

    /// Input values for a node, one per declared argument position: the
    /// cached upstream output, or `Null` when no pipe (or no cached value)
    /// feeds the position.
    pub fn arg_values(&self, node_id: &str) -> Result<Vec<Value>, DflowError> {
        let name = self
            .node_name(node_id)
            .ok_or_else(|| DflowError::NodeNotFound {
                node_id: node_id.to_string(),
            })?;
        let arity = self.arg_names.get(name).map_or(0, Vec::len);
        let values = (0..arity)
            .map(|position| {
                self.pipes
                    .get(&Pin::slot(node_id, position as u32).encode())
                    .and_then(|source| self.cache.get(source))
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();
        Ok(values)
    }

    /// Execute every node once in dependency order, awaiting async
    /// callables. The output cache is cleared before the first node runs.
    #[instrument(skip(self), fields(graph = %self.name), err)]
    pub async fn run(&mut self) -> Result<(), DflowError> {
        self.cache.clear();
        self.run_boxed().await
    }

    /// Synchronous whole-run entry point. Fails fast on graphs with async
    /// nodes, so purely synchronous graphs complete without entering any
    /// wait primitive.
    #[instrument(skip(self), fields(graph = %self.name), err)]
    pub fn run_sync(&mut self) -> Result<(), DflowError> {
        if self.has_async_nodes() {
            return Err(DflowError::HasAsyncNodes {
                name: self.name.clone(),
            });
        }
        self.cache.clear();
        self.run_sync_inner()
    }

    /// The persistence form of this engine. Round-trips modulo pin
    /// canonicalization.
    #[must_use]
    pub fn to_graph(&self) -> Graph {
        Graph {
            name: self.name.clone(),
            args: (!self.args.is_empty()).then(|| self.args.clone()),
            outs: (!self.outs.is_empty()).then(|| self.outs.clone()),
            nodes: self.nodes.clone(),
            pipes: self.pipes(),
        }
    }

    /// JSON form of [`to_graph`](Self::to_graph).
    pub fn to_json(&self) -> Result<String, DflowError> {
        Ok(serde_json::to_string(&self.to_graph())?)
    }

    fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    fn node_name(&self, id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.name.as_str())
    }

    /// A name may serve one callable and one template at once (the
    /// callable fires first, then the sub-graph); markers exclude both.
    fn assert_free_for_func(&self, name: &str) -> Result<(), DflowError> {
        if self.funcs.contains_key(name) || self.io_names.contains(name) {
            return Err(DflowError::NodeOverride {
                node_name: name.to_string(),
            });
        }
        Ok(())
    }

    fn assert_free_for_graph(&self, name: &str) -> Result<(), DflowError> {
        if self.graphs.contains_key(name) || self.io_names.contains(name) {
            return Err(DflowError::NodeOverride {
                node_name: name.to_string(),
            });
        }
        Ok(())
    }

    fn assert_free_for_marker(&self, name: &str) -> Result<(), DflowError> {
        if self.io_names.contains(name)
            || self.funcs.contains_key(name)
            || self.graphs.contains_key(name)
        {
            return Err(DflowError::NodeOverride {
                node_name: name.to_string(),
            });
        }
        Ok(())
    }

    fn run_boxed(&mut self) -> BoxFuture<'_, Result<(), DflowError>> {
        Box::pin(async move {
            self.status = RunStatus::Running;
            let pipes = self.pipes();
            let schedule = sorted_by_level(&self.nodes, &pipes);
            let mut result = Ok(());
            for entry in schedule {
                if !entry.level.is_finite() {
                    warn!(
                        node_id = %entry.node.id,
                        name = %entry.node.name,
                        "skipping unschedulable node on a cycle"
                    );
                    continue;
                }
                if let Err(error) = self.step(&entry.node).await {
                    result = Err(error);
                    break;
                }
            }
            self.status = if result.is_ok() {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            };
            result
        })
    }

    fn run_sync_inner(&mut self) -> Result<(), DflowError> {
        self.status = RunStatus::Running;
        let pipes = self.pipes();
        let schedule = sorted_by_level(&self.nodes, &pipes);
        let mut result = Ok(());
        for entry in schedule {
            if !entry.level.is_finite() {
                warn!(
                    node_id = %entry.node.id,
                    name = %entry.node.name,
                    "skipping unschedulable node on a cycle"
                );
                continue;
            }
            if let Err(error) = self.step_sync(&entry.node) {
                result = Err(error);
                break;
            }
        }
        self.status = if result.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        result
    }

    /// Dispatch one scheduled node: materialize its sub-graph instance if
    /// its name has a template, invoke its callable, then run the
    /// sub-graph. A node whose name resolves to nothing is a silent no-op.
    async fn step(&mut self, node: &NodeDef) -> Result<(), DflowError> {
        if self.graphs.contains_key(&node.name) && !self.children.contains_key(&node.id) {
            self.materialize(node)
                .map_err(|error| Self::execution_error(node, &error))?;
        }
        let args = self.arg_values(&node.id)?;
        if let Some(func) = self.funcs.get(&node.name).cloned() {
            let context = self
                .contexts
                .get(&node.id)
                .or_else(|| self.contexts.get(&node.name))
                .cloned();
            match func {
                NodeFunc::Sync { call, .. } => {
                    let value = call(&args, context.as_ref())
                        .map_err(|error| Self::execution_error(node, &error))?;
                    self.cache.insert(node.id.clone(), value);
                }
                NodeFunc::Async { call, .. } => {
                    let value = call(args.clone(), context)
                        .await
                        .map_err(|error| Self::execution_error(node, &error))?;
                    self.cache.insert(node.id.clone(), value);
                }
                NodeFunc::Generator { .. } | NodeFunc::AsyncGenerator { .. } => {
                    debug!(
                        node_id = %node.id,
                        name = %node.name,
                        "generator funcs are recognized but not executed"
                    );
                }
            }
        }
        if self.children.contains_key(&node.id) {
            self.run_child(node, &args).await?;
        }
        Ok(())
    }

    fn step_sync(&mut self, node: &NodeDef) -> Result<(), DflowError> {
        if self.graphs.contains_key(&node.name) && !self.children.contains_key(&node.id) {
            self.materialize(node)
                .map_err(|error| Self::execution_error(node, &error))?;
        }
        let args = self.arg_values(&node.id)?;
        if let Some(func) = self.funcs.get(&node.name).cloned() {
            let context = self
                .contexts
                .get(&node.id)
                .or_else(|| self.contexts.get(&node.name))
                .cloned();
            match func {
                NodeFunc::Sync { call, .. } => {
                    let value = call(&args, context.as_ref())
                        .map_err(|error| Self::execution_error(node, &error))?;
                    self.cache.insert(node.id.clone(), value);
                }
                // Unreachable behind the has_async_nodes entry check.
                NodeFunc::Async { .. } => {
                    return Err(DflowError::HasAsyncNodes {
                        name: self.name.clone(),
                    });
                }
                NodeFunc::Generator { .. } | NodeFunc::AsyncGenerator { .. } => {
                    debug!(
                        node_id = %node.id,
                        name = %node.name,
                        "generator funcs are recognized but not executed"
                    );
                }
            }
        }
        if self.children.contains_key(&node.id) {
            self.run_child_sync(node, &args)?;
        }
        Ok(())
    }

    /// Build the sub-graph instance for `node`, inheriting every callable
    /// whose name is not shadowed by the nested graph's own I/O markers.
    /// Inheritance copies the callable, its argument-name list, and its
    /// context entry, as a snapshot: later mutation of this engine's
    /// tables does not reach an already-materialized child.
    fn materialize(&mut self, node: &NodeDef) -> Result<(), DflowError> {
        if self.children.contains_key(&node.id) {
            return Ok(());
        }
        let Some(template) = self.graphs.get(&node.name) else {
            return Ok(());
        };
        let mut child = Dflow::from_graph(template)?;
        child.compiler = self.compiler.clone();
        for (name, func) in &self.funcs {
            if child.io_names.contains(name) {
                continue;
            }
            child.funcs.insert(name.clone(), func.clone());
            if let Some(args) = self.arg_names.get(name) {
                child.arg_names.insert(name.clone(), args.clone());
            }
            if let Some(context) = self.contexts.get(name) {
                child.contexts.insert(name.clone(), context.clone());
            }
        }
        self.children.insert(node.id.clone(), Box::new(child));
        Ok(())
    }

    async fn run_child(&mut self, node: &NodeDef, args: &[Value]) -> Result<(), DflowError> {
        let Some(mut child) = self.children.remove(&node.id) else {
            return Ok(());
        };
        Self::inject_child_args(&mut child, args);
        let result = child.run_boxed().await;
        if result.is_ok() {
            self.extract_child_outputs(node, &child);
        }
        self.children.insert(node.id.clone(), child);
        result.map_err(|error| Self::execution_error(node, &error))
    }

    fn run_child_sync(&mut self, node: &NodeDef, args: &[Value]) -> Result<(), DflowError> {
        let Some(mut child) = self.children.remove(&node.id) else {
            return Ok(());
        };
        Self::inject_child_args(&mut child, args);
        let result = child.run_sync_inner();
        if result.is_ok() {
            self.extract_child_outputs(node, &child);
        }
        self.children.insert(node.id.clone(), child);
        result.map_err(|error| Self::execution_error(node, &error))
    }

    /// Seed the child's argument-marker pins: a nested node whose name is
    /// the formal argument at `position` holds that argument's value at
    /// its `position` output before the child runs.
    fn inject_child_args(child: &mut Dflow, args: &[Value]) {
        child.cache.clear();
        for (position, arg_name) in child.args.iter().enumerate() {
            let Some(value) = args.get(position) else {
                continue;
            };
            for sub in &child.nodes {
                if sub.name == *arg_name {
                    child
                        .cache
                        .insert(Pin::slot(sub.id.as_str(), position as u32).encode(), value.clone());
                }
            }
        }
    }

    /// Project the child's output markers back into this cache: for a
    /// nested node whose name is the formal output at `position`, follow
    /// its position-0 inbound pipe and copy the source value to this
    /// node's `position` output pin.
    fn extract_child_outputs(&mut self, node: &NodeDef, child: &Dflow) {
        for (position, out_name) in child.outs.iter().enumerate() {
            for sub in &child.nodes {
                if sub.name != *out_name {
                    continue;
                }
                let Some(pipe) = child.pipe_of_target(&Pin::Id(sub.id.clone())) else {
                    continue;
                };
                let Some(value) = child.cache.get(&pipe.from.encode()) else {
                    continue;
                };
                self.cache.insert(
                    Pin::slot(node.id.as_str(), position as u32).encode(),
                    value.clone(),
                );
            }
        }
    }

    fn execution_error(node: &NodeDef, source: &dyn fmt::Display) -> DflowError {
        DflowError::NodeExecution {
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            message: source.to_string(),
        }
    }
}

impl fmt::Display for Dflow {
    /// One-line summary: the graph name plus args/nodes/pipes/outs counts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dflow name={} args={} nodes={} pipes={} outs={}",
            self.name,
            self.args.len(),
            self.nodes.len(),
            self.pipes.len(),
            self.outs.len()
        )
    }
}
