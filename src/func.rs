//! Callable bindings and the code-to-callable compiler seam.
//!
//! The engine consumes callables in four variants mirroring the compiler's
//! factories: plain, async, generator, and async generator. Variant
//! identity is carried by the [`NodeFunc`] tag, chosen from the submitted
//! source text by [`FuncKind::classify`]; only the `Sync` and `Async`
//! variants are dispatched, the generator variants are recognized and
//! skipped by the driver.
//!
//! Compiling text into a callable is not the engine's job: a host-specific
//! [`FuncCompiler`] collaborator provides the four factories, and the
//! engine only decides which one to call.

use futures_util::future::BoxFuture;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a user callable at dispatch time.
///
/// The engine wraps it into a node-execution error carrying the offending
/// node's identity; the message text survives the wrapping.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(dflow::func))]
pub struct FuncError {
    pub message: String,
}

impl FuncError {
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        FuncError {
            message: message.into(),
        }
    }
}

/// Error raised by a [`FuncCompiler`] factory.
#[derive(Debug, Error, Diagnostic)]
#[error("compile failed: {message}")]
#[diagnostic(code(dflow::compile))]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
        }
    }
}

/// Synchronous callable: positional argument values plus an optional
/// receiver resolved from the context map.
pub type SyncCall =
    Arc<dyn Fn(&[Value], Option<&Value>) -> Result<Value, FuncError> + Send + Sync>;

/// Asynchronous callable; the driver awaits the returned future before
/// moving to the next scheduled node.
pub type AsyncCall = Arc<
    dyn Fn(Vec<Value>, Option<Value>) -> BoxFuture<'static, Result<Value, FuncError>>
        + Send
        + Sync,
>;

/// Callable variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncKind {
    Sync,
    Async,
    Generator,
    AsyncGenerator,
}

impl FuncKind {
    /// Select the compiler factory from the submitted code.
    ///
    /// `await` without `yield` is async; `yield` without `await` is a
    /// generator; both make an async generator; neither makes a plain
    /// function.
    ///
    /// ```rust
    /// # use dflow::func::FuncKind;
    /// assert_eq!(FuncKind::classify("return a + b"), FuncKind::Sync);
    /// assert_eq!(FuncKind::classify("return await fetch(url)"), FuncKind::Async);
    /// assert_eq!(FuncKind::classify("yield 1"), FuncKind::Generator);
    /// assert_eq!(FuncKind::classify("yield await next()"), FuncKind::AsyncGenerator);
    /// ```
    #[must_use]
    pub fn classify(code: &str) -> Self {
        match (code.contains("await"), code.contains("yield")) {
            (false, false) => FuncKind::Sync,
            (true, false) => FuncKind::Async,
            (false, true) => FuncKind::Generator,
            (true, true) => FuncKind::AsyncGenerator,
        }
    }
}

impl fmt::Display for FuncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncKind::Sync => write!(f, "func"),
            FuncKind::Async => write!(f, "async func"),
            FuncKind::Generator => write!(f, "generator func"),
            FuncKind::AsyncGenerator => write!(f, "async generator func"),
        }
    }
}

/// A bound callable with its declared arity.
///
/// The declared arity stands in for reflective arity inspection: when a
/// binding omits its argument names, `arg0..arg{n-1}` are synthesized from
/// it.
#[derive(Clone)]
pub enum NodeFunc {
    Sync { arity: usize, call: SyncCall },
    Async { arity: usize, call: AsyncCall },
    /// Recognized but never dispatched.
    Generator { arity: usize, call: SyncCall },
    /// Recognized but never dispatched.
    AsyncGenerator { arity: usize, call: AsyncCall },
}

impl NodeFunc {
    /// Bind a plain synchronous callable.
    pub fn sync<F>(arity: usize, call: F) -> Self
    where
        F: Fn(&[Value], Option<&Value>) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        NodeFunc::Sync {
            arity,
            call: Arc::new(call),
        }
    }

    /// Bind an asynchronous callable.
    pub fn async_fn<F>(arity: usize, call: F) -> Self
    where
        F: Fn(Vec<Value>, Option<Value>) -> BoxFuture<'static, Result<Value, FuncError>>
            + Send
            + Sync
            + 'static,
    {
        NodeFunc::Async {
            arity,
            call: Arc::new(call),
        }
    }

    /// Bind a generator callable; the driver recognizes it and skips it.
    pub fn generator<F>(arity: usize, call: F) -> Self
    where
        F: Fn(&[Value], Option<&Value>) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        NodeFunc::Generator {
            arity,
            call: Arc::new(call),
        }
    }

    /// Bind an async generator callable; the driver recognizes it and
    /// skips it.
    pub fn async_generator<F>(arity: usize, call: F) -> Self
    where
        F: Fn(Vec<Value>, Option<Value>) -> BoxFuture<'static, Result<Value, FuncError>>
            + Send
            + Sync
            + 'static,
    {
        NodeFunc::AsyncGenerator {
            arity,
            call: Arc::new(call),
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            NodeFunc::Sync { arity, .. }
            | NodeFunc::Async { arity, .. }
            | NodeFunc::Generator { arity, .. }
            | NodeFunc::AsyncGenerator { arity, .. } => *arity,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FuncKind {
        match self {
            NodeFunc::Sync { .. } => FuncKind::Sync,
            NodeFunc::Async { .. } => FuncKind::Async,
            NodeFunc::Generator { .. } => FuncKind::Generator,
            NodeFunc::AsyncGenerator { .. } => FuncKind::AsyncGenerator,
        }
    }

    /// True when dispatching this callable suspends the driver.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, NodeFunc::Async { .. })
    }
}

impl fmt::Debug for NodeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeFunc")
            .field("kind", &self.kind())
            .field("arity", &self.arity())
            .finish()
    }
}

/// Function body source: one string, or a list joined with `";"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Single(String),
    Lines(Vec<String>),
}

impl Code {
    /// The body as a single string.
    #[must_use]
    pub fn join(&self) -> String {
        match self {
            Code::Single(body) => body.clone(),
            Code::Lines(lines) => lines.join(";"),
        }
    }
}

impl From<&str> for Code {
    fn from(body: &str) -> Self {
        Code::Single(body.to_string())
    }
}

impl From<String> for Code {
    fn from(body: String) -> Self {
        Code::Single(body)
    }
}

impl From<Vec<String>> for Code {
    fn from(lines: Vec<String>) -> Self {
        Code::Lines(lines)
    }
}

/// Input to [`Dflow::set_node_func`](crate::engine::Dflow::set_node_func):
/// a name, optional ordered argument names, and opaque source code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeFuncDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    pub code: Code,
}

impl NodeFuncDef {
    #[must_use]
    pub fn new(name: impl Into<String>, args: Option<Vec<String>>, code: impl Into<Code>) -> Self {
        NodeFuncDef {
            name: name.into(),
            args,
            code: code.into(),
        }
    }
}

/// Compiles user source into callables.
///
/// External collaborator: the engine picks the factory via
/// [`FuncKind::classify`] and never inspects the code beyond that
/// heuristic. Each factory receives the ordered argument names and the
/// joined function body.
pub trait FuncCompiler: Send + Sync {
    /// Plain synchronous function.
    fn compile_func(&self, args: &[String], body: &str) -> Result<SyncCall, CompileError>;

    /// Async function; dispatched with an await.
    fn compile_async_func(&self, args: &[String], body: &str) -> Result<AsyncCall, CompileError>;

    /// Generator function; compiled so its variant is discoverable, never
    /// dispatched.
    fn compile_generator_func(
        &self,
        args: &[String],
        body: &str,
    ) -> Result<SyncCall, CompileError>;

    /// Async generator function; compiled so its variant is discoverable,
    /// never dispatched.
    fn compile_async_generator_func(
        &self,
        args: &[String],
        body: &str,
    ) -> Result<AsyncCall, CompileError>;
}
