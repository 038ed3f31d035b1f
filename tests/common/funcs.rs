#![allow(dead_code)]

use dflow::func::{AsyncCall, CompileError, FuncCompiler, FuncError, NodeFunc, SyncCall};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 0-ary callable returning a fixed value.
pub fn const_func(value: Value) -> NodeFunc {
    NodeFunc::sync(0, move |_args, _ctx| Ok(value.clone()))
}

pub fn pi_func() -> NodeFunc {
    const_func(json!(std::f64::consts::PI))
}

pub fn e_func() -> NodeFunc {
    const_func(json!(std::f64::consts::E))
}

pub fn sin_func() -> NodeFunc {
    NodeFunc::sync(1, |args, _ctx| {
        let x = args
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| FuncError::msg("sin expects a number"))?;
        Ok(json!(x.sin()))
    })
}

pub fn sum_func() -> NodeFunc {
    NodeFunc::sync(2, |args, _ctx| {
        let a = args
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| FuncError::msg("sum expects numbers"))?;
        let b = args
            .get(1)
            .and_then(Value::as_f64)
            .ok_or_else(|| FuncError::msg("sum expects numbers"))?;
        Ok(json!(a + b))
    })
}

pub fn double_func() -> NodeFunc {
    NodeFunc::sync(1, |args, _ctx| {
        let x = args
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| FuncError::msg("double expects a number"))?;
        Ok(json!(2.0 * x))
    })
}

pub fn async_double_func() -> NodeFunc {
    NodeFunc::async_fn(1, |args, _ctx| {
        Box::pin(async move {
            let x = args
                .first()
                .and_then(Value::as_f64)
                .ok_or_else(|| FuncError::msg("double expects a number"))?;
            Ok(json!(2.0 * x))
        })
    })
}

pub fn failing_func(message: &'static str) -> NodeFunc {
    NodeFunc::sync(0, move |_args, _ctx| Err(FuncError::msg(message)))
}

/// 0-ary callable returning its receiver, or `Null` without one.
pub fn context_echo_func() -> NodeFunc {
    NodeFunc::sync(0, |_args, ctx| Ok(ctx.cloned().unwrap_or(Value::Null)))
}

/// Compiler double: every factory returns an echo callable reporting the
/// body it was compiled from, and a counter records which factory ran.
#[derive(Default)]
pub struct RecordingCompiler {
    pub sync_calls: AtomicUsize,
    pub async_calls: AtomicUsize,
    pub generator_calls: AtomicUsize,
    pub async_generator_calls: AtomicUsize,
}

impl RecordingCompiler {
    pub fn counts(&self) -> [usize; 4] {
        [
            self.sync_calls.load(Ordering::SeqCst),
            self.async_calls.load(Ordering::SeqCst),
            self.generator_calls.load(Ordering::SeqCst),
            self.async_generator_calls.load(Ordering::SeqCst),
        ]
    }
}

fn echo(body: &str) -> SyncCall {
    let body = body.to_string();
    Arc::new(move |args, _ctx| Ok(json!({ "body": body, "args": args })))
}

fn echo_async(body: &str) -> AsyncCall {
    let body = body.to_string();
    Arc::new(move |args, _ctx| {
        let body = body.clone();
        Box::pin(async move { Ok(json!({ "body": body, "args": args })) })
    })
}

impl FuncCompiler for RecordingCompiler {
    fn compile_func(&self, _args: &[String], body: &str) -> Result<SyncCall, CompileError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        Ok(echo(body))
    }

    fn compile_async_func(&self, _args: &[String], body: &str) -> Result<AsyncCall, CompileError> {
        self.async_calls.fetch_add(1, Ordering::SeqCst);
        Ok(echo_async(body))
    }

    fn compile_generator_func(
        &self,
        _args: &[String],
        body: &str,
    ) -> Result<SyncCall, CompileError> {
        self.generator_calls.fetch_add(1, Ordering::SeqCst);
        Ok(echo(body))
    }

    fn compile_async_generator_func(
        &self,
        _args: &[String],
        body: &str,
    ) -> Result<AsyncCall, CompileError> {
        self.async_generator_calls.fetch_add(1, Ordering::SeqCst);
        Ok(echo_async(body))
    }
}

/// Compiler double whose factories always fail.
pub struct RejectingCompiler;

impl FuncCompiler for RejectingCompiler {
    fn compile_func(&self, _args: &[String], _body: &str) -> Result<SyncCall, CompileError> {
        Err(CompileError::msg("rejected"))
    }

    fn compile_async_func(
        &self,
        _args: &[String],
        _body: &str,
    ) -> Result<AsyncCall, CompileError> {
        Err(CompileError::msg("rejected"))
    }

    fn compile_generator_func(
        &self,
        _args: &[String],
        _body: &str,
    ) -> Result<SyncCall, CompileError> {
        Err(CompileError::msg("rejected"))
    }

    fn compile_async_generator_func(
        &self,
        _args: &[String],
        _body: &str,
    ) -> Result<AsyncCall, CompileError> {
        Err(CompileError::msg("rejected"))
    }
}
