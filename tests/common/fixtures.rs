#![allow(dead_code)]

use dflow::engine::Dflow;
use dflow::graph::Graph;
use dflow::types::{Pin, Pipe};

use super::funcs::*;

/// `PI -> sin`: two nodes, one pipe.
pub fn sine_of_pi() -> Dflow {
    let mut engine = Dflow::new("sine");
    engine.set_func("Math.PI", pi_func(), None).unwrap();
    engine.set_func("Math.sin", sin_func(), None).unwrap();
    engine.add_node("Math.PI", "id1");
    engine.add_node("Math.sin", "id2");
    engine.add_pipe(Pipe::new("id1", "id2")).unwrap();
    engine
}

/// `PI` and `E` feeding a two-argument `sum`.
pub fn sum_of_constants() -> Dflow {
    let mut engine = Dflow::new("sum");
    engine.set_func("PI", pi_func(), None).unwrap();
    engine.set_func("E", e_func(), None).unwrap();
    engine.set_func("sum", sum_func(), None).unwrap();
    engine.add_node("PI", "id1");
    engine.add_node("E", "id2");
    engine.add_node("sum", "id3");
    engine.add_pipe(Pipe::new("id1", Pin::slot("id3", 0))).unwrap();
    engine.add_pipe(Pipe::new("id2", Pin::slot("id3", 1))).unwrap();
    engine
}

/// Template wrapping `double` between an `input` marker and an `output`
/// marker.
pub fn double_template() -> Graph {
    Graph::named("graph")
        .with_args(["input"])
        .with_outs(["output"])
        .with_node("input", "input")
        .with_node("d1", "double")
        .with_node("output", "output")
        .with_pipe("input", "d1")
        .with_pipe("d1", "output")
}

/// Outer engine running [`double_template`] on `PI`.
pub fn doubled_pi() -> Dflow {
    let mut engine = Dflow::new("outer");
    engine.set_func("PI", pi_func(), None).unwrap();
    engine.set_func("double", double_func(), None).unwrap();
    engine.set_node_graph(double_template()).unwrap();
    engine.add_node("PI", "nodeId1");
    engine.add_node("graph", "nodeId2");
    engine.add_pipe(Pipe::new("nodeId1", "nodeId2")).unwrap();
    engine
}

pub fn assert_close(value: Option<&serde_json::Value>, expected: f64) {
    let actual = value
        .and_then(serde_json::Value::as_f64)
        .unwrap_or_else(|| panic!("expected a number close to {expected}, got {value:?}"));
    assert!(
        (actual - expected).abs() < 1e-10,
        "expected {expected}, got {actual}"
    );
}
