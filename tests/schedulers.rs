mod common;

use common::*;
use dflow::engine::Dflow;
use dflow::graph::NodeDef;
use dflow::scheduler::{level_of, sorted_by_level, Level};
use dflow::types::{Pin, Pipe};
use serde_json::json;

fn defs(ids: &[&str]) -> Vec<NodeDef> {
    ids.iter().map(|id| NodeDef::new(*id, *id)).collect()
}

#[test]
fn levels_follow_the_longest_parent_chain() {
    let pipes = vec![
        Pipe::new("a", "b"),
        Pipe::new("b", "c"),
        Pipe::new("a", ("c", 1)),
    ];
    assert_eq!(level_of("a", &pipes), Level::Finite(0));
    assert_eq!(level_of("b", &pipes), Level::Finite(1));
    assert_eq!(level_of("c", &pipes), Level::Finite(2));
}

#[test]
fn schedule_ascends_and_keeps_insertion_order_on_ties() {
    let nodes = defs(&["sink", "left", "right", "source"]);
    let pipes = vec![
        Pipe::new("source", "left"),
        Pipe::new("source", "right"),
        Pipe::new("left", "sink"),
        Pipe::new("right", ("sink", 1)),
    ];
    let scheduled = sorted_by_level(&nodes, &pipes);
    let order: Vec<&str> = scheduled
        .iter()
        .map(|entry| entry.node.id.as_str())
        .collect();
    // source first, then left/right in insertion order, sink last.
    assert_eq!(order, vec!["source", "left", "right", "sink"]);
}

#[test]
fn pipes_always_ascend_in_level_on_finite_graphs() {
    let pipes = vec![
        Pipe::new("a", "b"),
        Pipe::new("a", "c"),
        Pipe::new("b", "d"),
        Pipe::new("c", ("d", 1)),
        Pipe::new("d", "e"),
    ];
    for pipe in &pipes {
        let (source, target) = pipe.node_ids();
        assert!(
            level_of(source, &pipes) < level_of(target, &pipes),
            "{source} must be scheduled before {target}"
        );
    }
}

#[test]
fn self_loop_is_infinite() {
    let pipes = vec![Pipe::new("a", ("a", 1))];
    assert_eq!(level_of("a", &pipes), Level::Infinite);
}

#[test]
fn cycle_classification_covers_dependants() {
    let pipes = vec![
        Pipe::new("a", "b"),
        Pipe::new("b", "c"),
        Pipe::new("c", "a"),
        Pipe::new("c", "outside"),
    ];
    for id in ["a", "b", "c", "outside"] {
        assert_eq!(level_of(id, &pipes), Level::Infinite, "{id}");
    }
}

#[test]
fn infinite_nodes_schedule_last() {
    let nodes = defs(&["x", "y", "free"]);
    let pipes = vec![Pipe::new("x", "y"), Pipe::new("y", "x")];
    let schedule = sorted_by_level(&nodes, &pipes);
    assert_eq!(schedule[0].node.id, "free");
    assert!(!schedule[1].level.is_finite());
    assert!(!schedule[2].level.is_finite());
}

#[test]
fn execution_respects_level_order_not_insertion_order() {
    // The consumer is added before its producer; levels must win.
    let mut engine = Dflow::new("g");
    engine.set_func("PI", pi_func(), None).unwrap();
    engine.set_func("double", double_func(), None).unwrap();
    engine.add_node("double", "late");
    engine.add_node("PI", "early");
    engine.add_pipe(Pipe::new("early", "late")).unwrap();
    engine.run_sync().unwrap();
    assert_close(engine.output("late"), 2.0 * std::f64::consts::PI);
}

#[test]
fn equal_level_siblings_run_in_insertion_order() {
    use std::sync::{Arc, Mutex};

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = Arc::clone(&seen);
        dflow::func::NodeFunc::sync(0, move |_args, ctx| {
            let tag = ctx
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string();
            seen.lock().unwrap().push(tag.clone());
            Ok(json!(tag))
        })
    };

    let mut engine = Dflow::new("g");
    engine.set_func("record", recorder, None).unwrap();
    engine.add_node("record", "s1");
    engine.add_node("record", "s2");
    engine.add_node("record", "s3");
    engine.set_context("s1", json!("s1"));
    engine.set_context("s2", json!("s2"));
    engine.set_context("s3", json!("s3"));
    engine.run_sync().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["s1", "s2", "s3"]);
}

#[test]
fn positional_pipes_deliver_positional_values() {
    let mut engine = Dflow::new("g");
    engine
        .set_func("one", const_func(json!("first")), None)
        .unwrap();
    engine
        .set_func("two", const_func(json!("second")), None)
        .unwrap();
    engine
        .set_func(
            "join",
            dflow::func::NodeFunc::sync(2, |args, _| Ok(json!(args.to_vec()))),
            None,
        )
        .unwrap();
    engine.add_node("one", "s1");
    engine.add_node("two", "s2");
    engine.add_node("join", "j");
    engine.add_pipe(Pipe::new("s1", Pin::slot("j", 0))).unwrap();
    engine.add_pipe(Pipe::new("s2", Pin::slot("j", 1))).unwrap();
    engine.run_sync().unwrap();
    assert_eq!(engine.output("j"), Some(&json!(["first", "second"])));
}
