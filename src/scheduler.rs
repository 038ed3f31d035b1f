//! Topological scheduling: level computation and stable ordering.
//!
//! The *level* of a node is the length of its longest parent chain: 0 when
//! no pipe targets it, otherwise one more than the highest parent level. A
//! node reached again while its own level is still being computed sits on a
//! cycle and is classified [`Level::Infinite`], which sorts after every
//! finite level; the run driver skips such nodes with a diagnostic.
//!
//! Scheduling is a pure function of `(nodes, pipes)`: the ordering is a
//! stable sort by ascending level, so nodes at equal level keep their
//! insertion order.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::NodeDef;
use crate::types::{parent_node_ids, Pipe};

/// Node depth within a set of pipes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Finite(u32),
    /// On a cycle; unschedulable.
    Infinite,
}

impl Level {
    #[must_use]
    pub fn is_finite(self) -> bool {
        matches!(self, Level::Finite(_))
    }

    fn succ(self) -> Self {
        match self {
            Level::Finite(depth) => Level::Finite(depth + 1),
            Level::Infinite => Level::Infinite,
        }
    }
}

/// A node paired with its computed level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub node: NodeDef,
    pub level: Level,
}

/// Level of a single node within `pipes`.
#[must_use]
pub fn level_of<'a>(node_id: &'a str, pipes: &'a [Pipe]) -> Level {
    let mut memo = FxHashMap::default();
    level_rec(node_id, pipes, &mut memo, &mut FxHashSet::default())
}

/// Every node with its level, ordered by ascending level with ties in
/// `nodes` insertion order; [`Level::Infinite`] nodes sort last.
#[must_use]
pub fn sorted_by_level<'a>(nodes: &'a [NodeDef], pipes: &'a [Pipe]) -> Vec<Scheduled> {
    let mut memo = FxHashMap::default();
    let mut scheduled: Vec<Scheduled> = nodes
        .iter()
        .map(|node| Scheduled {
            node: node.clone(),
            level: level_rec(&node.id, pipes, &mut memo, &mut FxHashSet::default()),
        })
        .collect();
    scheduled.sort_by_key(|entry| entry.level);
    scheduled
}

fn level_rec<'a>(
    node_id: &'a str,
    pipes: &'a [Pipe],
    memo: &mut FxHashMap<&'a str, Level>,
    path: &mut FxHashSet<&'a str>,
) -> Level {
    if let Some(&level) = memo.get(node_id) {
        return level;
    }
    // A repeat on the current recursion path is a cycle; the occurrence is
    // not memoized, only the completed computation below is.
    if !path.insert(node_id) {
        return Level::Infinite;
    }
    let level = parent_node_ids(node_id, pipes)
        .into_iter()
        .map(|parent| level_rec(parent, pipes, memo, path))
        .max()
        .map_or(Level::Finite(0), Level::succ);
    path.remove(node_id);
    memo.insert(node_id, level);
    level
}
