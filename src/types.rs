//! Core identifier types for dflow graphs.
//!
//! A node exposes numbered input and output *pins*; position 0 is the
//! default. Every pin has a canonical string form ([`PinId`]): the bare
//! node id for position 0, otherwise `"{node_id},{position}"`. Pipes
//! connect one node's output pin to another node's input pin and are keyed
//! by the target pin id.
//!
//! # Examples
//!
//! ```rust
//! use dflow::types::Pin;
//!
//! let bare = Pin::decode("sum");
//! assert_eq!(bare, Pin::Id("sum".to_string()));
//!
//! let slotted = Pin::slot("sum", 1);
//! assert_eq!(slotted.encode(), "sum,1");
//!
//! // Position 0 is always canonicalized to the bare form.
//! assert_eq!(Pin::slot("sum", 0).encode(), "sum");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node within a graph.
///
/// Non-empty, never contains a comma, generated by the caller.
pub type NodeId = String;

/// Canonical string form of a [`Pin`], used as a map key.
pub type PinId = String;

/// An addressable input or output port on a node.
///
/// Serializes untagged: a bare string for position 0, an `[id, position]`
/// pair otherwise. The `Slot(id, 0)` form is accepted on input and
/// canonicalizes to `Id(id)`.
///
/// Malformed pin ids do not fail to parse; validity of the node id half is
/// enforced by the operations that consume pins.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pin {
    /// The position-0 pin of a node.
    Id(NodeId),
    /// A pin at an explicit position.
    Slot(NodeId, u32),
}

impl Pin {
    /// Builds a pin at the given position, collapsing position 0 to the
    /// bare form.
    #[must_use]
    pub fn slot(node_id: impl Into<NodeId>, position: u32) -> Self {
        let node_id = node_id.into();
        if position == 0 {
            Pin::Id(node_id)
        } else {
            Pin::Slot(node_id, position)
        }
    }

    /// Encode into the canonical [`PinId`].
    ///
    /// ```rust
    /// # use dflow::types::Pin;
    /// assert_eq!(Pin::Id("a".into()).encode(), "a");
    /// assert_eq!(Pin::Slot("a".into(), 2).encode(), "a,2");
    /// assert_eq!(Pin::Slot("a".into(), 0).encode(), "a");
    /// ```
    #[must_use]
    pub fn encode(&self) -> PinId {
        match self {
            Pin::Id(node_id) | Pin::Slot(node_id, 0) => node_id.clone(),
            Pin::Slot(node_id, position) => format!("{node_id},{position}"),
        }
    }

    /// Decode a [`PinId`] back into a pin.
    ///
    /// Exact inverse of [`encode`](Self::encode) modulo canonicalization:
    /// a trailing `,0`, a missing position, or an unparsable position all
    /// collapse to the bare form.
    #[must_use]
    pub fn decode(id: &str) -> Self {
        match id.split_once(',') {
            Some((node_id, position)) => {
                Pin::slot(node_id, position.parse().unwrap_or_default())
            }
            None => Pin::Id(id.to_string()),
        }
    }

    /// Collapse `Slot(id, 0)` to `Id(id)`; other pins pass through.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        match self {
            Pin::Slot(node_id, 0) => Pin::Id(node_id),
            other => other,
        }
    }

    /// The node this pin belongs to.
    #[must_use]
    pub fn node_id(&self) -> &str {
        match self {
            Pin::Id(node_id) | Pin::Slot(node_id, _) => node_id,
        }
    }

    /// The pin position; 0 for the bare form.
    #[must_use]
    pub fn position(&self) -> u32 {
        match self {
            Pin::Id(_) => 0,
            Pin::Slot(_, position) => *position,
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<&str> for Pin {
    fn from(id: &str) -> Self {
        Pin::decode(id)
    }
}

impl From<String> for Pin {
    fn from(id: String) -> Self {
        Pin::decode(&id)
    }
}

impl From<(&str, u32)> for Pin {
    fn from((node_id, position): (&str, u32)) -> Self {
        Pin::slot(node_id, position)
    }
}

impl From<(String, u32)> for Pin {
    fn from((node_id, position): (String, u32)) -> Self {
        Pin::slot(node_id, position)
    }
}

/// A directed edge from one node's output pin to another node's input pin.
///
/// Each input pin is fed by at most one output pin; one output pin may fan
/// out to many inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipe {
    pub from: Pin,
    pub to: Pin,
}

impl Pipe {
    /// Builds a pipe; both endpoints canonicalize.
    #[must_use]
    pub fn new(from: impl Into<Pin>, to: impl Into<Pin>) -> Self {
        Pipe {
            from: from.into().canonicalize(),
            to: to.into().canonicalize(),
        }
    }

    /// Source and target node ids, in that order.
    #[must_use]
    pub fn node_ids(&self) -> (&str, &str) {
        (self.from.node_id(), self.to.node_id())
    }
}

impl fmt::Display for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Ids of the nodes feeding `node_id` through `pipes`, in pipe order.
///
/// Pure over the pipe list; duplicates are kept when several pipes share a
/// source.
#[must_use]
pub fn parent_node_ids<'a>(node_id: &str, pipes: &'a [Pipe]) -> Vec<&'a str> {
    pipes
        .iter()
        .filter(|pipe| pipe.to.node_id() == node_id)
        .map(|pipe| pipe.from.node_id())
        .collect()
}
