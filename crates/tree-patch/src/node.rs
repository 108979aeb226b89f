//! The tree model: maps, sequences and scalars.
//!
//! Containers are held behind [`Arc`] so that patching can share every
//! untouched subtree between the input and the output. Cloning a [`Node`] is
//! therefore cheap and never deep.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

pub type NodeMap = IndexMap<String, Node>;
pub type NodeSeq = Vec<Node>;

/// A node in a patchable tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Arc<NodeSeq>),
    Map(Arc<NodeMap>),
}

/// Coarse kind of a node, used to pick the patching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Map,
    Seq,
    Scalar,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Map => "map",
            NodeKind::Seq => "sequence",
            NodeKind::Scalar => "scalar",
        }
    }
}

impl Node {
    pub fn map(map: NodeMap) -> Node {
        Node::Map(Arc::new(map))
    }

    pub fn seq(seq: NodeSeq) -> Node {
        Node::Seq(Arc::new(seq))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Map(_) => NodeKind::Map,
            Node::Seq(_) => NodeKind::Seq,
            Node::Null | Node::Bool(_) | Node::Number(_) | Node::String(_) => NodeKind::Scalar,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind() != NodeKind::Scalar
    }

    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&NodeSeq> {
        match self {
            Node::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a map entry. Returns `None` for non-maps and absent keys.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Look up a sequence element. Returns `None` for non-sequences and
    /// out-of-range indices.
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_seq().and_then(|s| s.get(index))
    }

    /// Identity of the container allocation, `None` for scalars.
    ///
    /// Two containers with the same identity are the same shared subtree.
    pub fn container_id(&self) -> Option<usize> {
        match self {
            Node::Map(m) => Some(Arc::as_ptr(m) as *const () as usize),
            Node::Seq(s) => Some(Arc::as_ptr(s) as *const () as usize),
            _ => None,
        }
    }

    /// Returns true if both nodes are the same container allocation.
    /// Scalars are never identical.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            (Node::Seq(a), Node::Seq(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Copy one level of a container into a fresh allocation. Children stay
    /// shared. Returns `None` for scalars.
    pub fn shallow_clone(&self) -> Option<Node> {
        match self {
            Node::Map(m) => Some(Node::map(NodeMap::clone(m))),
            Node::Seq(s) => Some(Node::seq(NodeSeq::clone(s))),
            _ => None,
        }
    }

    /// Make this container exclusively owned, copying one level if it is
    /// shared. Returns true if a copy was made.
    pub fn make_exclusive(&mut self) -> bool {
        let before = self.container_id();
        match self {
            Node::Map(m) => {
                Arc::make_mut(m);
            }
            Node::Seq(s) => {
                Arc::make_mut(s);
            }
            _ => return false,
        }
        self.container_id() != before
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(arr) => Node::seq(arr.into_iter().map(Node::from).collect()),
            Value::Object(obj) => Node::map(obj.into_iter().map(|(k, v)| (k, Node::from(v))).collect()),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Seq(s) => Value::Array(s.iter().map(Value::from).collect()),
            Node::Map(m) => {
                let mut out = Map::with_capacity(m.len());
                for (k, v) in m.iter() {
                    out.insert(k.clone(), Value::from(v));
                }
                Value::Object(out)
            }
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::from(&node)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}
