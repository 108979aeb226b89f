//! Core types for tree patching: operations, array operations, options and
//! errors.

use std::str::FromStr;

use thiserror::Error;

use crate::node::{Node, NodeKind};
pub use tree_patch_path::{Key, Path, PathError, PathSpec};

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("path is empty")]
    EmptyPath,
    #[error("invalid path {path} at {at}, expecting map or sequence")]
    InvalidPath { path: String, at: String },
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("overlapping index found: {index} at operations[{op}]")]
    OverlappingIndex { index: usize, op: usize },
    #[error("invalid range [{start}, {end}]: start is past end")]
    InvalidRange { start: usize, end: usize },
    #[error("cannot patch a {} root, expecting map or sequence", .0.as_str())]
    InvalidRoot(NodeKind),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl From<PathError> for PatchError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::Empty => PatchError::EmptyPath,
        }
    }
}

// ── Operations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Replace,
    Remove,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Remove => "remove",
        }
    }
}

impl FromStr for OpKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OpKind::Add),
            "replace" => Ok(OpKind::Replace),
            "remove" => Ok(OpKind::Remove),
            other => Err(PatchError::InvalidOp(format!("unknown operation type: {other}"))),
        }
    }
}

/// A patch operation addressed by path.
///
/// On maps `Add` and `Replace` behave the same: the key is set. On sequences
/// `Add` inserts before the addressed position and `Replace` overwrites it.
/// A sequence value is spliced into a sequence element by element.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: PathSpec, value: Node },
    Replace { path: PathSpec, value: Node },
    Remove { path: PathSpec },
}

impl Op {
    pub fn add(path: impl Into<PathSpec>, value: impl Into<Node>) -> Op {
        Op::Add { path: path.into(), value: value.into() }
    }

    pub fn replace(path: impl Into<PathSpec>, value: impl Into<Node>) -> Op {
        Op::Replace { path: path.into(), value: value.into() }
    }

    pub fn remove(path: impl Into<PathSpec>) -> Op {
        Op::Remove { path: path.into() }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Op::Add { .. } => OpKind::Add,
            Op::Replace { .. } => OpKind::Replace,
            Op::Remove { .. } => OpKind::Remove,
        }
    }

    pub fn path(&self) -> &PathSpec {
        match self {
            Op::Add { path, .. } | Op::Replace { path, .. } | Op::Remove { path } => path,
        }
    }

    pub fn value(&self) -> Option<&Node> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } => Some(value),
            Op::Remove { .. } => None,
        }
    }
}

// ── Array operations ──────────────────────────────────────────────────────

/// Position addressed by an array operation: a single index or an inclusive
/// `[start, end]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIndex {
    At(usize),
    Range(usize, usize),
}

impl From<usize> for ArrayIndex {
    fn from(i: usize) -> Self {
        ArrayIndex::At(i)
    }
}

impl From<(usize, usize)> for ArrayIndex {
    fn from((start, end): (usize, usize)) -> Self {
        ArrayIndex::Range(start, end)
    }
}

/// What an array `Add` or `Replace` splices in.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Exactly one element, even if that element is itself a sequence.
    One(Node),
    /// Each element in order.
    Many(Vec<Node>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::One(_) => 1,
            Payload::Many(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nodes(&self) -> &[Node] {
        match self {
            Payload::One(node) => std::slice::from_ref(node),
            Payload::Many(nodes) => nodes,
        }
    }
}

impl From<Node> for Payload {
    fn from(node: Node) -> Self {
        Payload::One(node)
    }
}

impl From<Vec<Node>> for Payload {
    fn from(nodes: Vec<Node>) -> Self {
        Payload::Many(nodes)
    }
}

/// An operation on a sequence addressed by index or range.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOp {
    Add { index: ArrayIndex, value: Payload },
    Replace { index: ArrayIndex, value: Payload },
    Remove { index: ArrayIndex },
}

impl ArrayOp {
    pub fn add(index: usize, value: impl Into<Payload>) -> ArrayOp {
        ArrayOp::Add { index: ArrayIndex::At(index), value: value.into() }
    }

    pub fn add_range(start: usize, end: usize, value: impl Into<Payload>) -> ArrayOp {
        ArrayOp::Add { index: ArrayIndex::Range(start, end), value: value.into() }
    }

    pub fn replace(index: usize, value: impl Into<Payload>) -> ArrayOp {
        ArrayOp::Replace { index: ArrayIndex::At(index), value: value.into() }
    }

    pub fn replace_range(start: usize, end: usize, value: impl Into<Payload>) -> ArrayOp {
        ArrayOp::Replace { index: ArrayIndex::Range(start, end), value: value.into() }
    }

    pub fn remove(index: usize) -> ArrayOp {
        ArrayOp::Remove { index: ArrayIndex::At(index) }
    }

    pub fn remove_range(start: usize, end: usize) -> ArrayOp {
        ArrayOp::Remove { index: ArrayIndex::Range(start, end) }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            ArrayOp::Add { .. } => OpKind::Add,
            ArrayOp::Replace { .. } => OpKind::Replace,
            ArrayOp::Remove { .. } => OpKind::Remove,
        }
    }

    pub fn index(&self) -> ArrayIndex {
        match self {
            ArrayOp::Add { index, .. } | ArrayOp::Replace { index, .. } | ArrayOp::Remove { index } => *index,
        }
    }

    pub fn value(&self) -> Option<&Payload> {
        match self {
            ArrayOp::Add { value, .. } | ArrayOp::Replace { value, .. } => Some(value),
            ArrayOp::Remove { .. } => None,
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Options for [`apply_patch_with`](super::apply::apply_patch_with).
#[derive(Debug, Clone, Default)]
pub struct ApplyPatchOptions {
    /// If true, patch the given root directly. If false, start from a
    /// one-level copy of it.
    pub mutate: bool,
}

/// Options for the array engine.
#[derive(Debug, Clone, Default)]
pub struct ArrayPatchOptions {
    /// If true, operations are a sequential transcript: applied in the given
    /// order with no overlap check. If false (the default) they are an
    /// unordered batch of non-overlapping edits against the original indices.
    pub chained: bool,
}
