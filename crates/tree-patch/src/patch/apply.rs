//! Patch apply logic.
//!
//! Every container on the path to an edit is copied once per call and
//! installed into its (already copied) parent, so the edit lands on an
//! exclusively owned node. Containers off those paths stay shared with the
//! input.

use std::sync::Arc;

use tracing::{debug, trace};
use tree_patch_path::{split_path, SEPARATOR};

use super::array::apply_array_ops;
use super::context::PatchContext;
use super::types::{ApplyPatchOptions, ArrayOp, ArrayPatchOptions, Key, Op, PatchError, PathSpec, Payload};
use crate::node::Node;

// ── Walk ──────────────────────────────────────────────────────────────────

/// Mutable access to the child of `node` at `key`, if there is one.
fn child_mut<'a>(node: &'a mut Node, key: &Key) -> Option<&'a mut Node> {
    match node {
        Node::Map(map) => Arc::make_mut(map).get_mut(&key.to_map_key()),
        Node::Seq(seq) => {
            let seq = Arc::make_mut(seq);
            let index = key.as_index(seq.len())?;
            seq.get_mut(index)
        }
        _ => None,
    }
}

/// Walk `ancestors` from `root`, copying each container on first visit, and
/// return the container that holds the target.
fn resolve_parent<'a>(
    root: &'a mut Node,
    ancestors: &[Key],
    path: &PathSpec,
    ctx: &mut PatchContext,
) -> Result<&'a mut Node, PatchError> {
    let mut current = root;
    let mut at = String::new();
    for (i, key) in ancestors.iter().enumerate() {
        if i > 0 {
            at.push(SEPARATOR);
        }
        at.push_str(&key.to_string());
        let child = match child_mut(current, key) {
            Some(child) if child.is_container() => child,
            _ => {
                debug!(path = %path, at = %at, "path does not resolve to a container");
                return Err(PatchError::InvalidPath { path: path.to_string(), at });
            }
        };
        if ctx.is_copy(&at, child) {
            trace!(at = %at, "reusing copy");
            if child.make_exclusive() {
                ctx.record(&at, child);
            }
        } else {
            if let Some(copy) = child.shallow_clone() {
                *child = copy;
            }
            ctx.record(&at, child);
        }
        current = child;
    }
    Ok(current)
}

// ── Container patching ────────────────────────────────────────────────────

/// A sequence value is spliced into a sequence element by element.
fn splice_payload(value: &Node) -> Payload {
    match value {
        Node::Seq(items) => Payload::Many(items.as_ref().clone()),
        other => Payload::One(other.clone()),
    }
}

fn patch_container(parent: &mut Node, target: &Key, op: &Op) -> Result<(), PatchError> {
    match parent {
        Node::Map(map) => {
            let map = Arc::make_mut(map);
            let key = target.to_map_key();
            match op {
                Op::Add { value, .. } | Op::Replace { value, .. } => {
                    map.insert(key, value.clone());
                }
                Op::Remove { .. } => {
                    map.shift_remove(&key);
                }
            }
            Ok(())
        }
        Node::Seq(seq) => {
            let seq = Arc::make_mut(seq);
            let index = target.as_index(seq.len()).ok_or_else(|| PatchError::InvalidKey {
                key: target.to_string(),
                reason: "not a sequence index".to_string(),
            })?;
            let array_op = match op {
                Op::Add { value, .. } => ArrayOp::add(index, splice_payload(value)),
                Op::Replace { value, .. } => ArrayOp::replace(index, splice_payload(value)),
                Op::Remove { .. } => ArrayOp::remove(index),
            };
            apply_array_ops(seq, std::slice::from_ref(&array_op), &ArrayPatchOptions::default())
        }
        scalar => Err(PatchError::InvalidKey {
            key: target.to_string(),
            reason: format!("parent is a {}", scalar.kind().as_str()),
        }),
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Apply a single operation to `root` in place.
///
/// `root` itself stays the caller's node; only containers on the operation's
/// path are replaced by copies. `ctx` remembers those copies so later
/// operations on the same root do not copy them again. Using `ctx` with a
/// different root starts it over.
pub fn apply_operation(root: &mut Node, op: &Op, ctx: &mut PatchContext) -> Result<(), PatchError> {
    if !root.is_container() {
        return Err(PatchError::InvalidRoot(root.kind()));
    }
    ctx.bind_root(root);
    if root.make_exclusive() {
        ctx.bind_root(root);
    }
    let (ancestors, target) = split_path(op.path())?;
    let parent = resolve_parent(root, &ancestors, op.path(), ctx)?;
    patch_container(parent, &target, op)
}

/// Apply operations in order to `root` in place, sharing `ctx` between them.
///
/// Not transactional: on error the operations before the failing one have
/// already been applied.
pub fn apply_ops(root: &mut Node, ops: &[Op], ctx: &mut PatchContext) -> Result<(), PatchError> {
    for (i, op) in ops.iter().enumerate() {
        trace!(op = i, kind = op.kind().as_str(), path = %op.path(), "applying operation");
        apply_operation(root, op, ctx)?;
    }
    Ok(())
}

/// Apply a patch and return the patched tree. `root` is left untouched and
/// every subtree no operation reaches is shared with the result.
pub fn apply_patch(root: &Node, ops: &[Op]) -> Result<Node, PatchError> {
    let mut doc = root.shallow_clone().ok_or(PatchError::InvalidRoot(root.kind()))?;
    let mut ctx = PatchContext::new();
    debug!(ops = ops.len(), "applying patch");
    apply_ops(&mut doc, ops, &mut ctx)?;
    Ok(doc)
}

/// Apply a patch with options (mutate vs. copy).
///
/// With `mutate: true` the given root is patched directly, without the
/// up-front copy of its top level.
pub fn apply_patch_with(root: Node, ops: &[Op], options: &ApplyPatchOptions) -> Result<Node, PatchError> {
    if !options.mutate {
        return apply_patch(&root, ops);
    }
    let mut doc = root;
    let mut ctx = PatchContext::new();
    apply_ops(&mut doc, ops, &mut ctx)?;
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────
