//! tree-patch: copy-on-write patching of map/sequence trees.
//!
//! Applies batches of `add`, `replace` and `remove` operations to a tree of
//! maps, sequences and scalars. Only containers on the path to an edit are
//! copied; everything else is shared with the input.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tree_patch::{apply_patch, Node, Op};
//!
//! let source = Node::from(json!({"team": ["Alice"], "clients": [{"name": "A"}]}));
//! let result = apply_patch(&source, &[Op::add("/team/-", "Bob")]).unwrap();
//!
//! assert_eq!(result, Node::from(json!({"team": ["Alice", "Bob"], "clients": [{"name": "A"}]})));
//! assert!(result.get("clients").unwrap().ptr_eq(source.get("clients").unwrap()));
//! ```

pub mod node;
pub mod patch;
pub mod cli;

pub use node::{Node, NodeKind};
pub use patch::{
    apply_array_ops, apply_array_patch, apply_operation, apply_ops, apply_patch, apply_patch_with, ApplyPatchOptions,
    ArrayIndex, ArrayOp, ArrayPatchOptions, Key, Op, OpKind, PatchContext, PatchError, PathSpec, Payload,
};
