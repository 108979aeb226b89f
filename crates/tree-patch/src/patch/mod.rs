//! Copy-on-write patching of map/sequence trees.
//!
//! # Operations
//!
//! Path operations: `add`, `replace`, `remove`. On maps `add` and `replace`
//! both set the key; on sequences `add` inserts and `replace` overwrites.
//!
//! Array operations address a sequence directly by index or inclusive range
//! and are applied as one batch, either independent (unordered,
//! non-overlapping) or chained (a sequential transcript).

pub mod types;
pub mod array;
pub mod context;
pub mod apply;
pub mod codec;

pub use types::{
    ApplyPatchOptions, ArrayIndex, ArrayOp, ArrayPatchOptions, Key, Op, OpKind, PatchError, PathSpec, Payload,
};
pub use array::{apply_array_ops, apply_array_patch, FlatOp};
pub use context::PatchContext;
pub use apply::{apply_operation, apply_ops, apply_patch, apply_patch_with};
pub use codec::json::{from_json, from_json_array_patch, from_json_patch, to_json, to_json_patch};
