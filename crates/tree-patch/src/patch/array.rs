//! Array patch engine.
//!
//! Ranged operations are flattened into single-index splices. In the default
//! independent mode the splices are applied from the highest index down, so
//! no splice shifts the position of one that has not run yet. In chained mode
//! the caller has already accounted for shifts and order is kept.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::types::{ArrayIndex, ArrayOp, ArrayPatchOptions, Payload, PatchError};
use crate::node::Node;

/// A single-index splice produced by flattening an [`ArrayOp`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatOp<'a> {
    Add { index: usize, value: &'a Payload },
    Replace { index: usize, value: &'a Payload },
    Remove { index: usize },
}

impl FlatOp<'_> {
    pub fn index(&self) -> usize {
        match self {
            FlatOp::Add { index, .. } | FlatOp::Replace { index, .. } | FlatOp::Remove { index } => *index,
        }
    }
}

fn bounds(index: ArrayIndex) -> Result<(usize, usize), PatchError> {
    match index {
        ArrayIndex::At(i) => Ok((i, i)),
        ArrayIndex::Range(start, end) if start > end => Err(PatchError::InvalidRange { start, end }),
        ArrayIndex::Range(start, end) => Ok((start, end)),
    }
}

/// Claim `start..=end` unless it intersects an earlier claim. Claims are kept
/// as disjoint intervals keyed by their start. Returns the lowest index already
/// claimed on conflict.
fn claim(claimed: &mut BTreeMap<usize, usize>, start: usize, end: usize) -> Option<usize> {
    if let Some((_, &prev_end)) = claimed.range(..=start).next_back() {
        if prev_end >= start {
            return Some(start);
        }
    }
    if let Some((&next_start, _)) = claimed.range(start..=end).next() {
        return Some(next_start);
    }
    claimed.insert(start, end);
    None
}

/// The longest the sequence can get at any point of the batch.
fn reachable_len(ops: &[ArrayOp], len: usize) -> usize {
    ops.iter()
        .fold(len, |acc, op| acc.saturating_add(op.value().map_or(0, Payload::len)))
}

fn out_of_bounds(index: usize, len: usize) -> PatchError {
    PatchError::InvalidKey {
        key: index.to_string(),
        reason: format!("index out of bounds for sequence of length {len}"),
    }
}

/// Flatten operations into single-index splices for a sequence of length `len`.
///
/// - `Remove` over a range removes every index in it.
/// - `Replace` over a range keeps the replace at the last index and removes
///   the ones before it.
/// - `Add` over a range inserts once, at the end index.
///
/// The splices of one ranged operation are emitted highest index first. With
/// `check_overlap`, every index claimed by an operation must be unclaimed by
/// all earlier operations.
///
/// A range ending past any length the batch can reach is rejected before it
/// is expanded.
pub fn flatten(ops: &[ArrayOp], check_overlap: bool, len: usize) -> Result<Vec<FlatOp<'_>>, PatchError> {
    let reach = reachable_len(ops, len);
    let mut claimed = BTreeMap::new();
    let mut flat = Vec::with_capacity(ops.len());
    for (pos, op) in ops.iter().enumerate() {
        let (start, end) = bounds(op.index())?;
        let fits = match op {
            ArrayOp::Add { .. } => end <= reach,
            _ => end < reach,
        };
        if !fits {
            return Err(out_of_bounds(end, len));
        }
        if check_overlap {
            if let Some(index) = claim(&mut claimed, start, end) {
                debug!(index, op = pos, "rejecting overlapping array operation");
                return Err(PatchError::OverlappingIndex { index, op: pos });
            }
        }
        match op {
            ArrayOp::Add { value, .. } => flat.push(FlatOp::Add { index: end, value }),
            ArrayOp::Replace { value, .. } => {
                flat.push(FlatOp::Replace { index: end, value });
                flat.extend((start..end).rev().map(|index| FlatOp::Remove { index }));
            }
            ArrayOp::Remove { .. } => {
                flat.extend((start..=end).rev().map(|index| FlatOp::Remove { index }));
            }
        }
    }
    Ok(flat)
}

/// Flatten and order operations the way they will be applied to a sequence
/// of length `len`.
pub fn plan<'a>(ops: &'a [ArrayOp], options: &ArrayPatchOptions, len: usize) -> Result<Vec<FlatOp<'a>>, PatchError> {
    let mut flat = flatten(ops, !options.chained, len)?;
    if !options.chained {
        flat.sort_by(|a, b| b.index().cmp(&a.index()));
    }
    Ok(flat)
}

/// Replay the plan against the sequence length only.
fn check_bounds(plan: &[FlatOp<'_>], mut len: usize) -> Result<(), PatchError> {
    for op in plan {
        match *op {
            FlatOp::Remove { index } => {
                if index >= len {
                    return Err(out_of_bounds(index, len));
                }
                len -= 1;
            }
            FlatOp::Replace { index, value } => {
                if index >= len {
                    return Err(out_of_bounds(index, len));
                }
                len = len - 1 + value.len();
            }
            FlatOp::Add { index, value } => {
                if index > len {
                    return Err(out_of_bounds(index, len));
                }
                len += value.len();
            }
        }
    }
    Ok(())
}

fn splice(target: &mut Vec<Node>, op: &FlatOp<'_>) {
    match *op {
        FlatOp::Remove { index } => {
            target.remove(index);
        }
        FlatOp::Replace { index, value } => {
            let _ = target.splice(index..=index, value.nodes().iter().cloned());
        }
        FlatOp::Add { index, value } => {
            let _ = target.splice(index..index, value.nodes().iter().cloned());
        }
    }
}

/// Apply array operations to `target` in place.
///
/// The whole batch is checked before the first splice: on error `target` is
/// left unchanged.
pub fn apply_array_ops(target: &mut Vec<Node>, ops: &[ArrayOp], options: &ArrayPatchOptions) -> Result<(), PatchError> {
    let plan = plan(ops, options, target.len())?;
    check_bounds(&plan, target.len())?;
    trace!(ops = ops.len(), splices = plan.len(), chained = options.chained, "applying array operations");
    for op in &plan {
        splice(target, op);
    }
    Ok(())
}

/// Apply array operations to a copy of `source` and return the copy.
pub fn apply_array_patch(source: &[Node], ops: &[ArrayOp], options: &ArrayPatchOptions) -> Result<Vec<Node>, PatchError> {
    let mut out = source.to_vec();
    apply_array_ops(&mut out, ops, options)?;
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn nodes(v: Value) -> Vec<Node> {
        match Node::from(v) {
            Node::Seq(s) => s.as_ref().clone(),
            other => vec![other],
        }
    }

    fn n(v: Value) -> Node {
        Node::from(v)
    }

    fn batch(source: Value, ops: &[ArrayOp]) -> Result<Vec<Node>, PatchError> {
        apply_array_patch(&nodes(source), ops, &ArrayPatchOptions::default())
    }

    fn chained(source: Value, ops: &[ArrayOp]) -> Result<Vec<Node>, PatchError> {
        apply_array_patch(&nodes(source), ops, &ArrayPatchOptions { chained: true })
    }

    #[test]
    fn remove_single_index() {
        let out = batch(json!([1, 2, 3, 4, 5]), &[ArrayOp::remove(2)]).unwrap();
        assert_eq!(out, nodes(json!([1, 2, 4, 5])));
    }

    #[test]
    fn add_inserts_without_removing() {
        let out = batch(json!([1, 2, 3]), &[ArrayOp::add(1, n(json!(9)))]).unwrap();
        assert_eq!(out, nodes(json!([1, 9, 2, 3])));
    }

    #[test]
    fn add_at_len_appends() {
        let out = batch(json!([1, 2]), &[ArrayOp::add(2, n(json!(3)))]).unwrap();
        assert_eq!(out, nodes(json!([1, 2, 3])));
    }

    #[test]
    fn replace_with_many_splices_in_order() {
        let out = batch(json!([1, 2, 3]), &[ArrayOp::replace(1, nodes(json!(["a", "b"])))]).unwrap();
        assert_eq!(out, nodes(json!([1, "a", "b", 3])));
    }

    #[test]
    fn single_payload_keeps_nested_sequence_whole() {
        let out = batch(json!([1]), &[ArrayOp::add(0, n(json!([7, 8])))]).unwrap();
        assert_eq!(out, nodes(json!([[7, 8], 1])));
    }

    #[test]
    fn source_is_not_mutated() {
        let source = nodes(json!([1, 2, 3, 4, 5]));
        let out = apply_array_patch(&source, &[ArrayOp::remove(2)], &ArrayPatchOptions::default()).unwrap();
        assert_eq!(source.len(), 5);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn remove_and_add_are_order_independent() {
        let ops = [ArrayOp::remove(2), ArrayOp::add(4, n(json!("x")))];
        let forward = batch(json!([1, 2, 3, 4, 5]), &ops).unwrap();
        let reversed = batch(json!([1, 2, 3, 4, 5]), &[ops[1].clone(), ops[0].clone()]).unwrap();
        assert_eq!(forward, nodes(json!([1, 2, 4, "x", 5])));
        assert_eq!(forward, reversed);
    }

    #[test]
    fn removes_use_original_indices() {
        let out = batch(json!([0, 1, 2, 3, 4]), &[ArrayOp::remove(1), ArrayOp::remove(3)]).unwrap();
        assert_eq!(out, nodes(json!([0, 2, 4])));
    }

    #[test]
    fn overlapping_index_rejected() {
        let err = batch(json!([1, 2, 3, 4, 5]), &[ArrayOp::remove(2), ArrayOp::add(2, n(json!(0)))]).unwrap_err();
        assert_eq!(err, PatchError::OverlappingIndex { index: 2, op: 1 });
    }

    #[test]
    fn overlap_inside_range_rejected() {
        let err = batch(json!([1, 2, 3, 4, 5]), &[ArrayOp::remove_range(1, 3), ArrayOp::replace(2, n(json!(0)))]).unwrap_err();
        assert_eq!(err, PatchError::OverlappingIndex { index: 2, op: 1 });
    }

    #[test]
    fn chained_mode_allows_repeated_index() {
        let out = chained(json!([1, 2, 3, 4, 5]), &[ArrayOp::remove(2), ArrayOp::remove(2)]).unwrap();
        assert_eq!(out, nodes(json!([1, 2, 5])));
    }

    #[test]
    fn chained_mode_keeps_given_order() {
        let ops = [ArrayOp::add(0, n(json!("a"))), ArrayOp::remove(1)];
        let out = chained(json!([1, 2, 3]), &ops).unwrap();
        assert_eq!(out, nodes(json!(["a", 2, 3])));
    }

    #[test]
    fn range_replace_removes_leading_slots() {
        let out = batch(json!([1, 2, 3, 4, 5]), &[ArrayOp::replace_range(0, 2, n(json!("v")))]).unwrap();
        assert_eq!(out, nodes(json!(["v", 4, 5])));
    }

    #[test]
    fn range_replace_expansion_keeps_last_index() {
        let ops = [ArrayOp::replace_range(0, 2, n(json!("v")))];
        let flat = flatten(&ops, true, 5).unwrap();
        let value = ops[0].value().unwrap();
        assert_eq!(
            flat,
            vec![
                FlatOp::Replace { index: 2, value },
                FlatOp::Remove { index: 1 },
                FlatOp::Remove { index: 0 },
            ]
        );
    }

    #[test]
    fn range_remove_in_chained_mode() {
        let out = chained(json!([1, 2, 3, 4, 5]), &[ArrayOp::remove_range(1, 3)]).unwrap();
        assert_eq!(out, nodes(json!([1, 5])));
    }

    #[test]
    fn range_add_inserts_once_at_end() {
        let ops = [ArrayOp::add_range(1, 3, n(json!("x")))];
        assert_eq!(flatten(&ops, true, 5).unwrap().len(), 1);
        let out = batch(json!([1, 2, 3, 4, 5]), &ops).unwrap();
        assert_eq!(out, nodes(json!([1, 2, 3, "x", 4, 5])));
    }

    #[test]
    fn range_add_claims_whole_range() {
        let err = batch(json!([1, 2, 3, 4, 5]), &[ArrayOp::add_range(1, 3, n(json!("x"))), ArrayOp::remove(1)]).unwrap_err();
        assert_eq!(err, PatchError::OverlappingIndex { index: 1, op: 1 });
    }

    #[test]
    fn reversed_range_rejected() {
        let err = batch(json!([1, 2, 3]), &[ArrayOp::remove_range(2, 1)]).unwrap_err();
        assert_eq!(err, PatchError::InvalidRange { start: 2, end: 1 });
    }

    #[test]
    fn out_of_bounds_remove_rejected() {
        let err = batch(json!([1, 2, 3]), &[ArrayOp::remove(3)]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { ref key, .. } if key == "3"));
    }

    #[test]
    fn out_of_bounds_replace_rejected() {
        let err = batch(json!([]), &[ArrayOp::replace(0, n(json!(1)))]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
    }

    #[test]
    fn add_past_end_rejected() {
        let err = batch(json!([1]), &[ArrayOp::add(2, n(json!(1)))]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
    }

    #[test]
    fn rejected_batch_leaves_target_untouched() {
        let mut target = nodes(json!([1, 2, 3]));
        let ops = [ArrayOp::remove(0), ArrayOp::remove(7)];
        let err = apply_array_ops(&mut target, &ops, &ArrayPatchOptions::default());
        assert!(err.is_err());
        assert_eq!(target, nodes(json!([1, 2, 3])));
    }

    #[test]
    fn range_far_past_end_rejected_without_expanding() {
        let err = batch(json!([1, 2, 3]), &[ArrayOp::remove_range(0, usize::MAX - 1)]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
        let err = chained(json!([1, 2, 3]), &[ArrayOp::replace_range(1, 1_000_000_000_000, n(json!(0)))]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
        let err = batch(json!([1, 2, 3]), &[ArrayOp::add_range(0, usize::MAX, n(json!(0)))]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
    }

    #[test]
    fn range_within_reachable_length_is_expanded() {
        let ops = [ArrayOp::add(3, nodes(json!([4, 5]))), ArrayOp::remove_range(0, 1)];
        let out = chained(json!([1, 2, 3]), &ops).unwrap();
        assert_eq!(out, nodes(json!([3, 4, 5])));
    }

    #[test]
    fn overlap_reports_lowest_claimed_index() {
        let ops = [ArrayOp::remove_range(3, 4), ArrayOp::remove(0), ArrayOp::remove_range(1, 4)];
        let err = batch(json!([0, 1, 2, 3, 4, 5]), &ops).unwrap_err();
        assert_eq!(err, PatchError::OverlappingIndex { index: 3, op: 2 });
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let ops = [ArrayOp::remove_range(0, 1), ArrayOp::remove_range(2, 3)];
        let out = batch(json!([0, 1, 2, 3, 4]), &ops).unwrap();
        assert_eq!(out, nodes(json!([4])));
    }

    #[test]
    fn empty_many_payload_replace_acts_as_remove() {
        let out = batch(json!([1, 2, 3]), &[ArrayOp::replace(1, Vec::<Node>::new())]).unwrap();
        assert_eq!(out, nodes(json!([1, 3])));
    }
}
