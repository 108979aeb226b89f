//! JSON codec for patch operations.
//!
//! Operations are objects with a `type` of `add`, `replace` or `remove`
//! (`op` is accepted as an alias on decode):
//!
//! ```json
//! {"type": "add", "path": "/projects/0/team/-", "value": "Eve"}
//! {"type": "remove", "path": ["projects", 1, "team", 0]}
//! ```
//!
//! Array operations carry an `index` instead of a `path`, either a
//! non-negative integer or an inclusive `[start, end]` range. A JSON array
//! `value` is spliced in element by element.

use serde_json::{json, Map, Value};

use crate::node::Node;
use crate::patch::types::{ArrayIndex, ArrayOp, Key, Op, OpKind, Payload, PatchError, PathSpec};

// ── Field helpers ─────────────────────────────────────────────────────────

fn as_object(v: &Value) -> Result<&Map<String, Value>, PatchError> {
    v.as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))
}

fn decode_kind(obj: &Map<String, Value>) -> Result<OpKind, PatchError> {
    let s = obj
        .get("type")
        .or_else(|| obj.get("op"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'type' field".into()))?;
    s.parse()
}

fn required_value<'a>(obj: &'a Map<String, Value>, kind: OpKind) -> Result<&'a Value, PatchError> {
    obj.get("value")
        .ok_or_else(|| PatchError::InvalidOp(format!("{} requires 'value'", kind.as_str())))
}

// ── Path ──────────────────────────────────────────────────────────────────

fn decode_path(v: &Value) -> Result<PathSpec, PatchError> {
    match v {
        Value::String(s) => Ok(PathSpec::Pointer(s.clone())),
        Value::Array(steps) => steps
            .iter()
            .map(|step| {
                Key::from_json(step).ok_or_else(|| {
                    PatchError::InvalidOp("path steps must be strings or non-negative integers".into())
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PathSpec::Keys),
        _ => Err(PatchError::InvalidOp("path must be a string or an array".into())),
    }
}

fn encode_path(path: &PathSpec) -> Value {
    match path {
        PathSpec::Pointer(s) => Value::String(s.clone()),
        PathSpec::Keys(keys) => Value::Array(keys.iter().map(Key::to_json).collect()),
    }
}

// ── Array index and payload ───────────────────────────────────────────────

fn decode_position(v: &Value) -> Option<usize> {
    v.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn decode_index(v: &Value) -> Result<ArrayIndex, PatchError> {
    let invalid = || PatchError::InvalidOp("index must be a non-negative integer or [start, end]".into());
    match v {
        Value::Number(_) => decode_position(v).map(ArrayIndex::At).ok_or_else(invalid),
        Value::Array(bounds) => match bounds.as_slice() {
            [start] => {
                let start = decode_position(start).ok_or_else(invalid)?;
                Ok(ArrayIndex::Range(start, start))
            }
            [start, end] => {
                let start = decode_position(start).ok_or_else(invalid)?;
                let end = decode_position(end).ok_or_else(invalid)?;
                Ok(ArrayIndex::Range(start, end))
            }
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn encode_index(index: ArrayIndex) -> Value {
    match index {
        ArrayIndex::At(i) => json!(i),
        ArrayIndex::Range(start, end) => json!([start, end]),
    }
}

fn decode_payload(v: &Value) -> Payload {
    match v {
        Value::Array(items) => Payload::Many(items.iter().cloned().map(Node::from).collect()),
        other => Payload::One(Node::from(other.clone())),
    }
}

fn encode_payload(payload: &Payload) -> Value {
    match payload {
        Payload::One(node) => Value::from(node),
        Payload::Many(nodes) => Value::Array(nodes.iter().map(Value::from).collect()),
    }
}

// ── Operations ────────────────────────────────────────────────────────────

/// Serialize an [`Op`] to a `serde_json::Value`.
pub fn to_json(op: &Op) -> Value {
    let mut m = Map::new();
    m.insert("type".into(), json!(op.kind().as_str()));
    m.insert("path".into(), encode_path(op.path()));
    if let Some(value) = op.value() {
        m.insert("value".into(), Value::from(value));
    }
    Value::Object(m)
}

/// Deserialize an [`Op`] from a `serde_json::Value`.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = as_object(v)?;
    let kind = decode_kind(obj)?;
    let path = obj
        .get("path")
        .ok_or_else(|| PatchError::InvalidOp("missing 'path' field".into()))
        .and_then(decode_path)?;
    match kind {
        OpKind::Add => Ok(Op::Add { path, value: Node::from(required_value(obj, kind)?.clone()) }),
        OpKind::Replace => Ok(Op::Replace { path, value: Node::from(required_value(obj, kind)?.clone()) }),
        OpKind::Remove => Ok(Op::Remove { path }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

/// Deserialize a JSON array of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

// ── Array operations ──────────────────────────────────────────────────────

/// Serialize an [`ArrayOp`] to a `serde_json::Value`.
pub fn array_op_to_json(op: &ArrayOp) -> Value {
    let mut m = Map::new();
    m.insert("type".into(), json!(op.kind().as_str()));
    m.insert("index".into(), encode_index(op.index()));
    if let Some(value) = op.value() {
        m.insert("value".into(), encode_payload(value));
    }
    Value::Object(m)
}

/// Deserialize an [`ArrayOp`] from a `serde_json::Value`.
pub fn array_op_from_json(v: &Value) -> Result<ArrayOp, PatchError> {
    let obj = as_object(v)?;
    let kind = decode_kind(obj)?;
    let index = obj
        .get("index")
        .ok_or_else(|| PatchError::InvalidOp("missing 'index' field".into()))
        .and_then(decode_index)?;
    match kind {
        OpKind::Add => Ok(ArrayOp::Add { index, value: decode_payload(required_value(obj, kind)?) }),
        OpKind::Replace => Ok(ArrayOp::Replace { index, value: decode_payload(required_value(obj, kind)?) }),
        OpKind::Remove => Ok(ArrayOp::Remove { index }),
    }
}

/// Deserialize a JSON array of array operations.
pub fn from_json_array_patch(v: &Value) -> Result<Vec<ArrayOp>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("array patch must be an array".into()))?;
    arr.iter().map(array_op_from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_add_with_string_path() {
        let op = from_json(&json!({"type": "add", "path": "/a/-", "value": {"x": 1}})).unwrap();
        assert_eq!(op, Op::add("/a/-", Node::from(json!({"x": 1}))));
    }

    #[test]
    fn decode_accepts_op_alias() {
        let op = from_json(&json!({"op": "remove", "path": "/a"})).unwrap();
        assert_eq!(op, Op::remove("/a"));
    }

    #[test]
    fn decode_tokenized_path() {
        let op = from_json(&json!({"type": "remove", "path": ["projects", 1, "team"]})).unwrap();
        assert_eq!(
            op.path(),
            &PathSpec::Keys(vec![Key::from("projects"), Key::Index(1), Key::from("team")])
        );
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let err = from_json(&json!({"type": "move", "path": "/a"})).unwrap_err();
        assert!(matches!(err, PatchError::InvalidOp(_)));
    }

    #[test]
    fn op_kind_parses_from_str() {
        assert_eq!("replace".parse::<OpKind>(), Ok(OpKind::Replace));
        assert_eq!(
            "move".parse::<OpKind>(),
            Err(PatchError::InvalidOp("unknown operation type: move".into()))
        );
    }

    #[test]
    fn decode_kind_is_case_sensitive() {
        assert!(from_json(&json!({"type": "Add", "path": "/a", "value": 1})).is_err());
    }

    #[test]
    fn decode_requires_value_for_replace() {
        let err = from_json(&json!({"type": "replace", "path": "/a"})).unwrap_err();
        assert_eq!(err, PatchError::InvalidOp("replace requires 'value'".into()));
    }

    #[test]
    fn decode_null_value_is_kept() {
        let op = from_json(&json!({"type": "add", "path": "/a", "value": null})).unwrap();
        assert_eq!(op.value(), Some(&Node::Null));
    }

    #[test]
    fn encode_omits_value_for_remove() {
        assert_eq!(to_json(&Op::remove("/a")), json!({"type": "remove", "path": "/a"}));
    }

    #[test]
    fn decode_array_range_and_payloads() {
        let ops = from_json_array_patch(&json!([
            {"type": "replace", "index": [0, 2], "value": "v"},
            {"type": "add", "index": 4, "value": [1, 2]},
            {"type": "remove", "index": [5]},
        ]))
        .unwrap();
        assert_eq!(ops[0], ArrayOp::replace_range(0, 2, Node::from("v")));
        assert_eq!(ops[1], ArrayOp::add(4, vec![Node::from(json!(1)), Node::from(json!(2))]));
        assert_eq!(ops[2], ArrayOp::remove_range(5, 5));
    }

    #[test]
    fn decode_array_rejects_negative_index() {
        assert!(array_op_from_json(&json!({"type": "remove", "index": -1})).is_err());
        assert!(array_op_from_json(&json!({"type": "remove", "index": [1, 2, 3]})).is_err());
    }

    #[test]
    fn encode_array_op() {
        let op = ArrayOp::replace_range(1, 2, Node::from("v"));
        assert_eq!(array_op_to_json(&op), json!({"type": "replace", "index": [1, 2], "value": "v"}));
    }
}
