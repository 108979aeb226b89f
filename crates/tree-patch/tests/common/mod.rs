#![allow(dead_code)]

use serde_json::{json, Value};
use tree_patch::Node;

pub fn node(v: Value) -> Node {
    Node::from(v)
}

/// A person record with nested map and sequence branches.
pub fn employee() -> Node {
    node(json!({
        "name": "John Doe",
        "age": 30,
        "email": "johndoe@example.com",
        "address": {
            "street": "123 Main St",
            "city": "New York",
            "state": "NY",
            "zip": "10001"
        },
        "projects": [
            {"name": "Project A", "status": "completed", "team": ["Alice", "Bob"]},
            {"name": "Project B", "status": "in progress", "team": ["Charlie", "David"]},
            {"name": "Project C", "status": "in progress", "team": ["Eve"]}
        ],
        "isEmployed": true,
        "children": null,
        "clients": [
            {"name": "Client A", "status": "active"},
            {"name": "Client B", "status": "inactive"}
        ]
    }))
}

/// Follow map keys and sequence indices (given as strings) from `root`.
pub fn at<'a>(root: &'a Node, steps: &[&str]) -> &'a Node {
    steps.iter().fold(root, |node, step| match step.parse::<usize>() {
        Ok(i) if node.as_seq().is_some() => node.at(i).unwrap_or_else(|| panic!("no index {i}")),
        _ => node.get(step).unwrap_or_else(|| panic!("no key {step}")),
    })
}
