//! Command-line logic behind the `tree-patch` binary.
//!
//! Usage:
//!
//! ```text
//! tree-patch [--array] [--chained] '<patch-json>'  < document.json
//! ```
//!
//! Without `--array` the patch is a list of path operations applied to the
//! document. With `--array` the document must be a JSON array and the patch a
//! list of array operations; `--chained` applies them as a sequential
//! transcript instead of an independent batch.

use serde_json::Value;

use crate::node::Node;
use crate::patch::codec::json::{from_json_array_patch, from_json_patch};
use crate::patch::{apply_array_ops, apply_patch_with, ApplyPatchOptions, ArrayPatchOptions, PatchError};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Patch(PatchError),
    Usage(String),
    NotAnArray,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e)    => write!(f, "{e}"),
            CliError::Patch(e)   => write!(f, "{e}"),
            CliError::Usage(e)   => write!(f, "{e}"),
            CliError::NotAnArray => write!(f, "--array requires the document to be a JSON array"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<PatchError> for CliError {
    fn from(e: PatchError) -> Self { CliError::Patch(e) }
}

// ── Arguments ─────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub patch: String,
    pub array: bool,
    pub chained: bool,
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I, S>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = CliArgs::default();
    let mut patch = None;
    for arg in args {
        let arg = arg.into();
        match arg.as_str() {
            "--array" => out.array = true,
            "--chained" => out.chained = true,
            flag if flag.starts_with("--") => return Err(CliError::Usage(format!("unknown flag: {flag}"))),
            other => {
                if patch.replace(other.to_string()).is_some() {
                    return Err(CliError::Usage("expected a single patch argument".into()));
                }
            }
        }
    }
    out.patch = patch.ok_or_else(|| CliError::Usage("First argument must be a JSON patch array.".into()))?;
    if out.chained && !out.array {
        return Err(CliError::Usage("--chained only applies together with --array".into()));
    }
    Ok(out)
}

// ── tree-patch ────────────────────────────────────────────────────────────

/// Apply a list of path operations to a document.
///
/// Returns the patched document as a pretty-printed JSON string.
pub fn apply_json_patch(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc = Node::from(serde_json::from_str::<Value>(doc_json)?);
    let ops = from_json_patch(&serde_json::from_str(patch_json)?)?;
    let result = apply_patch_with(doc, &ops, &ApplyPatchOptions { mutate: true })?;
    Ok(serde_json::to_string_pretty(&Value::from(result))?)
}

/// Apply a list of array operations to a JSON array document.
pub fn apply_json_array_patch(doc_json: &str, patch_json: &str, chained: bool) -> Result<String, CliError> {
    let mut items = match serde_json::from_str::<Value>(doc_json)? {
        Value::Array(items) => items.into_iter().map(Node::from).collect::<Vec<_>>(),
        _ => return Err(CliError::NotAnArray),
    };
    let ops = from_json_array_patch(&serde_json::from_str(patch_json)?)?;
    apply_array_ops(&mut items, &ops, &ArrayPatchOptions { chained })?;
    Ok(serde_json::to_string_pretty(&Value::from(Node::seq(items)))?)
}

/// Run the command for parsed arguments against a document.
pub fn run(args: &CliArgs, doc_json: &str) -> Result<String, CliError> {
    if args.array {
        apply_json_array_patch(doc_json, &args.patch, args.chained)
    } else {
        apply_json_patch(doc_json, &args.patch)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
