use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The patch operation kinds accepted by `PATCH /{resource}/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl PatchKind {
    fn name(self) -> &'static str {
        match self {
            PatchKind::Add => "add",
            PatchKind::Remove => "remove",
            PatchKind::Replace => "replace",
            PatchKind::Move => "move",
            PatchKind::Copy => "copy",
            PatchKind::Test => "test",
        }
    }
}

/// One declarative operation against a JSON document. Paths are JSON
/// Pointers (`/name`, `/addresses/0/postCode`); `from` is used by move and
/// copy, `value` by add, replace and test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Errors raised while applying patch operations. Any of these aborts the
/// whole patch; the working copy is discarded, never committed.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Invalid patch path '{0}'")]
    InvalidPath(String),
    #[error("No value at path '{0}'")]
    MissingPath(String),
    #[error("Operation '{op}' requires a '{member}' member")]
    MissingMember { op: &'static str, member: &'static str },
    #[error("Array index out of bounds at '{0}'")]
    IndexOutOfBounds(String),
    #[error("Test operation failed at '{0}'")]
    TestFailed(String),
}

/// Applies `ops` in order to a working copy of `doc`. The first failing
/// operation aborts and the original document is left untouched.
pub fn apply(doc: &Value, ops: &[PatchOperation]) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    for op in ops {
        apply_one(&mut working, op)?;
    }
    Ok(working)
}

fn apply_one(doc: &mut Value, op: &PatchOperation) -> Result<(), PatchError> {
    match op.op {
        PatchKind::Add => {
            let value = required_value(op)?.clone();
            insert(doc, &op.path, value)
        }
        PatchKind::Replace => {
            let value = required_value(op)?.clone();
            match doc.pointer_mut(&op.path) {
                Some(target) => {
                    *target = value;
                    Ok(())
                }
                None => Err(PatchError::MissingPath(op.path.clone())),
            }
        }
        PatchKind::Remove => {
            remove(doc, &op.path)?;
            Ok(())
        }
        PatchKind::Move => {
            let from = required_from(op)?;
            let value = remove(doc, from)?;
            insert(doc, &op.path, value)
        }
        PatchKind::Copy => {
            let from = required_from(op)?;
            let value = doc
                .pointer(from)
                .cloned()
                .ok_or_else(|| PatchError::MissingPath(from.to_string()))?;
            insert(doc, &op.path, value)
        }
        PatchKind::Test => {
            let expected = required_value(op)?;
            let actual = doc
                .pointer(&op.path)
                .ok_or_else(|| PatchError::MissingPath(op.path.clone()))?;
            if actual == expected {
                Ok(())
            } else {
                Err(PatchError::TestFailed(op.path.clone()))
            }
        }
    }
}

fn required_value(op: &PatchOperation) -> Result<&Value, PatchError> {
    op.value
        .as_ref()
        .ok_or(PatchError::MissingMember { op: op.op.name(), member: "value" })
}

fn required_from(op: &PatchOperation) -> Result<&str, PatchError> {
    op.from
        .as_deref()
        .ok_or(PatchError::MissingMember { op: op.op.name(), member: "from" })
}

/// Splits a pointer into its parent pointer and unescaped leaf token.
fn split_pointer(path: &str) -> Result<(&str, String), PatchError> {
    if !path.starts_with('/') {
        return Err(PatchError::InvalidPath(path.to_string()));
    }
    // rfind cannot fail: the path starts with '/'
    let at = path.rfind('/').unwrap_or_default();
    let token = path[at + 1..].replace("~1", "/").replace("~0", "~");
    Ok((&path[..at], token))
}

fn insert(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, token) = split_pointer(path)?;
    let parent = doc
        .pointer_mut(parent)
        .ok_or_else(|| PatchError::MissingPath(path.to_string()))?;

    match parent {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(items) => {
            if token == "-" {
                items.push(value);
                return Ok(());
            }
            let index: usize =
                token.parse().map_err(|_| PatchError::InvalidPath(path.to_string()))?;
            if index > items.len() {
                return Err(PatchError::IndexOutOfBounds(path.to_string()));
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidPath(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidPath(path.to_string()));
    }
    let (parent, token) = split_pointer(path)?;
    let parent = doc
        .pointer_mut(parent)
        .ok_or_else(|| PatchError::MissingPath(path.to_string()))?;

    match parent {
        Value::Object(map) => {
            map.remove(&token).ok_or_else(|| PatchError::MissingPath(path.to_string()))
        }
        Value::Array(items) => {
            let index: usize =
                token.parse().map_err(|_| PatchError::InvalidPath(path.to_string()))?;
            if index >= items.len() {
                return Err(PatchError::IndexOutOfBounds(path.to_string()));
            }
            Ok(items.remove(index))
        }
        _ => Err(PatchError::InvalidPath(path.to_string())),
    }
}
