use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The six RFC 6902 verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
            OperationKind::Replace => "replace",
            OperationKind::Move => "move",
            OperationKind::Copy => "copy",
            OperationKind::Test => "test",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single patch operation as it appears on the wire.
///
/// `value` distinguishes an absent member from an explicit `null`: the former
/// is `None`, the latter `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: OperationKind,
    pub path: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
impl PatchOperation {
    fn with_value(op: OperationKind, path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op,
            path: path.into(),
            value: Some(value.into()),
            from: None,
        }
    }

    fn with_from(op: OperationKind, from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }
}

/// An ordered list of operations bound to one target resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchOperation> {
        self.operations.iter()
    }
}

/// Builders used to assemble documents in tests.
#[cfg(test)]
impl PatchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn add(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operations
            .push(PatchOperation::with_value(OperationKind::Add, path, value));
        self
    }

    pub fn replace(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operations
            .push(PatchOperation::with_value(OperationKind::Replace, path, value));
        self
    }

    pub fn test(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operations
            .push(PatchOperation::with_value(OperationKind::Test, path, value));
        self
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.operations.push(PatchOperation {
            op: OperationKind::Remove,
            path: path.into(),
            value: None,
            from: None,
        });
        self
    }

    pub fn copy_from(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.operations
            .push(PatchOperation::with_from(OperationKind::Copy, from, path));
        self
    }

    pub fn move_from(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.operations
            .push(PatchOperation::with_from(OperationKind::Move, from, path));
        self
    }
}

#[cfg(test)]
impl From<Vec<PatchOperation>> for PatchDocument {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_wire_array() {
        let document: PatchDocument = serde_json::from_value(json!([
            { "op": "replace", "path": "/Email", "value": "new@email.com", "from": null },
            { "op": "remove", "path": "/Phone" },
            { "op": "copy", "from": "/Email", "path": "/Name" }
        ]))
        .unwrap();

        assert_eq!(document.len(), 3);
        let ops: Vec<_> = document.iter().map(|o| o.op).collect();
        assert_eq!(ops, vec![OperationKind::Replace, OperationKind::Remove, OperationKind::Copy]);
        assert_eq!(document.operations()[0].value, Some(json!("new@email.com")));
        assert_eq!(document.operations()[1].value, None);
        assert_eq!(document.operations()[2].from.as_deref(), Some("/Email"));
    }

    #[test]
    fn test_explicit_null_value_is_kept() {
        let document: PatchDocument =
            serde_json::from_value(json!([{ "op": "replace", "path": "/Email", "value": null }]))
                .unwrap();
        assert_eq!(document.operations()[0].value, Some(Value::Null));
    }

    #[test]
    fn test_ignores_unknown_members() {
        // Payloads produced by some clients carry an extra numeric operation type.
        let document: PatchDocument = serde_json::from_value(json!([
            { "value": "x@email.com", "OperationType": 2, "path": "/Email", "op": "replace" }
        ]))
        .unwrap();
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_op() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "merge", "path": "/Email" }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_serializes_like_wire_format() {
        let document = PatchDocument::new()
            .replace("/Email", "test789@email.com")
            .move_from("/Phone", "/Email");

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!([
                { "op": "replace", "path": "/Email", "value": "test789@email.com" },
                { "op": "move", "path": "/Email", "from": "/Phone" }
            ])
        );
    }
}
