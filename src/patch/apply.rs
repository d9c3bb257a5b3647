use thiserror::Error;

use super::document::{OperationKind, PatchDocument, PatchOperation};
use super::fields::FieldTable;

/// Why a single operation could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchErrorKind {
    #[error("the target location '{0}' was not found")]
    PathNotFound(String),
    #[error("the value for '{path}' must be of type {expected}")]
    TypeMismatch { path: String, expected: &'static str },
    #[error("the current value at '{0}' is not equal to the test value")]
    TestFailed(String),
    #[error("the operation requires a 'value' member")]
    MissingValue,
    #[error("the operation requires a 'from' member")]
    MissingFrom,
    #[error("the target location '{0}' is read-only")]
    ReadOnly(String),
}

impl PatchErrorKind {
    /// Stable machine-readable name, used in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            PatchErrorKind::PathNotFound(_) => "PathNotFound",
            PatchErrorKind::TypeMismatch { .. } => "TypeMismatch",
            PatchErrorKind::TestFailed(_) => "TestFailed",
            PatchErrorKind::MissingValue => "MissingValue",
            PatchErrorKind::MissingFrom => "MissingFrom",
            PatchErrorKind::ReadOnly(_) => "ReadOnly",
        }
    }
}

/// A failed document: which operation stopped processing, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("patch operation {index} ({op} {path}) failed: {kind}")]
pub struct PatchError {
    pub index: usize,
    pub op: OperationKind,
    pub path: String,
    #[source]
    pub kind: PatchErrorKind,
}

/// Applies `document` to `target` in order, through `fields`.
///
/// Stops at the first failing operation. Operations before it stay applied:
/// callers that need all-or-nothing semantics must work on a copy.
pub fn apply_patch<T: 'static>(
    target: &mut T,
    document: &PatchDocument,
    fields: &FieldTable<T>,
) -> Result<(), PatchError> {
    for (index, operation) in document.iter().enumerate() {
        apply_operation(target, operation, fields).map_err(|kind| PatchError {
            index,
            op: operation.op,
            path: operation.path.clone(),
            kind,
        })?;
    }
    Ok(())
}

fn apply_operation<T: 'static>(
    target: &mut T,
    operation: &PatchOperation,
    fields: &FieldTable<T>,
) -> Result<(), PatchErrorKind> {
    let field = fields
        .resolve(&operation.path)
        .ok_or_else(|| PatchErrorKind::PathNotFound(operation.path.clone()))?;

    match operation.op {
        OperationKind::Add | OperationKind::Replace => {
            let value = operation.value.as_ref().ok_or(PatchErrorKind::MissingValue)?;
            field.write(target, value)
        }
        OperationKind::Remove => field.clear(target),
        OperationKind::Test => {
            let expected = operation.value.as_ref().ok_or(PatchErrorKind::MissingValue)?;
            if field.holds(target, expected) {
                Ok(())
            } else {
                Err(PatchErrorKind::TestFailed(operation.path.clone()))
            }
        }
        OperationKind::Copy | OperationKind::Move => {
            let from = operation.from.as_deref().ok_or(PatchErrorKind::MissingFrom)?;
            let source = fields
                .resolve(from)
                .ok_or_else(|| PatchErrorKind::PathNotFound(from.to_string()))?;
            let moving = operation.op == OperationKind::Move && !std::ptr::eq(source, field);
            if moving && !source.is_writable() {
                return Err(PatchErrorKind::ReadOnly(source.pointer()));
            }

            let value = source.read(target);
            field.write(target, &value)?;
            if moving {
                source.clear(target)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::patch::fields::tests::{widget, Widget, WIDGET_TABLE};
    use crate::user_actor::USER_FIELDS_V2;
    use serde_json::json;

    fn apply(target: &mut Widget, document: PatchDocument) -> Result<(), PatchError> {
        apply_patch(target, &document, &WIDGET_TABLE)
    }

    #[test]
    fn test_replace_touches_only_named_fields() {
        let mut w = widget();
        apply(&mut w, PatchDocument::new().replace("/Label", "nut")).unwrap();
        assert_eq!(w, Widget { label: "nut".to_string(), ..widget() });
    }

    #[test]
    fn test_empty_document_is_noop() {
        let mut w = widget();
        apply(&mut w, PatchDocument::new()).unwrap();
        assert_eq!(w, widget());
    }

    #[test]
    fn test_later_operations_observe_earlier_ones() {
        let mut w = widget();
        let document = PatchDocument::new()
            .replace("/Label", "washer")
            .test("/Label", "washer")
            .add("/Count", 10);
        apply(&mut w, document).unwrap();
        assert_eq!(w.label, "washer");
        assert_eq!(w.count, 10);
    }

    #[test]
    fn test_failed_test_halts_and_keeps_prior_operations() {
        let mut w = widget();
        let document = PatchDocument::new()
            .replace("/Label", "nut")
            .test("/Count", 99)
            .replace("/Count", 50);

        let err = apply(&mut w, document).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.op, OperationKind::Test);
        assert_eq!(err.kind, PatchErrorKind::TestFailed("/Count".to_string()));
        assert_eq!(w.label, "nut");
        assert_eq!(w.count, 3);
    }

    #[test]
    fn test_test_compares_numbers_by_value() {
        let mut w = widget();
        apply(&mut w, PatchDocument::new().test("/Count", 3.0).test("/Id", 7)).unwrap();

        let err = apply(&mut w, PatchDocument::new().test("/Count", 3.5)).unwrap_err();
        assert_eq!(err.kind, PatchErrorKind::TestFailed("/Count".to_string()));

        let mut user = User::new("Test User", "a@b.com", "").with_id(1);
        apply_patch(&mut user, &PatchDocument::new().test("/Id", json!(1.0)), &USER_FIELDS_V2).unwrap();
    }

    #[test]
    fn test_unknown_path_leaves_target_unchanged() {
        let mut w = widget();
        let err = apply(&mut w, PatchDocument::new().replace("/Nonexistent", "x")).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.path, "/Nonexistent");
        assert_eq!(err.kind, PatchErrorKind::PathNotFound("/Nonexistent".to_string()));
        assert_eq!(w, widget());
    }

    #[test]
    fn test_remove_clears_to_empty() {
        let mut w = widget();
        apply(&mut w, PatchDocument::new().remove("/Label").remove("/Count")).unwrap();
        assert_eq!(w.label, "");
        assert_eq!(w.count, 0);
    }

    #[test]
    fn test_missing_members() {
        let mut w = widget();
        let document = PatchDocument::from(vec![PatchOperation {
            op: OperationKind::Replace,
            path: "/Label".to_string(),
            value: None,
            from: None,
        }]);
        assert_eq!(apply(&mut w, document).unwrap_err().kind, PatchErrorKind::MissingValue);

        let document = PatchDocument::from(vec![PatchOperation {
            op: OperationKind::Copy,
            path: "/Label".to_string(),
            value: None,
            from: None,
        }]);
        assert_eq!(apply(&mut w, document).unwrap_err().kind, PatchErrorKind::MissingFrom);
    }

    #[test]
    fn test_type_mismatch_reports_index() {
        let mut w = widget();
        let document = PatchDocument::new()
            .replace("/Count", 4)
            .replace("/Label", json!(["not", "text"]));
        let err = apply(&mut w, document).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.kind, PatchErrorKind::TypeMismatch { expected: "string", .. }));
        assert_eq!(w.count, 4);
    }

    #[test]
    fn test_copy_and_move() {
        let mut w = widget();
        apply(&mut w, PatchDocument::new().copy_from("/Id", "/Count")).unwrap();
        assert_eq!(w.count, 7);
        assert_eq!(w.id, 7);

        let mut w = widget();
        let err = apply(&mut w, PatchDocument::new().move_from("/Id", "/Count")).unwrap_err();
        assert_eq!(err.kind, PatchErrorKind::ReadOnly("/Id".to_string()));
        assert_eq!(w, widget());

        let mut w = widget();
        apply(&mut w, PatchDocument::new().move_from("/Count", "/Count")).unwrap();
        assert_eq!(w, widget());

        let mut user = User::new("Test User", "a@b.com", "").with_id(1);
        apply_patch(&mut user, &PatchDocument::new().move_from("/Email", "/Name"), &USER_FIELDS_V2).unwrap();
        assert_eq!(user, User::new("a@b.com", "", "").with_id(1));
    }

    #[test]
    fn test_cross_kind_copy_is_type_mismatch() {
        let mut w = widget();
        let err = apply(&mut w, PatchDocument::new().copy_from("/Count", "/Label")).unwrap_err();
        assert!(matches!(err.kind, PatchErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_error_display() {
        let mut w = widget();
        let err = apply(&mut w, PatchDocument::new().replace("/Nope", 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "patch operation 0 (replace /Nope) failed: the target location '/Nope' was not found"
        );
        assert_eq!(err.kind.code(), "PathNotFound");
    }
}
