//! Request body decoding.

use serde_json::{Map, Value};

use crate::domain::User;
use crate::patch::PatchDocument;

use super::error::ApiError;
use super::version::PatchBodyShape;

const NULL_PATCH: &str = "patchDoc patch object cannot be null";
const NULL_USER: &str = "user object cannot be null";

/// A decoded PATCH body.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPayload {
    /// Caller identification sent alongside the document by v2 clients.
    pub client_id: Option<String>,
    pub document: PatchDocument,
}

/// Parses a body as JSON. `None` for an absent, blank or `null` body.
///
/// Text that is not JSON at all is an [`ApiError::Unexpected`].
fn parse_body(body: Option<&str>) -> Result<Option<Value>, ApiError> {
    let Some(text) = body.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(text).map_err(|e| ApiError::Unexpected(e.to_string()))?;
    Ok(Some(value).filter(|value| !value.is_null()))
}

fn take_member(members: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = members.keys().find(|key| key.eq_ignore_ascii_case(name))?.clone();
    members.remove(&key)
}

fn decode_document(value: Value) -> Result<PatchDocument, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("invalid patch document: {e}")))
}

pub fn decode_patch_payload(body: Option<&str>, shape: PatchBodyShape) -> Result<PatchPayload, ApiError> {
    let value = parse_body(body)?.ok_or_else(|| ApiError::BadRequest(NULL_PATCH.into()))?;

    match shape {
        PatchBodyShape::Document => Ok(PatchPayload {
            client_id: None,
            document: decode_document(value)?,
        }),
        PatchBodyShape::Envelope => {
            let Value::Object(mut members) = value else {
                return Err(ApiError::BadRequest(
                    "expected an object with a jsonPatchDocument member".into(),
                ));
            };
            let document = take_member(&mut members, "jsonPatchDocument")
                .filter(|document| !document.is_null())
                .ok_or_else(|| ApiError::BadRequest(NULL_PATCH.into()))?;
            let client_id = match take_member(&mut members, "clientId") {
                Some(Value::String(id)) => Some(id),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            };
            Ok(PatchPayload {
                client_id,
                document: decode_document(document)?,
            })
        }
    }
}

/// Decodes a PUT or POST body.
pub(crate) fn decode_user(body: Option<&str>) -> Result<User, ApiError> {
    let value = parse_body(body)?.ok_or_else(|| ApiError::BadRequest(NULL_USER.into()))?;
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("invalid user: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::OperationKind;

    const REPLACE_EMAIL: &str = r#"[{"op":"replace","path":"/Email","value":"new@email.com"}]"#;

    #[test]
    fn test_bare_document() {
        let payload = decode_patch_payload(Some(REPLACE_EMAIL), PatchBodyShape::Document).unwrap();
        assert_eq!(payload.client_id, None);
        assert_eq!(payload.document, PatchDocument::new().replace("/Email", "new@email.com"));
    }

    #[test]
    fn test_envelope_with_either_key_casing() {
        let body = format!(r#"{{"clientId":"console","jsonPatchDocument":{REPLACE_EMAIL}}}"#);
        let payload = decode_patch_payload(Some(&body), PatchBodyShape::Envelope).unwrap();
        assert_eq!(payload.client_id.as_deref(), Some("console"));
        assert_eq!(payload.document.len(), 1);

        let body = format!(r#"{{"ClientId":7,"JsonPatchDocument":{REPLACE_EMAIL}}}"#);
        let payload = decode_patch_payload(Some(&body), PatchBodyShape::Envelope).unwrap();
        assert_eq!(payload.client_id.as_deref(), Some("7"));
        assert_eq!(payload.document.operations()[0].op, OperationKind::Replace);
    }

    #[test]
    fn test_null_bodies() {
        let null_patch = Err(ApiError::BadRequest(NULL_PATCH.into()));
        for body in [None, Some(""), Some("  "), Some("null")] {
            assert_eq!(decode_patch_payload(body, PatchBodyShape::Document), null_patch);
        }
        assert_eq!(
            decode_patch_payload(Some(r#"{"clientId":"console"}"#), PatchBodyShape::Envelope),
            null_patch
        );
        assert_eq!(
            decode_patch_payload(
                Some(r#"{"clientId":"console","jsonPatchDocument":null}"#),
                PatchBodyShape::Envelope
            ),
            null_patch
        );
    }

    #[test]
    fn test_non_json_is_unexpected() {
        let err = decode_patch_payload(Some("not json"), PatchBodyShape::Document).unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_malformed_operations_are_bad_requests() {
        for body in [
            r#"[{"op":"rename","path":"/Email"}]"#,
            r#"[{"op":"replace","value":"x"}]"#,
            r#"{"op":"replace","path":"/Email","value":"x"}"#,
        ] {
            let err = decode_patch_payload(Some(body), PatchBodyShape::Document).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(ref m) if m.starts_with("invalid patch document")));
        }
    }

    #[test]
    fn test_decode_user() {
        let user = decode_user(Some(r#"{"id":1,"name":"Test User","email":"a@b.com"}"#)).unwrap();
        assert_eq!(user, User::new("Test User", "a@b.com", "").with_id(1));
        assert_eq!(decode_user(None), Err(ApiError::BadRequest(NULL_USER.into())));
    }
}
