use std::fmt;

use serde_json::{Map, Value};

use super::apply::PatchErrorKind;
use super::pointer::parse_pointer;

/// Scalar kinds a patchable field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Text => "string",
        }
    }
}

/// A JSON number with an integral value inside `i32` range.
fn as_integer(value: &Value) -> Option<i32> {
    let number = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })?;
    i32::try_from(number).ok()
}

/// Typed getter/setter pair for one field of `T`.
///
/// A `None` setter marks the field read-only: it can be tested, copied and
/// moved from, but never written.
pub enum Accessor<T> {
    Integer {
        get: fn(&T) -> i32,
        set: Option<fn(&mut T, i32)>,
    },
    Text {
        get: fn(&T) -> &str,
        set: Option<fn(&mut T, String)>,
    },
}

/// One entry of a [`FieldTable`].
pub struct FieldAccessor<T> {
    /// Property name as addressed by pointers (`/Email` → `Email`).
    pub name: &'static str,
    /// Member name in the JSON representation.
    pub json_key: &'static str,
    pub access: Accessor<T>,
}

impl<T> FieldAccessor<T> {
    pub fn kind(&self) -> FieldKind {
        match self.access {
            Accessor::Integer { .. } => FieldKind::Integer,
            Accessor::Text { .. } => FieldKind::Text,
        }
    }

    pub fn pointer(&self) -> String {
        format!("/{}", self.name)
    }

    pub fn is_writable(&self) -> bool {
        match self.access {
            Accessor::Integer { set, .. } => set.is_some(),
            Accessor::Text { set, .. } => set.is_some(),
        }
    }

    pub fn read(&self, target: &T) -> Value {
        match self.access {
            Accessor::Integer { get, .. } => Value::from(get(target)),
            Accessor::Text { get, .. } => Value::from(get(target)),
        }
    }

    /// Coerces `value` to this field's kind and stores it.
    pub fn write(&self, target: &mut T, value: &Value) -> Result<(), PatchErrorKind> {
        match self.access {
            Accessor::Integer { set, .. } => {
                let set = set.ok_or_else(|| self.read_only())?;
                let number = as_integer(value).ok_or_else(|| self.mismatch())?;
                set(target, number);
            }
            Accessor::Text { set, .. } => {
                let set = set.ok_or_else(|| self.read_only())?;
                let text = value.as_str().ok_or_else(|| self.mismatch())?;
                set(target, text.to_string());
            }
        }
        Ok(())
    }

    /// Compares the current value with `value` after coercing it to this
    /// field's kind, so `1` and `1.0` are the same integer.
    pub fn holds(&self, target: &T, value: &Value) -> bool {
        match self.access {
            Accessor::Integer { get, .. } => as_integer(value) == Some(get(target)),
            Accessor::Text { get, .. } => value.as_str() == Some(get(target)),
        }
    }

    /// Resets the field to its empty value: `0` or `""`.
    pub fn clear(&self, target: &mut T) -> Result<(), PatchErrorKind> {
        match self.access {
            Accessor::Integer { set, .. } => {
                let set = set.ok_or_else(|| self.read_only())?;
                set(target, 0);
            }
            Accessor::Text { set, .. } => {
                let set = set.ok_or_else(|| self.read_only())?;
                set(target, String::new());
            }
        }
        Ok(())
    }

    /// Copies this field from `source` into `target`. Read-only fields are left alone.
    pub fn copy_between(&self, target: &mut T, source: &T) {
        match self.access {
            Accessor::Integer { get, set: Some(set) } => set(target, get(source)),
            Accessor::Text { get, set: Some(set) } => set(target, get(source).to_string()),
            _ => {}
        }
    }

    fn read_only(&self) -> PatchErrorKind {
        PatchErrorKind::ReadOnly(self.pointer())
    }

    fn mismatch(&self) -> PatchErrorKind {
        PatchErrorKind::TypeMismatch {
            path: self.pointer(),
            expected: self.kind().as_str(),
        }
    }
}

impl<T> fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// The patchable surface of a resource type, in declaration order.
pub struct FieldTable<T: 'static> {
    fields: &'static [FieldAccessor<T>],
}

impl<T: 'static> FieldTable<T> {
    pub const fn new(fields: &'static [FieldAccessor<T>]) -> Self {
        Self { fields }
    }

    /// Resolves a pointer to exactly one field. Names match ASCII
    /// case-insensitively; the root pointer and nested pointers resolve to nothing.
    pub fn resolve(&self, pointer: &str) -> Option<&'static FieldAccessor<T>> {
        let tokens = parse_pointer(pointer);
        let [token] = tokens.as_slice() else {
            return None;
        };
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(token))
    }

    /// JSON object holding exactly the fields of this table.
    pub fn to_json(&self, target: &T) -> Value {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.json_key.to_string(), field.read(target)))
            .collect();
        Value::Object(object)
    }

    /// Copies every writable field of this table from `source` into `target`.
    pub fn copy_writable(&self, target: &mut T, source: &T) {
        for field in self.fields {
            field.copy_between(target, source);
        }
    }
}

impl<T: 'static> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|field| field.name))
            .finish()
    }
}
