//! JSON Patch (RFC 6902) documents and their application to typed resources.
//!
//! A resource exposes its patchable surface through a [`FieldTable`], a static
//! list of pointer → accessor entries. [`apply_patch`] walks a [`PatchDocument`]
//! against that table and mutates the resource in place. It never validates the
//! result: callers run the validator as a separate step.

mod apply;
mod document;
mod fields;
mod pointer;

pub use apply::{apply_patch, PatchError};
pub use document::PatchDocument;
#[cfg(test)]
pub use apply::PatchErrorKind;
#[cfg(test)]
pub use document::OperationKind;
pub use fields::{Accessor, FieldAccessor, FieldTable};
