//! User-specific store logic: the patch/validate update hook, the per-version
//! field tables and the validation rules.

pub mod entity;
pub mod error;
pub mod fields;
pub mod rules;

pub use entity::*;
pub use error::*;
pub use fields::{USER_FIELDS_V1, USER_FIELDS_V2};
pub use rules::{USER_RULES_V1, USER_RULES_V2};
