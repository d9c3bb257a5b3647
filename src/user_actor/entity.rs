use std::fmt;

use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate};
use crate::patch::{apply_patch, FieldTable, PatchDocument};
use crate::validation::{validate, RuleSet};

use super::error::UserError;

/// A patch document together with the field table and rule set it runs under.
pub struct UserPatch {
    pub document: PatchDocument,
    pub fields: &'static FieldTable<User>,
    pub rules: &'static RuleSet<User>,
}

/// A full replacement; only the fields of `fields` are taken from `user`.
pub struct UserReplacement {
    pub user: User,
    pub fields: &'static FieldTable<User>,
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("operations", &self.document.len())
            .field("fields", self.fields)
            .finish()
    }
}

impl fmt::Debug for UserReplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserReplacement")
            .field("user", &self.user)
            .field("fields", self.fields)
            .finish()
    }
}

impl Entity for User {
    const KIND: &'static str = "user";

    type Id = i32;
    type CreatePayload = UserCreate;
    type Replacement = UserReplacement;
    type Patch = UserPatch;
    type Error = UserError;

    fn id(&self) -> &i32 { &self.id }

    /// Creates a new User from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the store
    /// * `payload` - User creation parameters containing name, email and phone
    fn from_create(id: i32, payload: UserCreate) -> Result<Self, UserError> {
        Ok(Self {
            id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
        })
    }

    /// Overwrites every writable field visible to the replacement's version.
    ///
    /// The id never changes; fields hidden from that version keep their value.
    fn on_replace(&mut self, replacement: UserReplacement) -> Result<(), UserError> {
        if replacement.user.id != self.id {
            return Err(UserError::IdMismatch { route: self.id, body: replacement.user.id });
        }
        replacement.fields.copy_writable(self, &replacement.user);
        Ok(())
    }

    /// Applies the patch document, then validates the result.
    ///
    /// The two steps stay separate: a document that applies cleanly can still
    /// produce an invalid user, which is reported as [`UserError::Validation`].
    /// An empty document still validates the stored user.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if !patch.document.is_empty() {
            apply_patch(self, &patch.document, patch.fields)?;
        }

        let report = validate(self, patch.rules);
        if report.is_valid() {
            Ok(())
        } else {
            Err(UserError::Validation(report))
        }
    }
}
