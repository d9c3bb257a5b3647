use crate::domain::User;
use crate::validation::{FieldRule, FieldRules, ObjectRule, RuleSet};

pub const NAME_MAX_LENGTH: usize = 25;

fn name(user: &User) -> &str {
    &user.name
}

fn email(user: &User) -> &str {
    &user.email
}

fn phone(user: &User) -> &str {
    &user.phone
}

fn has_contact(user: &User) -> bool {
    !user.email.trim().is_empty() || !user.phone.trim().is_empty()
}

/// v1: email is mandatory, phone is not part of the model.
pub static USER_RULES_V1: RuleSet<User> = RuleSet::new(
    &[
        FieldRules {
            field: "Name",
            read: name,
            rules: &[FieldRule::Required, FieldRule::MaxLength(NAME_MAX_LENGTH)],
        },
        FieldRules {
            field: "Email",
            read: email,
            rules: &[FieldRule::Required, FieldRule::Email],
        },
    ],
    &[],
);

/// v2: email and phone are both optional, but one of them must be present.
pub static USER_RULES_V2: RuleSet<User> = RuleSet::new(
    &[
        FieldRules {
            field: "Name",
            read: name,
            rules: &[FieldRule::Required, FieldRule::MaxLength(NAME_MAX_LENGTH)],
        },
        FieldRules {
            field: "Email",
            read: email,
            rules: &[FieldRule::Email],
        },
        FieldRules {
            field: "Phone",
            read: phone,
            rules: &[FieldRule::Phone],
        },
    ],
    &[ObjectRule {
        message: "Email or Phone is required.",
        holds: has_contact,
    }],
);
