//! Patchable surface of [`User`] per API version.
//!
//! `Id` is readable everywhere but has no setter. `Phone` only exists from v2 on.

use crate::domain::User;
use crate::patch::{Accessor, FieldAccessor, FieldTable};

fn id(user: &User) -> i32 {
    user.id
}

fn name(user: &User) -> &str {
    &user.name
}

fn set_name(user: &mut User, value: String) {
    user.name = value;
}

fn email(user: &User) -> &str {
    &user.email
}

fn set_email(user: &mut User, value: String) {
    user.email = value;
}

fn phone(user: &User) -> &str {
    &user.phone
}

fn set_phone(user: &mut User, value: String) {
    user.phone = value;
}

const ID: FieldAccessor<User> = FieldAccessor {
    name: "Id",
    json_key: "id",
    access: Accessor::Integer { get: id, set: None },
};

const NAME: FieldAccessor<User> = FieldAccessor {
    name: "Name",
    json_key: "name",
    access: Accessor::Text { get: name, set: Some(set_name) },
};

const EMAIL: FieldAccessor<User> = FieldAccessor {
    name: "Email",
    json_key: "email",
    access: Accessor::Text { get: email, set: Some(set_email) },
};

const PHONE: FieldAccessor<User> = FieldAccessor {
    name: "Phone",
    json_key: "phone",
    access: Accessor::Text { get: phone, set: Some(set_phone) },
};

static V1: [FieldAccessor<User>; 3] = [ID, NAME, EMAIL];
static V2: [FieldAccessor<User>; 4] = [ID, NAME, EMAIL, PHONE];

pub static USER_FIELDS_V1: FieldTable<User> = FieldTable::new(&V1);
pub static USER_FIELDS_V2: FieldTable<User> = FieldTable::new(&V2);
