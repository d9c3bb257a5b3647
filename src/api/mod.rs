//! Transport-neutral HTTP surface for the user store.
//!
//! A single [`UsersApi`] serves every API version; what differs between
//! versions lives in a `VersionPolicy`.

mod error;
mod payload;
mod request;
mod users;
mod version;

pub use request::{ApiRequest, ApiResponse, Method};
pub use users::UsersApi;
pub use version::ApiVersion;
