pub(crate) mod json;
pub mod password;

pub use json::*;
pub use password::{Argon2Hasher, PasswordHasher};
