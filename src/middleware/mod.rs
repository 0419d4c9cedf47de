pub mod authentication;
pub mod authorization;

pub use authentication::{Authentication, AuthGate, Rejection, NEW_ACCESS_TOKEN_HEADER};
pub use authorization::{require_admin, AdminGate};
