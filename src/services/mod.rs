pub mod audit;
pub mod auth;
pub mod session;

pub use audit::Audit;
pub use auth::{AuthError, AuthService, Session};
pub use session::SessionStore;
