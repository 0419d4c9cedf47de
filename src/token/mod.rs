//! Signed tokens: session claims (access and refresh) and one-shot link
//! claims (email verification, password reset), all HS256 under a single
//! shared secret.

mod claims;
mod codec;
mod issuer;

pub use claims::*;
pub use codec::*;
pub use issuer::*;
