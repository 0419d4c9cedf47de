mod identity;
mod loan;
mod log;
pub mod user;

pub use identity::*;
pub use loan::*;
pub use log::*;
pub use user::*;
