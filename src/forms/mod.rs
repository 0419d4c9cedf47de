pub mod loan;
pub mod user;

pub use loan::*;
pub use user::*;
