pub mod admin;
pub mod health_checks;
pub mod loan;
pub mod user;

pub use health_checks::*;
