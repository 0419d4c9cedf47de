mod logs;
mod users;

pub use logs::*;
pub use users::*;
