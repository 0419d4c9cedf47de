mod login;
mod password;
mod profile;
mod refresh;
mod register;
mod verify;

pub use login::*;
pub use password::*;
pub use profile::*;
pub use refresh::*;
pub use register::*;
pub use verify::*;
