mod gate;
mod getheader;
mod manager;
mod manager_middleware;
mod rejection;

pub use gate::*;
pub use getheader::*;
pub use manager::*;
pub use manager_middleware::*;
pub use rejection::*;
