// Infrastructure layer
pub mod chunks;
pub mod validator;

pub use chunks::*;
pub use validator::*;
