// Core domain layer
pub mod file_ref;
pub mod interfaces;
pub mod loaders;
pub mod models;
pub mod services;

pub use file_ref::*;
pub use interfaces::*;
pub use models::*;
pub use services::*;
