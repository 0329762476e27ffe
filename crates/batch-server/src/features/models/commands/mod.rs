//! Model commands

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateModelCommand, CreateModelError};
pub use delete::{DeleteModelCommand, DeleteModelError};
pub use update::{UpdateModelCommand, UpdateModelError};
