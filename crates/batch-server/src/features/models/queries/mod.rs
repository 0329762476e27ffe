//! Model queries

pub mod get;
pub mod list;

pub use get::{GetModelError, GetModelQuery};
pub use list::{ListModelsError, ListModelsQuery};
