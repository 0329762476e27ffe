//! Models feature module
//!
//! A model is an id, a name and an opaque schema document. Uploads must
//! name an existing model; nothing else couples models to jobs.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::models_routes;
