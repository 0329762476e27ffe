//! CLI command implementations
//!
//! Each subcommand group has its own module with a `run` function.

pub mod job;
pub mod model;

use crate::api::ApiResponse;
use crate::error::{CliError, Result};

/// Render a response body for the terminal.
///
/// JSON bodies are pretty-printed; anything else is passed through. An
/// empty body (e.g. `204 No Content`) renders as nothing.
pub fn render_body(body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Print the body to stdout, then fail on a non-success status.
pub fn print_response(response: ApiResponse) -> Result<()> {
    let rendered = render_body(&response.body);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }

    if response.is_success() {
        Ok(())
    } else {
        Err(CliError::Api {
            status: response.status,
        })
    }
}
