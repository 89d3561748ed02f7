//! Output rendering and schema validation.

mod json;
mod validate;

pub use json::{to_json, JsonFormat};
pub use validate::{validate, validate_dir, validate_file, validate_str, ValidationReport};
