//! Schema validation of rendered outlines.
//!
//! The acceptance contract: `title` is a string, `outline` is a list, and
//! every entry has `level` in H1..H3, non-empty `text` and an integer
//! `page >= 1`. Every violation is reported, not only the first.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

const LEVELS: [&str; 3] = ["H1", "H2", "H3"];
const ENTRY_FIELDS: [&str; 3] = ["level", "text", "page"];

/// Validation outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// File that was checked
    pub path: PathBuf,
    /// Every violation found; empty when the file is valid
    pub errors: Vec<String>,
    /// Title, when the file parsed and carried one
    pub title: Option<String>,
    /// Number of outline entries, when the outline is a list
    pub outline_count: usize,
}

impl ValidationReport {
    /// True if no violation was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a JSON value against the output contract.
pub fn validate(value: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(object) = value.as_object() else {
        errors.push("Top-level value must be an object".to_string());
        return errors;
    };

    match object.get("title") {
        None => errors.push("Missing required field: 'title'".to_string()),
        Some(title) if !title.is_string() => {
            errors.push("Field 'title' must be a string".to_string())
        }
        Some(_) => {}
    }

    match object.get("outline") {
        None => errors.push("Missing required field: 'outline'".to_string()),
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_entry(i, item, &mut errors);
            }
        }
        Some(_) => errors.push("Field 'outline' must be a list".to_string()),
    }

    errors
}

fn validate_entry(i: usize, item: &Value, errors: &mut Vec<String>) {
    let Some(entry) = item.as_object() else {
        errors.push(format!("Outline item {} must be an object", i));
        return;
    };

    for field in ENTRY_FIELDS {
        let Some(value) = entry.get(field) else {
            errors.push(format!(
                "Outline item {} missing required field: '{}'",
                i, field
            ));
            continue;
        };

        match field {
            "level" => {
                if !value.as_str().is_some_and(|l| LEVELS.contains(&l)) {
                    errors.push(format!(
                        "Outline item {} field 'level' must be one of: H1, H2, H3",
                        i
                    ));
                }
            }
            "text" => {
                if !value.as_str().is_some_and(|t| !t.trim().is_empty()) {
                    errors.push(format!(
                        "Outline item {} field 'text' must be a non-empty string",
                        i
                    ));
                }
            }
            _ => {
                if !value.as_u64().is_some_and(|p| p >= 1) {
                    errors.push(format!(
                        "Outline item {} field 'page' must be a positive integer",
                        i
                    ));
                }
            }
        }
    }
}

/// Parse and validate a JSON string.
pub fn validate_str(json: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => validate(&value),
        Err(e) => vec![format!("Invalid JSON format: {}", e)],
    }
}

/// Validate a single file. Unreadable files are reported, not returned as errors.
pub fn validate_file<P: AsRef<Path>>(path: P) -> ValidationReport {
    let path = path.as_ref();
    let mut report = ValidationReport {
        path: path.to_path_buf(),
        errors: Vec::new(),
        title: None,
        outline_count: 0,
    };

    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            report.errors.push(format!("Error reading file: {}", e));
            return report;
        }
    };

    match serde_json::from_str::<Value>(&json) {
        Ok(value) => {
            report.errors = validate(&value);
            report.title = value.get("title").and_then(Value::as_str).map(String::from);
            report.outline_count = value
                .get("outline")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
        }
        Err(e) => report.errors.push(format!("Invalid JSON format: {}", e)),
    }

    report
}

/// Validate every `*.json` file in a directory, sorted by file name.
pub fn validate_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<ValidationReport>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files.iter().map(validate_file).collect())
}
