//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::Value;

use grocy_core::CommandResult;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Payload from `--data` or `--from-file`; neither means `null`.
pub fn read_payload(data: Option<&str>, from_file: Option<&Path>) -> Result<Value, CliError> {
    match (data, from_file) {
        (Some(raw), _) => serde_json::from_str(raw).map_err(|e| CliError::Validation {
            field: "data".into(),
            reason: format!("invalid JSON: {e}"),
        }),
        (None, Some(path)) => read_json_file(path),
        (None, None) => Ok(Value::Null),
    }
}

/// Table-mode text for a command result.
pub fn result_detail(result: &CommandResult) -> String {
    match result {
        CommandResult::Ok => "OK".into(),
        CommandResult::Created {
            object_id: Some(id),
        } => format!("Created object {id}"),
        CommandResult::Created { object_id: None } => "Created".into(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn inline_data_parsed() {
        let v = read_payload(Some(r#"{"chore_id": 3}"#), None).unwrap();
        assert_eq!(v, json!({"chore_id": 3}));
    }

    #[test]
    fn missing_payload_is_null() {
        assert_eq!(read_payload(None, None).unwrap(), Value::Null);
    }

    #[test]
    fn file_payload_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"task_id": 7}}"#).unwrap();
        let v = read_payload(None, Some(file.path())).unwrap();
        assert_eq!(v, json!({"task_id": 7}));
    }

    #[test]
    fn created_result_names_object() {
        let text = result_detail(&CommandResult::Created { object_id: Some(12) });
        assert_eq!(text, "Created object 12");
        assert_eq!(result_detail(&CommandResult::Ok), "OK");
    }

    #[test]
    fn bad_inline_json_is_validation_error() {
        assert!(matches!(
            read_payload(Some("{nope"), None),
            Err(CliError::Validation { .. })
        ));
    }
}
