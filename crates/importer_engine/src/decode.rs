use importer_core::{CellValue, FormErrors, JobResult, JobStatus, UploadOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("expected a json object, got {0}")]
    NotAnObject(&'static str),
    #[error("missing or non-string `status` field")]
    MissingStatus,
    #[error("malformed {status} result: {message}")]
    MalformedResult { status: String, message: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Deserialize)]
struct WireProgress {
    current: u64,
    total: u64,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    header_row: Option<Vec<String>>,
    #[serde(default)]
    data_rows: Option<Vec<Vec<Value>>>,
    /// Older payloads send one table where the first row is the header.
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    column_types: Option<Vec<Option<String>>>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    error_message: Option<String>,
}

/// Decodes a status-endpoint body into a [`JobStatus`].
///
/// Fails on any shape it does not recognize rather than treating it as a
/// job failure.
pub fn decode_status(bytes: &[u8]) -> Result<JobStatus, DecodeError> {
    let body: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    let mut body = match body {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(kind_of(&other))),
    };
    let status = match body.get("status") {
        Some(Value::String(status)) => status.clone(),
        _ => return Err(DecodeError::MissingStatus),
    };
    let result = body.remove("result").unwrap_or(Value::Null);

    match status.as_str() {
        "PENDING" => Ok(JobStatus::Pending),
        "PROGRESS" => {
            let progress: WireProgress =
                serde_json::from_value(result).map_err(|err| malformed(&status, err))?;
            Ok(JobStatus::Progress {
                current: progress.current,
                total: progress.total,
                message: progress.message,
            })
        }
        "SUCCESS" => decode_success(&status, result).map(JobStatus::Success),
        _ => Ok(JobStatus::Failure {
            detail: detail_text(result),
        }),
    }
}

fn decode_success(status: &str, result: Value) -> Result<JobResult, DecodeError> {
    match result {
        Value::Object(_) => {
            let wire: WireResult =
                serde_json::from_value(result).map_err(|err| malformed(status, err))?;
            Ok(from_wire(wire))
        }
        // `[headers, rows]` as returned by the import task itself.
        Value::Array(parts) if parts.len() == 2 => {
            let (header_row, data_rows): (Vec<String>, Vec<Vec<Value>>) =
                serde_json::from_value(Value::Array(parts)).map_err(|err| malformed(status, err))?;
            Ok(JobResult {
                header_row,
                data_rows: data_rows.into_iter().map(cells).collect(),
                ..JobResult::default()
            })
        }
        other => Err(DecodeError::MalformedResult {
            status: status.to_string(),
            message: format!("expected an object, got {}", kind_of(&other)),
        }),
    }
}

fn from_wire(wire: WireResult) -> JobResult {
    let (header_row, data_rows) = match (wire.header_row, wire.data_rows, wire.data) {
        (Some(header), rows, _) => (header, rows.unwrap_or_default()),
        (None, Some(rows), _) => (Vec::new(), rows),
        (None, None, Some(mut table)) if !table.is_empty() => {
            let header = table.remove(0).into_iter().map(cell_text).collect();
            (header, table)
        }
        _ => (Vec::new(), Vec::new()),
    };

    let error = error_text(&wire.error);
    JobResult {
        header_row,
        column_types: wire.column_types.unwrap_or_default(),
        data_rows: data_rows.into_iter().map(cells).collect(),
        warnings: wire.warnings.unwrap_or_default(),
        error,
        error_message: wire.error_message,
    }
}

fn cells(row: Vec<Value>) -> Vec<CellValue> {
    row.into_iter().map(cell_value).collect()
}

fn cell_value(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(flag) => CellValue::Bool(flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => CellValue::Integer(int),
            None => CellValue::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => CellValue::Text(text),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_text(value: Value) -> String {
    cell_value(value).to_string()
}

/// `error` counts when it is truthy: a non-empty string, `true` or a non-zero number.
fn error_text(error: &Value) -> Option<String> {
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        _ => Some("The import reported an error".to_string()),
    }
}

fn detail_text(result: Value) -> String {
    match result {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn malformed(status: &str, err: serde_json::Error) -> DecodeError {
    DecodeError::MalformedResult {
        status: status.to_string(),
        message: err.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes a successful upload response.
pub fn decode_upload_response(bytes: &[u8]) -> Result<UploadOutcome, DecodeError> {
    let body: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    let body = match body {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(kind_of(&other))),
    };

    for key in ["job_id", "task_id", "id"] {
        match body.get(key) {
            Some(Value::String(id)) if !id.is_empty() => return Ok(UploadOutcome::Job(id.clone())),
            Some(Value::Number(id)) => return Ok(UploadOutcome::Job(id.to_string())),
            _ => {}
        }
    }

    if let Some(Value::Array(headers)) = body.get("headers") {
        let names = headers
            .iter()
            .map(|header| match header {
                Value::String(name) => Ok(name.clone()),
                Value::Object(fields) => match fields.get("name") {
                    Some(Value::String(name)) => Ok(name.clone()),
                    _ => Err(DecodeError::UnexpectedShape(
                        "header object without a name".to_string(),
                    )),
                },
                other => Err(DecodeError::UnexpectedShape(format!(
                    "header is a {}",
                    kind_of(other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(UploadOutcome::Headers(names));
    }

    if let Some(Value::String(target)) = body.get("redirect") {
        return Ok(UploadOutcome::Redirect(target.clone()));
    }

    Err(DecodeError::UnexpectedShape(
        "no job id, headers or redirect in upload response".to_string(),
    ))
}

/// Decodes form validation errors.
///
/// The body maps field names to lists of `{message, code}` objects. It is
/// sometimes double-encoded as a JSON string. `__all__` holds errors not
/// tied to a field.
pub fn decode_form_errors(bytes: &[u8]) -> Result<FormErrors, DecodeError> {
    let body: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    let body = match body {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|err| DecodeError::InvalidJson(err.to_string()))?,
        other => other,
    };
    let fields = match body {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(kind_of(&other))),
    };

    let mut errors = FormErrors::default();
    for (field, messages) in fields {
        let Value::Array(messages) = messages else {
            return Err(DecodeError::UnexpectedShape(format!(
                "errors for {field} are not a list"
            )));
        };
        let messages: Vec<String> = messages
            .into_iter()
            .filter_map(|message| match message {
                Value::String(text) => Some(text),
                Value::Object(mut entry) => match entry.remove("message") {
                    Some(Value::String(text)) => Some(text),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        if field == "__all__" {
            errors.non_field.extend(messages);
        } else {
            errors.fields.insert(field, messages);
        }
    }
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use importer_core::{CellValue, JobStatus, UploadOutcome};
    use pretty_assertions::assert_eq;

    use super::{decode_form_errors, decode_status, decode_upload_response, DecodeError};

    #[test]
    fn decodes_pending_and_ignores_result() {
        let status = decode_status(br#"{"status":"PENDING","result":{"current":1,"total":4}}"#);
        assert_eq!(status, Ok(JobStatus::Pending));
    }

    #[test]
    fn decodes_progress() {
        let status =
            decode_status(br#"{"status":"PROGRESS","result":{"current":2,"total":4,"message":"Loading rows"}}"#)
                .unwrap();
        assert_eq!(
            status,
            JobStatus::Progress {
                current: 2,
                total: 4,
                message: Some("Loading rows".into())
            }
        );
    }

    #[test]
    fn negative_progress_is_a_decode_error() {
        let err = decode_status(br#"{"status":"PROGRESS","result":{"current":-1,"total":4}}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedResult { .. }));
    }

    #[test]
    fn decodes_success_with_camel_case_fields() {
        let status = decode_status(
            br#"{"status":"SUCCESS","result":{
                "headerRow":["name","age"],
                "columnTypes":["VARCHAR(32)", null],
                "dataRows":[["Ada",36],["Grace",null]],
                "warnings":["row 3 skipped"],
                "error":null
            }}"#,
        )
        .unwrap();
        let JobStatus::Success(result) = status else {
            panic!("expected success");
        };
        assert_eq!(result.header_row, vec!["name", "age"]);
        assert_eq!(result.column_types, vec![Some("VARCHAR(32)".to_string()), None]);
        assert_eq!(
            result.data_rows,
            vec![
                vec![CellValue::from("Ada"), CellValue::Integer(36)],
                vec![CellValue::from("Grace"), CellValue::Null],
            ]
        );
        assert_eq!(result.warnings, vec!["row 3 skipped"]);
        assert!(!result.has_domain_error());
    }

    #[test]
    fn decodes_legacy_data_table() {
        let status = decode_status(
            br#"{"status":"SUCCESS","result":{"data":[["a","b"],[1,2.5]]}}"#,
        )
        .unwrap();
        let JobStatus::Success(result) = status else {
            panic!("expected success");
        };
        assert_eq!(result.header_row, vec!["a", "b"]);
        assert_eq!(
            result.data_rows,
            vec![vec![CellValue::Integer(1), CellValue::Float(2.5)]]
        );
    }

    #[test]
    fn decodes_task_pair_result() {
        let status =
            decode_status(br#"{"status":"SUCCESS","result":[["a"],[["1"],["2"]]]}"#).unwrap();
        let JobStatus::Success(result) = status else {
            panic!("expected success");
        };
        assert_eq!(result.header_row, vec!["a"]);
        assert_eq!(result.data_rows.len(), 2);
    }

    #[test]
    fn truthy_error_is_a_domain_error() {
        let status = decode_status(
            br#"{"status":"SUCCESS","result":{"error":"x","errorMessage":"db write failed"}}"#,
        )
        .unwrap();
        let JobStatus::Success(result) = status else {
            panic!("expected success");
        };
        assert_eq!(result.error.as_deref(), Some("x"));
        assert_eq!(result.error_message.as_deref(), Some("db write failed"));

        for falsy in ["false", "\"\"", "0", "null"] {
            let body = format!(r#"{{"status":"SUCCESS","result":{{"error":{falsy}}}}}"#);
            let JobStatus::Success(result) = decode_status(body.as_bytes()).unwrap() else {
                panic!("expected success");
            };
            assert!(!result.has_domain_error(), "{falsy}");
        }

        let JobStatus::Success(result) =
            decode_status(br#"{"status":"SUCCESS","result":{"error":true}}"#).unwrap()
        else {
            panic!("expected success");
        };
        assert!(result.has_domain_error());
    }

    #[test]
    fn other_status_is_failure_with_detail() {
        assert_eq!(
            decode_status(br#"{"status":"FAILURE","result":"boom"}"#),
            Ok(JobStatus::Failure {
                detail: "boom".into()
            })
        );
        assert_eq!(
            decode_status(br#"{"status":"REVOKED","result":null}"#),
            Ok(JobStatus::Failure {
                detail: String::new()
            })
        );
        assert_eq!(
            decode_status(br#"{"status":"FAILURE","result":{"exc_type":"ValueError"}}"#),
            Ok(JobStatus::Failure {
                detail: r#"{"exc_type":"ValueError"}"#.into()
            })
        );
    }

    #[test]
    fn unrecognized_shapes_fail_fast() {
        assert!(matches!(
            decode_status(b"not json"),
            Err(DecodeError::InvalidJson(_))
        ));
        assert_eq!(decode_status(b"[1,2]"), Err(DecodeError::NotAnObject("array")));
        assert_eq!(
            decode_status(br#"{"result":"x"}"#),
            Err(DecodeError::MissingStatus)
        );
        assert_eq!(
            decode_status(br#"{"status":3}"#),
            Err(DecodeError::MissingStatus)
        );
        assert!(matches!(
            decode_status(br#"{"status":"SUCCESS","result":"done"}"#),
            Err(DecodeError::MalformedResult { .. })
        ));
        assert!(matches!(
            decode_status(br#"{"status":"PROGRESS"}"#),
            Err(DecodeError::MalformedResult { .. })
        ));
    }

    #[test]
    fn upload_response_variants() {
        assert_eq!(
            decode_upload_response(br#"{"job_id":"abc"}"#),
            Ok(UploadOutcome::Job("abc".into()))
        );
        assert_eq!(
            decode_upload_response(br#"{"id":17}"#),
            Ok(UploadOutcome::Job("17".into()))
        );
        assert_eq!(
            decode_upload_response(br#"{"headers":["a",{"name":"b"}]}"#),
            Ok(UploadOutcome::Headers(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            decode_upload_response(br#"{"redirect":"/categorize/"}"#),
            Ok(UploadOutcome::Redirect("/categorize/".into()))
        );
        assert!(matches!(
            decode_upload_response(br#"{"ok":true}"#),
            Err(DecodeError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn form_errors_accept_double_encoding() {
        let inner = r#"{"__all__":[{"message":"Upload failed","code":""}],"table_name":[{"message":"Required","code":"required"},{"message":"Too long","code":"max_length"}]}"#;
        let outer = serde_json::to_vec(&serde_json::Value::String(inner.to_string())).unwrap();

        for body in [inner.as_bytes().to_vec(), outer] {
            let errors = decode_form_errors(&body).unwrap();
            assert_eq!(errors.non_field, vec!["Upload failed"]);
            assert_eq!(errors.fields["table_name"], vec!["Required", "Too long"]);
            assert_eq!(
                errors.lines(),
                vec![
                    "Upload failed".to_string(),
                    "table_name: Required, Too long".to_string()
                ]
            );
        }
    }
}
