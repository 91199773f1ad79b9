//! Post-processing of decoded service responses.
//!
//! Every JSON response goes through the same pipeline: the uniform error
//! envelope check, then operation-specific unwrapping per the registry's
//! payload shape, then `datetime` coercion for observation-like records.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::registry::{OperationDefinition, Payload};

/// The service's uniform error envelope, reported under a top-level
/// `status` key regardless of HTTP status code.
#[derive(Debug, Deserialize)]
pub struct RemoteStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub value: i64,
}

/// Fails with [`ClientError::Remote`] when the decoded body carries a
/// `status` error envelope. Runs before any operation-specific unwrapping.
pub(crate) fn check_status(body: &Value) -> Result<(), ClientError> {
    let Some(status) = body.get("status") else {
        return Ok(());
    };
    let status: RemoteStatus =
        serde_json::from_value(status.clone()).unwrap_or_else(|_| RemoteStatus {
            message: status.to_string(),
            value: 0,
        });
    Err(ClientError::Remote {
        value: status.value,
        message: status.message,
    })
}

/// Applies the full post-processing pipeline for one operation.
pub(crate) fn postprocess(
    op: &OperationDefinition,
    mut body: Value,
    config: &ClientConfig,
) -> Result<Value, ClientError> {
    check_status(&body)?;

    let mut payload = match op.payload {
        Payload::Document => body,
        Payload::Record(key) => body.get_mut(key).map(Value::take).unwrap_or(Value::Null),
        Payload::List(key) => {
            let value = body.get_mut(key).map(Value::take).unwrap_or(Value::Null);
            match value {
                Value::Array(_) => value,
                // zero results: the service omits the key entirely
                Value::Null => Value::Array(Vec::new()),
                // single result: the service returns a bare record
                other => Value::Array(vec![other]),
            }
        }
    };

    if op.coerce_datetime {
        coerce_datetimes(&mut payload, config)?;
    }
    Ok(payload)
}

/// Coerces `datetime` fields in a record or in every element of a list.
fn coerce_datetimes(payload: &mut Value, config: &ClientConfig) -> Result<(), ClientError> {
    match payload {
        Value::Array(items) => {
            for item in items {
                coerce_record(item, config)?;
            }
        }
        Value::Object(_) => coerce_record(payload, config)?,
        _ => {}
    }
    Ok(())
}

fn coerce_record(record: &mut Value, config: &ClientConfig) -> Result<(), ClientError> {
    let Some(field) = record.get_mut("datetime") else {
        return Ok(());
    };
    let Some(raw) = field.as_str() else {
        return Ok(());
    };
    let parsed = parse_datetime(raw, &config.timezone, &config.time_format)?;
    *field = Value::String(parsed.to_rfc3339());
    Ok(())
}

/// Parses a service `datetime` string combined with a timezone label.
///
/// `UTC`, `GMT`, `UT` and `Z` resolve to `+00:00`; any other label is handed
/// to the format's `%z` conversion as-is, so numeric offsets such as
/// `+09:00` work directly.
pub fn parse_datetime(
    raw: &str,
    timezone: &str,
    format: &str,
) -> Result<DateTime<FixedOffset>, ClientError> {
    let offset = match timezone.to_ascii_uppercase().as_str() {
        "UTC" | "GMT" | "UT" | "Z" | "" => "+00:00",
        _ => timezone,
    };
    let combined = format!("{raw} {offset}");
    DateTime::parse_from_str(&combined, format).map_err(|source| ClientError::Datetime {
        value: combined,
        source,
    })
}
