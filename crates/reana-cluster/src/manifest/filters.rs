//! Custom template filters

use minijinja::value::ValueKind;
use minijinja::{Error, ErrorKind, Value};

/// Render any value as a double-quoted YAML scalar.
///
/// Non-string values are quoted in their display form, so `true` becomes
/// `"true"` and `200` becomes `"200"`.
pub fn quote(value: &Value) -> Result<String, Error> {
    let text = match (value.kind(), value.as_str()) {
        (_, Some(s)) => s.to_string(),
        (ValueKind::Bool, None) => value.is_true().to_string(),
        (_, None) => value.to_string(),
    };
    serde_json::to_string(&text)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, "cannot quote value").with_source(e))
}
