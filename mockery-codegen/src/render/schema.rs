//! JSON-schema validation of `template-data`.

use mockery_core::{Error, Result};
use serde_json::Value;

/// Check `data` against `schema`, reporting every violation at once.
pub fn validate(location: &str, schema: &Value, data: &Value) -> Result<()> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| Error::TemplateSchemaValidation {
            schema: location.to_string(),
            message: format!("invalid schema: {e}"),
        })?;

    let violations: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();
    if violations.is_empty() {
        return Ok(());
    }
    Err(Error::TemplateSchemaValidation {
        schema: location.to_string(),
        message: violations.join("; "),
    })
}
