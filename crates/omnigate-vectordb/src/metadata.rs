//! Metadata codec.
//!
//! Heterogeneous metadata lives in a single text column as a plain JSON
//! object (`{"year": 1928, "title": "Steamboat Willie"}`). Decoding maps
//! JSON strings and numbers back onto [`MetadataValue`]; any other JSON type
//! is rejected with `UnsupportedMetadataType`.

use serde_json::{Map, Number, Value};

use omnigate_core::vector::{FieldType, Metadata, MetadataValue, VectorSchema};
use omnigate_core::{GatewayError, GatewayResult, ProviderError};

/// Serialize metadata into its storage form.
pub fn encode(metadata: &Metadata) -> String {
    let object: Map<String, Value> = metadata
        .iter()
        .map(|(key, value)| (key.clone(), to_json(value)))
        .collect();
    Value::Object(object).to_string()
}

/// Parse the storage form back into metadata. Blank text is empty metadata.
pub fn decode(text: &str) -> GatewayResult<Metadata> {
    if text.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::Parse(format!("stored metadata is not JSON: {e}")))?;
    let Value::Object(object) = value else {
        return Err(ProviderError::Parse("stored metadata is not a JSON object".to_string()).into());
    };

    let mut metadata = Metadata::new();
    for (key, value) in object {
        let decoded = from_json(&key, value)?;
        metadata.insert(key, decoded);
    }
    Ok(metadata)
}

/// Check values of declared fields against their declared types.
///
/// Keys the schema does not declare are accepted as-is.
pub fn validate(schema: &VectorSchema, metadata: &Metadata) -> GatewayResult<()> {
    for (key, value) in metadata {
        if let MetadataValue::FloatValue(f) = value {
            if !f.is_finite() {
                return Err(GatewayError::UnsupportedMetadataType {
                    field: key.clone(),
                    found: "non-finite float".to_string(),
                });
            }
        }
        if let Some(declared) = schema.fields.get(key) {
            let actual = value.field_type();
            if actual != *declared {
                return Err(GatewayError::UnsupportedMetadataType {
                    field: key.clone(),
                    found: format!("{} (declared {})", type_name(actual), type_name(*declared)),
                });
            }
        }
    }
    Ok(())
}

fn to_json(value: &MetadataValue) -> Value {
    match value {
        MetadataValue::StringValue(s) => Value::String(s.clone()),
        MetadataValue::IntValue(i) => Value::Number((*i).into()),
        // NaN and infinities have no JSON form.
        MetadataValue::FloatValue(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
    }
}

fn from_json(key: &str, value: Value) -> GatewayResult<MetadataValue> {
    let unsupported = |found: &str| GatewayError::UnsupportedMetadataType {
        field: key.to_string(),
        found: found.to_string(),
    };

    match value {
        Value::String(s) => Ok(MetadataValue::StringValue(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(MetadataValue::IntValue(i)),
            None => n
                .as_f64()
                .map(MetadataValue::FloatValue)
                .ok_or_else(|| unsupported("number")),
        },
        Value::Bool(_) => Err(unsupported("boolean")),
        Value::Null => Err(unsupported("null")),
        Value::Array(_) => Err(unsupported("array")),
        Value::Object(_) => Err(unsupported("object")),
    }
}

fn type_name(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "string",
        FieldType::Integer => "integer",
        FieldType::Float => "float",
    }
}
