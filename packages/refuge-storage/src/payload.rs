//! Conversion between `Resource` records and Qdrant point payloads.
//!
//! Payloads are validated here once. Everything above the storage layer sees typed resources.

use std::collections::HashMap;

use qdrant_client::qdrant::{Value, value::Kind};
use serde_json::{Map, Number, Value as JsonValue};

use refuge_domain::Resource;

use crate::{Error, Result};

pub fn resource_to_payload(resource: &Resource) -> Result<HashMap<String, Value>> {
	let JsonValue::Object(map) = serde_json::to_value(resource)? else {
		return Err(Error::InvalidArgument(format!(
			"Resource {} did not serialize to an object.",
			resource.id
		)));
	};

	Ok(map.into_iter().map(|(key, value)| (key, Value::from(value))).collect())
}

/// Parses a stored payload. Returns `None` and logs when the record is malformed.
pub fn payload_to_resource(payload: HashMap<String, Value>) -> Option<Resource> {
	let object: Map<String, JsonValue> =
		payload.into_iter().map(|(key, value)| (key, to_json(value))).collect();
	let id = object.get("id").and_then(JsonValue::as_str).unwrap_or("<missing>").to_string();
	let resource: Resource = match serde_json::from_value(JsonValue::Object(object)) {
		Ok(resource) => resource,
		Err(err) => {
			tracing::warn!(resource_id = %id, error = %err, "Skipping malformed resource payload.");

			return None;
		},
	};

	if let Err(err) = resource.validate() {
		tracing::warn!(resource_id = %id, error = %err, "Skipping invalid resource payload.");

		return None;
	}

	Some(resource)
}

fn to_json(value: Value) -> JsonValue {
	match value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(flag),
		Some(Kind::IntegerValue(number)) => JsonValue::from(number),
		Some(Kind::DoubleValue(number)) =>
			Number::from_f64(number).map(JsonValue::Number).unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(text)) => JsonValue::String(text),
		Some(Kind::ListValue(list)) => JsonValue::Array(list.values.into_iter().map(to_json).collect()),
		Some(Kind::StructValue(object)) => JsonValue::Object(
			object.fields.into_iter().map(|(key, value)| (key, to_json(value))).collect(),
		),
	}
}
