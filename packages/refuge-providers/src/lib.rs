pub mod embedding;
pub mod random;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use serde_json::{Map, Value};

	#[test]
	fn rejects_non_string_default_headers() {
		let mut headers = Map::new();

		headers.insert("x-retries".to_string(), Value::from(3));

		assert!(crate::auth_headers("key", &headers).is_err());

		headers.insert("x-retries".to_string(), Value::from("3"));

		let map = crate::auth_headers("key", &headers).expect("Headers must build.");

		assert_eq!(map.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer key"));
		assert_eq!(map.get("x-retries").and_then(|v| v.to_str().ok()), Some("3"));
	}
}
