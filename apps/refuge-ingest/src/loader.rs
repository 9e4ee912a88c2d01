//! Reads resource records from a JSON array, keeping the valid ones.

use std::{collections::HashSet, fs, path::Path};

use serde_json::Value;

use refuge_domain::Resource;

use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct Loaded {
	pub resources: Vec<Resource>,
	/// Records dropped as malformed, invalid, or duplicate.
	pub skipped: usize,
}

pub fn load_file(path: &Path) -> Result<Loaded> {
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::ReadData { path: path.to_path_buf(), source })?;

	parse(&raw)
}

/// Parses a JSON array. A record that does not decode or validate is skipped with a warning; a
/// later record reusing an id is skipped too.
pub fn parse(raw: &str) -> Result<Loaded> {
	let records: Vec<Value> = serde_json::from_str(raw)?;
	let mut loaded = Loaded::default();
	let mut seen = HashSet::new();

	for (idx, record) in records.into_iter().enumerate() {
		let resource = match serde_json::from_value::<Resource>(record) {
			Ok(resource) => resource,
			Err(err) => {
				tracing::warn!(index = idx, error = %err, "Skipping malformed resource record.");

				loaded.skipped += 1;

				continue;
			},
		};

		if let Err(err) = resource.validate() {
			tracing::warn!(index = idx, id = %resource.id, error = %err, "Skipping invalid resource.");

			loaded.skipped += 1;

			continue;
		}
		if !seen.insert(resource.id.clone()) {
			tracing::warn!(index = idx, id = %resource.id, "Skipping duplicate resource id.");

			loaded.skipped += 1;

			continue;
		}

		loaded.resources.push(resource);
	}

	if loaded.resources.is_empty() {
		return Err(Error::Validation("Data file contains no valid resources.".to_string()));
	}

	Ok(loaded)
}
