pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Validation(String),
	#[error("Failed to read data file {path}: {source}")]
	ReadData { path: std::path::PathBuf, source: std::io::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	Provider(#[from] refuge_providers::Error),
	#[error(transparent)]
	Storage(#[from] refuge_storage::Error),
}
