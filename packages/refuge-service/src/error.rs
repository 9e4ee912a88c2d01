pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Cache error: {message}")]
	Cache { message: String },
}
impl Error {
	/// Embedding provider or vector store failures. These degrade instead of surfacing.
	pub fn is_upstream(&self) -> bool {
		matches!(self, Self::Provider { .. } | Self::Storage { .. })
	}
}

impl From<refuge_providers::Error> for Error {
	fn from(err: refuge_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<refuge_storage::Error> for Error {
	fn from(err: refuge_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
