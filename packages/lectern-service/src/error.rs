pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Embedding request timed out after {timeout_ms} ms.")]
	EncodeTimeout { timeout_ms: u64 },
	#[error("Index build failed: {message}")]
	IndexBuild { message: String },
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
