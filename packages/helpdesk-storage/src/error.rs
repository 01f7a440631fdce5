pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector cache I/O failed at {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error("Vector cache at {path:?} is not a valid snapshot.")]
	Decode { path: std::path::PathBuf, source: serde_json::Error },
	#[error("Failed to encode vector cache snapshot.")]
	Encode { source: serde_json::Error },
}
