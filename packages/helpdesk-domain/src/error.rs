pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read help-card catalog at {path:?}.")]
	ReadCatalog { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse help-card catalog.")]
	ParseCatalog { source: serde_json::Error },
}
