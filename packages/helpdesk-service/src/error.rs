pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Catalog error: {message}")]
	Catalog { message: String },
}
impl From<helpdesk_domain::Error> for Error {
	fn from(err: helpdesk_domain::Error) -> Self {
		Self::Catalog { message: err.to_string() }
	}
}
