pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider credential is not configured.")]
	Unavailable,
	#[error("Provider returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	Malformed { message: String },
}
impl Error {
	/// No credential configured. This is the expected steady state of a keyless deployment.
	pub fn is_unavailable(&self) -> bool {
		matches!(self, Self::Unavailable)
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Reqwest(err) if err.is_timeout())
	}
}
