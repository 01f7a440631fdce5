use std::sync::Arc;

use helpdesk_service::{HelpService, Providers};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HelpService>,
}
impl AppState {
	/// Loads the catalog and cached vectors, running the startup rebuild when configured.
	pub async fn new(config: helpdesk_config::Config) -> color_eyre::Result<Self> {
		let service = HelpService::start(config, Providers::default()).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: HelpService) -> Self {
		Self { service: Arc::new(service) }
	}
}
