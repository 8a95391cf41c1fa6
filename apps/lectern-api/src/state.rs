use std::sync::Arc;

use lectern_service::RecommendService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RecommendService>,
}
impl AppState {
	pub async fn new(config: lectern_config::Config) -> color_eyre::Result<Self> {
		let catalog = lectern_catalog::load(&config.catalog.path)?;

		tracing::info!(
			courses = catalog.len(),
			path = %config.catalog.path.display(),
			"Catalog loaded."
		);

		let service = RecommendService::new(config, catalog).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: RecommendService) -> Self {
		Self { service: Arc::new(service) }
	}
}
