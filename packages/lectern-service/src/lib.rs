pub mod index;
pub mod ranking;
pub mod recommend;

mod error;

pub use error::{Error, Result};
pub use index::EmbeddingIndex;
pub use recommend::{
	ChatItem, ChatRequest, ChatResponse, ListRecommendRequest, RecommendItem, RecommendRequest,
};

use std::{future::Future, pin::Pin, sync::Arc};

use lectern_catalog::Catalog;
use lectern_config::{Config, EmbeddingProviderConfig};
use lectern_domain::query::QueryNormalizer;
use lectern_providers::embedding;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

/// Everything a request needs: configuration, the built index, the chat query rewriter, and the
/// embedding provider used for free-text queries. Constructed once at startup and shared
/// read-only.
pub struct RecommendService {
	pub cfg: Config,
	pub index: EmbeddingIndex,
	pub normalizer: QueryNormalizer,
	pub providers: Providers,
}
impl RecommendService {
	pub async fn new(cfg: Config, catalog: Catalog) -> Result<Self> {
		Self::with_providers(cfg, catalog, Providers::default()).await
	}

	pub async fn with_providers(cfg: Config, catalog: Catalog, providers: Providers) -> Result<Self> {
		let index =
			EmbeddingIndex::build(catalog, providers.embedding.as_ref(), &cfg.providers.embedding)
				.await?;

		Ok(Self::from_index(cfg, index, providers))
	}

	/// Wraps an already-built index. Text queries are encoded with `providers`, which need not be
	/// the provider that built the index but must produce vectors of the same dimension.
	pub fn from_index(cfg: Config, index: EmbeddingIndex, providers: Providers) -> Self {
		let normalizer = QueryNormalizer::new(&cfg.chat.replacements);

		Self { cfg, index, normalizer, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
