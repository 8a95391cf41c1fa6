use std::{
	path::PathBuf,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use serde_json::Map;

use lectern_catalog::{Catalog, Course};
use lectern_config::{
	CatalogSource, Chat, Config, EmbeddingProviderConfig, Providers, Recommend, Service,
};
use lectern_service::{BoxFuture, EmbeddingProvider};

pub const TEST_DIMENSIONS: u32 = 3;

/// Returns fixed vectors keyed by text. A key matches a text that equals it or starts with it,
/// so `with_course` keys on the `ID: <id>. ` prefix the projector writes first. Unmatched texts
/// get the fallback vector.
#[derive(Clone)]
pub struct KeyedEmbedding {
	entries: Vec<(String, Vec<f32>)>,
	fallback: Vec<f32>,
	calls: Arc<AtomicUsize>,
	texts: Arc<AtomicUsize>,
}
impl KeyedEmbedding {
	pub fn new(fallback: Vec<f32>) -> Self {
		Self {
			entries: Vec::new(),
			fallback,
			calls: Arc::new(AtomicUsize::new(0)),
			texts: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn with_course(self, id: &str, vector: Vec<f32>) -> Self {
		self.with_text(&format!("ID: {id}. "), vector)
	}

	pub fn with_text(mut self, key: &str, vector: Vec<f32>) -> Self {
		self.entries.push((key.to_string(), vector));

		self
	}

	/// Number of `embed` calls seen so far.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Number of texts embedded across all calls.
	pub fn texts(&self) -> usize {
		self.texts.load(Ordering::SeqCst)
	}

	fn lookup(&self, text: &str) -> Vec<f32> {
		self.entries
			.iter()
			.find(|(key, _)| text == key || text.starts_with(key.as_str()))
			.map(|(_, vector)| vector.clone())
			.unwrap_or_else(|| self.fallback.clone())
	}
}
impl EmbeddingProvider for KeyedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.texts.fetch_add(texts.len(), Ordering::SeqCst);

		let vectors = texts.iter().map(|text| self.lookup(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Fails every call, as an unreachable or rejecting model would.
pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(eyre::eyre!("Embedding model unavailable.")) })
	}
}

/// Sleeps before answering with zero vectors of `TEST_DIMENSIONS`.
pub struct SlowEmbedding {
	pub delay: Duration,
}
impl EmbeddingProvider for SlowEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let delay = self.delay;
		let count = texts.len();

		Box::pin(async move {
			tokio::time::sleep(delay).await;

			Ok(vec![vec![0.0; TEST_DIMENSIONS as usize]; count])
		})
	}
}

pub fn course(id: &str, title: &str) -> Course {
	Course::new(id, title)
}

pub fn course_with_description(id: &str, title: &str, description: &str) -> Course {
	Course { description: Some(description.to_string()), ..Course::new(id, title) }
}

pub fn catalog(courses: Vec<Course>) -> Catalog {
	Catalog::new(courses)
}

pub fn embedding_config() -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "test".to_string(),
		dimensions: TEST_DIMENSIONS,
		timeout_ms: 1_000,
		batch_size: 2,
		default_headers: Map::new(),
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		catalog: CatalogSource { path: PathBuf::from("course.json") },
		providers: Providers { embedding: embedding_config() },
		recommend: Recommend {
			default_top_k: 5,
			chat_top_k: 3,
			max_top_k: None,
			encode_timeout_ms: 1_000,
		},
		chat: Chat::default(),
	}
}
