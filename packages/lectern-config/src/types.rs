use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub catalog: CatalogSource,
	pub providers: Providers,
	#[serde(default)]
	pub recommend: Recommend,
	#[serde(default)]
	pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSource {
	/// JSON array of course records, read once at startup.
	pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	/// Maximum number of catalog texts sent per provider call while building the index.
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Recommend {
	pub default_top_k: u32,
	pub chat_top_k: u32,
	/// Optional ceiling on a requested `top_k`. Unset means results stop only when the catalog
	/// runs out.
	pub max_top_k: Option<u32>,
	/// Upper bound on a single free-text encode call.
	pub encode_timeout_ms: u64,
}
impl Default for Recommend {
	fn default() -> Self {
		Self { default_top_k: 5, chat_top_k: 3, max_top_k: None, encode_timeout_ms: 10_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Chat {
	/// Applied in order; later patterns see the output of earlier ones.
	pub replacements: Vec<Replacement>,
}
impl Default for Chat {
	fn default() -> Self {
		let replacements = [
			("khoá học", "course"),
			("khóa", "course"),
			("khoa", "course"),
			("khoa hoc", "course"),
			("hoc", "course"),
			("goi y", "course"),
			("gợi ý", "course"),
		]
		.into_iter()
		.map(|(pattern, replacement)| Replacement {
			pattern: pattern.to_string(),
			replacement: replacement.to_string(),
		})
		.collect();

		Self { replacements }
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Replacement {
	pub pattern: String,
	pub replacement: String,
}

fn default_batch_size() -> u32 {
	64
}
