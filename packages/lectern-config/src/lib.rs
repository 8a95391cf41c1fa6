mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CatalogSource, Chat, Config, EmbeddingProviderConfig, Providers, Recommend, Replacement,
	Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(invalid("service.http_bind", "must be non-empty."));
	}
	if cfg.catalog.path.as_os_str().is_empty() {
		return Err(invalid("catalog.path", "must be non-empty."));
	}

	validate_embedding(&cfg.providers.embedding)?;
	validate_recommend(&cfg.recommend)?;

	if cfg.chat.replacements.iter().any(|entry| entry.pattern.is_empty()) {
		return Err(invalid("chat.replacements.pattern", "must be non-empty."));
	}

	Ok(())
}

fn validate_embedding(embedding: &EmbeddingProviderConfig) -> Result<()> {
	if embedding.dimensions == 0 {
		return Err(invalid("providers.embedding.dimensions", "must be greater than zero."));
	}
	if embedding.batch_size == 0 {
		return Err(invalid("providers.embedding.batch_size", "must be greater than zero."));
	}
	if embedding.timeout_ms == 0 {
		return Err(invalid("providers.embedding.timeout_ms", "must be greater than zero."));
	}
	if embedding.api_key.trim().is_empty() {
		return Err(invalid("providers.embedding.api_key", "must be non-empty."));
	}
	if embedding.default_headers.values().any(|value| !value.is_string()) {
		return Err(invalid("providers.embedding.default_headers", "values must be strings."));
	}

	Ok(())
}

fn validate_recommend(recommend: &Recommend) -> Result<()> {
	if recommend.default_top_k == 0 {
		return Err(invalid("recommend.default_top_k", "must be greater than zero."));
	}
	if recommend.chat_top_k == 0 {
		return Err(invalid("recommend.chat_top_k", "must be greater than zero."));
	}
	if recommend.encode_timeout_ms == 0 {
		return Err(invalid("recommend.encode_timeout_ms", "must be greater than zero."));
	}

	let Some(max_top_k) = recommend.max_top_k else { return Ok(()) };

	if max_top_k == 0 {
		return Err(invalid("recommend.max_top_k", "must be greater than zero."));
	}
	if recommend.default_top_k > max_top_k {
		return Err(invalid("recommend.default_top_k", "must not exceed recommend.max_top_k."));
	}
	if recommend.chat_top_k > max_top_k {
		return Err(invalid("recommend.chat_top_k", "must not exceed recommend.max_top_k."));
	}

	Ok(())
}

fn invalid(key: &str, message: &str) -> Error {
	Error::Validation { key: key.to_string(), message: message.to_string() }
}

fn normalize(cfg: &mut Config) {
	if let Some(raw) = cfg.catalog.path.to_str() {
		let trimmed = raw.trim();

		if trimmed.len() != raw.len() {
			cfg.catalog.path = trimmed.into();
		}
	}

	let level = cfg.service.log_level.trim();

	if level.len() != cfg.service.log_level.len() {
		cfg.service.log_level = level.to_string();
	}
}
