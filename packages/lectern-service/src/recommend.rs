use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
	EmbeddingIndex, Error, RecommendService, Result,
	ranking::{self, Ranked},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendRequest {
	pub course_id: String,
	pub top_k: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListRecommendRequest {
	pub course_ids: Vec<String>,
	pub top_k: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
	pub query: String,
	pub top_k: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendItem {
	pub id: String,
	pub title: String,
	pub score: f32,
}
impl From<Ranked<'_>> for RecommendItem {
	fn from(ranked: Ranked<'_>) -> Self {
		Self { id: ranked.course.id.clone(), title: ranked.course.title.clone(), score: ranked.score }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatItem {
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	pub score: f32,
}
impl From<Ranked<'_>> for ChatItem {
	fn from(ranked: Ranked<'_>) -> Self {
		Self {
			id: ranked.course.id.clone(),
			title: ranked.course.title.clone(),
			description: ranked.course.description.clone(),
			score: ranked.score,
		}
	}
}

/// Free-text results plus the best score, which callers use as a confidence signal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
	pub score: f32,
	pub courses: Vec<ChatItem>,
}

/// Courses closest to `course_id`, excluding the course itself. Unknown ids yield nothing.
pub fn recommend_by_id(index: &EmbeddingIndex, course_id: &str, top_k: usize) -> Vec<RecommendItem> {
	let Some(query) = index.position_of(course_id).and_then(|position| index.vector(position))
	else {
		return Vec::new();
	};
	let exclude = HashSet::from([course_id]);

	ranking::rank(index, query, &exclude, top_k).into_iter().map(RecommendItem::from).collect()
}

/// Centroid of the embeddings of every resolvable id in `course_ids`. Unknown ids are skipped and
/// repeated ids count once.
pub fn list_query_vector(index: &EmbeddingIndex, course_ids: &[String]) -> Option<Vec<f32>> {
	let mut seen = HashSet::new();
	let resolved: Vec<&[f32]> = course_ids
		.iter()
		.filter(|id| seen.insert(id.as_str()))
		.filter_map(|id| index.position_of(id))
		.filter_map(|position| index.vector(position))
		.collect();

	ranking::mean_vector(&resolved)
}

/// Courses closest to the centroid of `course_ids`. Every input id is excluded from the output,
/// resolvable or not.
pub fn recommend_by_list(
	index: &EmbeddingIndex,
	course_ids: &[String],
	top_k: usize,
) -> Vec<RecommendItem> {
	let Some(query) = list_query_vector(index, course_ids) else {
		return Vec::new();
	};
	let exclude: HashSet<&str> = course_ids.iter().map(String::as_str).collect();

	ranking::rank(index, &query, &exclude, top_k).into_iter().map(RecommendItem::from).collect()
}

/// Courses closest to an already-encoded free-text query. Nothing is excluded.
pub fn recommend_by_vector(index: &EmbeddingIndex, query: &[f32], top_k: usize) -> ChatResponse {
	let courses: Vec<ChatItem> = ranking::rank(index, query, &HashSet::new(), top_k)
		.into_iter()
		.map(ChatItem::from)
		.collect();
	let score = courses.first().map(|item| item.score).unwrap_or(0.0);

	ChatResponse { score, courses }
}

/// Requested `top_k`, or `default` when absent, capped at `max` when one is configured.
/// Non-positive requests select nothing.
pub fn resolve_top_k(requested: Option<i64>, default: u32, max: Option<u32>) -> usize {
	let top_k = match requested {
		None => i64::from(default),
		Some(value) if value <= 0 => 0,
		Some(value) => value,
	};
	let top_k = match max {
		Some(max) => top_k.min(i64::from(max)),
		None => top_k,
	};

	usize::try_from(top_k).unwrap_or(usize::MAX)
}

impl RecommendService {
	pub fn recommend_by_id(&self, req: RecommendRequest) -> Vec<RecommendItem> {
		let top_k = resolve_top_k(
			req.top_k,
			self.cfg.recommend.default_top_k,
			self.cfg.recommend.max_top_k,
		);
		let items = recommend_by_id(&self.index, &req.course_id, top_k);

		tracing::debug!(
			course_id = %req.course_id,
			top_k,
			results = items.len(),
			"Recommended by course id."
		);

		items
	}

	pub fn recommend_by_list(&self, req: ListRecommendRequest) -> Vec<RecommendItem> {
		let top_k = resolve_top_k(
			req.top_k,
			self.cfg.recommend.default_top_k,
			self.cfg.recommend.max_top_k,
		);
		let unresolved: Vec<&str> = req
			.course_ids
			.iter()
			.filter(|id| self.index.position_of(id).is_none())
			.map(String::as_str)
			.collect();

		if !unresolved.is_empty() {
			tracing::warn!(?unresolved, "Skipping unknown course ids.");
		}

		let items = recommend_by_list(&self.index, &req.course_ids, top_k);

		tracing::debug!(
			inputs = req.course_ids.len(),
			top_k,
			results = items.len(),
			"Recommended by course list."
		);

		items
	}

	/// Rewrites and encodes `req.query`, then ranks the whole catalog against it.
	///
	/// Blank queries, a zero `top_k`, and an empty catalog answer with an empty response without
	/// calling the embedding provider. Provider failures, timeouts, and dimension mismatches are
	/// returned as errors.
	pub async fn recommend_by_text(&self, req: ChatRequest) -> Result<ChatResponse> {
		let top_k =
			resolve_top_k(req.top_k, self.cfg.recommend.chat_top_k, self.cfg.recommend.max_top_k);
		let query = self.normalizer.normalize(&req.query);

		if query.trim().is_empty() || top_k == 0 || self.index.is_empty() {
			return Ok(ChatResponse::default());
		}

		let vector = self.encode_query(&query).await?;
		let response = recommend_by_vector(&self.index, &vector, top_k);

		tracing::debug!(
			query = %query,
			top_k,
			results = response.courses.len(),
			top_score = response.score,
			"Recommended by text."
		);

		Ok(response)
	}

	async fn encode_query(&self, query: &str) -> Result<Vec<f32>> {
		let timeout_ms = self.cfg.recommend.encode_timeout_ms;
		let texts = [query.to_string()];
		let embedded = tokio::time::timeout(
			Duration::from_millis(timeout_ms),
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts),
		)
		.await
		.map_err(|_| Error::EncodeTimeout { timeout_ms })??;
		let Some(vector) = embedded.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::Provider {
				message: "Embedding vector has non-finite components.".to_string(),
			});
		}
		if vector.len() != self.index.dimensions() {
			return Err(Error::Provider {
				message: format!(
					"Embedding vector has {} dimensions; index expects {}.",
					vector.len(),
					self.index.dimensions()
				),
			});
		}

		Ok(vector)
	}
}
