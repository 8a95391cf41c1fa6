use lectern_catalog::{Catalog, Course};
use lectern_config::EmbeddingProviderConfig;
use lectern_domain::projection;

use crate::{EmbeddingProvider, Error, Result, ranking};

/// Catalog plus one embedding per course, aligned by position. Built once and read-only after.
#[derive(Debug)]
pub struct EmbeddingIndex {
	catalog: Catalog,
	vectors: Vec<Vec<f32>>,
	dimensions: usize,
}
impl EmbeddingIndex {
	/// Projects and embeds every course. Any provider failure or malformed batch aborts the
	/// build; there is no partial index.
	pub async fn build(
		catalog: Catalog,
		provider: &dyn EmbeddingProvider,
		cfg: &EmbeddingProviderConfig,
	) -> Result<Self> {
		let texts: Vec<String> = catalog.courses().iter().map(projection::project).collect();
		let batch_size = (cfg.batch_size as usize).max(1);
		let mut vectors = Vec::with_capacity(texts.len());

		for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
			let embedded = provider.embed(cfg, batch).await.map_err(|err| Error::IndexBuild {
				message: format!("Embedding batch {batch_index} failed: {err}"),
			})?;

			if embedded.len() != batch.len() {
				return Err(Error::IndexBuild {
					message: format!(
						"Embedding batch {batch_index} returned {} vectors for {} courses.",
						embedded.len(),
						batch.len()
					),
				});
			}

			vectors.extend(embedded);
		}

		let index = Self::from_parts(catalog, vectors, cfg.dimensions as usize)?;

		tracing::info!(
			courses = index.len(),
			dimensions = index.dimensions,
			provider_id = %cfg.provider_id,
			"Embedding index built."
		);

		Ok(index)
	}

	/// Assembles an index from precomputed vectors, enforcing one vector of `dimensions`
	/// components per course.
	pub fn from_parts(catalog: Catalog, vectors: Vec<Vec<f32>>, dimensions: usize) -> Result<Self> {
		if dimensions == 0 {
			return Err(Error::IndexBuild {
				message: "Embedding dimensions must be greater than zero.".to_string(),
			});
		}
		if vectors.len() != catalog.len() {
			return Err(Error::IndexBuild {
				message: format!(
					"Index has {} vectors for {} courses.",
					vectors.len(),
					catalog.len()
				),
			});
		}

		if let Some((position, vec)) =
			vectors.iter().enumerate().find(|(_, vec)| vec.len() != dimensions)
		{
			let course_id = catalog.get(position).map(|course| course.id.as_str()).unwrap_or("");

			return Err(Error::IndexBuild {
				message: format!(
					"Embedding for course {course_id} has {} dimensions; expected {dimensions}.",
					vec.len()
				),
			});
		}

		if let Some(position) =
			vectors.iter().position(|vec| vec.iter().any(|value| !value.is_finite()))
		{
			let course_id = catalog.get(position).map(|course| course.id.as_str()).unwrap_or("");

			return Err(Error::IndexBuild {
				message: format!("Embedding for course {course_id} has non-finite components."),
			});
		}

		Ok(Self { catalog, vectors, dimensions })
	}

	/// Cosine similarity of `query` against every course, in catalog order.
	pub fn similarity(&self, query: &[f32]) -> Vec<(usize, f32)> {
		self.vectors
			.iter()
			.enumerate()
			.map(|(position, vec)| (position, ranking::cosine_similarity(query, vec)))
			.collect()
	}

	pub fn position_of(&self, course_id: &str) -> Option<usize> {
		self.catalog.position_of(course_id)
	}

	pub fn vector(&self, position: usize) -> Option<&[f32]> {
		self.vectors.get(position).map(Vec::as_slice)
	}

	pub fn course(&self, position: usize) -> Option<&Course> {
		self.catalog.get(position)
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}
}
