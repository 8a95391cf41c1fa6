pub mod models;

mod error;

pub use error::{Error, Result};
pub use models::Course;

use std::{collections::HashMap, fs, path::Path};

/// Immutable, ordered course list. Position `i` is the stable handle the embedding index aligns
/// its vectors to.
#[derive(Debug, Default)]
pub struct Catalog {
	courses: Vec<Course>,
	positions: HashMap<String, usize>,
}
impl Catalog {
	pub fn new(courses: Vec<Course>) -> Self {
		let mut positions = HashMap::with_capacity(courses.len());

		for (position, course) in courses.iter().enumerate() {
			if positions.contains_key(&course.id) {
				tracing::warn!(
					course_id = %course.id,
					position,
					"Duplicate course id ignored for lookup."
				);

				continue;
			}

			positions.insert(course.id.clone(), position);
		}

		Self { courses, positions }
	}

	pub fn courses(&self) -> &[Course] {
		&self.courses
	}

	pub fn get(&self, position: usize) -> Option<&Course> {
		self.courses.get(position)
	}

	/// First position holding `id`, if any.
	pub fn position_of(&self, id: &str) -> Option<usize> {
		self.positions.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.courses.len()
	}

	pub fn is_empty(&self) -> bool {
		self.courses.is_empty()
	}
}

pub fn load(path: &Path) -> Result<Catalog> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadCatalog { path: path.to_path_buf(), source: err })?;
	let courses: Vec<Course> = serde_json::from_str(&raw)
		.map_err(|err| Error::ParseCatalog { path: path.to_path_buf(), source: err })?;

	if courses.is_empty() {
		tracing::warn!(path = %path.display(), "Catalog file contains no courses.");
	}

	Ok(Catalog::new(courses))
}
