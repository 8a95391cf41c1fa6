use serde::Deserialize;
use serde_json::{Number, Value};

/// One catalog entry. Only `id` and `title` are required; every other attribute may be absent or
/// `null` in the source file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub slug: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub long_description: Option<String>,
	#[serde(default)]
	pub image_url: Option<String>,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub price: Option<Number>,
	#[serde(default)]
	pub is_featured: Option<bool>,
	#[serde(default)]
	pub is_popular: Option<bool>,
	#[serde(default)]
	pub enrolled_students: Option<Number>,
	#[serde(default)]
	pub rating: Option<Number>,
	#[serde(default)]
	pub review_count: Option<Number>,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub last_updated: Option<String>,
	#[serde(default)]
	pub author_id: Option<String>,
	#[serde(default)]
	pub curriculum: Option<Vec<Value>>,
	#[serde(default)]
	pub requirements: Option<Vec<String>>,
	#[serde(default)]
	pub objectives: Option<Vec<String>>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub quizzes: Option<Vec<Value>>,
	#[serde(default)]
	pub reviews: Option<Vec<Value>>,
}
impl Course {
	pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self { id: id.into(), title: title.into(), ..Default::default() }
	}
}
