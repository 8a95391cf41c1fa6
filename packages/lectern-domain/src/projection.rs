use serde_json::{Number, Value};

use lectern_catalog::Course;

/// Rendered in place of any scalar attribute the catalog left out.
pub const ABSENT: &str = "null";

const LIST_SEPARATOR: &str = ", ";

/// Renders a course as the single string handed to the embedding model.
///
/// The field order is fixed so the same course always projects to the same text. List attributes
/// are joined with `", "`; nested collections (curriculum, quizzes, reviews) contribute only
/// their length.
pub fn project(course: &Course) -> String {
	format!(
		"ID: {id}. Title: {title}. Slug: {slug}. \
Description: {description}. LongDescription: {long_description}. \
ImageUrl: {image_url}. Category: {category}. Level: {level}. \
Price: {price}. IsFeatured: {is_featured}. IsPopular: {is_popular}. \
EnrolledStudents: {enrolled_students}. Rating: {rating}. ReviewCount: {review_count}. \
Language: {language}. LastUpdated: {last_updated}. AuthorId: {author_id}. \
Curriculum: {curriculum} sections. \
Requirements: {requirements}. \
Objectives: {objectives}. \
Tags: {tags}. \
Quizzes: {quizzes} quizzes. \
Reviews: {reviews} reviews.",
		id = course.id,
		title = course.title,
		slug = text(&course.slug),
		description = text(&course.description),
		long_description = text(&course.long_description),
		image_url = text(&course.image_url),
		category = text(&course.category),
		level = text(&course.level),
		price = number(&course.price),
		is_featured = flag(course.is_featured),
		is_popular = flag(course.is_popular),
		enrolled_students = number(&course.enrolled_students),
		rating = number(&course.rating),
		review_count = number(&course.review_count),
		language = text(&course.language),
		last_updated = text(&course.last_updated),
		author_id = text(&course.author_id),
		curriculum = count(&course.curriculum),
		requirements = joined(&course.requirements),
		objectives = joined(&course.objectives),
		tags = joined(&course.tags),
		quizzes = count(&course.quizzes),
		reviews = count(&course.reviews),
	)
}

fn text(value: &Option<String>) -> &str {
	value.as_deref().unwrap_or(ABSENT)
}

fn number(value: &Option<Number>) -> String {
	value.as_ref().map(Number::to_string).unwrap_or_else(|| ABSENT.to_string())
}

fn flag(value: Option<bool>) -> &'static str {
	match value {
		Some(true) => "true",
		Some(false) => "false",
		None => ABSENT,
	}
}

fn joined(values: &Option<Vec<String>>) -> String {
	values.as_deref().map(|values| values.join(LIST_SEPARATOR)).unwrap_or_default()
}

fn count(values: &Option<Vec<Value>>) -> usize {
	values.as_ref().map(Vec::len).unwrap_or(0)
}
