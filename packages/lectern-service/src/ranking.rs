use std::{cmp::Ordering, collections::HashSet};

use lectern_catalog::Course;

use crate::index::EmbeddingIndex;

/// A catalog entry selected by [`rank`], with its raw similarity to the query.
#[derive(Clone, Copy, Debug)]
pub struct Ranked<'a> {
	pub position: usize,
	pub course: &'a Course,
	pub score: f32,
}

/// Cosine similarity in `[-1, 1]`. Mismatched lengths or a zero-norm side score `0.0`.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return 0.0;
	}

	(dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0)
}

/// Component-wise arithmetic mean. `None` for an empty input or vectors of differing lengths.
pub fn mean_vector(vectors: &[&[f32]]) -> Option<Vec<f32>> {
	let first = vectors.first()?;
	let dim = first.len();

	if vectors.iter().any(|vec| vec.len() != dim) {
		return None;
	}

	let mut sum = vec![0.0_f32; dim];

	for vec in vectors {
		for (acc, value) in sum.iter_mut().zip(vec.iter()) {
			*acc += value;
		}
	}

	let count = vectors.len() as f32;

	for acc in &mut sum {
		*acc /= count;
	}

	Some(sum)
}

/// Positions ordered by score, highest first. Equal scores keep their original order; NaN sorts
/// last.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
	let mut order: Vec<usize> = (0..scores.len()).collect();

	order.sort_by(|&a, &b| cmp_f32_desc(scores[a], scores[b]));

	order
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Scores every indexed course against `query` and keeps the best `top_k` distinct titles.
///
/// Courses whose id is in `exclude_ids` are never returned, and their titles count as already
/// seen, so a same-titled copy of an excluded course is dropped as well. Title comparison is
/// exact and case-sensitive.
pub fn rank<'a>(
	index: &'a EmbeddingIndex,
	query: &[f32],
	exclude_ids: &HashSet<&str>,
	top_k: usize,
) -> Vec<Ranked<'a>> {
	if top_k == 0 || index.is_empty() {
		return Vec::new();
	}

	let scores: Vec<f32> = index.similarity(query).into_iter().map(|(_, score)| score).collect();
	let mut seen_titles: HashSet<&str> = exclude_ids
		.iter()
		.filter_map(|id| index.position_of(id))
		.filter_map(|position| index.course(position))
		.map(|course| course.title.as_str())
		.collect();
	let mut out = Vec::with_capacity(top_k.min(scores.len()));

	for position in rank_descending(&scores) {
		let Some(course) = index.course(position) else { continue };

		if exclude_ids.contains(course.id.as_str()) {
			continue;
		}
		if !seen_titles.insert(course.title.as_str()) {
			continue;
		}

		out.push(Ranked { position, course, score: scores[position] });

		if out.len() >= top_k {
			break;
		}
	}

	out
}
