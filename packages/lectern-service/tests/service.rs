use std::{collections::HashSet, sync::Arc, time::Duration};

use lectern_catalog::Course;
use lectern_service::{
	ChatRequest, EmbeddingIndex, Error, ListRecommendRequest, Providers, RecommendRequest,
	RecommendService, recommend,
};
use lectern_testkit::{
	FailingEmbedding, KeyedEmbedding, SlowEmbedding, catalog, course, course_with_description,
	embedding_config, test_config,
};

fn courses() -> Vec<Course> {
	vec![
		course_with_description("c1", "Rust Intro", "Ownership and borrowing."),
		course("c2", "Rust Intro"),
		course("c3", "Go Web"),
		course("c4", "Go Web Advanced"),
		course("c5", "Data Science"),
		course("c6", "ML Basics"),
	]
}

fn keyed() -> KeyedEmbedding {
	KeyedEmbedding::new(vec![0.0, 0.0, 0.0])
		.with_course("c1", vec![1.0, 0.0, 0.0])
		.with_course("c2", vec![0.9, 0.1, 0.0])
		.with_course("c3", vec![0.0, 1.0, 0.0])
		.with_course("c4", vec![0.1, 0.9, 0.1])
		.with_course("c5", vec![0.0, 0.0, 1.0])
		.with_course("c6", vec![0.2, 0.1, 0.9])
		.with_text("rust", vec![1.0, 0.0, 0.0])
		.with_text("course course python", vec![0.0, 0.0, 1.0])
}

async fn service_with(provider: KeyedEmbedding, courses: Vec<Course>) -> RecommendService {
	RecommendService::with_providers(
		test_config(),
		catalog(courses),
		Providers::new(Arc::new(provider)),
	)
	.await
	.expect("Failed to build service.")
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
	items.iter().map(|item| id(item).to_string()).collect()
}

#[tokio::test]
async fn duplicate_title_of_the_query_course_is_suppressed() {
	let provider = KeyedEmbedding::new(vec![0.0, 0.0, 0.0])
		.with_course("c1", vec![1.0, 0.0, 0.0])
		.with_course("c2", vec![0.99, 0.01, 0.0])
		.with_course("c3", vec![0.0, 0.0, 1.0]);
	let service = service_with(
		provider,
		vec![course("c1", "Python Basics"), course("c2", "Python Basics"), course("c3", "Advanced Go")],
	)
	.await;
	let items = service
		.recommend_by_id(RecommendRequest { course_id: "c1".to_string(), top_k: Some(5) });

	assert_eq!(ids(&items, |item| item.id.as_str()), vec!["c3"]);
	assert_eq!(items[0].title, "Advanced Go");
}

#[tokio::test]
async fn unknown_course_id_returns_nothing() {
	let service = service_with(keyed(), courses()).await;
	let items = service
		.recommend_by_id(RecommendRequest { course_id: "missing".to_string(), top_k: Some(5) });

	assert!(items.is_empty());
}

#[tokio::test]
async fn by_id_results_respect_ranking_invariants() {
	let service = service_with(keyed(), courses()).await;
	let known: HashSet<String> =
		service.index.catalog().courses().iter().map(|course| course.id.clone()).collect();

	for course_id in ["c1", "c2", "c3", "c4", "c5", "c6"] {
		for top_k in 1..=7 {
			let items = service.recommend_by_id(RecommendRequest {
				course_id: course_id.to_string(),
				top_k: Some(top_k),
			});
			let titles: HashSet<&str> = items.iter().map(|item| item.title.as_str()).collect();

			assert!(items.len() <= top_k as usize);
			assert_eq!(titles.len(), items.len(), "Duplicate title for {course_id}.");
			assert!(items.iter().all(|item| item.id != course_id));
			assert!(items.iter().all(|item| known.contains(&item.id)));
			assert!(items.windows(2).all(|pair| pair[0].score >= pair[1].score));
		}
	}
}

#[tokio::test]
async fn by_id_is_idempotent() {
	let service = service_with(keyed(), courses()).await;
	let request = RecommendRequest { course_id: "c3".to_string(), top_k: Some(4) };
	let first = service.recommend_by_id(request.clone());
	let second = service.recommend_by_id(request);

	assert_eq!(first, second);
	assert_eq!(first.first().map(|item| item.id.as_str()), Some("c4"));
}

#[tokio::test]
async fn default_and_zero_top_k() {
	let service = service_with(keyed(), courses()).await;
	let defaulted =
		service.recommend_by_id(RecommendRequest { course_id: "c1".to_string(), top_k: None });
	let zero =
		service.recommend_by_id(RecommendRequest { course_id: "c1".to_string(), top_k: Some(0) });

	// Six courses, minus the query and its same-titled copy.
	assert_eq!(defaulted.len(), 4);
	assert!(zero.is_empty());
}

#[tokio::test]
async fn empty_list_returns_nothing() {
	let service = service_with(keyed(), courses()).await;
	let items =
		service.recommend_by_list(ListRecommendRequest { course_ids: Vec::new(), top_k: Some(5) });

	assert!(items.is_empty());
}

#[tokio::test]
async fn list_of_unknown_ids_returns_nothing() {
	let service = service_with(keyed(), courses()).await;
	let items = service.recommend_by_list(ListRecommendRequest {
		course_ids: vec!["x".to_string(), "y".to_string()],
		top_k: Some(5),
	});

	assert!(items.is_empty());
}

#[tokio::test]
async fn list_query_is_the_centroid_of_resolved_inputs() {
	let service = service_with(keyed(), courses()).await;
	let inputs = vec!["c1".to_string(), "c3".to_string()];
	let centroid = recommend::list_query_vector(&service.index, &inputs).expect("Expected centroid.");

	assert_eq!(centroid, vec![0.5, 0.5, 0.0]);

	let with_unknown = vec!["c1".to_string(), "nope".to_string(), "c3".to_string(), "c1".to_string()];

	assert_eq!(recommend::list_query_vector(&service.index, &with_unknown), Some(centroid));
}

#[tokio::test]
async fn list_results_exclude_every_input() {
	let service = service_with(keyed(), courses()).await;
	let items = service.recommend_by_list(ListRecommendRequest {
		course_ids: vec!["c1".to_string(), "c3".to_string(), "unknown".to_string()],
		top_k: Some(5),
	});

	// c2 shares its title with input c1.
	assert_eq!(ids(&items, |item| item.id.as_str()), vec!["c4", "c6", "c5"]);
}

#[tokio::test]
async fn text_query_ranks_without_exclusion() {
	let service = service_with(keyed(), courses()).await;
	let response = service
		.recommend_by_text(ChatRequest { query: "rust".to_string(), top_k: Some(2) })
		.await
		.expect("Expected chat response.");

	assert_eq!(ids(&response.courses, |item| item.id.as_str()), vec!["c1", "c6"]);
	assert_eq!(response.courses[0].description.as_deref(), Some("Ownership and borrowing."));
	assert!(response.courses[1].description.is_none());
	assert!((response.score - 1.0).abs() < 1e-6);
	assert_eq!(response.score, response.courses[0].score);
}

#[tokio::test]
async fn text_query_is_normalized_before_encoding() {
	let service = service_with(keyed(), courses()).await;
	let response = service
		.recommend_by_text(ChatRequest { query: "khoa hoc python".to_string(), top_k: None })
		.await
		.expect("Expected chat response.");

	assert_eq!(response.courses.len(), 3);
	assert_eq!(response.courses[0].id, "c5");
}

#[tokio::test]
async fn text_query_over_empty_catalog_is_empty() {
	let provider = KeyedEmbedding::new(vec![1.0, 0.0, 0.0]);
	let service = service_with(provider.clone(), Vec::new()).await;
	let response = service
		.recommend_by_text(ChatRequest { query: "show me a course".to_string(), top_k: Some(3) })
		.await
		.expect("Expected chat response.");

	assert_eq!(
		serde_json::to_value(&response).expect("Serializable response."),
		serde_json::json!({ "score": 0.0, "courses": [] })
	);
	assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn blank_text_query_skips_the_model() {
	let provider = keyed();
	let service = service_with(provider.clone(), courses()).await;
	let calls_after_build = provider.calls();
	let response = service
		.recommend_by_text(ChatRequest { query: "   ".to_string(), top_k: Some(3) })
		.await
		.expect("Expected chat response.");

	assert!(response.courses.is_empty());
	assert_eq!(response.score, 0.0);
	assert_eq!(provider.calls(), calls_after_build);
}

#[tokio::test]
async fn index_is_built_in_batches() {
	let provider = keyed();
	let service = service_with(provider.clone(), courses()).await;

	assert_eq!(service.index.len(), 6);
	assert_eq!(provider.texts(), 6);
	// batch_size is 2 in the test config.
	assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn failing_model_aborts_the_build() {
	let result = RecommendService::with_providers(
		test_config(),
		catalog(courses()),
		Providers::new(Arc::new(FailingEmbedding)),
	)
	.await;

	assert!(matches!(result, Err(Error::IndexBuild { .. })));
}

#[tokio::test]
async fn wrong_dimension_aborts_the_build() {
	let provider = KeyedEmbedding::new(vec![1.0, 0.0]);
	let result = EmbeddingIndex::build(catalog(courses()), &provider, &embedding_config()).await;

	assert!(matches!(result, Err(Error::IndexBuild { .. })));
}

async fn service_with_query_provider(providers: Providers) -> RecommendService {
	let cfg = test_config();
	let index = EmbeddingIndex::build(catalog(courses()), &keyed(), &cfg.providers.embedding)
		.await
		.expect("Failed to build index.");

	RecommendService::from_index(cfg, index, providers)
}

#[tokio::test]
async fn model_failure_surfaces_on_text_queries() {
	let service = service_with_query_provider(Providers::new(Arc::new(FailingEmbedding))).await;
	let err = service
		.recommend_by_text(ChatRequest { query: "rust".to_string(), top_k: Some(3) })
		.await
		.expect_err("Expected provider error.");

	assert!(matches!(err, Error::Provider { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn query_dimension_mismatch_is_a_provider_error() {
	let provider = KeyedEmbedding::new(vec![1.0, 0.0]);
	let service = service_with_query_provider(Providers::new(Arc::new(provider))).await;
	let err = service
		.recommend_by_text(ChatRequest { query: "rust".to_string(), top_k: Some(3) })
		.await
		.expect_err("Expected dimension error.");

	assert!(err.to_string().contains("dimensions"), "Unexpected error: {err}");
}

#[tokio::test]
async fn slow_model_hits_the_encode_timeout() {
	let mut service = service_with_query_provider(Providers::new(Arc::new(SlowEmbedding {
		delay: Duration::from_millis(500),
	})))
	.await;

	service.cfg.recommend.encode_timeout_ms = 20;

	let err = service
		.recommend_by_text(ChatRequest { query: "rust".to_string(), top_k: Some(3) })
		.await
		.expect_err("Expected timeout.");

	assert!(matches!(err, Error::EncodeTimeout { timeout_ms: 20 }));
}

#[tokio::test]
async fn non_finite_course_embedding_aborts_the_build() {
	let provider = KeyedEmbedding::new(vec![0.0, 1.0, 0.0]).with_course("c1", vec![f32::NAN, 0.0, 0.0]);
	let result = EmbeddingIndex::build(catalog(courses()), &provider, &embedding_config()).await;

	match result {
		Err(err @ Error::IndexBuild { .. }) => {
			assert!(err.to_string().contains("course c1"), "Unexpected error: {err}");
		},
		other => panic!("Expected index build failure, got {other:?}"),
	}
}

#[tokio::test]
async fn non_finite_query_embedding_is_a_provider_error() {
	let provider = KeyedEmbedding::new(vec![f32::INFINITY, 0.0, 0.0]);
	let service = service_with_query_provider(Providers::new(Arc::new(provider))).await;
	let err = service
		.recommend_by_text(ChatRequest { query: "rust".to_string(), top_k: Some(3) })
		.await
		.expect_err("Expected non-finite query to fail.");

	assert!(matches!(err, Error::Provider { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn large_top_k_is_bounded_only_by_the_catalog() {
	let many: Vec<Course> =
		(0..70).map(|n| course(&format!("x{n}"), &format!("Course {n}"))).collect();
	let service = service_with(KeyedEmbedding::new(vec![1.0, 0.0, 0.0]), many).await;
	let sixty =
		service.recommend_by_id(RecommendRequest { course_id: "x0".to_string(), top_k: Some(60) });
	let everything = service
		.recommend_by_id(RecommendRequest { course_id: "x0".to_string(), top_k: Some(500) });

	assert_eq!(sixty.len(), 60);
	assert_eq!(everything.len(), 69);
}

#[tokio::test]
async fn configured_max_top_k_caps_requests() {
	let many: Vec<Course> =
		(0..10).map(|n| course(&format!("x{n}"), &format!("Course {n}"))).collect();
	let mut service = service_with(KeyedEmbedding::new(vec![1.0, 0.0, 0.0]), many).await;

	service.cfg.recommend.max_top_k = Some(4);

	let items =
		service.recommend_by_id(RecommendRequest { course_id: "x0".to_string(), top_k: Some(8) });

	assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn normalized_query_is_encoded_untrimmed() {
	let provider =
		KeyedEmbedding::new(vec![1.0, 0.0, 0.0]).with_text(" course python", vec![0.0, 0.0, 1.0]);
	let service = service_with_query_provider(Providers::new(Arc::new(provider))).await;
	let response = service
		.recommend_by_text(ChatRequest { query: " khoa python".to_string(), top_k: Some(1) })
		.await
		.expect("Expected chat response.");

	assert_eq!(response.courses[0].id, "c5");
}
