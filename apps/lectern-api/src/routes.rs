use axum::{
	Json, Router,
	extract::{Query, RawQuery, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use lectern_service::{
	ChatRequest, ChatResponse, Error as ServiceError, ListRecommendRequest, RecommendItem,
	RecommendRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/recommend", get(recommend))
		.route("/recommend/batch", post(recommend_batch))
		.route("/recommend/list", post(recommend_list))
		.route("/chat", get(chat))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct RecommendParams {
	course_id: String,
	top_k: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TopKParams {
	top_k: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChatParams {
	query: String,
	top_k: Option<i64>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	Query(params): Query<RecommendParams>,
) -> Json<Vec<RecommendItem>> {
	let request = RecommendRequest { course_id: params.course_id, top_k: params.top_k };

	Json(state.service.recommend_by_id(request))
}

async fn recommend_batch(
	State(state): State<AppState>,
	RawQuery(raw): RawQuery,
) -> Result<Json<Vec<RecommendItem>>, ApiError> {
	let request = parse_batch_query(raw.as_deref().unwrap_or_default())?;

	Ok(Json(state.service.recommend_by_list(request)))
}

async fn recommend_list(
	State(state): State<AppState>,
	Query(params): Query<TopKParams>,
	Json(course_ids): Json<Vec<String>>,
) -> Json<Vec<RecommendItem>> {
	let request = ListRecommendRequest { course_ids, top_k: params.top_k };

	Json(state.service.recommend_by_list(request))
}

async fn chat(
	State(state): State<AppState>,
	Query(params): Query<ChatParams>,
) -> Result<Json<ChatResponse>, ApiError> {
	let request = ChatRequest { query: params.query, top_k: params.top_k };
	let response = state.service.recommend_by_text(request).await?;

	Ok(Json(response))
}

/// Reads repeated `course_ids` keys plus an optional `top_k` from a raw query string.
fn parse_batch_query(raw: &str) -> Result<ListRecommendRequest, ApiError> {
	let mut course_ids = Vec::new();
	let mut top_k = None;

	for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
		match &*key {
			"course_ids" => course_ids.push(value.into_owned()),
			"top_k" => {
				let parsed = value.trim().parse::<i64>().map_err(|_| {
					json_error(
						StatusCode::BAD_REQUEST,
						"invalid_request",
						"top_k must be an integer.",
						Some(vec!["top_k".to_string()]),
					)
				})?;

				top_k = Some(parsed);
			},
			_ => {},
		}
	}

	Ok(ListRecommendRequest { course_ids, top_k })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		tracing::error!(error = %err, "Recommendation request failed.");

		match err {
			ServiceError::Provider { message } => {
				json_error(StatusCode::BAD_GATEWAY, "provider_error", message, None)
			},
			ServiceError::EncodeTimeout { timeout_ms } => json_error(
				StatusCode::GATEWAY_TIMEOUT,
				"encode_timeout",
				format!("Embedding request timed out after {timeout_ms} ms."),
				None,
			),
			ServiceError::IndexBuild { message } => {
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "index_unavailable", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
