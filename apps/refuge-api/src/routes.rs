use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use refuge_service::{
	CacheStats, CategoryListingRequest, Error as ServiceError, InvalidateReport, InvalidateRequest,
	SearchRequest, SearchResponse, UrgentServicesRequest,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
	pub limit: Option<u32>,
	pub language: Option<String>,
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
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Provider { message } | ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Upstream failure reached the API boundary.");

				json_error(
					StatusCode::SERVICE_UNAVAILABLE,
					"upstream_unavailable",
					"A search backend is unavailable.",
					None,
				)
			},
			ServiceError::Cache { message } => {
				tracing::error!(error = %message, "Cache failure reached the API boundary.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal error.", None)
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

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/search/emergency", post(urgent_services))
		.route("/v1/search/crisis", post(crisis_search))
		.route("/v1/search/economic", post(economic_search))
		.route("/v1/resources/category/{category}", get(category_listing))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/cache/invalidate", post(invalidate_cache))
		.route("/v1/admin/cache/stats", get(cache_stats))
		.with_state(state)
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

async fn urgent_services(
	State(state): State<AppState>,
	Json(payload): Json<UrgentServicesRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.urgent_services(payload).await?;

	Ok(Json(response))
}

async fn crisis_search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.crisis_search(payload).await?;

	Ok(Json(response))
}

async fn economic_search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.economic_search(payload).await?;

	Ok(Json(response))
}

async fn category_listing(
	State(state): State<AppState>,
	Path(category): Path<String>,
	Query(params): Query<ListingParams>,
) -> Result<Json<SearchResponse>, ApiError> {
	let request =
		CategoryListingRequest { category, limit: params.limit, language: params.language };
	let response = state.service.category_listing(request).await?;

	Ok(Json(response))
}

async fn invalidate_cache(
	State(state): State<AppState>,
	Json(payload): Json<InvalidateRequest>,
) -> Result<Json<InvalidateReport>, ApiError> {
	let response = state.service.invalidate_cache(payload).await?;

	Ok(Json(response))
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
	Json(state.service.cache_stats())
}
