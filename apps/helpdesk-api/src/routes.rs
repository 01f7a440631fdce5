use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use helpdesk_domain::{DialogPlan, HelpCard};
use helpdesk_service::{ChatRequest, ChatResponse, RebuildReport, Recommendation};

const DEFAULT_RECOMMEND_LIMIT: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub query: String,
	pub limit: Option<usize>,
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

impl From<helpdesk_service::Error> for ApiError {
	fn from(err: helpdesk_service::Error) -> Self {
		match err {
			helpdesk_service::Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			helpdesk_service::Error::Catalog { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "catalog_error", message, None),
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
		.route("/api/help/categories", get(categories))
		.route("/api/help/cards", get(list_cards))
		.route("/api/help/cards/{id}", get(get_card))
		.route("/api/help/recommend", post(recommend))
		.route("/api/help/chat", post(chat))
		.route("/api/help/plan", post(plan))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/rebuild_embeddings", post(rebuild_embeddings))
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

async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
	Json(state.service.categories())
}

async fn list_cards(
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Json<Vec<HelpCard>> {
	Json(state.service.list(&query.category, &query.q))
}

async fn get_card(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<HelpCard>, ApiError> {
	let card = state.service.get(&id)?;

	Ok(Json(card))
}

async fn recommend(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Json<Recommendation> {
	let limit = payload.limit.unwrap_or(DEFAULT_RECOMMEND_LIMIT);
	let recommendation = state.service.recommend(&payload.category, &payload.query, limit).await;

	Json(recommendation)
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
	Json(state.service.chat(&payload).await)
}

async fn plan(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> Json<DialogPlan> {
	Json(state.service.plan_for_request(&payload).await)
}

async fn rebuild_embeddings(State(state): State<AppState>) -> Json<RebuildReport> {
	Json(state.service.rebuild_embeddings().await)
}
