use axum::{
	body::Bytes,
	extract::{Path, State},
	response::Json,
	routing::{get, post, put},
	Router,
};
use gliderd_core::{Error, Result};
use gliderd_matcher::submit_counts;
use serde_json::Value;

use crate::{
	auth::{issue_token, Principal, Role},
	dto::{QueueMap, StatusResponse, TokenRequest, TokenResponse},
	state::AppState,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/status", get(get_status))
		.route("/api/tokens", post(post_tokens))
		.route("/api/clients/{name}", put(put_client))
		.route("/api/clients/{name}/actions/queue", post(post_client_queue))
		.with_state(state)
}

/// An empty body is a valid, empty queue map; anything else must parse as
/// one. `PUT`/`POST` bodies in this API are never required.
fn parse_queue_map(body: &Bytes) -> Result<QueueMap> {
	if body.is_empty() {
		return Ok(QueueMap::new());
	}
	serde_json::from_slice(body).map_err(Error::from)
}

#[tracing::instrument(skip_all)]
async fn get_status(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
	let snapshot = state.snapshots.get_cached().await;
	Ok(Json(StatusResponse { condor: snapshot.to_wire(), clients: state.registry.to_wire() }))
}

#[tracing::instrument(skip_all)]
async fn post_tokens(
	State(state): State<AppState>,
	principal: Principal,
	Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>> {
	principal.require_admin()?;
	let token = issue_token(&state.config, &req.client, Role::Client)?;
	Ok(Json(TokenResponse { client: req.client, token }))
}

#[tracing::instrument(skip_all)]
async fn put_client(
	State(state): State<AppState>,
	principal: Principal,
	Path(name): Path<String>,
	body: Bytes,
) -> Result<Json<Value>> {
	principal.require_self_or_admin(&name)?;
	let queues = parse_queue_map(&body)?;
	state.registry.upsert(&name, queues)?;
	Ok(Json(serde_json::json!({})))
}

#[tracing::instrument(skip_all)]
async fn post_client_queue(
	State(state): State<AppState>,
	principal: Principal,
	Path(name): Path<String>,
	body: Bytes,
) -> Result<Json<Value>> {
	principal.require_self_or_admin(&name)?;

	if !body.is_empty() {
		let queues = parse_queue_map(&body)?;
		state.registry.upsert(&name, queues)?;
	}

	if !state.registry.contains(&name) {
		return Err(Error::bad_input("client must register a queue status before matching"));
	}

	let snapshot = state.snapshots.get().await?;
	let result = submit_counts(&name, &state.registry, &snapshot)?;

	if result.is_empty() {
		return Ok(Json(serde_json::json!({})));
	}

	let token = state.snapshots.fetch_startd_token().await?;
	Ok(Json(serde_json::json!({
		"queues": result,
		"token": String::from_utf8_lossy(&token),
	})))
}
