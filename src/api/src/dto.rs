use std::collections::HashMap;

use gliderd_registry::{QueueInput, QueueStatusEntry};
use gliderd_snapshot::StatusEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
	pub condor: HashMap<String, StatusEntry>,
	pub clients: HashMap<String, HashMap<String, QueueStatusEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
	pub client: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
	pub client: String,
	pub token: String,
}

/// `PUT /api/clients/{name}` and `POST /api/clients/{name}/actions/queue`
/// both take a queue map as their body, or an absent/empty body meaning
/// "no queues".
pub type QueueMap = HashMap<String, QueueInput>;
