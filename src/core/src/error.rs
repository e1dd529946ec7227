use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error taxonomy for the controller core.
///
/// `Infeasible` should never reach a caller in practice: the matcher only
/// ever calls `ResourceClass::mismatch` after `fits` has already gated the
/// pair, so seeing it surface is a bug in the matcher, not bad input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("bad input: {0}")]
	BadInput(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("forbidden: {0}")]
	Forbidden(String),

	#[error("resource value out of range for dimension {dimension}: {value} > {max}")]
	OutOfRange {
		dimension: &'static str,
		value: f64,
		max: f64,
	},

	#[error("mismatch requested for a class that does not fit")]
	Infeasible,

	#[error("batch-system adapter unavailable: {0}")]
	UpstreamUnavailable(String),

	#[error("malformed json: {0}")]
	Json(#[from] serde_json::Error),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn bad_input(msg: impl Into<String>) -> Self { Self::BadInput(msg.into()) }

	pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }

	pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

	fn status(&self) -> StatusCode {
		match self {
			| Self::BadInput(_) | Self::OutOfRange { .. } | Self::Json(_) => StatusCode::BAD_REQUEST,
			| Self::NotFound(_) => StatusCode::NOT_FOUND,
			| Self::Forbidden(_) => StatusCode::FORBIDDEN,
			| Self::Infeasible => StatusCode::INTERNAL_SERVER_ERROR,
			| Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
			| Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

#[derive(Serialize)]
struct ErrorBody {
	error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	dimension: Option<&'static str>,
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		let dimension = match &self {
			| Self::OutOfRange { dimension, .. } => Some(*dimension),
			| _ => None,
		};
		let body = ErrorBody { error: self.to_string(), dimension };
		(status, Json(body)).into_response()
	}
}
