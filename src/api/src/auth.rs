use axum::{
	extract::FromRequestParts,
	http::{header::AUTHORIZATION, request::Parts},
};
use gliderd_core::{Config, Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub role: Role,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
}

/// Sign a bearer token carrying `role` for `sub`, honouring
/// `Config::auth_expiration` (non-positive means no expiry).
pub fn issue_token(config: &Config, sub: &str, role: Role) -> Result<String> {
	let exp = if config.auth_expiration > 0 { Some(chrono::Utc::now().timestamp() + config.auth_expiration) } else { None };
	let claims = Claims { sub: sub.to_owned(), role, exp };
	encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(config.auth_secret.as_bytes()))
		.map_err(|e| Error::bad_input(format!("failed to sign token: {e}")))
}

fn verify_token(config: &Config, token: &str) -> Result<Claims> {
	let mut validation = Validation::new(Algorithm::HS256);
	validation.required_spec_claims.clear();
	validation.validate_exp = config.auth_expiration > 0;

	decode::<Claims>(token, &DecodingKey::from_secret(config.auth_secret.as_bytes()), &validation)
		.map(|data| data.claims)
		.map_err(|_| Error::forbidden("invalid or expired bearer token"))
}

/// The authenticated caller of a request. Extracted once per request; role
/// checks live on this type rather than scattered across handlers.
#[derive(Debug, Clone)]
pub enum Principal {
	Admin,
	Client { sub: String },
}

impl Principal {
	pub fn require_admin(&self) -> Result<()> {
		match self {
			| Self::Admin => Ok(()),
			| Self::Client { .. } => Err(Error::forbidden("this action requires the admin role")),
		}
	}

	/// Either the admin role, or a client principal whose subject matches
	/// `name` exactly.
	pub fn require_self_or_admin(&self, name: &str) -> Result<()> {
		match self {
			| Self::Admin => Ok(()),
			| Self::Client { sub } if sub == name => Ok(()),
			| Self::Client { .. } => Err(Error::forbidden("cannot act on a different client's resource")),
		}
	}
}

impl FromRequestParts<AppState> for Principal {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		if !state.config.auth_enabled() {
			return Ok(Self::Admin);
		}

		let header = parts
			.headers
			.get(AUTHORIZATION)
			.and_then(|v| v.to_str().ok())
			.ok_or_else(|| Error::forbidden("missing bearer token"))?;

		let token = header
			.strip_prefix("Bearer ")
			.ok_or_else(|| Error::forbidden("expected a bearer token"))?;

		let claims = verify_token(&state.config, token)?;
		Ok(match claims.role {
			| Role::Admin => Self::Admin,
			| Role::Client => Self::Client { sub: claims.sub },
		})
	}
}
