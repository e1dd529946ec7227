use figment::{
	Figment,
	providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Process configuration, loaded once at startup from the environment.
/// Every field has a default matching the original Python server's
/// `default_config` so an unconfigured deployment behaves the same as an
/// unconfigured `pyglidein_server`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Config {
	pub host: String,
	pub port: u16,
	pub debug: bool,
	/// Shared secret used to sign and verify bearer tokens. An empty
	/// secret disables authentication entirely.
	pub auth_secret: String,
	/// Token lifetime in seconds. Non-positive means "no expiry".
	pub auth_expiration: i64,
	/// Address of the batch-system collector the snapshot adapter queries.
	pub collector_address: String,
	/// Snapshot cache refresh interval in seconds.
	pub cache_timeout: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 8080,
			debug: false,
			auth_secret: String::new(),
			auth_expiration: -1,
			collector_address: "localhost".to_owned(),
			cache_timeout: 60,
		}
	}
}

impl Config {
	/// Load from `GLIDERD_*` environment variables, falling back to
	/// [`Default`] for anything unset.
	pub fn load() -> Result<Self> {
		let config: Self = Figment::new()
			.merge(Serialized::defaults(Self::default()))
			.merge(Env::prefixed("GLIDERD_"))
			.extract()
			.map_err(|e| Error::bad_input(format!("config: {e}")))?;

		config.check()?;
		Ok(config)
	}

	/// Validate cross-field invariants the way `tuwunel_core::config::check`
	/// validates a freshly loaded `Config` before it's used to start serving.
	pub fn check(&self) -> Result<()> {
		if self.port == 0 {
			return Err(Error::bad_input("port must be nonzero"));
		}

		if self.cache_timeout == 0 {
			return Err(Error::bad_input("cache_timeout must be nonzero"));
		}

		Ok(())
	}

	/// Auth is disabled entirely when no secret is configured.
	pub fn auth_enabled(&self) -> bool { !self.auth_secret.is_empty() }

	pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}
