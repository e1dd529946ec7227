use std::sync::Arc;

use async_trait::async_trait;
use gliderd_core::{Error, Result};
use tokio::process::Command;

use crate::{record::JobRecord, snapshot::JobSnapshot};

/// A source of job-queue state and startd auth tokens. The controller only
/// depends on this trait; the concrete batch-system binding is an
/// external, narrow-contract collaborator kept behind it.
#[async_trait]
pub trait BatchSystemAdapter: Send + Sync {
	async fn fetch_snapshot(&self) -> Result<JobSnapshot>;

	/// Mint a fresh collector auth token for glideins to advertise with.
	async fn fetch_startd_token(&self) -> Result<Vec<u8>>;
}

#[async_trait]
impl BatchSystemAdapter for Arc<dyn BatchSystemAdapter> {
	async fn fetch_snapshot(&self) -> Result<JobSnapshot> { (**self).fetch_snapshot().await }

	async fn fetch_startd_token(&self) -> Result<Vec<u8>> { (**self).fetch_startd_token().await }
}

/// Queries an HTCondor collector via the `condor_q`/`condor_token_fetch`
/// command-line tools, the same process-shelling approach the original
/// server uses (the Python bindings can't mint startd tokens, so it always
/// shells out for that; this adapter shells out for both calls so there's
/// one less moving part to depend on).
pub struct CondorAdapter {
	collector_address: String,
}

impl CondorAdapter {
	pub fn new(collector_address: impl Into<String>) -> Self { Self { collector_address: collector_address.into() } }
}

#[async_trait]
impl BatchSystemAdapter for CondorAdapter {
	async fn fetch_snapshot(&self) -> Result<JobSnapshot> {
		let attributes = [
			"JobStatus",
			"SingularityImage",
			"RequestCPUs",
			"RequestGPUs",
			"RequestMemory",
			"RequestDisk",
			"OriginalTime",
			"MachineAttrGLIDEIN_Site0",
			"MachineAttrGLIDEIN_ResourceName0",
		]
		.join(",");

		let output = Command::new("condor_q")
			.args(["-pool", &self.collector_address, "-allusers", "-json", "-attributes", &attributes])
			.output()
			.await
			.map_err(|e| Error::UpstreamUnavailable(format!("condor_q: {e}")))?;

		if !output.status.success() {
			return Err(Error::UpstreamUnavailable(format!(
				"condor_q exited with {}: {}",
				output.status,
				String::from_utf8_lossy(&output.stderr)
			)));
		}

		// condor_q -json prints an empty string, not `[]`, when the queue
		// is empty.
		let trimmed = output.stdout.trim_ascii();
		let ads: Vec<serde_json::Value> = if trimmed.is_empty() {
			Vec::new()
		} else {
			serde_json::from_slice(trimmed)?
		};

		let mut snapshot = JobSnapshot::default();
		for ad in &ads {
			snapshot.record(JobRecord::from_raw(ad)?);
		}
		Ok(snapshot)
	}

	async fn fetch_startd_token(&self) -> Result<Vec<u8>> {
		let output = Command::new("condor_token_fetch")
			.args([
				"-authz",
				"READ",
				"-authz",
				"WRITE",
				"-authz",
				"ADVERTISE_STARTD",
				"-authz",
				"ADVERTISE_MASTER",
				"-pool",
				&self.collector_address,
				"-type",
				"COLLECTOR",
			])
			.output()
			.await
			.map_err(|e| Error::UpstreamUnavailable(format!("condor_token_fetch: {e}")))?;

		if !output.status.success() {
			return Err(Error::UpstreamUnavailable(format!(
				"condor_token_fetch exited with {}: {}",
				output.status,
				String::from_utf8_lossy(&output.stderr)
			)));
		}

		let mut token = output.stdout;
		while token.last().is_some_and(|b| b.is_ascii_whitespace()) {
			token.pop();
		}
		Ok(token)
	}
}
