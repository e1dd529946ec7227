use std::collections::HashMap;

use gliderd_core::Result;
use gliderd_resource::ResourceClass;
use serde::Serialize;
use serde_json::Value;

/// A job's queue state, condensed from the three-way classad status the
/// batch system reports down to the three buckets the controller cares
/// about. Anything that isn't idle or running is `Unknown` (held, removed,
/// completed, suspended, ...) rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
	Queued,
	Processing,
	Unknown,
}

impl JobStatus {
	/// HTCondor's `JobStatus` classad: `1` is idle, `2` is running.
	pub fn from_condor_code(code: i64) -> Self {
		match code {
			| 1 => Self::Queued,
			| 2 => Self::Processing,
			| _ => Self::Unknown,
		}
	}
}

/// Per-status job tally for a single resource class (or a single
/// site/resource-name breakdown bucket within one).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct JobCounts {
	pub queued: u64,
	pub processing: u64,
	pub unknown: u64,
}

impl JobCounts {
	pub fn record(&mut self, status: JobStatus) {
		match status {
			| JobStatus::Queued => self.queued += 1,
			| JobStatus::Processing => self.processing += 1,
			| JobStatus::Unknown => self.unknown += 1,
		}
	}
}

/// One job observed in the batch system, resolved to a resource class and
/// a status. `site`/`resource_name` are the glidein's advertised origin,
/// absent for jobs that haven't landed on any glidein yet.
#[derive(Debug, Clone)]
pub struct JobRecord {
	pub resource_class: ResourceClass,
	pub site: Option<String>,
	pub resource_name: Option<String>,
	pub status: JobStatus,
}

impl JobRecord {
	/// Build a record from one raw classad, applying the same unit
	/// conversions as the original server's `Resources.from_condor`:
	/// memory MB -> GB and disk KB -> GB by integer division, wall time
	/// seconds -> hours by float division.
	pub fn from_raw(ad: &Value) -> Result<Self> {
		let mut partial = HashMap::new();

		if let Some(v) = ad.get("RequestCPUs") {
			partial.insert("cpu".to_owned(), v.clone());
		}
		if let Some(v) = ad.get("RequestGPUs") {
			partial.insert("gpu".to_owned(), v.clone());
		}
		if let Some(v) = ad.get("RequestMemory").and_then(Value::as_i64) {
			partial.insert("memory".to_owned(), Value::from(v / 1000));
		}
		if let Some(v) = ad.get("RequestDisk").and_then(Value::as_i64) {
			partial.insert("disk".to_owned(), Value::from(v / 1_000_000));
		}
		if let Some(v) = ad.get("OriginalTime").and_then(Value::as_f64) {
			partial.insert("time".to_owned(), Value::from(v / 3600.0));
		}
		if let Some(v) = ad.get("SingularityImage") {
			partial.insert("singularity".to_owned(), Value::from(!v.is_null()));
		}

		let resource_class = ResourceClass::construct(&partial, None)?;

		let status = JobStatus::from_condor_code(ad.get("JobStatus").and_then(Value::as_i64).unwrap_or(1));

		let site = ad
			.get("MachineAttrGLIDEIN_Site0")
			.and_then(Value::as_str)
			.map(str::to_owned);
		let resource_name = ad
			.get("MachineAttrGLIDEIN_ResourceName0")
			.and_then(Value::as_str)
			.map(str::to_owned);

		Ok(Self { resource_class, site, resource_name, status })
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn converts_units_like_the_original_server() {
		let ad = json!({
			"JobStatus": 1,
			"RequestCPUs": 4,
			"RequestGPUs": 0,
			"RequestMemory": 2000, // MB
			"RequestDisk": 2_000_000, // KB
			"OriginalTime": 7200.0, // seconds
		});
		let rec = JobRecord::from_raw(&ad).unwrap();
		assert_eq!(rec.resource_class.memory(), 2.0);
		assert_eq!(rec.resource_class.disk(), 2.0);
		assert_eq!(rec.resource_class.time(), 2.0);
		assert_eq!(rec.status, JobStatus::Queued);
	}

	#[test]
	fn running_status_maps_to_processing() {
		let ad = json!({"JobStatus": 2});
		let rec = JobRecord::from_raw(&ad).unwrap();
		assert_eq!(rec.status, JobStatus::Processing);
	}

	#[test]
	fn held_status_maps_to_unknown() {
		let ad = json!({"JobStatus": 5});
		let rec = JobRecord::from_raw(&ad).unwrap();
		assert_eq!(rec.status, JobStatus::Unknown);
	}

	#[test]
	fn missing_site_fields_are_none() {
		let ad = json!({"JobStatus": 1});
		let rec = JobRecord::from_raw(&ad).unwrap();
		assert!(rec.site.is_none());
		assert!(rec.resource_name.is_none());
	}
}
