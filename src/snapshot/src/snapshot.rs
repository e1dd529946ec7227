use std::collections::HashMap;

use gliderd_resource::{ResourceClass, ResourceMap};
use serde::Serialize;

use crate::record::{JobCounts, JobRecord};

/// The wire form of one resource class's entry in a job snapshot: the
/// resolved resource tuple plus its aggregate counts and a breakdown by
/// the glidein site/resource name jobs of that class have actually landed
/// on.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
	pub resources: ResourceMap,
	pub queued: u64,
	pub processing: u64,
	pub unknown: u64,
	pub by_site: HashMap<String, HashMap<String, JobCounts>>,
}

/// A point-in-time view of the batch system's job queue, aggregated by
/// resource class. The matcher only ever reads the per-class totals; the
/// site/resource-name breakdown exists purely for `GET /status`
/// observability.
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
	totals: HashMap<ResourceClass, JobCounts>,
	breakdown: HashMap<ResourceClass, HashMap<(Option<String>, Option<String>), JobCounts>>,
}

impl JobSnapshot {
	/// Build a snapshot directly from per-class aggregates, with no
	/// per-site breakdown. Useful for adapters that only have aggregate
	/// counts to report, and for tests.
	pub fn from_counts(pairs: impl IntoIterator<Item = (ResourceClass, JobCounts)>) -> Self {
		Self { totals: pairs.into_iter().collect(), breakdown: HashMap::new() }
	}

	pub fn record(&mut self, rec: JobRecord) {
		self.totals.entry(rec.resource_class).or_default().record(rec.status);
		self.breakdown
			.entry(rec.resource_class)
			.or_default()
			.entry((rec.site, rec.resource_name))
			.or_default()
			.record(rec.status);
	}

	/// The aggregate counts for one resource class, `Default` (all zero)
	/// if no job of that class has been observed.
	pub fn counts_for(&self, class: &ResourceClass) -> JobCounts { self.totals.get(class).copied().unwrap_or_default() }

	pub fn classes(&self) -> impl Iterator<Item = &ResourceClass> { self.totals.keys() }

	/// The full snapshot rendered for `GET /status`, keyed by each
	/// resource class's stable string key.
	pub fn to_wire(&self) -> HashMap<String, StatusEntry> {
		self.totals
			.iter()
			.map(|(class, counts)| {
				let by_site = self
					.breakdown
					.get(class)
					.map(|buckets| {
						let mut out: HashMap<String, HashMap<String, JobCounts>> = HashMap::new();
						for ((site, resource_name), c) in buckets {
							let site_key = site.clone().unwrap_or_else(|| "unknown".to_owned());
							let resource_key = resource_name.clone().unwrap_or_else(|| "unknown".to_owned());
							out.entry(site_key).or_default().insert(resource_key, *c);
						}
						out
					})
					.unwrap_or_default();

				let entry = StatusEntry {
					resources: class.as_map(),
					queued: counts.queued,
					processing: counts.processing,
					unknown: counts.unknown,
					by_site,
				};
				(class.stable_key(), entry)
			})
			.collect()
	}
}
