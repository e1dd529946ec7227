use std::{
	collections::HashMap,
	sync::RwLock,
};

use gliderd_core::{Error, Result};
use gliderd_resource::{ResourceClass, ResourceMap, DIMENSIONS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The wire shape of one queue entry in a `GET /status` response.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatusEntry {
	pub resources: ResourceMap,
	pub num_queued: u64,
	pub num_processing: u64,
}

/// The wire shape of one queue entry in a `PUT /api/clients/{name}` body.
/// `queue_ref` is not part of the JSON object itself — it's the key the
/// client used to name this queue in the request's outer map — but is
/// carried alongside the parsed resources for error messages and for
/// `GET` responses that want to echo it back.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueInput {
	pub resources: HashMap<String, Value>,
	pub num_queued: u64,
	pub num_processing: u64,
}

/// A site's queue, canonicalised to a resource class. Reachable only
/// through the registry, keyed by its resource class rather than by the
/// client-chosen reference the queue arrived under.
#[derive(Debug, Clone)]
pub struct QueueState {
	pub queue_ref: String,
	pub resource_class: ResourceClass,
	pub num_queued: u64,
	pub num_processing: u64,
}

/// Every site's current queue state. Lookups and the matcher's global scan
/// both key on `ResourceClass`, exactly as queues are stored — not on the
/// client-supplied queue reference, which only survives as a label.
#[derive(Debug, Default)]
pub struct ClientRegistry {
	sites: RwLock<HashMap<String, HashMap<ResourceClass, QueueState>>>,
}

impl ClientRegistry {
	pub fn new() -> Self { Self::default() }

	/// Replace all of `site`'s queues with `queues`. Resource classes are
	/// canonicalised with no rounding slack (tolerance `1.0`): a site
	/// reports its own real capacity, there's no reason to forgive it for
	/// rounding to the next bin up.
	pub fn upsert(&self, site: &str, queues: HashMap<String, QueueInput>) -> Result<()> {
		let mut canonical = HashMap::with_capacity(queues.len());

		for (queue_ref, input) in queues {
			for key in input.resources.keys() {
				if !DIMENSIONS.contains(&key.as_str()) {
					return Err(Error::bad_input(format!("unrecognised resource dimension '{key}'")));
				}
			}

			let resource_class = ResourceClass::construct(&input.resources, Some(1.0))?;
			canonical.insert(resource_class, QueueState {
				queue_ref,
				resource_class,
				num_queued: input.num_queued,
				num_processing: input.num_processing,
			});
		}

		self.sites.write().expect("registry lock poisoned").insert(site.to_owned(), canonical);
		Ok(())
	}

	/// A clone of one site's queues, keyed by resource class.
	pub fn queues_for(&self, site: &str) -> Result<HashMap<ResourceClass, QueueState>> {
		self.sites
			.read()
			.expect("registry lock poisoned")
			.get(site)
			.cloned()
			.ok_or_else(|| Error::not_found(format!("no such client '{site}'")))
	}

	/// A clone of every registered site's queues, for the matcher's
	/// global supply scan.
	pub fn all_queues(&self) -> HashMap<String, HashMap<ResourceClass, QueueState>> {
		self.sites.read().expect("registry lock poisoned").clone()
	}

	pub fn contains(&self, site: &str) -> bool { self.sites.read().expect("registry lock poisoned").contains_key(site) }

	/// The full registry rendered for `GET /status`, keyed by site name
	/// and then by the client-supplied queue reference.
	pub fn to_wire(&self) -> HashMap<String, HashMap<String, QueueStatusEntry>> {
		self.sites
			.read()
			.expect("registry lock poisoned")
			.iter()
			.map(|(site, queues)| {
				let entries = queues
					.values()
					.map(|q| {
						(q.queue_ref.clone(), QueueStatusEntry {
							resources: q.resource_class.as_map(),
							num_queued: q.num_queued,
							num_processing: q.num_processing,
						})
					})
					.collect();
				(site.clone(), entries)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn input(cpu: i64, num_queued: u64, num_processing: u64) -> QueueInput {
		QueueInput {
			resources: HashMap::from([("cpu".to_owned(), json!(cpu))]),
			num_queued,
			num_processing,
		}
	}

	#[test]
	fn upsert_then_lookup_round_trips() {
		let reg = ClientRegistry::new();
		reg.upsert("site-a", HashMap::from([("q1".to_owned(), input(4, 10, 2))])).unwrap();

		let queues = reg.queues_for("site-a").unwrap();
		assert_eq!(queues.len(), 1);
		let (_, state) = queues.into_iter().next().unwrap();
		assert_eq!(state.queue_ref, "q1");
		assert_eq!(state.num_queued, 10);
	}

	#[test]
	fn upsert_fully_replaces_prior_queues() {
		let reg = ClientRegistry::new();
		reg.upsert("site-a", HashMap::from([
			("q1".to_owned(), input(1, 1, 1)),
			("q2".to_owned(), input(2, 1, 1)),
		]))
		.unwrap();
		reg.upsert("site-a", HashMap::from([("q3".to_owned(), input(3, 5, 5))])).unwrap();

		let queues = reg.queues_for("site-a").unwrap();
		assert_eq!(queues.len(), 1);
	}

	#[test]
	fn unknown_dimension_is_rejected() {
		let reg = ClientRegistry::new();
		let mut bad = input(1, 1, 1);
		bad.resources.insert("nonsense".to_owned(), json!(1));
		let err = reg.upsert("site-a", HashMap::from([("q1".to_owned(), bad)]));
		assert!(matches!(err, Err(Error::BadInput(_))));
	}

	#[test]
	fn queue_input_rejects_extra_wire_fields() {
		let body = json!({"resources": {"cpu": 1}, "num_queued": 1, "num_processing": 1, "bogus": 9});
		let parsed: Result<QueueInput, _> = serde_json::from_value(body);
		assert!(parsed.is_err());
	}

	#[test]
	fn unknown_site_lookup_is_not_found() {
		let reg = ClientRegistry::new();
		assert!(matches!(reg.queues_for("nope"), Err(Error::NotFound(_))));
	}

	#[test]
	fn queues_keyed_by_resource_class_dedupe_collisions() {
		let reg = ClientRegistry::new();
		// Two refs that round to the same bin collapse to one queue; the
		// later one in iteration order wins, matching a plain dict
		// assignment keyed by the canonical resource class.
		reg.upsert("site-a", HashMap::from([
			("q1".to_owned(), input(4, 1, 0)),
			("q2".to_owned(), input(4, 9, 0)),
		]))
		.unwrap();
		let queues = reg.queues_for("site-a").unwrap();
		assert_eq!(queues.len(), 1);
	}
}
