//! The stateless matching function: how many more glideins a site's queue
//! should submit, given the batch system's job snapshot and every site's
//! currently registered supply.

use std::collections::HashMap;

use gliderd_core::Result;
use gliderd_registry::ClientRegistry;
use gliderd_resource::ResourceClass;
use gliderd_snapshot::JobSnapshot;
use tracing::debug;

/// Compute how many glideins `name` should submit on each of its queues,
/// given the batch system's current job snapshot and the supply already
/// registered across every site.
///
/// For each of `name`'s queues, sums mismatch-weighted job counts across
/// every snapshot class that fits within the queue's resource class, and
/// the same for mismatch-weighted glidein counts across every registered
/// queue (including `name`'s own) that fits within it. A cold pool
/// (`job_ratio`) and an oversubscribed pool (`glidein_util`) both dampen
/// the result; a queue that's already sitting on enough of its own backlog
/// is omitted from the returned map rather than given a zero entry.
pub fn submit_counts(name: &str, registry: &ClientRegistry, snapshot: &JobSnapshot) -> Result<HashMap<String, u64>> {
	let queues = registry.queues_for(name)?;
	let all = registry.all_queues();

	let mut result = HashMap::new();

	let mut sorted_classes: Vec<ResourceClass> = snapshot.classes().copied().collect();
	sorted_classes.sort();

	let mut sorted_queues: Vec<(ResourceClass, &gliderd_registry::QueueState)> =
		all.values().flat_map(|site_queues| site_queues.iter()).map(|(class, state)| (*class, state)).collect();
	sorted_queues.sort_by_key(|(class, _)| *class);

	for (class, queue) in &queues {
		let mut jobs_queued = 0.0;
		let mut jobs_processing = 0.0;
		for job_class in &sorted_classes {
			if job_class.fits(class) {
				let mismatch = class.mismatch(job_class)?;
				let counts = snapshot.counts_for(job_class);
				jobs_queued += mismatch * counts.queued as f64;
				jobs_processing += mismatch * counts.processing as f64;
			}
		}
		let job_ratio = if jobs_processing > 0.0 { jobs_processing / (jobs_processing + jobs_queued) } else { 1.0 };

		let mut glideins_queued = 0.0;
		let mut glideins_processing = 0.0;
		for (other_class, other) in &sorted_queues {
			if other_class.fits(class) {
				let mismatch = class.mismatch(other_class)?;
				glideins_queued += mismatch * other.num_queued as f64;
				glideins_processing += mismatch * other.num_processing as f64;
			}
		}
		let glidein_util =
			if glideins_processing > 0.0 { glideins_processing / (glideins_processing + glideins_queued) } else { 1.0 };

		let global_queue = (jobs_queued - glideins_queued) * job_ratio.powf(0.25) * glidein_util.powi(2);
		let local_queue = (global_queue - queue.num_queued as f64).max(0.0);

		debug!(
			site = name,
			queue = queue.queue_ref,
			jobs_queued,
			jobs_processing,
			job_ratio,
			glideins_queued,
			glideins_processing,
			glidein_util,
			global_queue,
			local_queue,
			"matched queue"
		);

		if local_queue > 0.0 {
			result.insert(queue.queue_ref.clone(), local_queue.ceil() as u64);
		}
	}

	Ok(result)
}
