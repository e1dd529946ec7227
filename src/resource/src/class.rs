use std::collections::HashMap;

use gliderd_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::bins::{self, DEFAULT_TOLERANCE};

/// One of the six dimensions a resource request is canonicalised over.
/// Declared in the fixed order used for both the lexicographic sort order
/// and the wire/JSON key names.
pub const DIMENSIONS: [&str; 6] = ["cpu", "gpu", "memory", "disk", "time", "singularity"];

/// A point in the six-dimensional resource lattice, rounded up to bin
/// edges. Field order matches `DIMENSIONS` and doubles as the derived
/// lexicographic `Ord` — keep it that way, the sort order depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceClass {
	cpu_idx: usize,
	gpu_idx: usize,
	memory_idx: usize,
	disk_idx: usize,
	time_idx: usize,
	singularity: bool,
}

fn round_up(value: f64, table: &[f64], tolerance: f64, dimension: &'static str) -> Result<usize> {
	for (idx, edge) in table.iter().enumerate() {
		if value <= edge * tolerance {
			return Ok(idx);
		}
	}

	Err(Error::OutOfRange {
		dimension,
		value,
		max: *table.last().expect("bin tables are never empty"),
	})
}

/// Coerce an arbitrary JSON value the way `bool(x)` would in the original
/// Python server: only empty/zero/false/null values are falsy.
fn truthy(value: &Value) -> bool {
	match value {
		| Value::Bool(b) => *b,
		| Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		| Value::String(s) => !s.is_empty(),
		| Value::Array(a) => !a.is_empty(),
		| Value::Object(o) => !o.is_empty(),
		| Value::Null => false,
	}
}

fn as_f64(value: &Value, dimension: &'static str) -> Result<f64> {
	value
		.as_f64()
		.or_else(|| value.as_i64().map(|v| v as f64))
		.or_else(|| value.as_u64().map(|v| v as f64))
		.ok_or_else(|| Error::bad_input(format!("resource '{dimension}' is not a number")))
}

impl ResourceClass {
	/// Build a canonical class from a partial, possibly-sparse map of
	/// dimension name to JSON value. Unknown keys are silently discarded
	/// here (registries enforce the stricter "unknown dimension is a
	/// client error" rule before calling this). Missing dimensions take
	/// their defaults, which already land exactly on a bin edge.
	pub fn construct(partial: &HashMap<String, Value>, tolerance: Option<f64>) -> Result<Self> {
		let tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);

		let cpu_idx = match partial.get("cpu") {
			| Some(v) => round_up(as_f64(v, "cpu")?, &bins::CPU, tolerance, "cpu")?,
			| None => 0, // bin edge for the default value of 1
		};
		let gpu_idx = match partial.get("gpu") {
			| Some(v) => round_up(as_f64(v, "gpu")?, &bins::GPU, tolerance, "gpu")?,
			| None => 0, // bin edge for the default value of 0
		};
		let memory_idx = match partial.get("memory") {
			| Some(v) => round_up(as_f64(v, "memory")?, &bins::MEMORY, tolerance, "memory")?,
			| None => bins::MEMORY.iter().position(|&b| b == 1.0).expect("1.0 is a memory bin edge"),
		};
		let disk_idx = match partial.get("disk") {
			| Some(v) => round_up(as_f64(v, "disk")?, &bins::DISK, tolerance, "disk")?,
			| None => bins::DISK.iter().position(|&b| b == 1.0).expect("1.0 is a disk bin edge"),
		};
		let time_idx = match partial.get("time") {
			| Some(v) => round_up(as_f64(v, "time")?, &bins::TIME, tolerance, "time")?,
			| None => bins::TIME.iter().position(|&b| b == 1.0).expect("1.0 is a time bin edge"),
		};
		let singularity = partial.get("singularity").map(truthy).unwrap_or(false);

		Ok(Self {
			cpu_idx,
			gpu_idx,
			memory_idx,
			disk_idx,
			time_idx,
			singularity,
		})
	}

	/// Whether `self` fits within `other` — componentwise ≤ on the five
	/// numeric dimensions, plus singularity implication. This is the
	/// matching predicate; it is intentionally distinct from `Ord`, which
	/// is the lexicographic total order used for deterministic sorting.
	pub fn fits(&self, other: &Self) -> bool {
		self.cpu_idx <= other.cpu_idx
			&& self.gpu_idx <= other.gpu_idx
			&& self.memory_idx <= other.memory_idx
			&& self.disk_idx <= other.disk_idx
			&& self.time_idx <= other.time_idx
			&& (!self.singularity || other.singularity)
	}

	/// The demand-attribution discount for running `other` (which must fit
	/// within `self`) on `self`'s resource class. `self.mismatch(self) ==
	/// 1`; a strictly smaller `other` yields a value in `(0, 1)`.
	pub fn mismatch(&self, other: &Self) -> Result<f64> {
		if !other.fits(self) {
			return Err(Error::Infeasible);
		}

		let ratio = |other_idx: usize, self_idx: usize| (other_idx as f64 + 1.0) / (self_idx as f64 + 1.0);

		Ok(ratio(other.cpu_idx, self.cpu_idx)
			* ratio(other.gpu_idx, self.gpu_idx)
			* ratio(other.memory_idx, self.memory_idx)
			* ratio(other.disk_idx, self.disk_idx)
			* ratio(other.time_idx, self.time_idx))
	}

	pub fn cpu(&self) -> f64 { bins::CPU[self.cpu_idx] }

	pub fn gpu(&self) -> f64 { bins::GPU[self.gpu_idx] }

	pub fn memory(&self) -> f64 { bins::MEMORY[self.memory_idx] }

	pub fn disk(&self) -> f64 { bins::DISK[self.disk_idx] }

	pub fn time(&self) -> f64 { bins::TIME[self.time_idx] }

    pub fn singularity(&self) -> bool { self.singularity }

	/// A stable string key suitable for use as a JSON object key, since
	/// `ResourceClass` itself can't be a serde map key. Used by
	/// `GET /status` to key the job-snapshot aggregate the way the
	/// original server keys it by `hash(Resources)`.
	pub fn stable_key(&self) -> String {
		format!(
			"{}-{}-{}-{}-{}-{}",
			self.cpu_idx, self.gpu_idx, self.memory_idx, self.disk_idx, self.time_idx, self.singularity as u8
		)
	}

	pub fn as_map(&self) -> ResourceMap {
		ResourceMap {
			cpu: self.cpu(),
			gpu: self.gpu(),
			memory: self.memory(),
			disk: self.disk(),
			time: self.time(),
			singularity: self.singularity,
		}
	}
}

/// The resolved (not partial) resource tuple, for serialisation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceMap {
	pub cpu: f64,
	pub gpu: f64,
	pub memory: f64,
	pub disk: f64,
	pub time: f64,
	pub singularity: bool,
}

impl From<ResourceMap> for HashMap<String, Value> {
	fn from(m: ResourceMap) -> Self {
		HashMap::from([
			("cpu".to_owned(), Value::from(m.cpu)),
			("gpu".to_owned(), Value::from(m.gpu)),
			("memory".to_owned(), Value::from(m.memory)),
			("disk".to_owned(), Value::from(m.disk)),
			("time".to_owned(), Value::from(m.time)),
			("singularity".to_owned(), Value::from(m.singularity)),
		])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn map(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
		pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
	}

	#[test]
	fn defaults_are_exact_bin_edges() {
		let c = ResourceClass::construct(&HashMap::new(), None).unwrap();
		assert_eq!(c.cpu(), 1.0);
		assert_eq!(c.gpu(), 0.0);
		assert_eq!(c.memory(), 1.0);
		assert_eq!(c.disk(), 1.0);
		assert_eq!(c.time(), 1.0);
		assert!(!c.singularity());
	}

	#[test]
	fn reflexive_fit_and_mismatch() {
		let c = ResourceClass::construct(&map(&[("cpu", Value::from(4))]), None).unwrap();
		assert!(c.fits(&c));
		assert_eq!(c.mismatch(&c).unwrap(), 1.0);
	}

	#[test]
	fn mismatch_is_a_bin_index_ratio() {
		let big = ResourceClass::construct(&map(&[("cpu", Value::from(2))]), None).unwrap();
		let small = ResourceClass::construct(&map(&[("cpu", Value::from(1))]), None).unwrap();
		assert_eq!(big.mismatch(&small).unwrap(), 0.5);
	}

	#[test]
	fn mismatch_on_non_fitting_pair_is_infeasible() {
		let big = ResourceClass::construct(&map(&[("cpu", Value::from(2))]), None).unwrap();
		let small = ResourceClass::construct(&map(&[("cpu", Value::from(1))]), None).unwrap();
		assert!(matches!(small.mismatch(&big), Err(Error::Infeasible)));
	}

	#[test]
	fn round_trip_is_idempotent() {
		let c = ResourceClass::construct(&map(&[("memory", Value::from(2.3))]), None).unwrap();
		let c2 = ResourceClass::construct(&c.as_map().into(), None).unwrap();
		assert_eq!(c, c2);
	}

	#[test]
	fn monotonic_rounding_preserves_order() {
		let a = ResourceClass::construct(&map(&[("cpu", Value::from(1))]), None).unwrap();
		let b = ResourceClass::construct(&map(&[("cpu", Value::from(5))]), None).unwrap();
		assert!(a <= b);
	}

	#[test]
	fn tolerance_one_disables_slack() {
		let edge = bins::TIME[3];
		let exact = ResourceClass::construct(&map(&[("time", Value::from(edge))]), Some(1.0)).unwrap();
		let over = ResourceClass::construct(&map(&[("time", Value::from(edge + 0.01))]), Some(1.0)).unwrap();
		assert_ne!(exact, over);
	}

	#[test]
	fn default_tolerance_absorbs_small_excess() {
		let edge = bins::TIME[3];
		let exact = ResourceClass::construct(&map(&[("time", Value::from(edge))]), None).unwrap();
		let over = ResourceClass::construct(&map(&[("time", Value::from(edge + 0.01))]), None).unwrap();
		assert_eq!(exact, over);
	}

	#[test]
	fn out_of_range_value_is_rejected() {
		let err = ResourceClass::construct(&map(&[("cpu", Value::from(100_000))]), None);
		assert!(matches!(err, Err(Error::OutOfRange { dimension: "cpu", .. })));
	}

	#[test]
	fn unknown_keys_are_discarded() {
		let c1 = ResourceClass::construct(&HashMap::new(), None).unwrap();
		let c2 = ResourceClass::construct(&map(&[("nonsense", Value::from(5))]), None).unwrap();
		assert_eq!(c1, c2);
	}

	#[test]
	fn singularity_gates_feasibility() {
		let needs_sing = ResourceClass::construct(&map(&[("singularity", Value::from(true))]), None).unwrap();
		let no_sing = ResourceClass::construct(&HashMap::new(), None).unwrap();
		assert!(!needs_sing.fits(&no_sing));
		assert!(no_sing.fits(&needs_sing));
	}
}
