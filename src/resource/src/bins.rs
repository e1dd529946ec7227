//! Bin edge tables for the six resource dimensions. Each table is a fixed,
//! monotonically increasing sequence of edges reproduced exactly from the
//! original `Resources.RESOURCE_BINS`.

use std::sync::LazyLock;

fn step_range(start: i64, stop: i64, step: i64) -> impl Iterator<Item = i64> {
	let mut v = start;
	std::iter::from_fn(move || {
		if v < stop {
			let cur = v;
			v += step;
			Some(cur)
		} else {
			None
		}
	})
}

/// `list(range(1, 1000))`
pub static CPU: LazyLock<Vec<f64>> = LazyLock::new(|| step_range(1, 1000, 1).map(|v| v as f64).collect());

/// `list(range(0, 100))`
pub static GPU: LazyLock<Vec<f64>> = LazyLock::new(|| step_range(0, 100, 1).map(|v| v as f64).collect());

/// `[x/10 for x in range(5,50,5) + range(50,200,10) + range(200,1000,40) + range(1000,40000,100)]`
pub static MEMORY: LazyLock<Vec<f64>> = LazyLock::new(|| {
	step_range(5, 50, 5)
		.chain(step_range(50, 200, 10))
		.chain(step_range(200, 1000, 40))
		.chain(step_range(1000, 40000, 100))
		.map(|v| (v as f64) / 10.0)
		.collect()
});

/// `range(1,10) + range(10,50,4) + range(50,100,10) + range(100,2000,100)`
pub static DISK: LazyLock<Vec<f64>> = LazyLock::new(|| {
	step_range(1, 10, 1)
		.chain(step_range(10, 50, 4))
		.chain(step_range(50, 100, 10))
		.chain(step_range(100, 2000, 100))
		.map(|v| v as f64)
		.collect()
});

/// `range(0,12) + range(12,24,3) + range(24,72,12) + range(72,1000,48)`
pub static TIME: LazyLock<Vec<f64>> = LazyLock::new(|| {
	step_range(0, 12, 1)
		.chain(step_range(12, 24, 3))
		.chain(step_range(24, 72, 12))
		.chain(step_range(72, 1000, 48))
		.map(|v| v as f64)
		.collect()
});

pub const DEFAULT_TOLERANCE: f64 = 1.05;
