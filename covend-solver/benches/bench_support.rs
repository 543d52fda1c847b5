//! Benchmark support utilities for the CVRP solver.
//!
//! Provides deterministic clustered customer layouts with Euclidean metre
//! costs and a fleet sized to hold every customer, for reproducible
//! benchmarks.

use covend_core::test_support::euclidean_instance;
use covend_core::{InstanceError, ProblemInstance};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Per-vehicle capacity used in benchmarks.
pub const BENCHMARK_CAPACITY: u32 = 550;

/// Depot position in metres, the centre of the benchmark area.
pub const BENCHMARK_DEPOT: (i32, i32) = (5_000, 5_000);

/// Number of cluster centres for customer distribution.
const CLUSTER_COUNT: usize = 5;

/// Standard deviation of customers around their cluster centre, in metres.
const CLUSTER_SPREAD_M: f64 = 400.0;

/// Side of the square cluster centres are drawn from, in metres.
const AREA_SIDE_M: f64 = 10_000.0;

/// Half-open range demands are drawn from, matching the sampler default.
const DEMAND_RANGE: std::ops::Range<u32> = 10..100;

/// Generate integer customer coordinates in clusters.
///
/// Customers are assigned to clusters round-robin and spread normally around
/// each centre.
#[must_use]
pub fn generate_clustered_coords(count: usize, seed: u64) -> Vec<(i32, i32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centres: Vec<(f64, f64)> = (0..CLUSTER_COUNT)
        .map(|_| (rng.gen_range(0.0..AREA_SIDE_M), rng.gen_range(0.0..AREA_SIDE_M)))
        .collect();
    let Ok(spread) = Normal::new(0.0, CLUSTER_SPREAD_M) else {
        return Vec::new();
    };

    centres
        .iter()
        .cycle()
        .take(count)
        .map(|&(cx, cy)| {
            #[expect(clippy::float_arithmetic, reason = "Required for coordinate offset")]
            let (x, y) = (cx + spread.sample(&mut rng), cy + spread.sample(&mut rng));
            #[expect(
                clippy::cast_possible_truncation,
                reason = "Coordinates stay within a few tens of kilometres"
            )]
            let coord = (x.round() as i32, y.round() as i32);
            coord
        })
        .collect()
}

/// Fleet size that holds `total_demand` under cheapest insertion.
#[must_use]
pub fn fleet_for(total_demand: u32) -> usize {
    let usable = BENCHMARK_CAPACITY - DEMAND_RANGE.end;
    usize::try_from(total_demand.div_ceil(usable) + 1).unwrap_or(usize::MAX)
}

/// Build a clustered benchmark instance with `customers` customers.
///
/// # Errors
///
/// Returns [`InstanceError`] if the generated bundle is invalid.
pub fn generate_clustered_instance(
    customers: usize,
    seed: u64,
) -> Result<ProblemInstance, InstanceError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut coords = vec![BENCHMARK_DEPOT];
    coords.extend(generate_clustered_coords(customers, seed));
    let mut demands = vec![0];
    demands.extend((0..customers).map(|_| rng.gen_range(DEMAND_RANGE)));
    let total: u32 = demands.iter().sum();
    euclidean_instance(&coords, demands, fleet_for(total), BENCHMARK_CAPACITY)
}
