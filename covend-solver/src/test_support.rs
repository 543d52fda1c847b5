//! Test-only utilities for `covend-solver`.
//!
//! The helpers in this module are available to unit tests, behavioural tests
//! and benchmarks. They are gated behind the `test-support` feature (and
//! `cfg(test)`).

use covend_core::test_support::euclidean_instance;
use covend_core::{Cost, DistanceMatrix, ProblemInstance, Vehicle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Side of the square that [`random_instance`] scatters points over.
pub const RANDOM_AREA_SIDE: i32 = 1_000;

/// Depot position used by [`random_instance`], the centre of the square.
pub const RANDOM_DEPOT: (i32, i32) = (500, 500);

/// Largest demand drawn by [`random_instance`].
pub const RANDOM_MAX_DEMAND: u32 = 20;

/// Build an instance from a literal matrix, demands and per-vehicle capacities.
///
/// Vehicle `i` gets `capacities[i]`.
///
/// # Panics
///
/// Panics if the matrix is not square with a zero diagonal or the bundle is
/// otherwise invalid; fixtures are static data.
///
/// # Examples
/// ```rust
/// use covend_solver::test_support::fixed_instance;
///
/// let instance = fixed_instance(&[&[0, 7], &[7, 0]], vec![0, 3], &[5]);
/// assert_eq!(instance.total_demand(), 3);
/// ```
#[must_use]
#[expect(clippy::expect_used, reason = "fixtures are static test data")]
pub fn fixed_instance(rows: &[&[Cost]], demands: Vec<u32>, capacities: &[u32]) -> ProblemInstance {
    let matrix = DistanceMatrix::from_rows(rows.iter().map(|row| row.to_vec()).collect())
        .expect("fixture matrix should be valid");
    let vehicles = capacities
        .iter()
        .enumerate()
        .map(|(id, &capacity)| Vehicle::new(id, capacity))
        .collect();
    ProblemInstance::new(matrix, demands, vehicles).expect("fixture instance should be valid")
}

/// Seeded instance with `customers` points scattered over a square and
/// demands in `1..=RANDOM_MAX_DEMAND`.
///
/// Euclidean costs keep the matrix symmetric and metric, which is what the
/// solver sees from an undirected road network.
///
/// # Panics
///
/// Panics if `vehicles` or `capacity` is zero.
#[must_use]
#[expect(clippy::expect_used, reason = "fixtures are static test data")]
pub fn random_instance(seed: u64, customers: usize, vehicles: usize, capacity: u32) -> ProblemInstance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut coords = vec![RANDOM_DEPOT];
    let mut demands = vec![0];
    for _ in 0..customers {
        coords.push((
            rng.gen_range(0..RANDOM_AREA_SIDE),
            rng.gen_range(0..RANDOM_AREA_SIDE),
        ));
        demands.push(rng.gen_range(1..=RANDOM_MAX_DEMAND));
    }
    euclidean_instance(&coords, demands, vehicles, capacity)
        .expect("random instance should be valid")
}

/// Fleet size that comfortably holds every customer of a [`random_instance`].
///
/// Each vehicle is at least `capacity - RANDOM_MAX_DEMAND` full before the next
/// one opens, so one spare vehicle beyond the even split always suffices.
#[must_use]
pub fn comfortable_fleet(customers: usize, capacity: u32) -> usize {
    let widen = |value: u32| usize::try_from(value).unwrap_or(usize::MAX);
    let usable = widen(capacity.saturating_sub(RANDOM_MAX_DEMAND).max(1));
    let worst_total = customers.saturating_mul(widen(RANDOM_MAX_DEMAND));
    worst_total.div_ceil(usable).saturating_add(1)
}
