//! Synthetic demand points around a reference origin.
//!
//! The depot is placed exactly at the origin. Every other point is offset by
//! a uniform jitter in `[0, max_offset_degrees)` on each axis and assigned a
//! demand drawn uniformly from `demand_range`.

use std::ops::Range;

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::Point;

/// Parameters controlling the spread and demand of sampled points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerConfig {
    /// Upper bound (exclusive) of the per-axis offset from the origin.
    pub max_offset_degrees: f64,
    /// Half-open range demands are drawn from.
    pub demand_range: Range<u32>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_offset_degrees: 0.01,
            demand_range: 10..100,
        }
    }
}

/// Errors returned by [`Sampler::generate_instance`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    /// An argument was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Seedable generator of demand points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use covend_core::Sampler;
///
/// # fn main() -> Result<(), covend_core::SamplerError> {
/// let origin = Coord { x: -77.0141, y: -12.0432 };
/// let points = Sampler::seeded(7).generate_instance(4, origin)?;
///
/// assert_eq!(points.len(), 4);
/// assert_eq!(points[0].location, origin);
/// assert_eq!(points[0].demand, 0);
/// assert!(points[1..].iter().all(|p| (10..100).contains(&p.demand)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplerConfig,
    rng: ChaCha8Rng,
}

impl Sampler {
    /// Create a sampler with default configuration and a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(SamplerConfig::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create a sampler with default configuration seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::with_config(SamplerConfig::default(), ChaCha8Rng::from_entropy())
    }

    /// Create a sampler from explicit configuration and generator.
    pub const fn with_config(config: SamplerConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    /// Configuration in effect.
    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Generate `num_points` points around `origin`, the first being the depot.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidArgument`] when `num_points` is zero,
    /// the origin is not a finite coordinate, the offset is negative or not
    /// finite, or the demand range is empty.
    pub fn generate_instance(
        &mut self,
        num_points: usize,
        origin: Coord<f64>,
    ) -> Result<Vec<Point>, SamplerError> {
        if num_points == 0 {
            return Err(SamplerError::InvalidArgument(
                "num_points must be at least 1".into(),
            ));
        }
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return Err(SamplerError::InvalidArgument(format!(
                "origin ({}, {}) is not a finite coordinate",
                origin.y, origin.x
            )));
        }
        let offset = self.config.max_offset_degrees;
        if !offset.is_finite() || offset < 0.0 {
            return Err(SamplerError::InvalidArgument(format!(
                "max_offset_degrees must be finite and non-negative, got {offset}"
            )));
        }
        if self.config.demand_range.is_empty() {
            return Err(SamplerError::InvalidArgument(format!(
                "demand range {:?} is empty",
                self.config.demand_range
            )));
        }

        let mut points = Vec::with_capacity(num_points);
        points.push(Point::depot(origin));
        for id in 1..num_points {
            let location = Coord {
                x: origin.x + self.jitter(offset),
                y: origin.y + self.jitter(offset),
            };
            let demand = self.rng.gen_range(self.config.demand_range.clone());
            points.push(Point::new(id, location, demand));
        }
        log::debug!("sampled {num_points} points around ({}, {})", origin.y, origin.x);
        Ok(points)
    }

    fn jitter(&mut self, offset: f64) -> f64 {
        if offset == 0.0 {
            0.0
        } else {
            self.rng.gen_range(0.0..offset)
        }
    }
}

/// Generate points with default configuration.
///
/// Uses a fixed seed when `seed` is provided and OS entropy otherwise.
pub fn generate_instance(
    num_points: usize,
    origin: Coord<f64>,
    seed: Option<u64>,
) -> Result<Vec<Point>, SamplerError> {
    let mut sampler = seed.map_or_else(Sampler::from_entropy, Sampler::seeded);
    sampler.generate_instance(num_points, origin)
}
