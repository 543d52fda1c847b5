//! The boundary to outside map data.

use geo::Coord;

use super::{RoadGraph, RoadNetworkError};
use crate::Quota;

/// Materialise a routable graph around a coordinate.
///
/// Implementations fetch or read map data covering the disc of `radius_m`
/// metres around `center`. The cost matrix builder is the only consumer, so
/// tests substitute synthetic graphs through this trait.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use covend_core::{Quota, RoadGraph, RoadGraphBuilder, RoadNetworkError, RoadNetworkService, Unlimited};
///
/// struct SingleJunction;
///
/// impl RoadNetworkService for SingleJunction {
///     fn build_graph(
///         &self,
///         center: Coord<f64>,
///         _radius_m: f64,
///         _quota: &dyn Quota,
///     ) -> Result<RoadGraph, RoadNetworkError> {
///         let mut builder = RoadGraphBuilder::new();
///         builder.add_node(1, center);
///         Ok(builder.build())
///     }
/// }
///
/// let graph = SingleJunction.build_graph(Coord { x: 0.0, y: 0.0 }, 100.0, &Unlimited)?;
/// assert_eq!(graph.node_count(), 1);
/// # Ok::<(), RoadNetworkError>(())
/// ```
pub trait RoadNetworkService: Send + Sync {
    /// Build the graph covering `radius_m` metres around `center`.
    ///
    /// Implementations must return [`RoadNetworkError::NetworkUnavailable`]
    /// when map data cannot be retrieved, [`RoadNetworkError::EmptyRegion`]
    /// when nothing routable lies in range, and
    /// [`RoadNetworkError::Cancelled`] once `quota` is reached.
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError>;
}

impl<T: RoadNetworkService + ?Sized> RoadNetworkService for &T {
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        (**self).build_graph(center, radius_m, quota)
    }
}

impl<T: RoadNetworkService + ?Sized> RoadNetworkService for Box<T> {
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        (**self).build_graph(center, radius_m, quota)
    }
}

/// Check that `radius_m` is a usable search radius.
///
/// # Errors
///
/// Returns [`RoadNetworkError::InvalidRadius`] for zero, negative or
/// non-finite values.
pub fn validate_radius(radius_m: f64) -> Result<(), RoadNetworkError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(())
    } else {
        Err(RoadNetworkError::InvalidRadius { radius_m })
    }
}
