//! Demand points served by the fleet.

use geo::Coord;

/// A location with a demand to be served from the depot.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. The point's
/// `id` is its index in the instance; index `0` is the depot, whose demand is
/// always zero.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use covend_core::Point;
///
/// let point = Point::new(3, Coord { x: -77.01, y: -12.04 }, 40);
///
/// assert_eq!(point.id, 3);
/// assert_eq!(point.latitude(), -12.04);
/// assert_eq!(point.demand, 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Index of the point within its instance.
    pub id: usize,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Units requested by this point.
    pub demand: u32,
}

impl Point {
    /// Construct a demand point.
    pub const fn new(id: usize, location: Coord<f64>, demand: u32) -> Self {
        Self {
            id,
            location,
            demand,
        }
    }

    /// Construct the depot: index `0` with zero demand.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use covend_core::Point;
    ///
    /// let depot = Point::depot(Coord { x: 0.0, y: 0.0 });
    /// assert_eq!(depot.id, 0);
    /// assert_eq!(depot.demand, 0);
    /// ```
    pub const fn depot(location: Coord<f64>) -> Self {
        Self::new(0, location, 0)
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Whether this point is the depot.
    pub const fn is_depot(&self) -> bool {
        self.id == 0
    }
}
