//! Fleet members.

/// A vehicle with a load limit.
///
/// The fleet in a single instance usually shares one capacity, but nothing
/// in the model requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    /// Position of the vehicle in the fleet.
    pub id: usize,
    /// Maximum load the vehicle may carry at any point of its route.
    pub capacity: u32,
}

impl Vehicle {
    /// Construct a vehicle.
    ///
    /// Capacity is validated when the vehicle joins a
    /// [`ProblemInstance`](crate::ProblemInstance).
    pub const fn new(id: usize, capacity: u32) -> Self {
        Self { id, capacity }
    }

    /// Build `count` vehicles sharing `capacity`, numbered from zero.
    ///
    /// # Examples
    /// ```
    /// use covend_core::Vehicle;
    ///
    /// let fleet = Vehicle::uniform_fleet(3, 550);
    /// assert_eq!(fleet.len(), 3);
    /// assert!(fleet.iter().all(|v| v.capacity == 550));
    /// assert_eq!(fleet[2].id, 2);
    /// ```
    pub fn uniform_fleet(count: usize, capacity: u32) -> Vec<Self> {
        (0..count).map(|id| Self::new(id, capacity)).collect()
    }
}
