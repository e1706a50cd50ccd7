//! Parabolic size profile.
//!
//! Maps the distance between an item's rest center and the pointer to the
//! item's magnified size.

/// Size-from-distance function used for the zoom effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParabolicProfile {
    min_size: i32,
    max_size: i32,
    max_distance: i32,
}

impl ParabolicProfile {
    /// Create a profile with an explicit influence radius.
    pub fn new(min_size: i32, max_size: i32, max_distance: i32) -> Self {
        Self {
            min_size,
            max_size,
            max_distance,
        }
    }

    /// Create a profile whose influence covers about two and a half items on
    /// each side of the pointer.
    pub fn from_spacing(min_size: i32, max_size: i32, spacing: i32) -> Self {
        let max_distance = (2.5 * f64::from(min_size + spacing)) as i32;
        Self::new(min_size, max_size, max_distance)
    }

    pub fn min_size(&self) -> i32 {
        self.min_size
    }

    pub fn max_size(&self) -> i32 {
        self.max_size
    }

    /// Distance at which magnification stops.
    pub fn max_distance(&self) -> i32 {
        self.max_distance
    }

    /// Whether an item at this distance is inside the affected window.
    pub fn affects(&self, distance: i32) -> bool {
        distance.abs() < self.max_distance
    }

    /// Size of an item whose rest center is `distance` pixels from the pointer.
    pub fn size(&self, distance: i32) -> i32 {
        let distance = i64::from(distance).abs();
        let max_distance = i64::from(self.max_distance);
        if max_distance <= 0 {
            return if distance == 0 { self.max_size } else { self.min_size };
        }
        if distance > max_distance {
            return self.min_size;
        }

        let range = i64::from(self.max_size - self.min_size);
        let shrink = distance * distance * range / (max_distance * max_distance);
        (i64::from(self.max_size) - shrink) as i32
    }
}
