//! # Path cache
//!
//! Keeps the most recently received planned path. Only the latest path is of
//! interest, so each update replaces the previous one wholesale.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use comms_if::msg::PathMsg;
use util::time::duration_to_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planned path in the vehicle frame, x forward and y left.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PlannedPath {
    pub points_m: Vec<Vector2<f64>>,
}

/// Cache of the latest planned path.
#[derive(Debug, Default)]
pub struct PathCache {
    path: Option<PlannedPath>,

    /// When the cached path was received
    received: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlannedPath {
    pub fn new(points_m: Vec<Vector2<f64>>) -> Self {
        Self { points_m }
    }

    /// Number of points in the path
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }
}

impl From<&PathMsg> for PlannedPath {
    fn from(msg: &PathMsg) -> Self {
        Self {
            points_m: msg
                .points_m
                .iter()
                .map(|p| Vector2::new(p[0], p[1]))
                .collect(),
        }
    }
}

impl PathCache {
    /// Replace the cached path with a new one.
    pub fn update(&mut self, path: PlannedPath, now: DateTime<Utc>) {
        self.path = Some(path);
        self.received = Some(now);
    }

    /// Get the first point of the latest path.
    ///
    /// `None` if no path has been received or the latest path is empty.
    pub fn front(&self) -> Option<Vector2<f64>> {
        self.path.as_ref()?.points_m.first().copied()
    }

    /// True if any path has ever been received.
    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    /// Age of the cached path at `now`, in seconds.
    pub fn age_s(&self, now: DateTime<Utc>) -> Option<f64> {
        self.received
            .and_then(|r| duration_to_seconds(now.signed_duration_since(r)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_path_cache() {
        let now = Utc::now();
        let mut cache = PathCache::default();

        assert!(!cache.has_path());
        assert_eq!(cache.front(), None);
        assert_eq!(cache.age_s(now), None);

        cache.update(
            PlannedPath::new(vec![Vector2::new(2.0, 1.0), Vector2::new(4.0, 1.0)]),
            now,
        );
        assert_eq!(cache.front(), Some(Vector2::new(2.0, 1.0)));
        assert_eq!(
            cache.age_s(now + chrono::Duration::milliseconds(250)),
            Some(0.25)
        );

        // Updates replace the whole path
        cache.update(PlannedPath::new(vec![Vector2::new(5.0, -1.0)]), now);
        assert_eq!(cache.front(), Some(Vector2::new(5.0, -1.0)));

        // An empty path is still a path, it just has no front
        cache.update(PlannedPath::default(), now);
        assert!(cache.has_path());
        assert_eq!(cache.front(), None);
    }

    #[test]
    fn test_from_msg() {
        let msg = PathMsg {
            stamp: Utc::now(),
            points_m: vec![[1.0, 2.0], [3.0, 4.0]],
        };

        let path = PlannedPath::from(&msg);
        assert_eq!(path.get_num_points(), 2);
        assert_eq!(path.points_m[1], Vector2::new(3.0, 4.0));
    }
}
