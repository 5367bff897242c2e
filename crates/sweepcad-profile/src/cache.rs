//! Memoized normalization results.

use std::cell::RefCell;
use std::collections::HashMap;

use sweepcad_math::Point2;

/// Polygon cache keyed by `(version, point_count)`.
///
/// Entries from an older version are dropped on the first lookup after the
/// owner bumps its version.
#[derive(Debug, Clone, Default)]
pub(crate) struct NormalizeCache {
    inner: RefCell<CacheState>,
}

#[derive(Debug, Clone, Default)]
struct CacheState {
    version: u64,
    polygons: HashMap<usize, Vec<Point2>>,
}

impl NormalizeCache {
    /// Cached polygon for `(version, point_count)`, computing it on a miss.
    pub fn get_or_insert_with(
        &self,
        version: u64,
        point_count: usize,
        compute: impl FnOnce() -> Vec<Point2>,
    ) -> Vec<Point2> {
        let mut state = self.inner.borrow_mut();
        if state.version != version {
            state.version = version;
            state.polygons.clear();
        }
        if let Some(points) = state.polygons.get(&point_count) {
            return points.clone();
        }
        let points = compute();
        state.polygons.insert(point_count, points.clone());
        points
    }

    /// Number of cached polygons for the current version.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.borrow().polygons.len()
    }
}
