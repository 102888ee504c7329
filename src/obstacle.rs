//! Rectangular obstacles particles can collide with.
//!
//! Obstacles are plain axis-aligned boxes in surface pixel coordinates. The
//! host owns whatever they stand for (page elements, UI panels, ...) and
//! hands the simulation a resolver that maps identifiers to boxes.
//! Resolution happens once, at construction, and is best-effort: an
//! identifier the resolver does not know is skipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the horizontal extent `[min_x, max_x]` intersects this box's.
    pub fn overlaps_x(&self, min_x: f32, max_x: f32) -> bool {
        min_x < self.x + self.width && max_x > self.x
    }

    /// Whether the vertical extent `[min_y, max_y]` intersects this box's.
    pub fn overlaps_y(&self, min_y: f32, max_y: f32) -> bool {
        min_y < self.y + self.height && max_y > self.y
    }
}

/// Resolves external identifiers into obstacle boxes.
pub trait ObstacleSource {
    /// Bounding box for `id`, or `None` if nothing matches.
    fn resolve(&self, id: &str) -> Option<Obstacle>;
}

/// A source that knows no obstacles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl ObstacleSource for NoObstacles {
    fn resolve(&self, _id: &str) -> Option<Obstacle> {
        None
    }
}

impl ObstacleSource for HashMap<String, Obstacle> {
    fn resolve(&self, id: &str) -> Option<Obstacle> {
        self.get(id).copied()
    }
}

impl ObstacleSource for [(String, Obstacle)] {
    fn resolve(&self, id: &str) -> Option<Obstacle> {
        self.iter().find(|(name, _)| name == id).map(|(_, ob)| *ob)
    }
}

/// Resolve every identifier independently, dropping the ones that fail.
pub fn resolve_obstacles<S>(ids: &[String], source: &S) -> Vec<Obstacle>
where
    S: ObstacleSource + ?Sized,
{
    ids.iter()
        .filter_map(|id| {
            let found = source.resolve(id);
            if found.is_none() {
                log::warn!("Obstacle '{}' could not be resolved, skipping", id);
            }
            found
        })
        .collect()
}
