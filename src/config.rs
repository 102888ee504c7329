//! Simulation configuration.
//!
//! [`SimulationConfig`] can be built in code with the `with_*` methods or
//! loaded from JSON. Every field has a default, so a config file only needs
//! the values it changes:
//!
//! ```json
//! {
//!     "particle_count": 150,
//!     "boundary": "ResetAbove",
//!     "gradient_colors": ["#ffffff", "skyblue", "royalblue"],
//!     "obstacle_ids": ["title", "card"]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ConfigError;
use crate::particle::BoundaryPolicy;

/// Everything a [`Simulation`](crate::Simulation) needs besides the surface
/// size and obstacle resolver.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles. Fixed for the simulation's lifetime.
    pub particle_count: usize,
    /// Gradient stops, spread evenly from the top-left corner to the
    /// bottom-right corner.
    pub gradient_colors: Vec<Color>,
    /// Global friction, `0.0..=1.0`. Higher means more damping.
    pub friction: f32,
    /// Particles closer than this (in pixels) are joined by a line.
    pub connection_distance: f32,
    /// Interaction radius stored on the pointer.
    pub pointer_radius: f32,
    pub boundary: BoundaryPolicy,
    /// Smallest particle radius (inclusive, at least 1).
    pub radius_min: u32,
    /// Largest particle radius (exclusive).
    pub radius_max: u32,
    /// Identifiers handed to the obstacle resolver at construction.
    pub obstacle_ids: Vec<String>,
    /// RNG seed. `None` gives a different layout every run.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 300,
            gradient_colors: vec![
                Color::WHITE,
                Color::from_hex(0xffd700),
                Color::from_hex(0xff4500),
            ],
            friction: 0.2,
            connection_distance: 100.0,
            pointer_radius: 150.0,
            boundary: BoundaryPolicy::Bounce,
            radius_min: 3,
            radius_max: 10,
            obstacle_ids: Vec::new(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_gradient_colors(mut self, colors: Vec<Color>) -> Self {
        self.gradient_colors = colors;
        self
    }

    /// Set the friction coefficient. Clamped to `0.0..=1.0`.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Radius range as `min..max` integer pixels.
    pub fn with_radius_range(mut self, min: u32, max: u32) -> Self {
        self.radius_min = min;
        self.radius_max = max;
        self
    }

    pub fn with_obstacle_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obstacle_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
