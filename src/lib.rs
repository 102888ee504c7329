//! # Constellation
//!
//! A 2D particle effect: particles fall under gravity, bounce off the edges
//! of the surface (or fall through and respawn above it), collide with
//! rectangular obstacles and are joined by fading lines whenever two of
//! them come close.
//!
//! The crate draws through the [`DrawContext`] trait and never touches a
//! window, so it runs the same in a native window, a browser canvas or a
//! headless renderer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::collections::HashMap;
//!
//! use constellation::prelude::*;
//!
//! let config = SimulationConfig::new()
//!     .with_particle_count(300)
//!     .with_boundary(BoundaryPolicy::ResetAbove)
//!     .with_obstacle_ids(["title"]);
//!
//! let mut obstacles = HashMap::new();
//! obstacles.insert("title".to_string(), Obstacle::new(200.0, 150.0, 400.0, 80.0));
//!
//! let mut canvas = RasterCanvas::new(800, 600);
//! let mut sim = Simulation::new(&config, 800.0, 600.0, &obstacles);
//!
//! for _ in 0..600 {
//!     sim.tick(&mut canvas);
//! }
//! canvas.save_png("frame.png", Color::BLACK)?;
//! ```
//!
//! ## Frame Order
//!
//! Every [`Simulation::tick`] clears the surface, strokes the connection
//! lines, then draws and updates each particle in order, then outlines
//! obstacles if the debug overlay is on.
//!
//! ## Boundary Policies
//!
//! | Policy | Spawn | At the edge |
//! |--------|-------|-------------|
//! | [`BoundaryPolicy::Bounce`] | anywhere inside | clamp and reverse |
//! | [`BoundaryPolicy::ResetAbove`] | above the top | respawn above, obstacles active |
//!
//! ## Host Input
//!
//! The host forwards resize, pointer and key events through
//! [`Simulation::handle_event`] (see [`HostEvent::from_window_event`] for
//! winit) or the narrow setters like [`Simulation::on_resize`].

pub mod color;
pub mod config;
pub mod error;
pub mod input;
pub mod obstacle;
mod particle;
pub mod render;
mod simulation;
mod spawn;
pub mod time;

pub use color::Color;
pub use config::SimulationConfig;
pub use error::{ColorParseError, ConfigError, ExportError};
pub use glam::Vec2;
pub use input::{HostEvent, KeyCode, Pointer};
pub use obstacle::{resolve_obstacles, NoObstacles, Obstacle, ObstacleSource};
pub use particle::{BoundaryPolicy, Environment, Particle, GRAVITY_PER_RADIUS};
pub use render::{DrawContext, FillStyle, LinearGradient, RasterCanvas, RecordingContext};
pub use simulation::{connection_opacity, diagonal_gradient, distance, Simulation, DEBUG_KEY};
pub use spawn::Spawner;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use constellation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::SimulationConfig;
    pub use crate::input::{HostEvent, KeyCode};
    pub use crate::obstacle::{NoObstacles, Obstacle, ObstacleSource};
    pub use crate::particle::BoundaryPolicy;
    pub use crate::render::{DrawContext, RasterCanvas, RecordingContext};
    pub use crate::simulation::Simulation;
    pub use crate::time::FrameClock;
    pub use crate::Vec2;
}
