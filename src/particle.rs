//! Individual particles and the physics they run each frame.
//!
//! A particle's radius is fixed at creation and determines its two physical
//! coefficients: larger particles fall faster, smaller particles feel more
//! drag. What happens at the edge of the surface is decided by the
//! simulation-wide [`BoundaryPolicy`].

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::obstacle::Obstacle;
use crate::render::DrawContext;
use crate::spawn::Spawner;

/// Gravity per unit of radius, in pixels per frame squared.
pub const GRAVITY_PER_RADIUS: f32 = 0.001;

/// What a particle does when it reaches the edge of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Clamp to the edge and reverse the velocity component.
    ///
    /// Particles start anywhere inside the surface and never leave it.
    #[default]
    Bounce,

    /// Let particles fall out and respawn above the top edge.
    ///
    /// Particles start above the surface, fall through it and collide with
    /// obstacles on the way. Once a particle is further than
    /// `radius + connection_distance` past the left, right or bottom edge it
    /// is moved back above the top with zero vertical speed, keeping its
    /// horizontal speed.
    ResetAbove,
}

/// Read-only view of the simulation a particle may consult.
///
/// Only the owning [`Simulation`](crate::Simulation) mutates these values.
#[derive(Debug, Clone)]
pub struct Environment {
    pub width: f32,
    pub height: f32,
    /// Global friction setting, `0.0..=1.0`.
    pub friction: f32,
    pub connection_distance: f32,
    pub boundary: BoundaryPolicy,
    pub obstacles: Vec<Obstacle>,
    pub debug: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            friction: 0.2,
            connection_distance: 100.0,
            boundary: BoundaryPolicy::Bounce,
            obstacles: Vec::new(),
            debug: false,
        }
    }
}

/// A simulated body.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    friction_factor: f32,
    gravity: f32,
}

impl Particle {
    /// Spawn a particle with a random radius in `radius_min..radius_max`
    /// (integer steps), placed according to the boundary policy.
    pub fn new(env: &Environment, spawner: &mut Spawner, radius_min: u32, radius_max: u32) -> Self {
        let radius = spawner.random_int(radius_min.max(1), radius_max) as f32;
        let x = spawner.random_span(radius, env.width - radius * 2.0);
        let y = match env.boundary {
            BoundaryPolicy::Bounce => spawner.random_span(radius, env.height - radius * 2.0),
            // Spread the first wave over one surface height so it doesn't
            // arrive as a single sheet.
            BoundaryPolicy::ResetAbove => -radius - spawner.random() * env.height,
        };
        let velocity = Vec2::new(spawner.random_signed(0.5), spawner.random_signed(0.5));

        Self::from_parts(radius, Vec2::new(x, y), velocity, env)
    }

    /// Build a particle from explicit state. Coefficients are derived from
    /// `radius` and the environment's friction setting.
    ///
    /// `radius` is raised to 1.0 if smaller.
    pub fn from_parts(radius: f32, position: Vec2, velocity: Vec2, env: &Environment) -> Self {
        let radius = radius.max(1.0);
        let mut friction_factor = 1.0 - (1.0 - 1.0 / radius) * env.friction;
        if env.boundary == BoundaryPolicy::ResetAbove {
            friction_factor = (friction_factor * 100.0).round() / 100.0;
        }

        Self {
            position,
            velocity,
            radius,
            friction_factor,
            gravity: radius * GRAVITY_PER_RADIUS,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Damping coefficient derived from radius and global friction.
    #[inline]
    pub fn friction_factor(&self) -> f32 {
        self.friction_factor
    }

    /// Downward acceleration added to the vertical speed every frame.
    #[inline]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Move to `position` with `velocity`. Radius and coefficients are kept.
    pub(crate) fn place(&mut self, position: Vec2, velocity: Vec2) {
        self.position = position;
        self.velocity = velocity;
    }

    /// Fill a circle with the current fill style. In debug mode also stroke
    /// the bounding square used for obstacle collisions.
    pub fn draw(&self, ctx: &mut dyn DrawContext, env: &Environment) {
        ctx.begin_path();
        ctx.arc(self.position.x, self.position.y, self.radius, 0.0, TAU);
        ctx.fill();
        if env.debug {
            ctx.stroke_rect(
                self.position.x - self.radius,
                self.position.y - self.radius,
                self.radius * 2.0,
                self.radius * 2.0,
            );
        }
    }

    /// Advance one frame: gravity, integration, boundary, obstacles.
    pub fn update(&mut self, env: &Environment, spawner: &mut Spawner) {
        self.velocity.y += self.gravity;
        self.position += self.velocity;

        match env.boundary {
            BoundaryPolicy::Bounce => self.bounce_off_edges(env),
            BoundaryPolicy::ResetAbove => {
                if self.has_left(env) {
                    self.reset(env, spawner);
                    return;
                }
                self.collide_with_obstacles(&env.obstacles);
            }
        }
    }

    /// Move the particle back to its entry state for the current policy.
    ///
    /// `Bounce` re-places it anywhere inside the surface and keeps its
    /// velocity. `ResetAbove` puts it above the top edge, at least
    /// `connection_distance` out of view, with zero vertical speed.
    pub fn reset(&mut self, env: &Environment, spawner: &mut Spawner) {
        let r = self.radius;
        let x = spawner.random_span(r, env.width - r * 2.0);
        match env.boundary {
            BoundaryPolicy::Bounce => {
                let y = spawner.random_span(r, env.height - r * 2.0);
                self.position = Vec2::new(x, y);
            }
            BoundaryPolicy::ResetAbove => {
                let y = -r - env.connection_distance - spawner.random() * env.connection_distance;
                self.position = Vec2::new(x, y);
                self.velocity.y = 0.0;
                log::trace!("Particle reset to ({:.1}, {:.1})", x, y);
            }
        }
    }

    /// Whether the particle is past the exit margin on the left, right or
    /// bottom. The top is the entry side and never counts.
    pub fn has_left(&self, env: &Environment) -> bool {
        let margin = self.radius + env.connection_distance;
        self.position.x < -margin
            || self.position.x > env.width + margin
            || self.position.y > env.height + margin
    }

    fn bounce_off_edges(&mut self, env: &Environment) {
        let r = self.radius;
        if self.position.x < r {
            self.position.x = r;
            self.velocity.x = -self.velocity.x;
        } else if self.position.x > env.width - r {
            self.position.x = env.width - r;
            self.velocity.x = -self.velocity.x;
        }

        if self.position.y < r {
            self.position.y = r;
            self.velocity.y = -self.velocity.y;
        } else if self.position.y > env.height - r {
            self.position.y = env.height - r;
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Reverse velocity on contact with an obstacle.
    ///
    /// On a hit, `vy` flips if the vertical extents overlap and `vx` flips if
    /// the horizontal extents overlap. An overlapping box overlaps on both
    /// axes, so every hit reverses both components. Position is not
    /// corrected, so a particle may sink into an obstacle for a frame or two.
    fn collide_with_obstacles(&mut self, obstacles: &[Obstacle]) {
        let r = self.radius;
        let (min, max) = (self.position - r, self.position + r);
        for obstacle in obstacles {
            let hit_x = obstacle.overlaps_x(min.x, max.x);
            let hit_y = obstacle.overlaps_y(min.y, max.y);
            if !(hit_x && hit_y) {
                continue;
            }
            if hit_y {
                self.velocity.y = -self.velocity.y;
            }
            if hit_x {
                self.velocity.x = -self.velocity.x;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingContext;

    fn env(boundary: BoundaryPolicy) -> Environment {
        Environment {
            width: 300.0,
            height: 200.0,
            boundary,
            ..Default::default()
        }
    }

    #[test]
    fn test_coefficients_from_radius() {
        let p = Particle::from_parts(5.0, Vec2::ZERO, Vec2::ZERO, &env(BoundaryPolicy::Bounce));
        assert!((p.friction_factor() - 0.84).abs() < 1e-6);
        assert!((p.gravity() - 0.005).abs() < 1e-7);
    }

    #[test]
    fn test_reset_above_rounds_friction() {
        let mut e = env(BoundaryPolicy::ResetAbove);
        e.friction = 0.3;
        // 1 - (1 - 1/7) * 0.3 = 0.742857...
        let p = Particle::from_parts(7.0, Vec2::ZERO, Vec2::ZERO, &e);
        assert!((p.friction_factor() - 0.74).abs() < 1e-6);
    }

    #[test]
    fn test_new_radius_and_position() {
        let e = env(BoundaryPolicy::Bounce);
        let mut spawner = Spawner::new(Some(1));
        for _ in 0..200 {
            let p = Particle::new(&e, &mut spawner, 3, 10);
            let r = p.radius();
            assert!((3.0..10.0).contains(&r));
            assert_eq!(r, r.floor());
            assert!(p.position().x >= r && p.position().x <= e.width - r);
            assert!(p.position().y >= r && p.position().y <= e.height - r);
            assert!(p.velocity().x >= -0.5 && p.velocity().x < 0.5);
        }
    }

    #[test]
    fn test_new_reset_above_starts_above() {
        let e = env(BoundaryPolicy::ResetAbove);
        let mut spawner = Spawner::new(Some(2));
        for _ in 0..200 {
            let p = Particle::new(&e, &mut spawner, 3, 10);
            assert!(p.position().y <= -p.radius());
        }
    }

    #[test]
    fn test_zero_minimum_radius_is_raised() {
        let e = env(BoundaryPolicy::Bounce);
        let mut spawner = Spawner::new(Some(4));
        for _ in 0..50 {
            assert!(Particle::new(&e, &mut spawner, 0, 2).radius() >= 1.0);
        }
    }

    #[test]
    fn test_update_applies_gravity_then_moves() {
        let e = env(BoundaryPolicy::Bounce);
        let mut spawner = Spawner::new(Some(0));
        let mut p = Particle::from_parts(5.0, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), &e);
        p.update(&e, &mut spawner);
        assert!((p.velocity().y - 0.005).abs() < 1e-7);
        assert!((p.position().x - 101.0).abs() < 1e-5);
        assert!((p.position().y - 100.005).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_clamps_and_reflects() {
        let e = env(BoundaryPolicy::Bounce);
        let mut spawner = Spawner::new(Some(0));

        let mut p = Particle::from_parts(4.0, Vec2::new(5.0, 50.0), Vec2::new(-3.0, 0.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.position().x, 4.0);
        assert_eq!(p.velocity().x, 3.0);

        let mut p = Particle::from_parts(4.0, Vec2::new(150.0, 195.0), Vec2::new(0.0, 2.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.position().y, 196.0);
        assert!((p.velocity().y + 2.004).abs() < 1e-6);

        let mut p = Particle::from_parts(4.0, Vec2::new(295.0, 50.0), Vec2::new(2.5, 0.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.position().x, 296.0);
        assert_eq!(p.velocity().x, -2.5);
    }

    #[test]
    fn test_reset_above_on_exit() {
        let e = env(BoundaryPolicy::ResetAbove);
        let mut spawner = Spawner::new(Some(8));
        // Bottom margin is height + radius + connection_distance = 305.
        let mut p = Particle::from_parts(5.0, Vec2::new(150.0, 304.0), Vec2::new(0.7, 3.0), &e);
        p.update(&e, &mut spawner);

        assert_eq!(p.velocity().y, 0.0);
        assert_eq!(p.velocity().x, 0.7);
        assert!(p.position().y <= -5.0 - 100.0);
        assert!(p.position().y >= -5.0 - 200.0);
        assert!(!p.has_left(&e));
    }

    #[test]
    fn test_reset_above_keeps_side_margin() {
        let e = env(BoundaryPolicy::ResetAbove);
        let mut spawner = Spawner::new(Some(8));
        let mut p = Particle::from_parts(5.0, Vec2::new(-100.0, 50.0), Vec2::new(-1.0, 0.0), &e);
        p.update(&e, &mut spawner);
        // -101 is still inside the 105 pixel margin.
        assert!((p.position().x + 101.0).abs() < 1e-5);

        // -102 .. -105 are still inside, -106 is out.
        for _ in 0..5 {
            p.update(&e, &mut spawner);
        }
        assert!(p.position().x > 0.0);
        assert_eq!(p.velocity().x, -1.0);
    }

    #[test]
    fn test_landing_on_top_flips_both() {
        let mut e = env(BoundaryPolicy::ResetAbove);
        e.obstacles = vec![Obstacle::new(100.0, 100.0, 100.0, 20.0)];
        let mut spawner = Spawner::new(Some(0));
        // Bottom of the square goes from 98 to 101.
        let mut p = Particle::from_parts(3.0, Vec2::new(150.0, 95.0), Vec2::new(0.5, 3.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.velocity().x, -0.5);
        assert!((p.velocity().y + 3.003).abs() < 1e-6);
    }

    #[test]
    fn test_side_hit_flips_both() {
        let mut e = env(BoundaryPolicy::ResetAbove);
        e.obstacles = vec![Obstacle::new(100.0, 100.0, 50.0, 50.0)];
        let mut spawner = Spawner::new(Some(0));
        let mut p = Particle::from_parts(3.0, Vec2::new(95.0, 120.0), Vec2::new(3.0, 0.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.velocity().x, -3.0);
        assert!(p.velocity().y < 0.0);
    }

    #[test]
    fn test_corner_hit_flips_both() {
        let mut e = env(BoundaryPolicy::ResetAbove);
        e.obstacles = vec![Obstacle::new(100.0, 100.0, 50.0, 50.0)];
        let mut spawner = Spawner::new(Some(0));
        let mut p = Particle::from_parts(3.0, Vec2::new(95.0, 95.0), Vec2::new(3.0, 3.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.velocity().x, -3.0);
        assert!(p.velocity().y < 0.0);
    }

    #[test]
    fn test_single_axis_overlap_is_not_a_hit() {
        let mut e = env(BoundaryPolicy::ResetAbove);
        e.obstacles = vec![Obstacle::new(100.0, 100.0, 100.0, 20.0)];
        let mut spawner = Spawner::new(Some(0));
        // Horizontally inside the box, still above it after the step.
        let mut p = Particle::from_parts(3.0, Vec2::new(150.0, 90.0), Vec2::new(0.5, 3.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.velocity().x, 0.5);
        assert!(p.velocity().y > 0.0);
    }

    #[test]
    fn test_bounce_policy_ignores_obstacles() {
        let mut e = env(BoundaryPolicy::Bounce);
        e.obstacles = vec![Obstacle::new(0.0, 0.0, 300.0, 200.0)];
        let mut spawner = Spawner::new(Some(0));
        let mut p = Particle::from_parts(3.0, Vec2::new(150.0, 100.0), Vec2::new(1.0, 0.0), &e);
        p.update(&e, &mut spawner);
        assert_eq!(p.velocity().x, 1.0);
    }

    #[test]
    fn test_draw_debug_square() {
        let mut e = env(BoundaryPolicy::Bounce);
        let p = Particle::from_parts(4.0, Vec2::new(10.0, 20.0), Vec2::ZERO, &e);

        let mut ctx = RecordingContext::new();
        p.draw(&mut ctx, &e);
        assert_eq!(ctx.fill_count(), 1);
        assert!(ctx.stroked_rects().is_empty());

        e.debug = true;
        p.draw(&mut ctx, &e);
        assert_eq!(ctx.stroked_rects(), vec![[6.0, 16.0, 8.0, 8.0]]);
    }
}
