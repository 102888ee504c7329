//! The constellation effect.
//!
//! [`Simulation`] owns a fixed population of particles and draws one frame
//! per [`tick`](Simulation::tick):
//!
//! 1. lines between every pair of particles closer than the connection
//!    distance, fading linearly to nothing at the threshold
//! 2. each particle in order: draw, then update
//! 3. in debug mode, the outline of every obstacle
//!
//! The connection pass compares all pairs, so a frame costs O(n²) in the
//! particle count. That is fine for the few hundred particles the effect is
//! meant for.

use glam::Vec2;

use crate::color::Color;
use crate::config::SimulationConfig;
use crate::input::{HostEvent, KeyCode, Pointer};
use crate::obstacle::{resolve_obstacles, Obstacle, ObstacleSource};
use crate::particle::{Environment, Particle};
use crate::render::{DrawContext, FillStyle, LinearGradient};
use crate::spawn::Spawner;

/// Key that toggles the debug overlay.
pub const DEBUG_KEY: KeyCode = KeyCode::D;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Opacity of a connection line at `distance`, or `None` if the particles
/// are too far apart to be connected.
///
/// Falls off linearly from 1.0 at zero distance to 0.0 at the threshold.
#[inline]
pub fn connection_opacity(distance: f32, threshold: f32) -> Option<f32> {
    if distance < threshold {
        Some(1.0 - distance / threshold)
    } else {
        None
    }
}

/// Build the diagonal gradient for a surface, with `colors` spread evenly
/// from `(0, 0)` to `(width, height)`.
///
/// A single color gives a flat fill; no colors give a transparent gradient.
pub fn diagonal_gradient(width: f32, height: f32, colors: &[Color]) -> LinearGradient {
    let mut gradient = LinearGradient::new(Vec2::ZERO, Vec2::new(width, height));
    let last = colors.len().saturating_sub(1);
    for (i, color) in colors.iter().enumerate() {
        let offset = if last == 0 { 0.0 } else { i as f32 / last as f32 };
        gradient.add_color_stop(offset, *color);
    }
    gradient
}

/// A running constellation effect.
pub struct Simulation {
    env: Environment,
    particles: Vec<Particle>,
    gradient_colors: Vec<Color>,
    gradient: LinearGradient,
    pointer: Pointer,
    spawner: Spawner,
}

impl Simulation {
    /// Create the effect for a `width` x `height` surface.
    ///
    /// Obstacle identifiers from the config are resolved through `obstacles`
    /// once, here. Identifiers it cannot resolve are skipped.
    pub fn new<S>(config: &SimulationConfig, width: f32, height: f32, obstacles: &S) -> Self
    where
        S: ObstacleSource + ?Sized,
    {
        let env = Environment {
            width,
            height,
            friction: config.friction.clamp(0.0, 1.0),
            connection_distance: config.connection_distance,
            boundary: config.boundary,
            obstacles: resolve_obstacles(&config.obstacle_ids, obstacles),
            debug: false,
        };
        let mut spawner = Spawner::new(config.seed);
        let particles: Vec<Particle> = (0..config.particle_count)
            .map(|_| Particle::new(&env, &mut spawner, config.radius_min, config.radius_max))
            .collect();

        log::debug!(
            "Simulation created: {} particles, {}x{}, {:?}, {}/{} obstacles resolved",
            config.particle_count,
            width,
            height,
            config.boundary,
            env.obstacles.len(),
            config.obstacle_ids.len()
        );

        Self {
            gradient: diagonal_gradient(width, height, &config.gradient_colors),
            gradient_colors: config.gradient_colors.clone(),
            pointer: Pointer::new(config.pointer_radius),
            env,
            particles,
            spawner,
        }
    }

    // ========== Accessors ==========

    pub fn width(&self) -> f32 {
        self.env.width
    }

    pub fn height(&self) -> f32 {
        self.env.height
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Move particle `index` to `position` with `velocity`, keeping its
    /// radius and derived coefficients. Returns `false` if there is no such
    /// particle.
    pub fn place_particle(&mut self, index: usize, position: Vec2, velocity: Vec2) -> bool {
        match self.particles.get_mut(index) {
            Some(particle) => {
                particle.place(position, velocity);
                true
            }
            None => false,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.env.obstacles
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn gradient(&self) -> &LinearGradient {
        &self.gradient
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn debug(&self) -> bool {
        self.env.debug
    }

    // ========== Host input ==========

    pub fn set_debug(&mut self, enabled: bool) {
        self.env.debug = enabled;
    }

    pub fn toggle_debug(&mut self) {
        self.env.debug = !self.env.debug;
        log::debug!("Debug overlay {}", if self.env.debug { "on" } else { "off" });
    }

    /// Track the pointer. Movement only registers while it is pressed.
    pub fn set_pointer(&mut self, position: Vec2) {
        if self.pointer.pressed {
            self.pointer.position = position;
        }
    }

    pub fn set_pointer_pressed(&mut self, pressed: bool) {
        self.pointer.pressed = pressed;
    }

    /// Apply one forwarded host event.
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Resized { width, height } => self.on_resize(width as f32, height as f32),
            HostEvent::PointerMoved(position) => self.set_pointer(position),
            HostEvent::PointerButton { pressed } => self.set_pointer_pressed(pressed),
            HostEvent::KeyPressed(DEBUG_KEY) => self.toggle_debug(),
            HostEvent::KeyPressed(_) => {}
        }
    }

    /// The surface changed size: rebuild the gradient and reset every
    /// particle for the new extent.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.env.width = width;
        self.env.height = height;
        self.gradient = diagonal_gradient(width, height, &self.gradient_colors);
        for particle in &mut self.particles {
            particle.reset(&self.env, &mut self.spawner);
        }
        log::debug!("Resized to {}x{}, {} particles reset", width, height, self.particles.len());
    }

    // ========== Frame ==========

    /// Make the particle gradient the context's fill style.
    ///
    /// The gradient is created by the context and given the stops computed
    /// at construction or the last resize.
    pub fn apply_gradient(&self, ctx: &mut dyn DrawContext) {
        let (start, end) = (self.gradient.start, self.gradient.end);
        let mut gradient = ctx.create_linear_gradient(start.x, start.y, end.x, end.y);
        for stop in self.gradient.stops() {
            gradient.add_color_stop(stop.offset, stop.color);
        }
        ctx.set_fill_style(FillStyle::Gradient(gradient));
    }

    /// Clear the surface and draw one frame.
    pub fn tick(&mut self, ctx: &mut dyn DrawContext) {
        ctx.clear_rect(0.0, 0.0, self.env.width, self.env.height);
        self.handle_particles(ctx);
    }

    /// Draw connections, then draw and update each particle, then the debug
    /// overlay.
    pub fn handle_particles(&mut self, ctx: &mut dyn DrawContext) {
        self.connect_particles(ctx);

        if !self.particles.is_empty() {
            self.apply_gradient(ctx);
        }
        for particle in &mut self.particles {
            particle.draw(ctx, &self.env);
            particle.update(&self.env, &mut self.spawner);
        }

        if self.env.debug {
            for obstacle in &self.env.obstacles {
                ctx.stroke_rect(obstacle.x, obstacle.y, obstacle.width, obstacle.height);
            }
        }
    }

    /// Stroke a white line between every pair of particles within the
    /// connection distance.
    ///
    /// Pairs include each particle with itself, which draws a zero-length
    /// line at full opacity.
    pub fn connect_particles(&self, ctx: &mut dyn DrawContext) {
        let threshold = self.env.connection_distance;
        for (a, pa) in self.particles.iter().enumerate() {
            for pb in &self.particles[a..] {
                let d = distance(pa.position(), pb.position());
                let Some(opacity) = connection_opacity(d, threshold) else {
                    continue;
                };
                ctx.save();
                ctx.set_global_alpha(opacity);
                ctx.set_stroke_style(Color::WHITE);
                ctx.begin_path();
                ctx.set_line_width(1.0);
                ctx.move_to(pa.position().x, pa.position().y);
                ctx.line_to(pb.position().x, pb.position().y);
                ctx.stroke();
                ctx.close_path();
                ctx.restore();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::NoObstacles;
    use crate::particle::BoundaryPolicy;
    use crate::render::{DrawCommand, RecordingContext};

    fn config(count: usize) -> SimulationConfig {
        SimulationConfig::new()
            .with_particle_count(count)
            .with_radius_range(5, 6)
            .with_seed(17)
    }

    fn place(sim: &mut Simulation, positions: &[Vec2]) {
        for (i, &pos) in positions.iter().enumerate() {
            assert!(sim.place_particle(i, pos, Vec2::ZERO));
        }
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Vec2::splat(7.0), Vec2::splat(7.0)), 0.0);
    }

    #[test]
    fn test_connection_opacity_falloff() {
        assert_eq!(connection_opacity(0.0, 100.0), Some(1.0));
        assert_eq!(connection_opacity(25.0, 100.0), Some(0.75));
        assert_eq!(connection_opacity(100.0, 100.0), None);
        assert_eq!(connection_opacity(150.0, 100.0), None);

        let mut last = 1.0;
        for step in 0..100 {
            let o = connection_opacity(step as f32, 100.0).unwrap();
            assert!(o <= last);
            last = o;
        }
    }

    #[test]
    fn test_gradient_stops_even() {
        let colors: Vec<Color> = ["white", "gold", "orangered"]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        let g = diagonal_gradient(300.0, 200.0, &colors);
        assert_eq!(g.start, Vec2::ZERO);
        assert_eq!(g.end, Vec2::new(300.0, 200.0));
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_gradient_single_and_empty() {
        let g = diagonal_gradient(10.0, 10.0, &[Color::WHITE]);
        assert_eq!(g.stops().len(), 1);
        assert_eq!(g.stops()[0].offset, 0.0);
        assert!(diagonal_gradient(10.0, 10.0, &[]).stops().is_empty());
    }

    #[test]
    fn test_population_fixed() {
        let mut sim = Simulation::new(&config(25), 400.0, 300.0, &NoObstacles);
        assert_eq!(sim.particles().len(), 25);
        let mut ctx = RecordingContext::new();
        for _ in 0..10 {
            sim.tick(&mut ctx);
        }
        sim.on_resize(200.0, 100.0);
        assert_eq!(sim.particles().len(), 25);
    }

    #[test]
    fn test_connections_include_self_pairs() {
        let mut sim = Simulation::new(&config(3), 400.0, 300.0, &NoObstacles);
        place(
            &mut sim,
            &[Vec2::new(10.0, 10.0), Vec2::new(40.0, 50.0), Vec2::new(390.0, 290.0)],
        );

        let mut ctx = RecordingContext::new();
        sim.connect_particles(&mut ctx);
        let strokes = ctx.line_strokes();

        // three self lines plus the one close pair
        assert_eq!(strokes.len(), 4);
        let pair = strokes.iter().find(|s| s.from != s.to).unwrap();
        assert!((pair.alpha - 0.5).abs() < 1e-6);
        assert_eq!(pair.color, Color::WHITE);
        assert_eq!(pair.width, 1.0);
        assert!(strokes.iter().filter(|s| s.from == s.to).all(|s| s.alpha == 1.0));
    }

    #[test]
    fn test_connection_state_is_scoped() {
        let mut sim = Simulation::new(&config(2), 400.0, 300.0, &NoObstacles);
        place(&mut sim, &[Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0)]);

        let mut ctx = RecordingContext::new();
        sim.connect_particles(&mut ctx);
        let saves = ctx.commands().iter().filter(|c| matches!(c, DrawCommand::Save)).count();
        let restores = ctx.commands().iter().filter(|c| matches!(c, DrawCommand::Restore)).count();
        assert_eq!(saves, 3);
        assert_eq!(saves, restores);
        assert_eq!(ctx.commands().last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn test_exact_threshold_not_connected() {
        let mut sim = Simulation::new(&config(2), 400.0, 300.0, &NoObstacles);
        place(&mut sim, &[Vec2::new(0.0, 0.0), Vec2::new(60.0, 80.0)]);

        let mut ctx = RecordingContext::new();
        sim.connect_particles(&mut ctx);
        assert!(ctx.line_strokes().iter().all(|s| s.from == s.to));
    }

    #[test]
    fn test_empty_population_draws_only_background() {
        let mut sim = Simulation::new(&config(0), 300.0, 200.0, &NoObstacles);
        let mut ctx = RecordingContext::new();
        sim.tick(&mut ctx);
        assert_eq!(
            ctx.commands(),
            &[DrawCommand::ClearRect { x: 0.0, y: 0.0, width: 300.0, height: 200.0 }]
        );
    }

    #[test]
    fn test_draw_before_update() {
        let mut sim = Simulation::new(&config(1), 400.0, 300.0, &NoObstacles);
        place(&mut sim, &[Vec2::new(100.0, 100.0)]);
        let mut ctx = RecordingContext::new();
        sim.handle_particles(&mut ctx);

        let arc_center = ctx.commands().iter().find_map(|c| match c {
            DrawCommand::Arc { center, .. } => Some(*center),
            _ => None,
        });
        assert_eq!(arc_center, Some(Vec2::new(100.0, 100.0)));
        assert!(sim.particles()[0].position().y > 100.0);
    }

    #[test]
    fn test_resize_keeps_particles_inside() {
        let mut sim = Simulation::new(&config(100), 800.0, 600.0, &NoObstacles);
        sim.on_resize(120.0, 90.0);
        assert_eq!(sim.gradient().end, Vec2::new(120.0, 90.0));
        for p in sim.particles() {
            let (pos, r) = (p.position(), p.radius());
            assert!(pos.x >= r && pos.x <= 120.0 - r);
            assert!(pos.y >= r && pos.y <= 90.0 - r);
        }
    }

    #[test]
    fn test_resize_reset_above_puts_particles_in_entry_band() {
        let cfg = config(50).with_boundary(BoundaryPolicy::ResetAbove);
        let mut sim = Simulation::new(&cfg, 800.0, 600.0, &NoObstacles);
        sim.place_particle(0, Vec2::new(10.0, 10.0), Vec2::new(0.3, 2.0));
        sim.on_resize(400.0, 300.0);
        for p in sim.particles() {
            let (pos, r) = (p.position(), p.radius());
            assert!(pos.x >= r && pos.x <= 400.0 - r);
            assert!(pos.y <= -r - 100.0 && pos.y >= -r - 200.0);
            assert_eq!(p.velocity().y, 0.0);
        }
        assert_eq!(sim.particles()[0].velocity().x, 0.3);
    }

    #[test]
    fn test_debug_overlay_strokes_obstacles() {
        let obstacles = vec![("panel".to_string(), Obstacle::new(50.0, 60.0, 70.0, 80.0))];
        let cfg = config(0).with_obstacle_ids(["panel", "ghost"]);
        let mut sim = Simulation::new(&cfg, 400.0, 300.0, obstacles.as_slice());
        assert_eq!(sim.obstacles().len(), 1);

        let mut ctx = RecordingContext::new();
        sim.handle_particles(&mut ctx);
        assert!(ctx.stroked_rects().is_empty());

        sim.handle_event(HostEvent::KeyPressed(KeyCode::D));
        assert!(sim.debug());
        sim.handle_particles(&mut ctx);
        assert_eq!(ctx.stroked_rects(), vec![[50.0, 60.0, 70.0, 80.0]]);
    }

    #[test]
    fn test_pointer_moves_only_while_pressed() {
        let mut sim = Simulation::new(&config(0), 400.0, 300.0, &NoObstacles);
        assert_eq!(sim.pointer().radius, 150.0);

        sim.handle_event(HostEvent::PointerMoved(Vec2::new(5.0, 5.0)));
        assert_eq!(sim.pointer().position, Vec2::ZERO);

        sim.handle_event(HostEvent::PointerButton { pressed: true });
        sim.handle_event(HostEvent::PointerMoved(Vec2::new(5.0, 5.0)));
        assert_eq!(sim.pointer().position, Vec2::new(5.0, 5.0));

        sim.handle_event(HostEvent::PointerButton { pressed: false });
        sim.handle_event(HostEvent::PointerMoved(Vec2::new(9.0, 9.0)));
        assert_eq!(sim.pointer().position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_resize_event() {
        let mut sim = Simulation::new(&config(5), 400.0, 300.0, &NoObstacles);
        sim.handle_event(HostEvent::Resized { width: 640, height: 480 });
        assert_eq!((sim.width(), sim.height()), (640.0, 480.0));
        assert!(!sim.debug());
        sim.handle_event(HostEvent::KeyPressed(KeyCode::X));
        assert!(!sim.debug());
    }

    #[test]
    fn test_place_keeps_coefficients() {
        let mut sim = Simulation::new(&config(2), 400.0, 300.0, &NoObstacles);
        let before = sim.particles()[1].clone();

        assert!(sim.place_particle(1, Vec2::new(42.0, 24.0), Vec2::new(1.0, -1.0)));
        let after = &sim.particles()[1];
        assert_eq!(after.position(), Vec2::new(42.0, 24.0));
        assert_eq!(after.velocity(), Vec2::new(1.0, -1.0));
        assert_eq!(after.radius(), before.radius());
        assert_eq!(after.gravity(), before.gravity());
        assert_eq!(after.friction_factor(), before.friction_factor());

        assert!(!sim.place_particle(2, Vec2::ZERO, Vec2::ZERO));
    }

    #[test]
    fn test_loaded_friction_is_clamped() {
        let cfg = SimulationConfig::from_json(r#"{ "particle_count": 20, "friction": 3.0 }"#).unwrap();
        let sim = Simulation::new(&cfg, 400.0, 300.0, &NoObstacles);
        assert_eq!(sim.environment().friction, 1.0);
        assert!(sim.particles().iter().all(|p| p.friction_factor() > 0.0));

        let cfg = SimulationConfig { friction: -0.5, ..config(1) };
        let sim = Simulation::new(&cfg, 400.0, 300.0, &NoObstacles);
        assert_eq!(sim.environment().friction, 0.0);
        assert_eq!(sim.particles()[0].friction_factor(), 1.0);
    }

    #[test]
    fn test_gradient_created_through_context() {
        let mut sim = Simulation::new(&config(3), 300.0, 200.0, &NoObstacles);
        let mut ctx = RecordingContext::new();
        sim.tick(&mut ctx);

        let created = ctx.commands().iter().find_map(|c| match c {
            DrawCommand::CreateLinearGradient { start, end } => Some((*start, *end)),
            _ => None,
        });
        assert_eq!(created, Some((Vec2::ZERO, Vec2::new(300.0, 200.0))));
        assert_eq!(ctx.last_fill_style(), Some(&FillStyle::Gradient(sim.gradient().clone())));
    }
}
