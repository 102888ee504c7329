//! Headless demo host.
//!
//! Renders the effect with the software canvas and writes the last frame
//! to a PNG.
//!
//! Usage: `constellation [config.json] [frames] [output.png] [debug]`
//!
//! Set `RUST_LOG=info` (or `debug`) for progress output.

use std::collections::HashMap;

use constellation::prelude::*;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Stand-in for the page elements a browser host would measure.
fn demo_layout(width: f32, height: f32) -> HashMap<String, Obstacle> {
    let mut layout = HashMap::new();
    layout.insert(
        "title".to_string(),
        Obstacle::new(width * 0.25, height * 0.2, width * 0.5, 60.0),
    );
    layout.insert(
        "card".to_string(),
        Obstacle::new(width * 0.1, height * 0.6, width * 0.3, 120.0),
    );
    layout.insert(
        "button".to_string(),
        Obstacle::new(width * 0.65, height * 0.7, 140.0, 40.0),
    );
    layout
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => SimulationConfig::load(&path)?,
        _ => SimulationConfig::default(),
    };
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(300);
    let output = args.next().unwrap_or_else(|| "constellation.png".to_string());
    let debug = args.next().is_some_and(|s| s == "debug");

    log::info!(
        "Rendering {} frames of {} particles at {}x{} ({:?})",
        frames,
        config.particle_count,
        WIDTH,
        HEIGHT,
        config.boundary
    );

    let layout = demo_layout(WIDTH as f32, HEIGHT as f32);
    let mut canvas = RasterCanvas::new(WIDTH, HEIGHT);
    canvas.set_stroke_style(Color::rgb(0.4, 0.8, 1.0));

    let mut sim = Simulation::new(&config, WIDTH as f32, HEIGHT as f32, &layout);
    if debug {
        sim.handle_event(HostEvent::KeyPressed(KeyCode::D));
    }

    let mut clock = FrameClock::new();
    for _ in 0..frames {
        sim.tick(&mut canvas);
        clock.tick();
        if clock.frame() % 60 == 0 {
            log::info!(
                "frame {} ({:.1} fps, last frame {:.2} ms)",
                clock.frame(),
                clock.fps(),
                clock.delta() * 1000.0
            );
        }
    }

    canvas.save_png(&output, Color::BLACK)?;
    log::info!(
        "Wrote {} after {} frames, {:.1} fps average",
        output,
        clock.frame(),
        clock.average_fps()
    );

    Ok(())
}
