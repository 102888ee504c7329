//! Host input forwarded into the simulation.
//!
//! The simulation never listens for events itself. The host owns its event
//! loop and forwards the few events the effect cares about as
//! [`HostEvent`]s:
//!
//! ```ignore
//! fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
//!     if let Some(host_event) = HostEvent::from_window_event(&event) {
//!         self.simulation.handle_event(host_event);
//!     }
//! }
//! ```
//!
//! Hosts without winit can build `HostEvent`s directly or call the narrow
//! methods on [`Simulation`](crate::Simulation).

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the effect distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Space, Enter, Escape,

    // Other
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyA => KeyCode::A,
            WinitKeyCode::KeyB => KeyCode::B,
            WinitKeyCode::KeyC => KeyCode::C,
            WinitKeyCode::KeyD => KeyCode::D,
            WinitKeyCode::KeyE => KeyCode::E,
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyG => KeyCode::G,
            WinitKeyCode::KeyH => KeyCode::H,
            WinitKeyCode::KeyI => KeyCode::I,
            WinitKeyCode::KeyJ => KeyCode::J,
            WinitKeyCode::KeyK => KeyCode::K,
            WinitKeyCode::KeyL => KeyCode::L,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::KeyN => KeyCode::N,
            WinitKeyCode::KeyO => KeyCode::O,
            WinitKeyCode::KeyP => KeyCode::P,
            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyT => KeyCode::T,
            WinitKeyCode::KeyU => KeyCode::U,
            WinitKeyCode::KeyV => KeyCode::V,
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyX => KeyCode::X,
            WinitKeyCode::KeyY => KeyCode::Y,
            WinitKeyCode::KeyZ => KeyCode::Z,

            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Enter => KeyCode::Enter,
            WinitKeyCode::Escape => KeyCode::Escape,

            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Last known pointer state.
///
/// Physics does not read it yet; it is kept so interactive rules can be
/// added without changing how hosts forward input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
    pub pressed: bool,
    pub radius: f32,
}

impl Pointer {
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            pressed: false,
            radius,
        }
    }
}

/// An input event the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The drawing surface changed size, in pixels.
    Resized { width: u32, height: u32 },
    /// The pointer moved to a surface position.
    PointerMoved(Vec2),
    /// The primary pointer button went down or up.
    PointerButton { pressed: bool },
    /// A key went down. Auto-repeats are not reported.
    KeyPressed(KeyCode),
}

impl HostEvent {
    /// Translate a winit window event, or `None` if the effect ignores it.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => Some(HostEvent::Resized {
                width: size.width,
                height: size.height,
            }),

            WindowEvent::CursorMoved { position, .. } => Some(HostEvent::PointerMoved(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                Some(HostEvent::PointerButton {
                    pressed: *state == ElementState::Pressed,
                })
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => Some(HostEvent::KeyPressed(KeyCode::from(code))),
                    PhysicalKey::Unidentified(_) => None,
                }
            }

            _ => None,
        }
    }
}
