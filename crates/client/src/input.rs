use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rewind_movement::{MoveFlags, MoveInput};

/// A terminal has no reliable key-up event on most platforms, so "held" is
/// emulated from the OS's own key-repeat: a key counts as active until this
/// long has passed since its last press.
const HOLD_WINDOW: Duration = Duration::from_millis(220);
const TURN_RATE: f32 = 2.0;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

/// Tracks recently-pressed keys and turns them into a per-tick `MoveInput`,
/// grounded in `client/net/input.rs::InputState` but built for a terminal's
/// press-only event stream instead of a winit window's held-key query.
pub struct KeyboardInput {
    pressed: HashMap<KeyCode, Instant>,
    yaw: f32,
    pitch: f32,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self {
            pressed: HashMap::new(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        self.pressed.insert(code, Instant::now());
    }

    fn active(&self, code: KeyCode) -> bool {
        self.pressed
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_WINDOW)
    }

    pub fn build(&mut self, dt: f32) -> MoveInput {
        self.pressed.retain(|_, t| t.elapsed() < HOLD_WINDOW);

        let forward = axis(self.active(KeyCode::Char('w')), self.active(KeyCode::Char('s')));
        let strafe = axis(self.active(KeyCode::Char('d')), self.active(KeyCode::Char('a')));

        if self.active(KeyCode::Left) {
            self.yaw -= TURN_RATE * dt;
        }
        if self.active(KeyCode::Right) {
            self.yaw += TURN_RATE * dt;
        }
        if self.active(KeyCode::Up) {
            self.pitch = (self.pitch + TURN_RATE * dt).min(PITCH_LIMIT);
        }
        if self.active(KeyCode::Down) {
            self.pitch = (self.pitch - TURN_RATE * dt).max(-PITCH_LIMIT);
        }

        let mut flags = MoveFlags::empty();
        if self.active(KeyCode::Char(' ')) {
            flags |= MoveFlags::JUMP;
        }
        if self.active(KeyCode::Char('c')) {
            flags |= MoveFlags::CROUCH;
        }

        MoveInput {
            forward,
            strafe,
            yaw: self.yaw,
            pitch: self.pitch,
            flags,
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
