//! Input fusion
//!
//! Hosts forward raw keyboard and touch/pointer events through
//! [`InputEvent`]; gameplay reads a single direction vector plus a pause edge.
//!
//! Priority: a touch vector beyond the deadzone always wins over the
//! keyboard. Below the deadzone the pressed direction keys are summed
//! (opposites cancel) and normalized.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TOUCH_DEADZONE;

/// Logical keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value to a game key
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "w" | "W" | "ArrowUp" => Some(Key::Up),
            "s" | "S" | "ArrowDown" => Some(Key::Down),
            "a" | "A" | "ArrowLeft" => Some(Key::Left),
            "d" | "D" | "ArrowRight" => Some(Key::Right),
            "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Raw event delivered by the host adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Continuous pointer/touch direction (e.g. virtual joystick offset)
    Touch(Vec2),
    TouchEnd,
    /// Window lost focus: every held key is released
    Blur,
}

/// Which device class currently drives the direction vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    Keyboard,
    Touch,
}

/// Last known key states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub pause: bool,
}

impl KeyState {
    fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Pause => self.pause = pressed,
        }
    }

    /// Sum of pressed direction keys, normalized (zero when none or cancelled)
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

/// Keyboard + touch input state with an attach/detach lifecycle
#[derive(Debug, Clone)]
pub struct InputManager {
    keys: KeyState,
    touch: Vec2,
    deadzone: f32,
    /// Pause pressed since the last `take_pause`
    pause_latched: bool,
    attached: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_deadzone(TOUCH_DEADZONE)
    }

    pub fn with_deadzone(deadzone: f32) -> Self {
        Self {
            keys: KeyState::default(),
            touch: Vec2::ZERO,
            deadzone: deadzone.max(0.0),
            pause_latched: false,
            attached: false,
        }
    }

    /// Start accepting host events (resets all state)
    pub fn initialize(&mut self) {
        self.reset();
        self.attached = true;
        log::debug!("Input attached");
    }

    /// Stop accepting host events; safe to call repeatedly or before `initialize`
    pub fn destroy(&mut self) {
        if self.attached {
            log::debug!("Input detached");
        }
        self.attached = false;
        self.reset();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn reset(&mut self) {
        self.keys = KeyState::default();
        self.touch = Vec2::ZERO;
        self.pause_latched = false;
    }

    /// Feed one host event; ignored while detached
    pub fn handle_event(&mut self, event: InputEvent) {
        if !self.attached {
            return;
        }
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat keydowns arrive while held and must not re-latch
                if key == Key::Pause && !self.keys.pause {
                    self.pause_latched = true;
                }
                self.keys.set(key, true);
            }
            InputEvent::KeyUp(key) => self.keys.set(key, false),
            InputEvent::Touch(v) => self.set_touch_vector(v),
            InputEvent::TouchEnd => self.touch = Vec2::ZERO,
            InputEvent::Blur => {
                self.keys = KeyState::default();
                self.touch = Vec2::ZERO;
            }
        }
    }

    /// Convenience for hosts that only have DOM key names
    pub fn handle_dom_key(&mut self, key: &str, pressed: bool) {
        if let Some(key) = Key::from_dom(key) {
            self.handle_event(if pressed {
                InputEvent::KeyDown(key)
            } else {
                InputEvent::KeyUp(key)
            });
        }
    }

    /// Record the latest continuous touch vector; non-finite input counts as zero
    pub fn set_touch_vector(&mut self, v: Vec2) {
        self.touch = if v.is_finite() { v } else { Vec2::ZERO };
    }

    pub fn get_state(&self) -> KeyState {
        self.keys
    }

    pub fn touch_vector(&self) -> Vec2 {
        self.touch
    }

    fn touch_active(&self) -> bool {
        self.touch.length() > self.deadzone
    }

    /// Fused direction vector
    pub fn get_vector(&self) -> Vec2 {
        if self.touch_active() {
            if self.touch.length() > 1.0 {
                self.touch.normalize()
            } else {
                // Keep analog magnitude for partial deflection
                self.touch
            }
        } else {
            self.keys.direction()
        }
    }

    pub fn get_source(&self) -> InputSource {
        if self.touch_active() {
            InputSource::Touch
        } else {
            InputSource::Keyboard
        }
    }

    /// Consume the pause edge
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_latched)
    }
}
