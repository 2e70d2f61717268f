/// Platform-agnostic input handling system
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    FocusLost,
    PointerLockChanged { locked: bool },
}

/// Movement flags for one frame, snapshotted from the pressed-key set and
/// handed to the camera controller explicitly. Every key sets its flag on
/// key-down and clears it on key-up; there is no hidden global state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Unified input state fed by the platform event listeners.
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    pub mouse_pos: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            look_delta: (0.0, 0.0),
            pointer_locked: false,
            mouse_pos: (0.0, 0.0),
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
                self.mouse_pos.0 += dx;
                self.mouse_pos.1 += dy;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    /// Take the look delta accumulated since the last frame, resetting it.
    /// The rotation step consumes this exactly once per frame.
    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    /// Re-center the synthetic mouse-position tracker (pointer lock hides the
    /// real cursor, so this is the only notion of "where the mouse is").
    pub fn center_mouse(&mut self, width: f32, height: f32) {
        self.mouse_pos = (width / 2.0, height / 2.0);
    }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub reset: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            up: " ".to_string(),
            down: "Shift".to_string(),
            reset: "r".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn default() -> Self {
        Self::new(KeyBindings::default())
    }

    /// Snapshot the movement flags for this frame.
    pub fn move_input(&self, input: &InputState) -> MoveInput {
        MoveInput {
            forward: self.holds(input, &self.bindings.forward) || input.is_key_pressed("ArrowUp"),
            backward: self.holds(input, &self.bindings.backward)
                || input.is_key_pressed("ArrowDown"),
            left: self.holds(input, &self.bindings.left) || input.is_key_pressed("ArrowLeft"),
            right: self.holds(input, &self.bindings.right) || input.is_key_pressed("ArrowRight"),
            up: input.is_key_pressed(&self.bindings.up),
            down: input.is_key_pressed(&self.bindings.down),
        }
    }

    fn holds(&self, input: &InputState, key: &str) -> bool {
        input.is_key_pressed(key) || input.is_key_pressed(&key.to_uppercase())
    }

    pub fn wants_reset(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.reset)
    }

    pub fn is_escape(&self, key: &str) -> bool {
        key == self.bindings.escape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keydown_sets_and_keyup_clears_every_flag() {
        let mut state = InputState::new();
        let proc = InputProcessor::default();

        let keys = ["w", "s", "a", "d", " ", "Shift"];
        for key in keys {
            state.process_event(&InputEvent::KeyDown(key.to_string()));
        }
        let held = proc.move_input(&state);
        assert_eq!(
            held,
            MoveInput { forward: true, backward: true, left: true, right: true, up: true, down: true }
        );

        for key in keys {
            state.process_event(&InputEvent::KeyUp(key.to_string()));
        }
        assert_eq!(proc.move_input(&state), MoveInput::default());
    }

    #[test]
    fn arrow_keys_alias_wasd() {
        let mut state = InputState::new();
        let proc = InputProcessor::default();
        state.process_event(&InputEvent::KeyDown("ArrowUp".to_string()));
        state.process_event(&InputEvent::KeyDown("ArrowLeft".to_string()));
        let held = proc.move_input(&state);
        assert!(held.forward && held.left);
        assert!(!held.backward && !held.right);
    }

    #[test]
    fn look_delta_accumulates_only_while_locked() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 3.0 });
        assert_eq!(state.look_delta, (0.0, 0.0));

        state.process_event(&InputEvent::PointerLockChanged { locked: true });
        state.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 3.0 });
        state.process_event(&InputEvent::MouseMove { dx: 2.0, dy: -1.0 });
        assert_eq!(state.look_delta, (7.0, 2.0));
    }

    #[test]
    fn consume_look_resets_delta() {
        let mut state = InputState::new();
        state.pointer_locked = true;
        state.process_event(&InputEvent::MouseMove { dx: 4.0, dy: -2.0 });
        assert_eq!(state.consume_look(), (4.0, -2.0));
        assert_eq!(state.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::KeyDown("w".to_string()));
        state.process_event(&InputEvent::FocusLost);
        assert!(!state.is_key_pressed("w"));
    }

    #[test]
    fn center_mouse_recenters_tracker() {
        let mut state = InputState::new();
        state.mouse_pos = (37.0, 99.0);
        state.center_mouse(800.0, 600.0);
        assert_eq!(state.mouse_pos, (400.0, 300.0));
    }
}
