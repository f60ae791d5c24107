// Merges keyboard and touch events into one intent per frame.

use crate::domain::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
}

/// On-screen touch controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Shoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    KeyDown(Key),
    KeyUp(Key),
    PointerDown(Button),
    PointerUp(Button),
    Quit,
}

#[derive(Debug, Default)]
pub struct InputState {
    key_left: bool,
    key_right: bool,
    // A space press seen since the last frame. Every press counts, even one released and
    // pressed again between two frames.
    space_pressed: bool,
    touch_left: bool,
    touch_right: bool,
    touch_shoot: bool,
}

impl InputState {
    pub fn apply(&mut self, command: InputCommand) {
        match command {
            InputCommand::KeyDown(Key::Left) => self.key_left = true,
            InputCommand::KeyDown(Key::Right) => self.key_right = true,
            InputCommand::KeyDown(Key::Space) => self.space_pressed = true,
            InputCommand::KeyUp(Key::Left) => self.key_left = false,
            InputCommand::KeyUp(Key::Right) => self.key_right = false,
            InputCommand::KeyUp(Key::Space) => {}
            InputCommand::PointerDown(Button::Left) => self.touch_left = true,
            InputCommand::PointerDown(Button::Right) => self.touch_right = true,
            InputCommand::PointerDown(Button::Shoot) => self.touch_shoot = true,
            InputCommand::PointerUp(Button::Left) => self.touch_left = false,
            InputCommand::PointerUp(Button::Right) => self.touch_right = false,
            InputCommand::PointerUp(Button::Shoot) => self.touch_shoot = false,
            InputCommand::Quit => {}
        }
    }

    /// Returns the intent for the coming frame and consumes pending presses.
    pub fn next_intent(&mut self) -> Intent {
        let intent = Intent {
            left: self.key_left || self.touch_left,
            right: self.key_right || self.touch_right,
            shoot_key: self.space_pressed,
            shoot_touch: self.touch_shoot,
        };
        self.space_pressed = false;
        intent
    }
}
