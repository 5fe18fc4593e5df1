//! Input sampling
//!
//! Platform event handlers write into an `InputSampler` whenever they fire;
//! the engine takes one `InputSnapshot` per step. Held controls and the pointer
//! are level-triggered and persist across snapshots. One-shot actions go through
//! a command queue that each snapshot drains, so every command is seen by
//! exactly one step.

use std::collections::VecDeque;

use glam::Vec2;

/// Level-triggered directional controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
}

impl Control {
    /// Map a DOM `KeyboardEvent.key` name to a control
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Control::Left),
            "ArrowRight" | "d" | "D" => Some(Control::Right),
            "ArrowUp" | "w" | "W" => Some(Control::Up),
            "ArrowDown" | "s" | "S" => Some(Control::Down),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Control::Left => 1,
            Control::Right => 1 << 1,
            Control::Up => 1 << 2,
            Control::Down => 1 << 3,
        }
    }
}

/// Set of currently held controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSet(u8);

impl ControlSet {
    pub fn insert(&mut self, control: Control) {
        self.0 |= control.bit();
    }

    pub fn remove(&mut self, control: Control) {
        self.0 &= !control.bit();
    }

    pub fn contains(&self, control: Control) -> bool {
        self.0 & control.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// -1, 0 or +1 along one axis
    pub fn axis(&self, negative: Control, positive: Control) -> f32 {
        let mut v = 0.0;
        if self.contains(negative) {
            v -= 1.0;
        }
        if self.contains(positive) {
            v += 1.0;
        }
        v
    }
}

/// Edge-triggered action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Click, tap, Space or Enter; meaning depends on the phase
    Primary { at: Option<Vec2> },
    /// Toggle pause
    Pause,
}

impl Command {
    /// Map a DOM key name to a one-shot command
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Enter" => Some(Command::Primary { at: None }),
            "Escape" | "p" | "P" => Some(Command::Pause),
            _ => None,
        }
    }
}

/// Input for exactly one simulation step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub held: ControlSet,
    /// Latest pointer position in logical canvas coordinates
    pub pointer: Option<Vec2>,
    pub commands: Vec<Command>,
}

impl InputSnapshot {
    pub fn with_commands(commands: Vec<Command>) -> Self {
        Self {
            commands,
            ..Default::default()
        }
    }
}

/// Accumulates platform input between steps
#[derive(Debug, Default)]
pub struct InputSampler {
    held: ControlSet,
    pointer: Option<Vec2>,
    queue: VecDeque<Command>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. Auto-repeat never enqueues a second command.
    pub fn key_down(&mut self, key: &str, repeat: bool) {
        if let Some(control) = Control::from_key(key) {
            self.held.insert(control);
        } else if let Some(command) = Command::from_key(key) {
            if !repeat {
                self.push(command);
            }
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(control) = Control::from_key(key) {
            self.held.remove(control);
        }
    }

    /// Pointer or touch moved, already in logical coordinates
    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    /// Click or tap
    pub fn press(&mut self, pos: Option<Vec2>) {
        if let Some(pos) = pos {
            self.pointer = Some(pos);
        }
        self.push(Command::Primary { at: pos });
    }

    /// Queue a command for the next step
    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Forget everything held, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held = ControlSet::default();
    }

    /// Drop pending commands without consuming them
    pub fn discard_commands(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the snapshot for the next step, draining queued commands
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held,
            pointer: self.pointer,
            commands: self.queue.drain(..).collect(),
        }
    }
}

/// Convert a client-space point into the canvas's logical coordinate space
pub fn to_logical(client: Vec2, rect_origin: Vec2, rect_size: Vec2, logical_size: Vec2) -> Vec2 {
    let scale = Vec2::new(
        if rect_size.x > 0.0 { logical_size.x / rect_size.x } else { 1.0 },
        if rect_size.y > 0.0 { logical_size.y / rect_size.y } else { 1.0 },
    );
    (client - rect_origin) * scale
}
