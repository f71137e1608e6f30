//! Input handling
//!
//! Hosts report which actions are held. The simulation needs edges for jump,
//! dash and pause (one per physical press), so [`EdgeDetector`] compares each
//! poll with the previous one.

use std::collections::VecDeque;

use crate::sim::TickInput;

bitflags::bitflags! {
    /// Set of currently held actions
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ActionSet: u8 {
        const MOVE_LEFT  = 1 << 0;
        const MOVE_RIGHT = 1 << 1;
        const JUMP       = 1 << 2;
        const DASH       = 1 << 3;
        const PAUSE      = 1 << 4;
    }
}

impl ActionSet {
    /// Map a DOM-style key code to the action it drives
    pub fn from_key(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Self::MOVE_LEFT),
            "ArrowRight" | "KeyD" => Some(Self::MOVE_RIGHT),
            "Space" | "ArrowUp" | "KeyW" => Some(Self::JUMP),
            "ShiftLeft" | "ShiftRight" | "KeyZ" => Some(Self::DASH),
            "Escape" => Some(Self::PAUSE),
            _ => None,
        }
    }
}

/// Converts held actions into tick input with one-shot edges
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    prev: ActionSet,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, held: ActionSet) -> TickInput {
        let pressed = held.difference(self.prev);
        self.prev = held;
        TickInput {
            move_left: held.contains(ActionSet::MOVE_LEFT),
            move_right: held.contains(ActionSet::MOVE_RIGHT),
            jump: pressed.contains(ActionSet::JUMP),
            dash: pressed.contains(ActionSet::DASH),
            pause: pressed.contains(ActionSet::PAUSE),
        }
    }

    /// Forget held state, e.g. after focus loss
    pub fn reset(&mut self) {
        self.prev = ActionSet::empty();
    }
}

/// Source of held actions, polled once per frame
pub trait InputProvider {
    fn poll(&mut self) -> ActionSet;
}

impl<F> InputProvider for F
where
    F: FnMut() -> ActionSet,
{
    fn poll(&mut self) -> ActionSet {
        self()
    }
}

/// Replays a fixed sequence of held-action frames, then holds nothing
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<ActionSet>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `held` for `frames` polls
    pub fn hold(mut self, held: ActionSet, frames: usize) -> Self {
        self.frames.extend(std::iter::repeat_n(held, frames));
        self
    }

    /// Hold nothing for `frames` polls
    pub fn idle(self, frames: usize) -> Self {
        self.hold(ActionSet::empty(), frames)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputProvider for ScriptedInput {
    fn poll(&mut self) -> ActionSet {
        self.frames.pop_front().unwrap_or_default()
    }
}
