//! Platform abstraction layer
//!
//! Turns whatever the host delivers (key names, gamepad buttons, a script)
//! into held actions, and held actions into per-tick input.

pub mod input;

pub use input::{ActionSet, EdgeDetector, InputProvider, ScriptedInput};
