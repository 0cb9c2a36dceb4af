// Engine-independent building blocks

pub mod math;
pub mod timer;

pub use timer::{Timer, TimerState};
