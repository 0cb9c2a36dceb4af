// Platformer cube controller: movement state machine, jump/dash abilities and
// ground/wall/slope probing on top of rapier2d

pub mod core;
pub mod engine;
pub mod error;
pub mod game;
