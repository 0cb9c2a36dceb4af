// Game layer: the character controller and the level that hosts it

pub mod characters;
pub mod level;

pub use level::Level;
