// Error types for controller construction and physics wiring

use thiserror::Error;

/// Errors surfaced while building or wiring a character controller.
///
/// Rejected transitions and exhausted abilities are not errors; they are
/// reported through boolean returns.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    /// A collaborator the state machine cannot run without was not provided
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A tunable holds a value that cannot be sanitized (NaN or infinite)
    #[error("invalid setting `{name}`: {value}")]
    InvalidSetting { name: &'static str, value: f32 },

    /// The character's rigid body or collider is not in the physics world
    #[error("character body is not registered in the physics world")]
    MissingBody,
}

pub type Result<T> = std::result::Result<T, ControllerError>;
