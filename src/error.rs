use std::path::PathBuf;
use thiserror::Error;

pub const FILE_NOT_FOUND: i32 = 2;
pub const BAD_FILE_FORMAT: i32 = 3;
pub const UNKNOWN_COMPONENT: i32 = 4;
pub const REPEAT_NAME: i32 = 5;
pub const UNKNOWN_COMPONENT_TYPE: i32 = 6;
pub const UNKNOWN_USER_COMMAND: i32 = 7;
pub const UNSWITCHABLE_COMPONENT: i32 = 8;

/// Errors surfaced by the loader, the circuit and the command session.
///
/// Breaker trips are not errors: they are reported as
/// [`CircuitEvent::Blown`](crate::domain::CircuitEvent::Blown).
#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("Circuit file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read circuit file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error in circuit file (line {line}): {reason}")]
    BadFileFormat { line: usize, reason: String },

    #[error("Malformed command: {0}")]
    BadCommand(String),

    #[error("Reference to unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component name repeated: {0}")]
    RepeatName(String),

    #[error("Reference to unknown type of component: {0}")]
    UnknownComponentType(String),

    #[error("Unknown user command: {0}")]
    UnknownUserCommand(String),

    #[error("Component {0} is not switchable")]
    UnswitchableComponent(String),
}

impl CircuitError {
    /// Stable numeric code, also used as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            CircuitError::FileNotFound(_) => FILE_NOT_FOUND,
            CircuitError::Io { .. }
            | CircuitError::BadFileFormat { .. }
            | CircuitError::BadCommand(_) => BAD_FILE_FORMAT,
            CircuitError::UnknownComponent(_) => UNKNOWN_COMPONENT,
            CircuitError::RepeatName(_) => REPEAT_NAME,
            CircuitError::UnknownComponentType(_) => UNKNOWN_COMPONENT_TYPE,
            CircuitError::UnknownUserCommand(_) => UNKNOWN_USER_COMMAND,
            CircuitError::UnswitchableComponent(_) => UNSWITCHABLE_COMPONENT,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            CircuitError::FileNotFound(_) => "FileNotFound",
            CircuitError::Io { .. } => "Io",
            CircuitError::BadFileFormat { .. } => "BadFileFormat",
            CircuitError::BadCommand(_) => "BadCommand",
            CircuitError::UnknownComponent(_) => "UnknownComponent",
            CircuitError::RepeatName(_) => "RepeatName",
            CircuitError::UnknownComponentType(_) => "UnknownComponentType",
            CircuitError::UnknownUserCommand(_) => "UnknownUserCommand",
            CircuitError::UnswitchableComponent(_) => "UnswitchableComponent",
        }
    }

    /// Topology errors come from the circuit file (or `connect`); the rest are usage errors.
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            CircuitError::UnknownComponent(_)
                | CircuitError::RepeatName(_)
                | CircuitError::UnknownComponentType(_)
        )
    }

    pub(crate) fn bad_format(line: usize, reason: impl Into<String>) -> Self {
        CircuitError::BadFileFormat {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = CircuitError> = std::result::Result<T, E>;
