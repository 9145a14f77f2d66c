//! Library error taxonomy.

use crate::gpio::GpioError;

/// Errors returned by the config loader and the buzzer controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file missing, unreadable, unparsable, or lacking a field.
    #[error("config: {0}")]
    Config(String),

    /// Config schema version does not match the supported MAJOR.MINOR.
    #[error("config version not supported, need to be {required}")]
    UnsupportedVersion { required: &'static str },

    /// Underlying OS or library call failure.
    #[error("system: {0}")]
    System(String),

    /// Operation invoked before a successful init.
    #[error("buzzer is not initialized")]
    NotInitialized,

    /// Play requested while a play session is already active.
    #[error("buzzer is already playing")]
    AlreadyPlaying,

    /// Requested duration exceeds the allowed bound.
    #[error("duration out of range: {0}")]
    InvalidDuration(u64),

    /// Propagated unchanged from the GPIO backend.
    #[error(transparent)]
    Gpio(#[from] GpioError),
}
