//! GPIO collaborator interface.
//!
//! Platform crates implement this against real hardware; the controller and
//! its tests only ever talk to the trait.

use std::io;

/// Direction of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// Logic level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Error from the GPIO backend, naming the pin and the failed operation.
#[derive(Debug, thiserror::Error)]
#[error("gpio{pin}: {op}: {source}")]
pub struct GpioError {
    pub pin: u16,
    pub op: &'static str,
    #[source]
    pub source: io::Error,
}

/// Pin-level GPIO backend.
///
/// Implementations must be usable from the auto-stop thread, hence `Send`.
pub trait Gpio: Send {
    /// Whether the pin is already exported to userspace.
    fn is_exported(&self, pin: u16) -> bool;

    /// Export the pin. Only called when [`Gpio::is_exported`] reported false.
    fn export(&mut self, pin: u16) -> Result<(), GpioError>;

    /// Configure the pin direction.
    fn set_direction(&mut self, pin: u16, direction: Direction) -> Result<(), GpioError>;

    /// Drive the pin to the given level.
    fn set_value(&mut self, pin: u16, level: Level) -> Result<(), GpioError>;
}
