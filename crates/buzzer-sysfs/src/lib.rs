//! Linux sysfs GPIO backend.
//!
//! Drives pins through the `/sys/class/gpio` class interface: a pin is
//! exported by writing its number to `export`, after which its attributes
//! live under `gpio<N>/`.

use std::fs;
use std::path::{Path, PathBuf};

use buzzer_core::gpio::{Direction, Gpio, GpioError, Level};

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// GPIO backend over the sysfs class interface.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Backend rooted at an alternate directory. Used by tests.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn pin_dir(&self, pin: u16) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn write_attr(
        &self,
        path: &Path,
        pin: u16,
        op: &'static str,
        contents: &str,
    ) -> Result<(), GpioError> {
        log::trace!("gpio{pin}: {op}: writing {contents:?} to {}", path.display());
        fs::write(path, contents).map_err(|source| GpioError { pin, op, source })
    }
}

impl Gpio for SysfsGpio {
    fn is_exported(&self, pin: u16) -> bool {
        self.pin_dir(pin).exists()
    }

    fn export(&mut self, pin: u16) -> Result<(), GpioError> {
        self.write_attr(&self.root.join("export"), pin, "export", &pin.to_string())
    }

    fn set_direction(&mut self, pin: u16, direction: Direction) -> Result<(), GpioError> {
        let value = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        self.write_attr(&self.pin_dir(pin).join("direction"), pin, "set_direction", value)
    }

    fn set_value(&mut self, pin: u16, level: Level) -> Result<(), GpioError> {
        let value = match level {
            Level::Low => "0",
            Level::High => "1",
        };
        self.write_attr(&self.pin_dir(pin).join("value"), pin, "set_value", value)
    }
}
