//! JSON configuration loading and the schema version gate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// Default location of the buzzer config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/buzzer-control.json";

/// Schema version this build understands. The patch component is ignored.
pub const SUPPORTED_VERSION: &str = "1.0.*";

/// Settings extracted from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub gpio_pin: u16,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "CONFIG_VERSION")]
    version: String,
    #[serde(rename = "GPIO_NUM")]
    gpio_num: u16,
}

/// Reads and validates the JSON config file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the config, enforcing the schema version gate.
    pub fn load(&self) -> Result<Config, Error> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("load file {}: {e}", self.path.display())))?;
        parse(&text)
    }
}

fn parse(text: &str) -> Result<Config, Error> {
    let raw: RawConfig = serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
    check_version_supported(&raw.version)?;
    Ok(Config {
        gpio_pin: raw.gpio_num,
    })
}

/// Major and minor must match [`SUPPORTED_VERSION`] exactly.
fn check_version_supported(version: &str) -> Result<(), Error> {
    let loaded = major_minor(version)?;
    let supported = major_minor(SUPPORTED_VERSION)?;
    if loaded != supported {
        return Err(Error::UnsupportedVersion {
            required: SUPPORTED_VERSION,
        });
    }
    Ok(())
}

fn major_minor(version: &str) -> Result<(u32, u32), Error> {
    let mut parts = version.splitn(3, '.');
    let major = parts.next().and_then(|p| p.parse().ok());
    let minor = parts.next().and_then(|p| p.parse().ok());
    match (major, minor) {
        (Some(major), Some(minor)) => Ok((major, minor)),
        _ => Err(Error::System(format!("malformed version string: {version}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::process;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn write_config(contents: &str) -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let n = SEQ.fetch_add(1, Ordering::Relaxed);
        let path = env::temp_dir().join(format!("buzzer-config-test-{}-{n}.json", process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_pin_when_version_matches() {
        let path = write_config(r#"{ "CONFIG_VERSION": "1.0.5", "GPIO_NUM": 18 }"#);
        let config = ConfigLoader::new(path).load().unwrap();
        assert_eq!(config, Config { gpio_pin: 18 });
    }

    #[test]
    fn rejects_minor_version_mismatch() {
        let result = parse(r#"{ "CONFIG_VERSION": "1.1.0", "GPIO_NUM": 18 }"#);
        assert!(matches!(
            result,
            Err(Error::UnsupportedVersion { required: "1.0.*" })
        ));
    }

    #[test]
    fn rejects_major_version_mismatch() {
        let result = parse(r#"{ "CONFIG_VERSION": "2.0.0", "GPIO_NUM": 18 }"#);
        assert!(matches!(result, Err(Error::UnsupportedVersion { .. })));
    }

    #[test]
    fn missing_version_is_a_config_error() {
        let result = parse(r#"{ "GPIO_NUM": 18 }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_pin_is_a_config_error() {
        let result = parse(r#"{ "CONFIG_VERSION": "1.0.0" }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = parse("{ not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn unparsable_version_is_a_system_error() {
        let result = parse(r#"{ "CONFIG_VERSION": "one.zero.0", "GPIO_NUM": 18 }"#);
        assert!(matches!(result, Err(Error::System(_))));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let loader = ConfigLoader::new("/nonexistent/buzzer-control.json");
        assert!(matches!(loader.load(), Err(Error::Config(_))));
    }
}
