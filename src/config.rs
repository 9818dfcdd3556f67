use crate::buffer::MAX_CAPACITY;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use zbus::names::WellKnownName;

pub const DEFAULT_SERVICE_NAME: &str = "io.kocd";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub dbus: DbusConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DeviceConfig {
    #[serde(default)]
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbusConfig {
    #[serde(default = "default_bus")]
    pub bus: String,
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for DbusConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            name: default_name(),
        }
    }
}

fn default_bus() -> String {
    "session".to_string()
}

fn default_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Session,
    System,
}

/// Validated settings the daemon starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub capacity: usize,
    pub bus: BusKind,
    pub name: String,
}

pub fn get_config_path() -> String {
    if let Ok(home) = std::env::var("HOME") {
        format!("{}/.config/kocd/config.toml", home)
    } else {
        "/etc/kocd/config.toml".to_string()
    }
}

/// Read and parse the TOML file at `path`. Missing files are an error.
pub fn read_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Err(format!("Config file not found: {}", path).into());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path, e))?;

    let cfg: Config = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse TOML config {}: {}", path, e))?;

    log::info!("Config loaded from: {}", path);
    Ok(cfg)
}

/// Load the config and apply command-line overrides.
///
/// With `explicit_path` unset the default location is tried, and a missing
/// file there falls back to built-in defaults.
pub fn load_config(
    explicit_path: Option<&str>,
    capacity_override: Option<usize>,
    force_system_bus: bool,
) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    let cfg = match explicit_path {
        Some(path) => read_config(path)?,
        None => {
            let path = get_config_path();
            if Path::new(&path).exists() {
                read_config(&path)?
            } else {
                log::info!("No config at {}, using defaults", path);
                Config::default()
            }
        }
    };

    let bus = if force_system_bus {
        BusKind::System
    } else {
        parse_bus(&cfg.dbus.bus)?
    };

    WellKnownName::try_from(cfg.dbus.name.as_str())
        .map_err(|e| format!("Invalid D-Bus name '{}': {}", cfg.dbus.name, e))?;

    let capacity = capacity_override.unwrap_or(cfg.device.capacity);
    if capacity > MAX_CAPACITY {
        return Err(format!(
            "Buffer capacity {} too large (maximum {})",
            capacity, MAX_CAPACITY
        )
        .into());
    }
    if capacity == 0 {
        log::warn!("Buffer capacity is 0 - every write will store nothing");
    }

    log::info!(
        "Device capacity {}, serving as '{}' on the {:?} bus",
        capacity,
        cfg.dbus.name,
        bus
    );

    Ok(ServiceConfig {
        capacity,
        bus,
        name: cfg.dbus.name,
    })
}

fn parse_bus(s: &str) -> Result<BusKind, Box<dyn std::error::Error>> {
    if s.eq_ignore_ascii_case("session") {
        Ok(BusKind::Session)
    } else if s.eq_ignore_ascii_case("system") {
        Ok(BusKind::System)
    } else {
        Err(format!("Unknown bus '{}'. Use \"session\" or \"system\"", s).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
[device]
capacity = 64

[dbus]
bus = "system"
name = "org.example.Kocd"
"#,
        );
        let cfg = load_config(file.path().to_str(), None, false).unwrap();
        assert_eq!(
            cfg,
            ServiceConfig {
                capacity: 64,
                bus: BusKind::System,
                name: "org.example.Kocd".to_string(),
            }
        );
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let file = write_config("[device]\ncapacity = 8\n");
        let cfg = load_config(file.path().to_str(), None, false).unwrap();
        assert_eq!(cfg.capacity, 8);
        assert_eq!(cfg.bus, BusKind::Session);
        assert_eq!(cfg.name, DEFAULT_SERVICE_NAME);

        let file = write_config("");
        let cfg = load_config(file.path().to_str(), None, false).unwrap();
        assert_eq!(cfg.capacity, 0);
    }

    #[test]
    fn test_overrides() {
        let file = write_config("[device]\ncapacity = 8\n");
        let cfg = load_config(file.path().to_str(), Some(128), true).unwrap();
        assert_eq!(cfg.capacity, 128);
        assert_eq!(cfg.bus, BusKind::System);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(path.to_str(), None, false).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let file = write_config("[dbus]\nbus = \"bogus\"\n");
        assert!(load_config(file.path().to_str(), None, false).is_err());

        let file = write_config("[dbus]\nname = \"nodots\"\n");
        assert!(load_config(file.path().to_str(), None, false).is_err());

        let file = write_config("[device]\ncapacity = -1\n");
        assert!(load_config(file.path().to_str(), None, false).is_err());

        let file = write_config("[device\n");
        assert!(load_config(file.path().to_str(), None, false).is_err());
    }

    fn load_with_name(name: &str) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
        let file = write_config(&format!("[dbus]\nname = \"{}\"\n", name));
        load_config(file.path().to_str(), None, false)
    }

    #[test]
    fn test_bus_names() {
        assert!(load_with_name("io.kocd").is_ok());
        assert!(load_with_name("org.example_1.Kocd-dev").is_ok());
        for bad in ["kocd", "io..kocd", "io.1kocd", ".io.kocd", "io.ko cd", ":1.42"] {
            let err = load_with_name(bad).unwrap_err();
            assert!(err.to_string().starts_with("Invalid D-Bus name"), "{}", bad);
        }
    }

    #[test]
    fn test_rejects_oversized_capacity() {
        let file = write_config("[device]\ncapacity = 8\n");
        assert!(load_config(file.path().to_str(), Some(usize::MAX), false).is_err());
        assert!(load_config(file.path().to_str(), Some(MAX_CAPACITY + 1), false).is_err());

        let file = write_config("[device]\ncapacity = 9223372036854775807\n");
        let err = load_config(file.path().to_str(), None, false).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
