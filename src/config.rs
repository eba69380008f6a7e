use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILE_NAME: &str = "tmon.toml";

/// User settings, read from `~/.config/tmon.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Refresh interval in milliseconds; also the key-read timeout.
    pub interval: u64,
    /// How often the cpu sampler takes a reading, in milliseconds.
    pub cpu_interval: u64,
    /// Label of the temperature sensor to show, as printed by `sensors`.
    pub temp_sensor: String,
    pub temp_min: f32,
    pub temp_max: f32,
    /// Upper bound for external tools such as `sensors`, in milliseconds.
    pub command_timeout: u64,
    pub battery: BatteryIcons,
}

/// Icons for the battery panel in unicode mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryIcons {
    /// Shown while on external power (charging, full or idle).
    pub charging: String,
    pub discharging: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            interval: 2000,
            cpu_interval: 1000,
            temp_sensor: "Core 0".to_string(),
            temp_min: 0.0,
            temp_max: 100.0,
            command_timeout: 500,
            battery: BatteryIcons::default(),
        }
    }
}

impl Default for BatteryIcons {
    fn default() -> Self {
        BatteryIcons {
            charging: "🔌".to_string(),
            discharging: "⚡".to_string(),
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    pub fn cpu_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_interval)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid {
                key: "interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cpu_interval == 0 {
            return Err(ConfigError::Invalid {
                key: "cpu_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.temp_max > self.temp_min) {
            return Err(ConfigError::Invalid {
                key: "temp_max",
                reason: format!(
                    "must be above temp_min ({} <= {})",
                    self.temp_max, self.temp_min
                ),
            });
        }
        Ok(())
    }
}

/// `$HOME/.config/tmon.toml`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".config").join(FILE_NAME))
        .ok_or(ConfigError::NoHome)
}

/// Parses and validates config text. `path` is only used for messages.
pub fn load_from_str(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content, path)
}

/// Writes the default config to `path`, creating parent directories.
pub fn generate(path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, default_contents()).map_err(write_err)
}

fn default_contents() -> String {
    let defaults = Config::default();
    format!(
        "\
# tmon configuration

# refresh interval (ms)
interval = {}
# cpu sampling interval (ms)
cpu_interval = {}

# sensor label as shown by `sensors`
temp_sensor = {:?}
temp_min = {:.1}
temp_max = {:.1}

# upper bound for external tools (ms)
command_timeout = {}

[battery]
charging = {:?}
discharging = {:?}
",
        defaults.interval,
        defaults.cpu_interval,
        defaults.temp_sensor,
        defaults.temp_min,
        defaults.temp_max,
        defaults.command_timeout,
        defaults.battery.charging,
        defaults.battery.discharging,
    )
}

/// Loads the config.
///
/// An explicit `path` must exist. Without one the default location is used
/// and generated on first run; `on_generate` is told where.
pub fn load(
    path: Option<&Path>,
    on_generate: impl FnOnce(&Path),
) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_from_file(path);
    }

    let path = default_path()?;
    if !path.exists() {
        on_generate(&path);
        generate(&path)?;
    }
    load_from_file(&path)
}
