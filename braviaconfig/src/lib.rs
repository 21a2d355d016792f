//! # Bravia skill configuration
//!
//! This module loads the skill settings:
//! - Embedded default configuration (`bravia.yaml`)
//! - Merged with `config.yaml` from the configuration directory
//! - Environment variable overrides (`BRAVIA_CONFIG__BRAVIA__VOLUME_STEP=10`)
//! - Validated into a typed [`SkillSettings`]
//!
//! ## Usage
//!
//! ```no_run
//! use braviaconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let settings = config.skill_settings()?;
//! for device in &settings.devices {
//!     println!("{} at {}:{}", device.name, device.ip, device.port);
//! }
//! # Ok::<(), braviaconfig::ConfigError>(())
//! ```
//!
//! The configuration file is only read. Persisting settings belongs to the
//! host runtime.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use braviacontrol::{DEFAULT_PORT, DeviceSettings};
use dirs::home_dir;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("bravia.yaml");

const ENV_CONFIG_DIR: &str = "BRAVIA_CONFIG";
const ENV_PREFIX: &str = "BRAVIA_CONFIG__";
const CONFIG_FILE: &str = "config.yaml";
const DOT_DIR: &str = ".bravia";

pub const DEFAULT_VOLUME_STEP: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(String, std::io::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Path {0} does not exist")]
    MissingKey(String),
    #[error("Device '{0}' has no IP address")]
    MissingAddress(String),
    #[error("Device '{device}' has an invalid port: {value}")]
    InvalidPort { device: String, value: String },
    #[error("Invalid volume step: {0}")]
    InvalidVolumeStep(String),
}

/// Validated settings of the skill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillSettings {
    /// Televisions in configuration order; the first one is the default.
    pub devices: Vec<DeviceSettings>,
    pub volume_step: u32,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            volume_step: DEFAULT_VOLUME_STEP,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    volume_step: Option<Value>,
    #[serde(default)]
    tv_name: Option<String>,
    #[serde(default)]
    tv_ip: Option<String>,
    #[serde(default)]
    tv_port: Option<Value>,
    #[serde(default)]
    tv_key: Option<Value>,
    // `devices:` left empty reads as null
    #[serde(default)]
    devices: Option<Vec<RawDevice>>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    port: Option<Value>,
    #[serde(default)]
    access_key: Option<Value>,
}

/// Merged configuration tree.
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: Option<PathBuf>,
    data: Value,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> Option<PathBuf> {
        // 1. Try provided directory
        if !directory.is_empty() {
            return Some(PathBuf::from(directory));
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        // 3. Try current directory
        if Path::new(DOT_DIR).is_dir() {
            return Some(PathBuf::from(DOT_DIR));
        }

        // 4. Try home directory
        home_dir()
            .map(|home| home.join(DOT_DIR))
            .filter(|dir| dir.is_dir())
    }

    /// Loads the configuration.
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `BRAVIA_CONFIG` environment variable
    /// 3. `.bravia` in the current directory
    /// 4. `.bravia` in the user's home directory
    ///
    /// A missing directory or `config.yaml` is not an error: the embedded
    /// defaults are used. Environment overrides are applied last.
    pub fn load_config(directory: &str) -> Result<Self, ConfigError> {
        let config_dir = Self::find_config_dir(directory);

        let external = match &config_dir {
            Some(dir) => {
                let path = dir.join(CONFIG_FILE);
                match fs::read_to_string(&path) {
                    Ok(data) => {
                        info!(config_file = %path.display(), "Loaded config file");
                        Some(data)
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        info!(config_file = %path.display(), "Config file not found, using default embedded config");
                        None
                    }
                    Err(err) => return Err(ConfigError::Io(path.display().to_string(), err)),
                }
            }
            None => {
                info!("No config directory found, using default embedded config");
                None
            }
        };

        let mut config = Self::from_sources(external.as_deref(), env::vars())?;
        config.config_dir = config_dir;
        Ok(config)
    }

    /// Builds a configuration from an optional YAML document and a set of
    /// `BRAVIA_CONFIG__*` variables.
    pub fn from_sources<I>(external: Option<&str>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut data = lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);

        if let Some(yaml) = external {
            let external_value: Value = serde_yaml::from_str(yaml)?;
            // Un fichier vide se lit comme Null
            if !external_value.is_null() {
                merge_yaml(&mut data, &lower_keys_value(external_value));
            }
        }

        apply_env_overrides(&mut data, vars);

        Ok(Config {
            config_dir: None,
            data,
        })
    }

    /// Directory the configuration was read from, if any.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["bravia", "volume_step"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<&Value, ConfigError> {
        let mut current = &self.data;
        for (i, key) in path.iter().enumerate() {
            current = match current {
                Value::Mapping(map) => map
                    .get(Value::String(key.to_lowercase()))
                    .ok_or_else(|| ConfigError::MissingKey(path[..=i].join(".")))?,
                _ => return Err(ConfigError::MissingKey(path[..=i].join("."))),
            };
        }
        Ok(current)
    }

    /// Validates the `bravia` section into typed settings.
    pub fn skill_settings(&self) -> Result<SkillSettings, ConfigError> {
        let raw: RawSettings = serde_yaml::from_value(self.get_value(&["bravia"])?.clone())?;

        let volume_step = parse_volume_step(raw.volume_step.as_ref())?;

        let raw_devices = raw.devices.unwrap_or_default();
        let mut devices = Vec::with_capacity(raw_devices.len().max(1));
        for (index, device) in raw_devices.into_iter().enumerate() {
            devices.push(device_settings(
                device.name.as_deref(),
                device.ip.as_deref(),
                device.port.as_ref(),
                scalar_string(device.access_key.as_ref()).as_deref(),
                index,
            )?);
        }

        // Raccourci mono-téléviseur
        if devices.is_empty() {
            if let Some(ip) = raw.tv_ip.as_deref().filter(|ip| !ip.trim().is_empty()) {
                devices.push(device_settings(
                    raw.tv_name.as_deref(),
                    Some(ip),
                    raw.tv_port.as_ref(),
                    scalar_string(raw.tv_key.as_ref()).as_deref(),
                    0,
                )?);
            }
        }

        debug!(devices = devices.len(), volume_step, "Skill settings validated");
        Ok(SkillSettings {
            devices,
            volume_step,
        })
    }
}

fn device_settings(
    name: Option<&str>,
    ip: Option<&str>,
    port: Option<&Value>,
    access_key: Option<&str>,
    index: usize,
) -> Result<DeviceSettings, ConfigError> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let ip = ip.map(str::trim).filter(|ip| !ip.is_empty());

    let ip = match ip {
        Some(ip) => ip,
        None => {
            let label = name
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index + 1));
            return Err(ConfigError::MissingAddress(label));
        }
    };
    let name = name.unwrap_or(ip);
    let port = parse_port(name, port)?;

    let settings = DeviceSettings::new(name, ip).with_port(port);
    Ok(match access_key {
        Some(key) => settings.with_access_key(key.trim()),
        None => settings,
    })
}

// `access_key: 0000` arrives as a number
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_port(device: &str, value: Option<&Value>) -> Result<u16, ConfigError> {
    let invalid = |shown: String| ConfigError::InvalidPort {
        device: device.to_string(),
        value: shown,
    };

    match value {
        None | Some(Value::Null) => Ok(DEFAULT_PORT),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p != 0)
            .ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| invalid(s.clone())),
        Some(other) => Err(invalid(format!("{other:?}"))),
    }
}

fn parse_volume_step(value: Option<&Value>) -> Result<u32, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_VOLUME_STEP),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|s| u32::try_from(s).ok())
            .filter(|s| *s != 0)
            .ok_or_else(|| ConfigError::InvalidVolumeStep(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|s| *s != 0)
            .ok_or_else(|| ConfigError::InvalidVolumeStep(s.clone())),
        Some(other) => Err(ConfigError::InvalidVolumeStep(format!("{other:?}"))),
    }
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped
                .split("__")
                .map(str::to_lowercase)
                .collect::<Vec<_>>();
            debug!(key = %key, "Applying environment override");
            set_value_internal(config, &key_path, convert_env_value(&value));
        }
    }
}

fn set_value_internal(data: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *data = value;
        return;
    }
    if !data.is_mapping() {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].clone());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map
                .entry(key)
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value);
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from external are merged into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn defaults_have_no_device_and_step_five() {
        let settings = Config::from_sources(None, no_env())
            .unwrap()
            .skill_settings()
            .unwrap();
        assert_eq!(settings, SkillSettings::default());
    }

    #[test]
    fn devices_keep_configuration_order() {
        let yaml = r#"
Bravia:
  Volume_Step: 3
  devices:
    - name: Living Room
      ip: 10.0.0.5
      access_key: 1234
    - name: Bedroom
      ip: 10.0.0.6
      port: "8080"
"#;
        let settings = Config::from_sources(Some(yaml), no_env())
            .unwrap()
            .skill_settings()
            .unwrap();

        assert_eq!(settings.volume_step, 3);
        assert_eq!(
            settings.devices,
            vec![
                DeviceSettings::new("Living Room", "10.0.0.5").with_access_key("1234"),
                DeviceSettings::new("Bedroom", "10.0.0.6").with_port(8080),
            ]
        );
    }

    #[test]
    fn single_tv_shortcut_applies_without_device_list() {
        let yaml = "bravia:\n  tv_ip: 192.168.1.20\n  tv_key: secret\n";
        let settings = Config::from_sources(Some(yaml), no_env())
            .unwrap()
            .skill_settings()
            .unwrap();
        assert_eq!(
            settings.devices,
            vec![DeviceSettings::new("TV", "192.168.1.20").with_access_key("secret")]
        );
    }

    #[test]
    fn shortcut_is_ignored_when_devices_are_listed() {
        let yaml = r#"
bravia:
  tv_ip: 192.168.1.20
  devices:
    - name: Den
      ip: 10.0.0.7
"#;
        let settings = Config::from_sources(Some(yaml), no_env())
            .unwrap()
            .skill_settings()
            .unwrap();
        assert_eq!(settings.devices.len(), 1);
        assert_eq!(settings.devices[0].name, "Den");
    }

    #[test]
    fn empty_device_key_is_accepted() {
        let yaml = "bravia:\n  devices:\n  tv_ip: 10.0.0.9\n";
        let settings = Config::from_sources(Some(yaml), no_env())
            .unwrap()
            .skill_settings()
            .unwrap();
        assert_eq!(settings.devices[0].ip, "10.0.0.9");
    }

    #[test]
    fn device_without_ip_is_rejected() {
        let yaml = "bravia:\n  devices:\n    - name: Kitchen\n";
        let err = Config::from_sources(Some(yaml), no_env())
            .unwrap()
            .skill_settings()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAddress(name) if name == "Kitchen"));
    }

    #[test]
    fn invalid_ports_are_rejected() {
        for port in ["0", "70000", "\"http\"", "-1"] {
            let yaml = format!("bravia:\n  devices:\n    - name: Den\n      ip: 10.0.0.7\n      port: {port}\n");
            let err = Config::from_sources(Some(&yaml), no_env())
                .unwrap()
                .skill_settings()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPort { ref device, .. } if device == "Den"),
                "port {port} gave {err:?}"
            );
        }
    }

    #[test]
    fn zero_volume_step_is_rejected() {
        let err = Config::from_sources(Some("bravia:\n  volume_step: 0\n"), no_env())
            .unwrap()
            .skill_settings()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVolumeStep(_)));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let vars = vec![
            ("BRAVIA_CONFIG__BRAVIA__VOLUME_STEP".to_string(), "10".to_string()),
            ("BRAVIA_CONFIG__BRAVIA__TV_IP".to_string(), "10.1.1.1".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        let settings = Config::from_sources(Some("bravia:\n  volume_step: 2\n"), vars)
            .unwrap()
            .skill_settings()
            .unwrap();
        assert_eq!(settings.volume_step, 10);
        assert_eq!(settings.devices[0].ip, "10.1.1.1");
    }

    #[test]
    fn get_value_reports_missing_path() {
        let config = Config::from_sources(None, no_env()).unwrap();
        assert!(config.get_value(&["bravia", "volume_step"]).is_ok());
        match config.get_value(&["bravia", "nope", "deeper"]) {
            Err(ConfigError::MissingKey(path)) => assert_eq!(path, "bravia.nope"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_config_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "bravia:\n  devices:\n    - name: Office\n      ip: 10.0.0.8\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.config_dir(), Some(dir.path()));
        let settings = config.skill_settings().unwrap();
        assert_eq!(settings.devices[0].name, "Office");
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(
            config.get_value(&["bravia", "tv_port"]).unwrap(),
            &Value::from(80)
        );
    }
}
