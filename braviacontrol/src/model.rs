use serde::{Deserialize, Serialize};

/// Connection parameters for one television.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub name: String,
    pub ip: String,
    pub port: u16,
    /// Pre-shared key; `None` sends unauthenticated requests.
    pub access_key: Option<String>,
}

impl DeviceSettings {
    pub fn new(name: &str, ip: &str) -> Self {
        Self {
            name: name.to_string(),
            ip: ip.to_string(),
            port: DEFAULT_PORT,
            access_key: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_access_key(mut self, key: &str) -> Self {
        self.access_key = Some(key.to_string()).filter(|k| !k.is_empty());
        self
    }
}

pub const DEFAULT_PORT: u16 = 80;

/// Entry of `getApplicationList`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub title: String,
    pub uri: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Entry of `getRemoteControllerInfo`: a button name and its IRCC code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCode {
    pub name: String,
    pub value: String,
}

/// One output of `getVolumeInformation` (speaker, headphone, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInformation {
    #[serde(default)]
    pub target: String,
    pub volume: i64,
    pub mute: bool,
    pub min_volume: i64,
    pub max_volume: i64,
}

impl VolumeInformation {
    /// Clamps `value` into `[min_volume, max_volume]`.
    pub fn clamp(&self, value: i64) -> i64 {
        value.max(self.min_volume).min(self.max_volume)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PowerStatus {
    pub status: String,
}

impl PowerStatus {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
