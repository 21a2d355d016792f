//! Dialog requests handed back to the host for rendering.

use std::{collections::BTreeMap, fmt};

pub const NO_CLIENT: &str = "no.client";
pub const DEVICE_UNREACHABLE: &str = "device.unreachable";
pub const POWER_ON: &str = "power.on";
pub const POWER_OFF: &str = "power.off";
pub const ALREADY_ON: &str = "already.on";
pub const ALREADY_OFF: &str = "already.off";
pub const REBOOT: &str = "reboot";
pub const VOLUME_SET: &str = "volume.set";
pub const VOLUME_CURRENT: &str = "volume.current";
pub const MUTED: &str = "muted";
pub const UNMUTED: &str = "unmuted";
pub const APP_OPENED: &str = "app.opened";
pub const NO_MATCHING_APP: &str = "no.matching.app";
pub const COMMAND_SENT: &str = "command.sent";
pub const COMMAND_UNKNOWN: &str = "command.unknown";
pub const COMMAND_FAILED: &str = "command.failed";
pub const CHANNEL_CHANGED: &str = "change.channel";

/// Name of a dialog file plus the values to substitute into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub name: &'static str,
    pub data: BTreeMap<&'static str, String>,
}

impl Dialog {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.data.insert(key, value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.data.is_empty() {
            let pairs: Vec<String> = self.data.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        Ok(())
    }
}
