//! Intents the skill reacts to, already parsed by the host.

use std::{fmt, str::FromStr};

/// Transport buttons of the remote, emulated over IRCC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Stop,
    Forward,
    Rewind,
    Next,
    Previous,
}

impl PlayerCommand {
    /// Name of the button in `getRemoteControllerInfo`.
    pub fn remote_code_name(&self) -> &'static str {
        match self {
            PlayerCommand::Play => "Play",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::Stop => "Stop",
            PlayerCommand::Forward => "Forward",
            PlayerCommand::Rewind => "Rewind",
            PlayerCommand::Next => "Next",
            PlayerCommand::Previous => "Prev",
        }
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remote_code_name())
    }
}

impl FromStr for PlayerCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" | "resume" => Ok(PlayerCommand::Play),
            "pause" => Ok(PlayerCommand::Pause),
            "stop" => Ok(PlayerCommand::Stop),
            "forward" | "fast forward" => Ok(PlayerCommand::Forward),
            "rewind" => Ok(PlayerCommand::Rewind),
            "next" | "skip" => Ok(PlayerCommand::Next),
            "previous" | "prev" | "back" => Ok(PlayerCommand::Previous),
            other => Err(format!("unknown player command '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    PowerOn,
    PowerOff,
    Reboot,
    /// `amount` defaults to the configured volume step.
    VolumeUp { amount: Option<u32> },
    VolumeDown { amount: Option<u32> },
    SetVolume { level: i64 },
    CurrentVolume,
    Mute,
    Unmute,
    ToggleMute,
    OpenApp { name: String },
    Player(PlayerCommand),
    ChangeChannel { number: u32 },
    ChannelUp,
    ChannelDown,
}

/// An intent aimed at an optional, spoken device name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentRequest {
    pub intent: Intent,
    pub device: Option<String>,
}

impl IntentRequest {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            device: None,
        }
    }

    pub fn on_device(mut self, device: &str) -> Self {
        self.device = Some(device.to_string());
        self
    }
}

impl From<Intent> for IntentRequest {
    fn from(intent: Intent) -> Self {
        Self::new(intent)
    }
}
