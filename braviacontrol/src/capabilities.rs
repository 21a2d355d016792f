// braviacontrol/src/capabilities.rs
use crate::{
    client::{Client, CommandOutcome},
    errors::BraviaError,
};

/// Power switching, independent of how the device is reached.
pub trait PowerControl {
    fn is_on(&self) -> Result<bool, BraviaError>;

    fn power_on(&self) -> Result<(), BraviaError>;

    fn power_off(&self) -> Result<(), BraviaError>;
}

/// Volume and mute.
///
/// Reads take `&mut self` because the client refreshes its last-known
/// volume on every read.
pub trait VolumeControl {
    /// Current volume on the device's own scale.
    fn volume(&mut self) -> Result<i64, BraviaError>;

    /// Sets the volume, clamped to what the device accepts. Returns the
    /// value sent.
    fn set_volume(&mut self, v: i64) -> Result<i64, BraviaError>;

    fn muted(&mut self) -> Result<bool, BraviaError>;

    fn set_mute(&mut self, m: bool) -> Result<(), BraviaError>;
}

/// Remote-control button emulation.
pub trait RemoteControl {
    fn press(&self, button: &str) -> CommandOutcome;

    fn has_button(&self, button: &str) -> bool;
}

impl PowerControl for Client {
    fn is_on(&self) -> Result<bool, BraviaError> {
        Client::is_on(self)
    }

    fn power_on(&self) -> Result<(), BraviaError> {
        Client::power_on(self)
    }

    fn power_off(&self) -> Result<(), BraviaError> {
        Client::power_off(self)
    }
}

impl VolumeControl for Client {
    fn volume(&mut self) -> Result<i64, BraviaError> {
        Client::volume(self)
    }

    fn set_volume(&mut self, v: i64) -> Result<i64, BraviaError> {
        Client::set_volume(self, v)
    }

    fn muted(&mut self) -> Result<bool, BraviaError> {
        Client::muted(self)
    }

    fn set_mute(&mut self, m: bool) -> Result<(), BraviaError> {
        if m { self.mute() } else { self.unmute() }
    }
}

impl RemoteControl for Client {
    fn press(&self, button: &str) -> CommandOutcome {
        self.send_command(button)
    }

    fn has_button(&self, button: &str) -> bool {
        self.command_code(button).is_some()
    }
}
