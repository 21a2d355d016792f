use serde_json::{Value, json};

use crate::{client::Client, errors::BraviaError, rpc};

impl Client {
    /// `target` empty means every setting.
    pub fn sound_settings(&self, target: &str) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SOUND_SETTINGS, vec![json!({ "target": target })])
    }

    pub fn speaker_settings(&self, target: &str) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SPEAKER_SETTINGS, vec![json!({ "target": target })])
    }

    /// `settings` is the `[{target, value}]` list the device expects.
    pub fn set_sound_settings(&self, settings: Value) -> Result<(), BraviaError> {
        self.command(
            &rpc::SET_SOUND_SETTINGS,
            vec![json!({ "settings": settings })],
        )
    }

    pub fn set_speaker_settings(&self, settings: Value) -> Result<(), BraviaError> {
        self.command(
            &rpc::SET_SPEAKER_SETTINGS,
            vec![json!({ "settings": settings })],
        )
    }
}
