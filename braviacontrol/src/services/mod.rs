//! Secondary web API calls.
//!
//! Thin wrappers returning the raw `result` array; callers pick what they
//! need from it.

mod app_control;
mod audio;
mod av_content;
mod system;

use serde_json::{Value, json};

use crate::{client::Client, errors::BraviaError, rpc};

impl Client {
    /// Lists the methods each of `services` supports.
    pub fn supported_api_info(&self, services: &[&str]) -> Result<Value, BraviaError> {
        self.query(
            &rpc::GET_SUPPORTED_API_INFO,
            vec![json!({ "services": services })],
        )
    }

    pub fn public_key(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_PUBLIC_KEY, Vec::new())
    }

    pub fn set_scene_setting(&self, scene: &str) -> Result<(), BraviaError> {
        self.command(&rpc::SET_SCENE_SETTING, vec![json!({ "value": scene })])
    }
}
