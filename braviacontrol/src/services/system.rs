use serde_json::{Value, json};

use crate::{client::Client, errors::BraviaError, rpc};

impl Client {
    pub fn current_time(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_CURRENT_TIME, Vec::new())
    }

    pub fn interface_information(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_INTERFACE_INFORMATION, Vec::new())
    }

    pub fn led_indicator_status(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_LED_INDICATOR_STATUS, Vec::new())
    }

    /// `netif` empty means every interface.
    pub fn network_settings(&self, netif: &str) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_NETWORK_SETTINGS, vec![json!({ "netif": netif })])
    }

    pub fn power_saving_mode(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_POWER_SAVING_MODE, Vec::new())
    }

    pub fn remote_device_settings(&self, target: &str) -> Result<Value, BraviaError> {
        self.query(
            &rpc::GET_REMOTE_DEVICE_SETTINGS,
            vec![json!({ "target": target })],
        )
    }

    pub fn system_information(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SYSTEM_INFORMATION, Vec::new())
    }

    pub fn system_supported_function(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SYSTEM_SUPPORTED_FUNCTION, Vec::new())
    }

    pub fn wol_mode(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_WOL_MODE, Vec::new())
    }

    pub fn set_led_indicator_status(&self, mode: &str, status: &str) -> Result<(), BraviaError> {
        self.command(
            &rpc::SET_LED_INDICATOR_STATUS,
            vec![json!({ "mode": mode, "status": status })],
        )
    }

    pub fn set_language(&self, language: &str) -> Result<(), BraviaError> {
        self.command(&rpc::SET_LANGUAGE, vec![json!({ "language": language })])
    }

    pub fn set_power_saving_mode(&self, mode: &str) -> Result<(), BraviaError> {
        self.command(&rpc::SET_POWER_SAVING_MODE, vec![json!({ "mode": mode })])
    }

    pub fn set_wol_mode(&self, enabled: bool) -> Result<(), BraviaError> {
        self.command(&rpc::SET_WOL_MODE, vec![json!({ "enabled": enabled })])
    }
}
