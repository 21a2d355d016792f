//! JSON-RPC envelope used by the Bravia REST API.
//!
//! Every call is a POST of `{method, id, params, version}` to
//! `/sony/<service>`. The `id` is taken from the block reserved for the
//! service and only documents which call was made; the device echoes it
//! back but nothing correlates on it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BraviaError;

/// One of the web API services exposed under `/sony/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    Guide,
    AppControl,
    Audio,
    AvContent,
    Encryption,
    System,
    VideoScreen,
}

impl Service {
    /// Path segment appended to the client's base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Service::Guide => "guide",
            Service::AppControl => "appControl",
            Service::Audio => "audio",
            Service::AvContent => "avContent",
            Service::Encryption => "encryption",
            Service::System => "system",
            Service::VideoScreen => "videoScreen",
        }
    }

    /// First id of the block reserved for this service (1xx, 2xx, ...).
    pub fn id_block(&self) -> u32 {
        match self {
            Service::Guide => 100,
            Service::AppControl => 200,
            Service::Audio => 300,
            Service::AvContent => 400,
            Service::Encryption => 500,
            Service::System => 600,
            Service::VideoScreen => 700,
        }
    }
}

/// Static description of a remote method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RpcMethod {
    pub service: Service,
    pub name: &'static str,
    pub id: u32,
    pub version: &'static str,
}

impl RpcMethod {
    pub const fn new(
        service: Service,
        name: &'static str,
        id: u32,
        version: &'static str,
    ) -> Self {
        Self {
            service,
            name,
            id,
            version,
        }
    }

    /// Builds the request body for this method.
    pub fn request(&self, params: Vec<Value>) -> RpcRequest<'_> {
        RpcRequest {
            method: self.name,
            id: self.id,
            params,
            version: self.version,
        }
    }
}

// guide
pub const GET_SUPPORTED_API_INFO: RpcMethod =
    RpcMethod::new(Service::Guide, "getSupportedApiInfo", 101, "1.0");

// appControl
pub const GET_APPLICATION_LIST: RpcMethod =
    RpcMethod::new(Service::AppControl, "getApplicationList", 201, "1.0");
pub const GET_APPLICATION_STATUS_LIST: RpcMethod =
    RpcMethod::new(Service::AppControl, "getApplicationStatusList", 202, "1.0");
pub const GET_TEXT_FORM: RpcMethod = RpcMethod::new(Service::AppControl, "getTextForm", 203, "1.1");
pub const GET_WEB_APP_STATUS: RpcMethod =
    RpcMethod::new(Service::AppControl, "getWebAppStatus", 204, "1.0");
pub const SET_ACTIVE_APP: RpcMethod =
    RpcMethod::new(Service::AppControl, "setActiveApp", 205, "1.0");
pub const SET_TEXT_FORM: RpcMethod = RpcMethod::new(Service::AppControl, "setTextForm", 206, "1.1");
pub const TERMINATE_APPS: RpcMethod =
    RpcMethod::new(Service::AppControl, "terminateApps", 207, "1.0");

// audio
pub const GET_SOUND_SETTINGS: RpcMethod =
    RpcMethod::new(Service::Audio, "getSoundSettings", 301, "1.1");
pub const GET_SPEAKER_SETTINGS: RpcMethod =
    RpcMethod::new(Service::Audio, "getSpeakerSettings", 302, "1.0");
pub const GET_VOLUME_INFORMATION: RpcMethod =
    RpcMethod::new(Service::Audio, "getVolumeInformation", 303, "1.0");
pub const SET_AUDIO_MUTE: RpcMethod = RpcMethod::new(Service::Audio, "setAudioMute", 304, "1.0");
pub const SET_AUDIO_VOLUME: RpcMethod =
    RpcMethod::new(Service::Audio, "setAudioVolume", 305, "1.2");
pub const SET_SOUND_SETTINGS: RpcMethod =
    RpcMethod::new(Service::Audio, "setSoundSettings", 306, "1.1");
pub const SET_SPEAKER_SETTINGS: RpcMethod =
    RpcMethod::new(Service::Audio, "setSpeakerSettings", 307, "1.0");

// avContent
pub const GET_CONTENT_COUNT: RpcMethod =
    RpcMethod::new(Service::AvContent, "getContentCount", 401, "1.0");
pub const GET_CONTENT_LIST: RpcMethod =
    RpcMethod::new(Service::AvContent, "getContentList", 402, "1.5");
pub const GET_CURRENT_EXTERNAL_INPUTS_STATUS: RpcMethod =
    RpcMethod::new(Service::AvContent, "getCurrentExternalInputsStatus", 403, "1.1");
pub const GET_SCHEME_LIST: RpcMethod =
    RpcMethod::new(Service::AvContent, "getSchemeList", 404, "1.0");
pub const GET_SOURCE_LIST: RpcMethod =
    RpcMethod::new(Service::AvContent, "getSourceList", 405, "1.0");
pub const GET_PLAYING_CONTENT_INFO: RpcMethod =
    RpcMethod::new(Service::AvContent, "getPlayingContentInfo", 406, "1.0");
pub const SET_PLAY_CONTENT: RpcMethod =
    RpcMethod::new(Service::AvContent, "setPlayContent", 407, "1.0");

// encryption
pub const GET_PUBLIC_KEY: RpcMethod =
    RpcMethod::new(Service::Encryption, "getPublicKey", 501, "1.0");

// system
pub const GET_CURRENT_TIME: RpcMethod =
    RpcMethod::new(Service::System, "getCurrentTime", 601, "1.1");
pub const GET_INTERFACE_INFORMATION: RpcMethod =
    RpcMethod::new(Service::System, "getInterfaceInformation", 602, "1.0");
pub const GET_LED_INDICATOR_STATUS: RpcMethod =
    RpcMethod::new(Service::System, "getLEDIndicatorStatus", 603, "1.0");
pub const GET_NETWORK_SETTINGS: RpcMethod =
    RpcMethod::new(Service::System, "getNetworkSettings", 604, "1.0");
pub const GET_POWER_SAVING_MODE: RpcMethod =
    RpcMethod::new(Service::System, "getPowerSavingMode", 605, "1.0");
pub const GET_POWER_STATUS: RpcMethod =
    RpcMethod::new(Service::System, "getPowerStatus", 606, "1.0");
pub const GET_REMOTE_CONTROLLER_INFO: RpcMethod =
    RpcMethod::new(Service::System, "getRemoteControllerInfo", 607, "1.0");
pub const GET_REMOTE_DEVICE_SETTINGS: RpcMethod =
    RpcMethod::new(Service::System, "getRemoteDeviceSettings", 608, "1.0");
pub const GET_SYSTEM_INFORMATION: RpcMethod =
    RpcMethod::new(Service::System, "getSystemInformation", 609, "1.0");
pub const GET_SYSTEM_SUPPORTED_FUNCTION: RpcMethod =
    RpcMethod::new(Service::System, "getSystemSupportedFunction", 610, "1.0");
pub const GET_WOL_MODE: RpcMethod = RpcMethod::new(Service::System, "getWolMode", 611, "1.0");
pub const REQUEST_REBOOT: RpcMethod = RpcMethod::new(Service::System, "requestReboot", 612, "1.0");
pub const SET_LED_INDICATOR_STATUS: RpcMethod =
    RpcMethod::new(Service::System, "setLEDIndicatorStatus", 613, "1.1");
pub const SET_LANGUAGE: RpcMethod = RpcMethod::new(Service::System, "setLanguage", 614, "1.0");
pub const SET_POWER_SAVING_MODE: RpcMethod =
    RpcMethod::new(Service::System, "setPowerSavingMode", 615, "1.0");
pub const SET_POWER_STATUS: RpcMethod =
    RpcMethod::new(Service::System, "setPowerStatus", 616, "1.0");
pub const SET_WOL_MODE: RpcMethod = RpcMethod::new(Service::System, "setWolMode", 617, "1.0");

// videoScreen
pub const SET_SCENE_SETTING: RpcMethod =
    RpcMethod::new(Service::VideoScreen, "setSceneSetting", 701, "1.0");

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'a str,
    pub id: u32,
    pub params: Vec<Value>,
    pub version: &'a str,
}

/// Raw response. `error` is `[code, message]` when the call was rejected.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Option<u32>,
}

impl RpcResponse {
    pub fn parse(method: &str, body: &str) -> Result<Self, BraviaError> {
        serde_json::from_str(body).map_err(|e| BraviaError::Json(method.to_string(), e.to_string()))
    }

    /// Returns the `result` array, or the JSON-RPC error carried instead.
    pub fn into_result(self, method: &str) -> Result<Value, BraviaError> {
        if let Some(error) = self.error {
            let code = error.get(0).and_then(Value::as_i64).unwrap_or(-1);
            let message = error
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(BraviaError::Rpc {
                method: method.to_string(),
                code,
                message,
            });
        }

        self.result
            .ok_or_else(|| BraviaError::unexpected_response(method, "missing result member"))
    }
}

/// Walks `value` positionally, e.g. `&[0, 0]` for `result[0][0]`.
pub fn result_at<'a>(value: &'a Value, method: &str, path: &[usize]) -> Result<&'a Value, BraviaError> {
    let mut current = value;
    for (depth, index) in path.iter().enumerate() {
        current = current.get(*index).ok_or_else(|| {
            let shown: Vec<String> = path[..=depth].iter().map(|i| format!("[{i}]")).collect();
            BraviaError::unexpected_response(method, format!("no element at result{}", shown.concat()))
        })?;
    }
    Ok(current)
}
