//! Device client for one Bravia television.

use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    errors::BraviaError,
    ircc::{self, IRCC_TIMEOUT},
    model::{AppEntry, DeviceSettings, PowerStatus, RemoteCode, VolumeInformation},
    rpc::{self, RpcMethod, RpcResponse, result_at},
    transport::{HttpReply, HttpRequest, Transport},
};

const PSK_HEADER: &str = "X-Auth-PSK";

/// What became of a remote-button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The device accepted the code; raw response body.
    Sent(String),
    /// No cached remote code carries that name. Nothing was sent.
    UnknownCommand,
    /// The code was sent but the request failed.
    Failed(String),
}

impl CommandOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, CommandOutcome::Sent(_))
    }
}

/// Outcome of [`Client::connect`].
///
/// A degraded client is fully usable; its cached lists are empty and the
/// reason of the failed bootstrap is kept.
#[derive(Debug)]
pub enum Bootstrap {
    Ready(Client),
    Degraded(Client, BraviaError),
}

impl Bootstrap {
    pub fn is_ready(&self) -> bool {
        matches!(self, Bootstrap::Ready(_))
    }

    pub fn reason(&self) -> Option<&BraviaError> {
        match self {
            Bootstrap::Ready(_) => None,
            Bootstrap::Degraded(_, reason) => Some(reason),
        }
    }

    pub fn into_client(self) -> Client {
        match self {
            Bootstrap::Ready(client) | Bootstrap::Degraded(client, _) => client,
        }
    }
}

pub struct Client {
    settings: DeviceSettings,
    base_url: String,
    transport: Arc<dyn Transport>,
    last_volume: Option<VolumeInformation>,
    applications: Vec<AppEntry>,
    remote_codes: Vec<RemoteCode>,
    degraded: Option<String>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.settings.name)
            .field("base_url", &self.base_url)
            .field("applications", &self.applications.len())
            .field("remote_codes", &self.remote_codes.len())
            .field("degraded", &self.degraded)
            .finish()
    }
}

impl Client {
    /// Builds a client without contacting the device.
    pub fn new(settings: DeviceSettings, transport: Arc<dyn Transport>) -> Self {
        let base_url = format!("http://{}:{}/sony/", settings.ip, settings.port);
        Self {
            settings,
            base_url,
            transport,
            last_volume: None,
            applications: Vec::new(),
            remote_codes: Vec::new(),
            degraded: None,
        }
    }

    /// Builds a client and loads its caches from the device.
    ///
    /// See [`Client::refresh_caches`]. Never fails; an unreachable device
    /// yields [`Bootstrap::Degraded`].
    pub fn connect(settings: DeviceSettings, transport: Arc<dyn Transport>) -> Bootstrap {
        let mut client = Self::new(settings, transport);

        match client.refresh_caches() {
            Ok(()) => {
                info!(
                    device = %client.name(),
                    applications = client.applications.len(),
                    remote_codes = client.remote_codes.len(),
                    "Bravia client ready"
                );
                Bootstrap::Ready(client)
            }
            Err(err) => {
                warn!(device = %client.name(), "Bravia bootstrap failed: {}", err);
                Bootstrap::Degraded(client, err)
            }
        }
    }

    /// Reloads volume information, applications and remote codes.
    ///
    /// On success an empty IRCC code follows: the set seems to drop the
    /// first command it receives after (re)connecting. On failure both
    /// lists are left empty and the client is marked degraded.
    pub fn refresh_caches(&mut self) -> Result<(), BraviaError> {
        match self.load_caches() {
            Ok((applications, remote_codes)) => {
                self.applications = applications;
                self.remote_codes = remote_codes;
                self.degraded = None;
                let outcome = self.send_ircc_code("");
                debug!(device = %self.name(), ?outcome, "Wake-up IRCC code sent");
                Ok(())
            }
            Err(err) => {
                self.applications.clear();
                self.remote_codes.clear();
                self.degraded = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn load_caches(&mut self) -> Result<(Vec<AppEntry>, Vec<RemoteCode>), BraviaError> {
        self.volume_information()?;
        let applications = self.fetch_application_list()?;
        let remote_codes = self.fetch_remote_codes()?;
        Ok((applications, remote_codes))
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn ip(&self) -> &str {
        &self.settings.ip
    }

    pub fn port(&self) -> u16 {
        self.settings.port
    }

    pub fn access_key(&self) -> Option<&str> {
        self.settings.access_key.as_deref()
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ircc_url(&self) -> String {
        format!("{}IRCC", self.base_url)
    }

    pub fn applications(&self) -> &[AppEntry] {
        &self.applications
    }

    pub fn remote_codes(&self) -> &[RemoteCode] {
        &self.remote_codes
    }

    /// Volume information seen by the last volume read.
    pub fn last_volume(&self) -> Option<&VolumeInformation> {
        self.last_volume.as_ref()
    }

    /// Why the last cache load failed, if it did.
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        match self.access_key() {
            Some(key) => vec![(PSK_HEADER.to_string(), key.to_string())],
            None => Vec::new(),
        }
    }

    fn post_rpc(&self, method: &RpcMethod, params: Vec<Value>) -> Result<HttpReply, BraviaError> {
        let url = format!("{}{}", self.base_url, method.service.path());
        let body = serde_json::to_string(&method.request(params))
            .map_err(|e| BraviaError::Json(method.name.to_string(), e.to_string()))?;

        let mut headers = self.auth_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        debug!(device = %self.name(), method = method.name, id = method.id, "JSON-RPC call");
        let reply = self.transport.post(&HttpRequest {
            url,
            headers,
            body,
            timeout: None,
        })?;

        if !reply.is_success() {
            return Err(BraviaError::HttpStatus(
                method.name.to_string(),
                reply.status,
                reply.body,
            ));
        }
        Ok(reply)
    }

    /// Calls a query method and returns its `result` array.
    pub fn query(&self, method: &RpcMethod, params: Vec<Value>) -> Result<Value, BraviaError> {
        let reply = self.post_rpc(method, params)?;
        RpcResponse::parse(method.name, &reply.body)?.into_result(method.name)
    }

    /// Calls a command method. Success is the HTTP status alone.
    pub fn command(&self, method: &RpcMethod, params: Vec<Value>) -> Result<(), BraviaError> {
        self.post_rpc(method, params).map(|_| ())
    }

    fn query_at<T: DeserializeOwned>(
        &self,
        method: &RpcMethod,
        path: &[usize],
    ) -> Result<T, BraviaError> {
        let result = self.query(method, Vec::new())?;
        let value = result_at(&result, method.name, path)?;
        serde_json::from_value(value.clone())
            .map_err(|e| BraviaError::unexpected_response(method.name, e))
    }

    // ----- power -----

    pub fn power_status(&self) -> Result<PowerStatus, BraviaError> {
        self.query_at(&rpc::GET_POWER_STATUS, &[0])
    }

    pub fn is_on(&self) -> Result<bool, BraviaError> {
        Ok(self.power_status()?.is_active())
    }

    fn set_power_status(&self, status: bool) -> Result<(), BraviaError> {
        self.command(&rpc::SET_POWER_STATUS, vec![json!({ "status": status })])
    }

    pub fn power_on(&self) -> Result<(), BraviaError> {
        self.set_power_status(true)
    }

    pub fn power_off(&self) -> Result<(), BraviaError> {
        self.set_power_status(false)
    }

    pub fn toggle_power(&self) -> Result<(), BraviaError> {
        let on = self.is_on()?;
        self.set_power_status(!on)
    }

    pub fn request_reboot(&self) -> Result<(), BraviaError> {
        self.command(&rpc::REQUEST_REBOOT, Vec::new())
    }

    // ----- audio -----

    /// First entry of `getVolumeInformation`. Always asks the device.
    pub fn volume_information(&mut self) -> Result<VolumeInformation, BraviaError> {
        let info: VolumeInformation = self.query_at(&rpc::GET_VOLUME_INFORMATION, &[0, 0])?;
        self.last_volume = Some(info.clone());
        Ok(info)
    }

    pub fn volume(&mut self) -> Result<i64, BraviaError> {
        Ok(self.volume_information()?.volume)
    }

    /// Sets the speaker volume, clamped to the bounds the device reports.
    ///
    /// Returns the value actually sent.
    pub fn set_volume(&mut self, value: i64) -> Result<i64, BraviaError> {
        let info = self.volume_information()?;
        let clamped = info.clamp(value);
        if clamped != value {
            debug!(
                device = %self.name(),
                requested = value,
                clamped,
                min = info.min_volume,
                max = info.max_volume,
                "Volume clamped"
            );
        }

        self.command(
            &rpc::SET_AUDIO_VOLUME,
            vec![json!({
                "volume": clamped.to_string(),
                "ui": "on",
                "target": "speaker",
            })],
        )?;

        if let Some(last) = self.last_volume.as_mut() {
            last.volume = clamped;
        }
        Ok(clamped)
    }

    pub fn muted(&mut self) -> Result<bool, BraviaError> {
        Ok(self.volume_information()?.mute)
    }

    fn set_audio_mute(&self, status: bool) -> Result<(), BraviaError> {
        self.command(&rpc::SET_AUDIO_MUTE, vec![json!({ "status": status })])
    }

    pub fn mute(&self) -> Result<(), BraviaError> {
        self.set_audio_mute(true)
    }

    pub fn unmute(&self) -> Result<(), BraviaError> {
        self.set_audio_mute(false)
    }

    /// Returns the new mute state.
    pub fn toggle_mute(&mut self) -> Result<bool, BraviaError> {
        let target = !self.muted()?;
        self.set_audio_mute(target)?;
        Ok(target)
    }

    // ----- applications -----

    fn fetch_application_list(&self) -> Result<Vec<AppEntry>, BraviaError> {
        self.query_at(&rpc::GET_APPLICATION_LIST, &[0])
    }

    /// Launches the application at `uri`. The cached list is not consulted.
    pub fn set_active_app(&self, uri: &str) -> Result<(), BraviaError> {
        self.command(&rpc::SET_ACTIVE_APP, vec![json!({ "uri": uri })])
    }

    pub fn terminate_apps(&self) -> Result<(), BraviaError> {
        self.command(&rpc::TERMINATE_APPS, Vec::new())
    }

    /// Fills the on-screen text field currently focused.
    pub fn set_text_form(&self, text: &str) -> Result<(), BraviaError> {
        self.command(
            &rpc::SET_TEXT_FORM,
            vec![json!({ "encKey": "", "text": text })],
        )
    }

    // ----- remote control -----

    fn fetch_remote_codes(&self) -> Result<Vec<RemoteCode>, BraviaError> {
        self.query_at(&rpc::GET_REMOTE_CONTROLLER_INFO, &[1])
    }

    pub fn command_code(&self, name: &str) -> Option<&str> {
        self.remote_codes
            .iter()
            .find(|code| code.name == name)
            .map(|code| code.value.as_str())
    }

    /// Presses the remote button called `name`.
    ///
    /// Unknown names send nothing. Transport failures are logged and
    /// reported in the outcome, never raised.
    pub fn send_command(&self, name: &str) -> CommandOutcome {
        match self.command_code(name) {
            Some(code) => self.send_ircc_code(code),
            None => {
                debug!(device = %self.name(), command = name, "Unknown remote command");
                CommandOutcome::UnknownCommand
            }
        }
    }

    /// Posts a raw IRCC code.
    pub fn send_ircc_code(&self, code: &str) -> CommandOutcome {
        let url = self.ircc_url();
        let body = match ircc::build_ircc_envelope(code) {
            Ok(body) => body,
            Err(err) => {
                warn!(device = %self.name(), "Cannot build IRCC envelope: {}", err);
                return CommandOutcome::Failed(err.to_string());
            }
        };

        let mut headers = vec![
            ("SOAPACTION".to_string(), ircc::soap_action_header()),
            (
                "Content-Type".to_string(),
                r#"text/xml; charset="utf-8""#.to_string(),
            ),
        ];
        headers.extend(self.auth_headers());

        let request = HttpRequest {
            url,
            headers,
            body,
            timeout: Some(IRCC_TIMEOUT),
        };

        match self.transport.post(&request) {
            Ok(reply) if reply.is_success() => CommandOutcome::Sent(reply.body),
            Ok(reply) => {
                let reason = match ircc::parse_fault(&reply.body) {
                    Some(fault) => format!(
                        "IRCC error {}: {} (HTTP status {})",
                        fault.error_code, fault.error_description, reply.status
                    ),
                    None => format!("IRCC failed with HTTP status {}", reply.status),
                };
                warn!(device = %self.name(), "{}", reason);
                CommandOutcome::Failed(reason)
            }
            Err(err) => {
                warn!(device = %self.name(), "IRCC request failed: {}", err);
                CommandOutcome::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{IRCC_ROUTE, MockTransport};

    fn volume_result(volume: i64, mute: bool, min: i64, max: i64) -> Value {
        json!([[{
            "target": "speaker",
            "volume": volume,
            "mute": mute,
            "minVolume": min,
            "maxVolume": max
        }]])
    }

    fn scripted_tv() -> MockTransport {
        MockTransport::new()
            .with_result("getVolumeInformation", volume_result(20, false, 0, 100))
            .with_result(
                "getApplicationList",
                json!([[
                    {"title": "Netflix", "uri": "com.sony.dtv.com.netflix.ninja", "icon": "netflix.png"},
                    {"title": "YouTube", "uri": "com.sony.dtv.com.google.android.youtube.tv"}
                ]]),
            )
            .with_result(
                "getRemoteControllerInfo",
                json!([
                    {"bundled": true, "type": "IR_REMOTE_BUNDLE_TYPE_AEP_N"},
                    [
                        {"name": "Play", "value": "AAAAAgAAAJcAAAAaAw=="},
                        {"name": "Pause", "value": "AAAAAgAAAJcAAAAZAw=="}
                    ]
                ]),
            )
            .with_result("getPowerStatus", json!([{"status": "active"}]))
    }

    fn connect(mock: &Arc<MockTransport>) -> Client {
        let settings = DeviceSettings::new("Living Room", "10.0.0.5").with_access_key("0000");
        match Client::connect(settings, mock.clone()) {
            Bootstrap::Ready(client) => client,
            Bootstrap::Degraded(_, err) => panic!("bootstrap failed: {err}"),
        }
    }

    #[test]
    fn connect_loads_caches_and_sends_wake_up_code() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);

        assert_eq!(client.applications().len(), 2);
        assert_eq!(client.applications()[1].icon, None);
        assert_eq!(client.remote_codes().len(), 2);
        assert_eq!(client.last_volume().unwrap().volume, 20);
        assert_eq!(
            mock.routes(),
            vec![
                "getVolumeInformation",
                "getApplicationList",
                "getRemoteControllerInfo",
                IRCC_ROUTE
            ]
        );
        assert_eq!(mock.ircc_codes(), vec![String::new()]);
    }

    #[test]
    fn unreachable_device_still_yields_a_client() {
        let mock = Arc::new(MockTransport::offline());
        let bootstrap = Client::connect(DeviceSettings::new("TV", "10.0.0.9"), mock.clone());

        assert!(!bootstrap.is_ready());
        assert!(bootstrap.reason().unwrap().is_unreachable());
        let client = bootstrap.into_client();
        assert!(client.applications().is_empty());
        assert!(client.remote_codes().is_empty());
        assert!(client.is_degraded());
        // Bootstrap stops at the first failure.
        assert_eq!(mock.routes(), vec!["getVolumeInformation"]);
    }

    #[test]
    fn refresh_recovers_a_degraded_client() {
        let mock = Arc::new(scripted_tv());
        mock.set_offline(true);
        let mut client =
            Client::connect(DeviceSettings::new("TV", "10.0.0.9"), mock.clone()).into_client();
        assert!(client.is_degraded());

        mock.set_offline(false);
        mock.clear_requests();
        client.refresh_caches().unwrap();
        assert!(!client.is_degraded());
        assert_eq!(client.applications().len(), 2);

        // The first press after recovery must not be the one the set drops
        assert!(client.send_command("Play").is_sent());
        assert_eq!(
            mock.ircc_codes(),
            vec![String::new(), "AAAAAgAAAJcAAAAaAw==".to_string()]
        );
    }

    #[test]
    fn requests_carry_psk_only_when_configured() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        client.power_on().unwrap();
        let with_key = mock.requests().pop().unwrap();
        assert_eq!(with_key.header("X-Auth-PSK"), Some("0000"));
        assert_eq!(with_key.url, "http://10.0.0.5:80/sony/system");

        let anonymous = Client::new(DeviceSettings::new("TV", "10.0.0.6"), mock.clone());
        anonymous.power_off().unwrap();
        let without_key = mock.requests().pop().unwrap();
        assert_eq!(without_key.header("X-Auth-PSK"), None);
        assert_eq!(
            mock.bodies_for("setPowerStatus").last().unwrap()["params"][0]["status"],
            json!(false)
        );
    }

    #[test]
    fn is_on_reads_active_status() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        assert!(client.is_on().unwrap());

        mock.set_result("getPowerStatus", json!([{"status": "standby"}]));
        assert!(!client.is_on().unwrap());
    }

    #[test]
    fn toggle_power_negates_current_status() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        client.toggle_power().unwrap();
        assert_eq!(
            mock.bodies_for("setPowerStatus").last().unwrap()["params"][0]["status"],
            json!(false)
        );
    }

    #[test]
    fn transport_errors_propagate_from_queries() {
        let mock = Arc::new(scripted_tv());
        let mut client = connect(&mock);
        mock.set_offline(true);
        assert!(client.is_on().unwrap_err().is_unreachable());
        assert!(client.volume().is_err());
        assert!(client.power_on().is_err());
    }

    #[test]
    fn http_error_status_is_reported() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        mock.set_reply("requestReboot", 403, "Forbidden");
        match client.request_reboot() {
            Err(BraviaError::HttpStatus(method, 403, _)) => assert_eq!(method, "requestReboot"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn set_volume_clamps_to_device_bounds() {
        let mock = Arc::new(scripted_tv());
        let mut client = connect(&mock);
        mock.set_result("getVolumeInformation", volume_result(20, false, 5, 60));

        for (requested, expected) in [(-10, 5), (0, 5), (33, 33), (60, 60), (250, 60)] {
            assert_eq!(client.set_volume(requested).unwrap(), expected);
            let sent = mock.bodies_for("setAudioVolume").pop().unwrap();
            assert_eq!(sent["params"][0]["volume"], json!(expected.to_string()));
            assert_eq!(sent["params"][0]["target"], json!("speaker"));
            assert_eq!(sent["version"], json!("1.2"));
        }
    }

    #[test]
    fn volume_is_read_from_device_every_time() {
        let mock = Arc::new(scripted_tv());
        let mut client = connect(&mock);
        assert_eq!(client.volume().unwrap(), 20);
        mock.set_result("getVolumeInformation", volume_result(31, false, 0, 100));
        assert_eq!(client.volume().unwrap(), 31);
    }

    #[test]
    fn toggle_mute_sends_the_negation() {
        let mock = Arc::new(scripted_tv());
        let mut client = connect(&mock);

        mock.set_result("getVolumeInformation", volume_result(20, true, 0, 100));
        assert!(!client.toggle_mute().unwrap());
        assert_eq!(
            mock.bodies_for("setAudioMute").pop().unwrap()["params"][0]["status"],
            json!(false)
        );

        mock.set_result("getVolumeInformation", volume_result(20, false, 0, 100));
        assert!(client.toggle_mute().unwrap());
        assert_eq!(
            mock.bodies_for("setAudioMute").pop().unwrap()["params"][0]["status"],
            json!(true)
        );
    }

    #[test]
    fn send_command_transmits_cached_code() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        mock.clear_requests();

        assert!(client.send_command("Pause").is_sent());
        assert_eq!(mock.ircc_codes(), vec!["AAAAAgAAAJcAAAAZAw=="]);
        let request = mock.requests().pop().unwrap();
        assert_eq!(request.url, "http://10.0.0.5:80/sony/IRCC");
        assert_eq!(request.timeout, Some(IRCC_TIMEOUT));
        assert_eq!(
            request.header("SOAPACTION"),
            Some("\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"")
        );
    }

    #[test]
    fn unknown_command_sends_nothing() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        mock.clear_requests();

        assert_eq!(client.send_command("Teleport"), CommandOutcome::UnknownCommand);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn failed_ircc_is_reported_not_raised() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);

        mock.set_offline(true);
        assert!(matches!(client.send_command("Play"), CommandOutcome::Failed(_)));

        mock.set_offline(false);
        mock.set_reply(IRCC_ROUTE, 500, "<s:Envelope/>");
        match client.send_command("Play") {
            CommandOutcome::Failed(reason) => assert!(reason.contains("500")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn set_active_app_does_not_check_the_cache() {
        let mock = Arc::new(scripted_tv());
        let client = connect(&mock);
        client.set_active_app("com.example.unknown").unwrap();
        assert_eq!(
            mock.bodies_for("setActiveApp").pop().unwrap()["params"][0]["uri"],
            json!("com.example.unknown")
        );
    }
}
