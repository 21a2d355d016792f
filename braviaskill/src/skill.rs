use std::sync::Arc;

use braviaconfig::SkillSettings;
use braviacontrol::{
    Bootstrap, BraviaError, Client, CommandOutcome, PowerControl, RemoteControl, Transport,
    VolumeControl,
};
use tracing::{debug, info, warn};

use crate::{
    collection::ClientCollection,
    dialog::{self, Dialog},
    fuzzy::match_application,
    intents::{Intent, IntentRequest, PlayerCommand},
};

/// Maps intents to client calls and picks the dialog to speak.
#[derive(Debug)]
pub struct BraviaSkill {
    clients: ClientCollection,
    volume_step: u32,
}

impl BraviaSkill {
    pub fn new(clients: ClientCollection, volume_step: u32) -> Self {
        Self {
            clients,
            volume_step,
        }
    }

    /// Connects every configured television.
    ///
    /// Unreachable devices are kept as degraded clients.
    pub fn initialize(settings: &SkillSettings, transport: Arc<dyn Transport>) -> Self {
        let mut clients = ClientCollection::new();
        for device in &settings.devices {
            match Client::connect(device.clone(), transport.clone()) {
                Bootstrap::Ready(client) => {
                    info!(device = %client.name(), url = %client.base_url(), "Television registered");
                    clients.push(client);
                }
                Bootstrap::Degraded(client, reason) => {
                    warn!(
                        device = %client.name(),
                        "Television registered without cached apps or remote codes: {}",
                        reason
                    );
                    clients.push(client);
                }
            }
        }
        Self::new(clients, settings.volume_step)
    }

    pub fn clients(&self) -> &ClientCollection {
        &self.clients
    }

    pub fn volume_step(&self) -> u32 {
        self.volume_step
    }

    /// Runs `request` against the resolved client.
    ///
    /// Device errors are returned as is.
    pub fn handle(&mut self, request: &IntentRequest) -> Result<Dialog, BraviaError> {
        let step = self.volume_step;
        let Some(client) = self.clients.get_client_mut(request.device.as_deref()) else {
            debug!(intent = ?request.intent, "No television configured");
            return Ok(Dialog::new(dialog::NO_CLIENT));
        };
        debug!(intent = ?request.intent, device = %client.name(), "Handling intent");
        let device = client.name().to_string();

        match &request.intent {
            Intent::PowerOn => handle_power_on_intent(&*client, &device),
            Intent::PowerOff => handle_power_off_intent(&*client, &device),
            Intent::Reboot => handle_reboot_intent(client, &device),
            Intent::VolumeUp { amount } => {
                handle_volume_up_intent(client, &device, i64::from(amount.unwrap_or(step)))
            }
            Intent::VolumeDown { amount } => {
                handle_volume_down_intent(client, &device, i64::from(amount.unwrap_or(step)))
            }
            Intent::SetVolume { level } => handle_set_volume_intent(client, &device, *level),
            Intent::CurrentVolume => handle_current_volume_intent(client, &device),
            Intent::Mute => handle_mute_intent(client, &device),
            Intent::Unmute => handle_unmute_intent(client, &device),
            Intent::ToggleMute => handle_toggle_mute_intent(client, &device),
            Intent::OpenApp { name } => handle_open_app_intent(client, name),
            Intent::Player(command) => {
                ensure_caches(client);
                Ok(handle_player_intent(&*client, &device, *command))
            }
            Intent::ChangeChannel { number } => {
                ensure_caches(client);
                Ok(handle_change_channel_intent(&*client, &device, *number))
            }
            Intent::ChannelUp => {
                ensure_caches(client);
                Ok(handle_channel_up_intent(&*client, &device))
            }
            Intent::ChannelDown => {
                ensure_caches(client);
                Ok(handle_channel_down_intent(&*client, &device))
            }
        }
    }

    /// Like [`handle`](Self::handle), but a device error becomes the
    /// "unreachable" dialog.
    pub fn respond(&mut self, request: &IntentRequest) -> Dialog {
        match self.handle(request) {
            Ok(dialog) => dialog,
            Err(err) => {
                let device = self
                    .clients
                    .get_client(request.device.as_deref())
                    .map(|client| client.name().to_string())
                    .unwrap_or_default();
                warn!(device = %device, intent = ?request.intent, "Intent failed: {}", err);
                Dialog::new(dialog::DEVICE_UNREACHABLE).with("device", device)
            }
        }
    }
}

fn device_dialog(name: &'static str, device: &str) -> Dialog {
    Dialog::new(name).with("device", device)
}

/// Reloads the caches of a client whose bootstrap failed.
fn ensure_caches(client: &mut Client) {
    if client.is_degraded() {
        match client.refresh_caches() {
            Ok(()) => info!(device = %client.name(), "Television caches recovered"),
            Err(err) => debug!(device = %client.name(), "Still unable to load caches: {}", err),
        }
    }
}

fn handle_power_on_intent(tv: &impl PowerControl, device: &str) -> Result<Dialog, BraviaError> {
    if tv.is_on()? {
        return Ok(device_dialog(dialog::ALREADY_ON, device));
    }
    tv.power_on()?;
    Ok(device_dialog(dialog::POWER_ON, device))
}

fn handle_power_off_intent(tv: &impl PowerControl, device: &str) -> Result<Dialog, BraviaError> {
    if !tv.is_on()? {
        return Ok(device_dialog(dialog::ALREADY_OFF, device));
    }
    tv.power_off()?;
    Ok(device_dialog(dialog::POWER_OFF, device))
}

fn handle_reboot_intent(client: &Client, device: &str) -> Result<Dialog, BraviaError> {
    client.request_reboot()?;
    Ok(device_dialog(dialog::REBOOT, device))
}

fn handle_volume_up_intent(
    tv: &mut impl VolumeControl,
    device: &str,
    amount: i64,
) -> Result<Dialog, BraviaError> {
    let current = tv.volume()?;
    let volume = tv.set_volume(current + amount)?;
    Ok(device_dialog(dialog::VOLUME_SET, device).with("volume", volume))
}

fn handle_volume_down_intent(
    tv: &mut impl VolumeControl,
    device: &str,
    amount: i64,
) -> Result<Dialog, BraviaError> {
    let current = tv.volume()?;
    let volume = tv.set_volume(current - amount)?;
    Ok(device_dialog(dialog::VOLUME_SET, device).with("volume", volume))
}

fn handle_set_volume_intent(
    tv: &mut impl VolumeControl,
    device: &str,
    level: i64,
) -> Result<Dialog, BraviaError> {
    let volume = tv.set_volume(level)?;
    Ok(device_dialog(dialog::VOLUME_SET, device).with("volume", volume))
}

fn handle_current_volume_intent(
    tv: &mut impl VolumeControl,
    device: &str,
) -> Result<Dialog, BraviaError> {
    let volume = tv.volume()?;
    Ok(device_dialog(dialog::VOLUME_CURRENT, device).with("volume", volume))
}

fn handle_mute_intent(tv: &mut impl VolumeControl, device: &str) -> Result<Dialog, BraviaError> {
    tv.set_mute(true)?;
    Ok(device_dialog(dialog::MUTED, device))
}

fn handle_unmute_intent(tv: &mut impl VolumeControl, device: &str) -> Result<Dialog, BraviaError> {
    tv.set_mute(false)?;
    Ok(device_dialog(dialog::UNMUTED, device))
}

fn handle_toggle_mute_intent(
    tv: &mut impl VolumeControl,
    device: &str,
) -> Result<Dialog, BraviaError> {
    let muted = !tv.muted()?;
    tv.set_mute(muted)?;
    let name = if muted { dialog::MUTED } else { dialog::UNMUTED };
    Ok(device_dialog(name, device))
}

fn handle_open_app_intent(client: &mut Client, spoken: &str) -> Result<Dialog, BraviaError> {
    ensure_caches(client);

    let Some(app) = match_application(spoken, client.applications()).cloned() else {
        debug!(device = %client.name(), spoken, "No application matches");
        return Ok(device_dialog(dialog::NO_MATCHING_APP, client.name()).with("app", spoken));
    };

    client.set_active_app(&app.uri)?;
    Ok(device_dialog(dialog::APP_OPENED, client.name()).with("app", app.title))
}

fn command_dialog(device: &str, command: &str, outcome: CommandOutcome) -> Dialog {
    let name = match outcome {
        CommandOutcome::Sent(_) => dialog::COMMAND_SENT,
        CommandOutcome::UnknownCommand => dialog::COMMAND_UNKNOWN,
        CommandOutcome::Failed(_) => dialog::COMMAND_FAILED,
    };
    device_dialog(name, device).with("command", command)
}

fn handle_player_intent(tv: &impl RemoteControl, device: &str, command: PlayerCommand) -> Dialog {
    let code_name = command.remote_code_name();
    command_dialog(device, code_name, tv.press(code_name))
}

fn handle_change_channel_intent(tv: &impl RemoteControl, device: &str, number: u32) -> Dialog {
    for digit in number.to_string().chars() {
        let code_name = format!("Num{digit}");
        let outcome = tv.press(&code_name);
        if !outcome.is_sent() {
            return command_dialog(device, &code_name, outcome);
        }
    }
    device_dialog(dialog::CHANNEL_CHANGED, device).with("channel", number)
}

fn handle_channel_up_intent(tv: &impl RemoteControl, device: &str) -> Dialog {
    command_dialog(device, "ChannelUp", tv.press("ChannelUp"))
}

fn handle_channel_down_intent(tv: &impl RemoteControl, device: &str) -> Dialog {
    command_dialog(device, "ChannelDown", tv.press("ChannelDown"))
}

#[cfg(test)]
mod tests {
    use braviacontrol::{DeviceSettings, mock::MockTransport};
    use serde_json::json;

    use super::*;

    fn tv() -> Arc<MockTransport> {
        Arc::new(
            MockTransport::new()
                .with_result(
                    "getVolumeInformation",
                    json!([[{"target": "speaker", "volume": 10, "mute": false, "minVolume": 0, "maxVolume": 50}]]),
                )
                .with_result("getApplicationList", json!([[]]))
                .with_result(
                    "getRemoteControllerInfo",
                    json!([{}, [
                        {"name": "Num1", "value": "AAAAAQAAAAEAAAAAAw=="},
                        {"name": "Num2", "value": "AAAAAQAAAAEAAAABAw=="},
                        {"name": "ChannelUp", "value": "AAAAAQAAAAEAAAAQAw=="}
                    ]]),
                )
                .with_result("getPowerStatus", json!([{"status": "standby"}])),
        )
    }

    fn skill(mock: &Arc<MockTransport>) -> BraviaSkill {
        let settings = SkillSettings {
            devices: vec![DeviceSettings::new("Den", "10.0.0.7")],
            volume_step: 5,
        };
        let skill = BraviaSkill::initialize(&settings, mock.clone());
        mock.clear_requests();
        skill
    }

    #[test]
    fn no_configured_client_makes_no_call() {
        let mock = tv();
        let mut skill = BraviaSkill::initialize(&SkillSettings::default(), mock.clone());
        let dialog = skill.respond(&Intent::PowerOn.into());
        assert_eq!(dialog.name, dialog::NO_CLIENT);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn power_on_when_standby_turns_on() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::PowerOn.into());
        assert_eq!(dialog.name, dialog::POWER_ON);
        assert_eq!(mock.routes(), vec!["getPowerStatus", "setPowerStatus"]);
    }

    #[test]
    fn power_on_when_active_only_reports() {
        let mock = tv();
        mock.set_result("getPowerStatus", json!([{"status": "active"}]));
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::PowerOn.into());
        assert_eq!(dialog.name, dialog::ALREADY_ON);
        assert_eq!(mock.routes(), vec!["getPowerStatus"]);
    }

    #[test]
    fn power_off_when_standby_only_reports() {
        let mock = tv();
        let mut skill = skill(&mock);
        assert_eq!(skill.respond(&Intent::PowerOff.into()).name, dialog::ALREADY_OFF);
    }

    #[test]
    fn volume_down_clamps_at_minimum() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::VolumeDown { amount: Some(30) }.into());
        assert_eq!(dialog.get("volume"), Some("0"));
    }

    #[test]
    fn set_volume_above_maximum_is_clamped() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::SetVolume { level: 80 }.into());
        assert_eq!(dialog.name, dialog::VOLUME_SET);
        assert_eq!(dialog.get("volume"), Some("50"));
    }

    #[test]
    fn channel_digits_are_pressed_in_order() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::ChangeChannel { number: 12 }.into());
        assert_eq!(dialog.name, dialog::CHANNEL_CHANGED);
        assert_eq!(
            mock.ircc_codes(),
            vec!["AAAAAQAAAAEAAAAAAw==", "AAAAAQAAAAEAAAABAw=="]
        );
    }

    #[test]
    fn channel_with_unknown_digit_stops() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::ChangeChannel { number: 19 }.into());
        assert_eq!(dialog.name, dialog::COMMAND_UNKNOWN);
        assert_eq!(dialog.get("command"), Some("Num9"));
        assert_eq!(mock.ircc_codes().len(), 1);
    }

    #[test]
    fn player_command_without_code_is_reported_unknown() {
        let mock = tv();
        let mut skill = skill(&mock);
        let dialog = skill.respond(&Intent::Player(PlayerCommand::Pause).into());
        assert_eq!(dialog.name, dialog::COMMAND_UNKNOWN);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn device_error_becomes_unreachable_dialog() {
        let mock = tv();
        let mut skill = skill(&mock);
        mock.set_offline(true);

        assert!(skill.handle(&Intent::Mute.into()).is_err());
        let dialog = skill.respond(&Intent::Mute.into());
        assert_eq!(dialog.name, dialog::DEVICE_UNREACHABLE);
        assert_eq!(dialog.get("device"), Some("Den"));
    }

    #[test]
    fn degraded_client_recovers_before_remote_command() {
        let mock = tv();
        mock.set_offline(true);
        let mut skill = skill(&mock);
        assert!(skill.clients().first().unwrap().is_degraded());

        mock.set_offline(false);
        mock.clear_requests();
        let dialog = skill.respond(&Intent::ChannelUp.into());
        assert_eq!(dialog.name, dialog::COMMAND_SENT);
        assert!(!skill.clients().first().unwrap().is_degraded());
        assert_eq!(
            mock.ircc_codes(),
            vec![String::new(), "AAAAAQAAAAEAAAAQAw==".to_string()]
        );
    }

    /// Remote that knows a fixed set of buttons and records presses.
    #[derive(Default)]
    struct Keypad {
        buttons: Vec<&'static str>,
        pressed: std::cell::RefCell<Vec<String>>,
    }

    impl RemoteControl for Keypad {
        fn press(&self, button: &str) -> CommandOutcome {
            if !self.has_button(button) {
                return CommandOutcome::UnknownCommand;
            }
            self.pressed.borrow_mut().push(button.to_string());
            CommandOutcome::Sent(String::new())
        }

        fn has_button(&self, button: &str) -> bool {
            self.buttons.contains(&button)
        }
    }

    #[test]
    fn channel_digits_go_through_any_remote() {
        let keypad = Keypad {
            buttons: vec!["Num4", "Num2"],
            ..Default::default()
        };

        let dialog = handle_change_channel_intent(&keypad, "Den", 42);
        assert_eq!(dialog.name, dialog::CHANNEL_CHANGED);
        assert_eq!(*keypad.pressed.borrow(), vec!["Num4", "Num2"]);

        let dialog = handle_change_channel_intent(&keypad, "Den", 47);
        assert_eq!(dialog.name, dialog::COMMAND_UNKNOWN);
        assert_eq!(dialog.get("command"), Some("Num7"));
        assert_eq!(keypad.pressed.borrow().len(), 3);
    }
}
