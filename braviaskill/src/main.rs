use std::sync::Arc;

use anyhow::{Context, Result};
use braviaconfig::Config;
use braviacontrol::UreqTransport;
use braviaskill::{BraviaSkill, Intent, IntentRequest, PlayerCommand};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drives a Bravia television the way the voice skill would.
#[derive(Debug, Parser)]
#[command(name = "braviaskill", version)]
struct Cli {
    /// Configuration directory (contains config.yaml)
    #[arg(short, long, default_value = "")]
    config: String,

    /// Spoken device name; the first configured television otherwise
    #[arg(short, long)]
    device: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    PowerOn,
    PowerOff,
    Reboot,
    VolumeUp { amount: Option<u32> },
    VolumeDown { amount: Option<u32> },
    SetVolume {
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    Volume,
    Mute,
    Unmute,
    ToggleMute,
    /// Opens the application whose title best matches NAME
    Open { name: Vec<String> },
    /// play, pause, stop, forward, rewind, next, previous
    Player { command: PlayerCommand },
    Channel { number: u32 },
    ChannelUp,
    ChannelDown,
    /// Lists configured televisions and their cached applications
    List,
}

impl Command {
    fn into_intent(self) -> Option<Intent> {
        let intent = match self {
            Command::PowerOn => Intent::PowerOn,
            Command::PowerOff => Intent::PowerOff,
            Command::Reboot => Intent::Reboot,
            Command::VolumeUp { amount } => Intent::VolumeUp { amount },
            Command::VolumeDown { amount } => Intent::VolumeDown { amount },
            Command::SetVolume { level } => Intent::SetVolume { level },
            Command::Volume => Intent::CurrentVolume,
            Command::Mute => Intent::Mute,
            Command::Unmute => Intent::Unmute,
            Command::ToggleMute => Intent::ToggleMute,
            Command::Open { name } => Intent::OpenApp {
                name: name.join(" "),
            },
            Command::Player { command } => Intent::Player(command),
            Command::Channel { number } => Intent::ChangeChannel { number },
            Command::ChannelUp => Intent::ChannelUp,
            Command::ChannelDown => Intent::ChannelDown,
            Command::List => return None,
        };
        Some(intent)
    }
}

fn init_tracing() {
    let _ = tracing_log::LogTracer::init();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load_config(&cli.config).context("Failed to load configuration")?;
    let settings = config
        .skill_settings()
        .context("Invalid Bravia configuration")?;
    info!(devices = settings.devices.len(), "Configuration loaded");

    let mut skill = BraviaSkill::initialize(&settings, Arc::new(UreqTransport::new()));

    let Some(intent) = cli.command.into_intent() else {
        for client in skill.clients().iter() {
            let state = client.degraded_reason().unwrap_or("ready");
            println!("{} ({}) - {}", client.name(), client.base_url(), state);
            for app in client.applications() {
                println!("    {} -> {}", app.title, app.uri);
            }
        }
        return Ok(());
    };

    let mut request = IntentRequest::new(intent);
    request.device = cli.device;

    let dialog = skill.respond(&request);
    println!("{dialog}");
    Ok(())
}
