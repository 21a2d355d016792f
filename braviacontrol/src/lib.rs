//! # Bravia device control
//!
//! Blocking client for the local control API of Sony Bravia televisions:
//! JSON-RPC calls under `/sony/<service>` and IRCC remote-button presses
//! under `/sony/IRCC`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use braviacontrol::{Client, DeviceSettings, UreqTransport};
//!
//! let settings = DeviceSettings::new("Living Room", "192.168.1.20").with_access_key("0000");
//! let mut tv = Client::connect(settings, Arc::new(UreqTransport::new())).into_client();
//! if !tv.is_on()? {
//!     tv.power_on()?;
//! }
//! tv.set_volume(25)?;
//! tv.send_command("Pause");
//! # Ok::<(), braviacontrol::BraviaError>(())
//! ```

pub mod capabilities;
pub mod client;
pub mod errors;
pub mod ircc;
pub mod model;
pub mod rpc;
pub mod transport;

mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use capabilities::{PowerControl, RemoteControl, VolumeControl};
pub use client::{Bootstrap, Client, CommandOutcome};
pub use errors::BraviaError;
pub use model::{AppEntry, DEFAULT_PORT, DeviceSettings, PowerStatus, RemoteCode, VolumeInformation};
pub use rpc::{RpcMethod, Service};
pub use transport::{HttpReply, HttpRequest, Transport, UreqTransport};
