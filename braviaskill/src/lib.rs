//! # Bravia voice skill
//!
//! Receives parsed voice intents, picks the targeted television and drives
//! it through [`braviacontrol::Client`]. Every handled intent ends in a
//! [`Dialog`] for the host to speak.

pub mod collection;
pub mod dialog;
pub mod fuzzy;
pub mod intents;
pub mod skill;

pub use collection::{ClientCollection, resolve_client};
pub use dialog::Dialog;
pub use intents::{Intent, IntentRequest, PlayerCommand};
pub use skill::BraviaSkill;
