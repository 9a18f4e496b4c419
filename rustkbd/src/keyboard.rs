mod action;
mod config;
mod controller;
mod external_communicator;
mod hooks;
mod key;
mod key_switches;
mod keyboard_state;
mod layer;
mod layout;
mod mouse;

pub use action::Action;
pub use config::{Config, Duration, Instant, MouseConfig};
pub use controller::Controller;
pub use external_communicator::ExternalCommunicator;
pub use hooks::{Behavior, Context};
pub use key::Key;
pub use key_switches::{KeySwitchIdentifier, KeySwitches};
pub use keyboard_state::KeyboardState;
pub use layer::{Layer, LayerState};
pub use layout::Layout;
pub use mouse::MouseReport;
pub use rustkbd_macros::layout;
