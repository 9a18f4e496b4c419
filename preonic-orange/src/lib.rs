#![cfg_attr(not(test), no_std)]

mod behavior;
pub mod config;
mod layout;
mod logging;
mod switch_identifier;

use rustkbd::{
    audio::Audio,
    keyboard::{ExternalCommunicator, KeySwitches},
    storage::DefaultLayerStore,
};

pub use behavior::Orange;
pub use layout::{CustomKey, KeyAction, Layer, Layout};
pub use switch_identifier::KeySwitchIdentifier;

pub type Controller<const RO: usize, C, K, A, S> =
    rustkbd::keyboard::Controller<2, RO, C, K, Layout, Orange, A, S>;

/// Builds a controller running this keymap.
pub fn controller<const RO: usize, C, K, A, S>(
    communicator: C,
    key_switches: K,
    audio: A,
    store: S,
) -> Controller<RO, C, K, A, S>
where
    C: ExternalCommunicator,
    K: KeySwitches<2, RO, Identifier = KeySwitchIdentifier>,
    A: Audio,
    S: DefaultLayerStore,
{
    rustkbd::keyboard::Controller::new(
        communicator,
        key_switches,
        Layout::default(),
        Orange::default(),
        audio,
        store,
        config::keyboard_config(),
    )
}
