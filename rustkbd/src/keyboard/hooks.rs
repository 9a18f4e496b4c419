use heapless::{Deque, Vec};

use crate::{
    audio::{Audio, AudioState, MusicState},
    logging::{debug, info, warn},
    storage::DefaultLayerStore,
};

use super::{Action, Config, Key, Layer, LayerState};

/// Keymap-specific handling of events. Every method has a default that leaves the event to the
/// controller.
pub trait Behavior<L: Layer, C: Copy> {
    /// Called for every press and release before the controller acts on it.
    /// Returning `false` skips the controller's own handling.
    fn process_record(
        &mut self,
        _action: &Action<L, C>,
        _pressed: bool,
        _ctx: &mut Context<'_, L>,
    ) -> bool {
        true
    }

    fn encoder_update(&mut self, _index: u8, _clockwise: bool, _ctx: &mut Context<'_, L>) -> bool {
        true
    }

    fn dip_switch_update(&mut self, _index: u8, _active: bool, _ctx: &mut Context<'_, L>) -> bool {
        true
    }

    /// Called once per controller loop.
    fn matrix_scan(&mut self, _ctx: &mut Context<'_, L>) {}

    /// Returning `false` lets the action through while music mode is on.
    fn music_mask(&self, _action: &Action<L, C>) -> bool {
        true
    }
}

const MAX_REGISTERED: usize = 8;
const MAX_TAPS: usize = 8;

/// Controller state that hooks can change.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub(crate) registered: Vec<Key, MAX_REGISTERED>,
    pub(crate) taps: Deque<Key, MAX_TAPS>,
    pub(crate) backlight: u8,
    pub(crate) audio: AudioState,
    pub(crate) music: MusicState,
}

/// What a [`Behavior`] hook can do to the keyboard.
pub struct Context<'a, L: Layer> {
    layers: &'a mut LayerState<L>,
    store: &'a mut dyn DefaultLayerStore,
    audio: &'a mut dyn Audio,
    effects: &'a mut Effects,
    config: &'a Config,
}

impl<'a, L: Layer> Context<'a, L> {
    pub(crate) fn new(
        layers: &'a mut LayerState<L>,
        store: &'a mut dyn DefaultLayerStore,
        audio: &'a mut dyn Audio,
        effects: &'a mut Effects,
        config: &'a Config,
    ) -> Self {
        Context {
            layers,
            store,
            audio,
            effects,
            config,
        }
    }

    pub fn layer_on(&mut self, layer: L) {
        self.layers.layer_on(layer);
    }

    pub fn layer_off(&mut self, layer: L) {
        self.layers.layer_off(layer);
    }

    pub fn is_layer_on(&self, layer: L) -> bool {
        self.layers.is_on(layer)
    }

    pub fn update_tri_layer(&mut self, a: L, b: L, c: L) {
        self.layers.update_tri_layer(a, b, c);
    }

    pub fn layer_state(&self) -> &LayerState<L> {
        self.layers
    }

    /// Makes `layer` the only default layer and remembers it across restarts.
    pub fn set_single_persistent_default_layer(&mut self, layer: L) {
        self.layers.set_default(layer);
        info!("Default layer: {}", layer.index());
        if let Err(e) = self.store.store(layer.index()) {
            warn!("Failed to persist default layer: {:?}", e);
        }
    }

    /// Holds `key` down until [`Context::unregister_key`].
    pub fn register_key(&mut self, key: Key) {
        if self.effects.registered.contains(&key) {
            return;
        }
        if self.effects.registered.push(key).is_err() {
            warn!("Too many registered keys, dropping {:?}", key);
        }
    }

    pub fn unregister_key(&mut self, key: Key) {
        self.effects.registered.retain(|k| *k != key);
    }

    /// Sends a press and a release of `key` in the next reports.
    pub fn tap_key(&mut self, key: Key) {
        debug!("Tap {:?}", key);
        if self.effects.taps.push_back(key).is_err() {
            warn!("Tap queue is full, dropping {:?}", key);
        }
    }

    pub fn backlight_step(&mut self) {
        self.effects.backlight = (self.effects.backlight + 1) % (self.config.backlight_levels + 1);
    }

    pub fn backlight_level(&self) -> u8 {
        self.effects.backlight
    }

    pub fn audio_enabled(&self) -> bool {
        self.effects.audio.enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.effects.music.enabled
    }

    /// Does nothing while audio is off.
    pub fn play_note(&mut self, freq: f32, volume: u8) {
        if self.effects.audio.enabled {
            self.audio.play_note(freq, volume);
        }
    }

    pub fn stop_note(&mut self, freq: f32) {
        self.audio.stop_note(freq);
    }

    pub fn stop_all_notes(&mut self) {
        self.audio.stop_all_notes();
    }
}
