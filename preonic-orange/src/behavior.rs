use rustkbd::{
    audio::{compute_freq_for_midi_note, Muse, SCALE},
    keyboard::{Action, Behavior, Context, Key},
};

use crate::{
    config::{MUSE_OFFSET, MUSE_TEMPO, MUSE_VOLUME},
    layout::{CustomKey, KeyAction, Layer},
    logging::{debug, info},
};

/// Event handling of the keymap: custom keycodes, the encoder, the DIP switches and muse mode.
#[derive(Debug, Clone)]
pub struct Orange {
    muse: Muse,
    muse_mode: bool,
    last_muse_note: u8,
    muse_counter: u16,
    muse_offset: u8,
    muse_tempo: u16,
}

impl Default for Orange {
    fn default() -> Self {
        Orange {
            muse: Muse::default(),
            muse_mode: false,
            last_muse_note: 0,
            muse_counter: 0,
            muse_offset: MUSE_OFFSET,
            muse_tempo: MUSE_TEMPO,
        }
    }
}

impl Orange {
    pub fn muse_mode(&self) -> bool {
        self.muse_mode
    }

    pub fn muse_offset(&self) -> u8 {
        self.muse_offset
    }

    pub fn muse_tempo(&self) -> u16 {
        self.muse_tempo
    }

    pub fn muse_counter(&self) -> u16 {
        self.muse_counter
    }

    pub fn last_muse_note(&self) -> u8 {
        self.last_muse_note
    }
}

fn momentary(ctx: &mut Context<'_, Layer>, layer: Layer, on: bool) {
    if on {
        ctx.layer_on(layer);
    } else {
        ctx.layer_off(layer);
    }
}

impl Behavior<Layer, CustomKey> for Orange {
    fn process_record(
        &mut self,
        action: &KeyAction,
        pressed: bool,
        ctx: &mut Context<'_, Layer>,
    ) -> bool {
        let Action::Custom(key) = action else {
            return true;
        };
        match key {
            CustomKey::Qwerty if pressed => ctx.set_single_persistent_default_layer(Layer::Qwerty),
            CustomKey::Manual if pressed => ctx.set_single_persistent_default_layer(Layer::Manual),
            CustomKey::Qwerty | CustomKey::Manual => {}
            CustomKey::System => momentary(ctx, Layer::System, pressed),
            CustomKey::Lower => {
                momentary(ctx, Layer::Lower, pressed);
                ctx.update_tri_layer(Layer::Lower, Layer::Raise, Layer::Adjust);
            }
            CustomKey::Raise => {
                momentary(ctx, Layer::Raise, pressed);
                ctx.update_tri_layer(Layer::Lower, Layer::Raise, Layer::Adjust);
            }
            CustomKey::Adjust => momentary(ctx, Layer::Adjust, pressed),
            CustomKey::Backlit => {
                if pressed {
                    ctx.register_key(Key::RightShift);
                    ctx.backlight_step();
                } else {
                    ctx.unregister_key(Key::RightShift);
                }
            }
        }
        false
    }

    fn encoder_update(&mut self, _index: u8, clockwise: bool, ctx: &mut Context<'_, Layer>) -> bool {
        if self.muse_mode {
            if ctx.is_layer_on(Layer::Raise) {
                self.muse_offset = if clockwise {
                    self.muse_offset.wrapping_add(1)
                } else {
                    self.muse_offset.wrapping_sub(1)
                };
                debug!("Muse offset: {}", self.muse_offset);
            } else {
                // テンポ 0 では拍が刻めない
                self.muse_tempo = if clockwise {
                    self.muse_tempo.saturating_add(1)
                } else {
                    self.muse_tempo.saturating_sub(1).max(1)
                };
                debug!("Muse tempo: {}", self.muse_tempo);
            }
        } else if clockwise {
            ctx.tap_key(Key::PageDown);
        } else {
            ctx.tap_key(Key::PageUp);
        }
        true
    }

    fn dip_switch_update(&mut self, index: u8, active: bool, ctx: &mut Context<'_, Layer>) -> bool {
        match index {
            0 => momentary(ctx, Layer::Adjust, active),
            1 => {
                self.muse_mode = active;
                info!("Muse mode: {}", active);
            }
            _ => {}
        }
        true
    }

    fn matrix_scan(&mut self, ctx: &mut Context<'_, Layer>) {
        if self.muse_mode {
            if self.muse_counter == 0 {
                let step = SCALE[self.muse.clock_pulse() as usize];
                let note = self.muse_offset.wrapping_add_signed(step);
                if note != self.last_muse_note {
                    ctx.stop_note(compute_freq_for_midi_note(self.last_muse_note));
                    ctx.play_note(compute_freq_for_midi_note(note), MUSE_VOLUME);
                    self.last_muse_note = note;
                }
            }
            self.muse_counter = (self.muse_counter + 1) % self.muse_tempo;
        } else if self.muse_counter != 0 {
            ctx.stop_all_notes();
            self.muse_counter = 0;
        }
    }

    fn music_mask(&self, action: &KeyAction) -> bool {
        !matches!(action, Action::Custom(CustomKey::Lower | CustomKey::Raise))
    }
}
