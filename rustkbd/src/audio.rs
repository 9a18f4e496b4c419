//! Sound output seams and the note generators built on them.
//!
//! Producing the waveform is the board's job; the keyboard only decides which
//! notes start and stop through [`Audio`].

mod muse;
mod music;
mod note;

pub use muse::{Muse, Tap, SCALE};
pub use music::{MusicMode, MusicState};
pub use note::compute_freq_for_midi_note;

pub trait Audio {
    fn play_note(&mut self, freq: f32, volume: u8);
    fn stop_note(&mut self, freq: f32);
    fn stop_all_notes(&mut self);
}

/// For boards without a speaker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudio;

impl Audio for NoAudio {
    fn play_note(&mut self, _freq: f32, _volume: u8) {}
    fn stop_note(&mut self, _freq: f32) {}
    fn stop_all_notes(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioState {
    pub enabled: bool,
    pub voice: u8,
}

impl AudioState {
    pub const VOICE_COUNT: u8 = 8;

    pub fn voice_increment(&mut self) {
        self.voice = (self.voice + 1) % Self::VOICE_COUNT;
    }

    pub fn voice_decrement(&mut self) {
        self.voice = (self.voice + Self::VOICE_COUNT - 1) % Self::VOICE_COUNT;
    }
}

impl Default for AudioState {
    fn default() -> Self {
        AudioState {
            enabled: true,
            voice: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_wraps_both_ways() {
        let mut state = AudioState::default();
        state.voice_decrement();
        assert_eq!(state.voice, AudioState::VOICE_COUNT - 1);
        state.voice_increment();
        assert_eq!(state.voice, 0);
    }
}
