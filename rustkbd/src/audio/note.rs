/// 2^(n/12) for n in 0..12.
const SEMITONE_RATIOS: [f32; 12] = [
    1.0,
    1.059_463_1,
    1.122_462,
    1.189_207_1,
    1.259_921,
    1.334_84,
    1.414_213_5,
    1.498_307_1,
    1.587_401,
    1.681_792_8,
    1.781_797_4,
    1.887_748_6,
];

/// Frequency of a MIDI note in equal temperament, A4 (note 69) = 440Hz.
pub fn compute_freq_for_midi_note(note: u8) -> f32 {
    let offset = note as i32 - 69;
    let octave = offset.div_euclid(12);
    let freq = 440.0 * SEMITONE_RATIOS[offset.rem_euclid(12) as usize];
    if octave >= 0 {
        freq * (1u32 << octave) as f32
    } else {
        freq / (1u32 << -octave) as f32
    }
}
