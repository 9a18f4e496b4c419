use super::SCALE;

/// How switch positions map to notes while music mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MusicMode {
    /// Semitones along a row, octaves across rows.
    #[default]
    Chromatic,
    /// Rows a fourth apart.
    Guitar,
    /// Rows a fifth apart.
    Violin,
    /// Major scale along a row, octaves across rows.
    Major,
}

impl MusicMode {
    pub fn next(self) -> Self {
        match self {
            MusicMode::Chromatic => MusicMode::Guitar,
            MusicMode::Guitar => MusicMode::Violin,
            MusicMode::Violin => MusicMode::Major,
            MusicMode::Major => MusicMode::Chromatic,
        }
    }

    /// MIDI note for the switch at `row`, `col` of a grid with `rows` rows.
    /// The bottom-left switch plays `starting_note`.
    pub fn note(self, starting_note: u8, row: u8, col: u8, rows: u8) -> u8 {
        let from_bottom = rows.saturating_sub(row.saturating_add(1)) as i16;
        let col = col as i16;
        let note = starting_note as i16
            + match self {
                MusicMode::Chromatic => col + 12 * from_bottom,
                MusicMode::Guitar => col + 5 * from_bottom,
                MusicMode::Violin => col + 7 * from_bottom,
                MusicMode::Major => {
                    SCALE.get(col as usize).copied().unwrap_or(0) as i16 + 12 * from_bottom
                }
            };
        note.clamp(0, 127) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MusicState {
    pub enabled: bool,
    pub mode: MusicMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_modes() {
        let mut mode = MusicMode::default();
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, MusicMode::Chromatic);
        assert_eq!(MusicMode::Violin.next(), MusicMode::Major);
    }

    #[test]
    fn notes_rise_upwards_and_rightwards() {
        assert_eq!(MusicMode::Chromatic.note(48, 4, 0, 5), 48);
        assert_eq!(MusicMode::Chromatic.note(48, 4, 3, 5), 51);
        assert_eq!(MusicMode::Chromatic.note(48, 3, 0, 5), 60);
        assert_eq!(MusicMode::Guitar.note(48, 3, 0, 5), 53);
        assert_eq!(MusicMode::Violin.note(48, 3, 1, 5), 56);
        assert_eq!(MusicMode::Major.note(48, 4, 2, 5), 52);
        assert_eq!(MusicMode::Major.note(48, 0, 7, 5), 108);
    }
}
