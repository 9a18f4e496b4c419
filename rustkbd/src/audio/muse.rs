/// Major scale over five octaves, in semitones above the tonic.
pub const SCALE: [i8; 35] = [
    0, 2, 4, 5, 7, 9, 11, //
    12, 14, 16, 17, 19, 21, 23, //
    24, 26, 28, 29, 31, 33, 35, //
    36, 38, 40, 41, 43, 45, 47, //
    48, 50, 52, 53, 55, 57, 59, //
];

/// A source of one bit for the [`Muse`] generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    Off,
    On,
    /// Toggles on every pulse.
    Half,
    /// Bits of the 4-bit counter.
    Count1,
    Count2,
    Count4,
    Count8,
    /// Bits of the counter that advances every third step.
    Count3,
    Count6,
    /// A bit of the shift register, 0 being the newest.
    Bit(u8),
}

/// Pseudo-random melody generator.
///
/// Every other pulse shifts the register left and feeds back the parity of the
/// `theme` bits; the `interface` bits form the returned 4-bit value.
#[derive(Debug, Clone)]
pub struct Muse {
    interface: [Tap; 4],
    theme: [Tap; 4],
    half: bool,
    count3: u8,
    count3_step: u8,
    count4: u8,
    register: u32,
}

impl Default for Muse {
    fn default() -> Self {
        Muse::new(
            [Tap::Bit(6), Tap::Bit(18), Tap::Bit(2), Tap::Bit(27)],
            [Tap::Bit(7), Tap::Bit(22), Tap::Bit(17), Tap::Bit(16)],
        )
    }
}

impl Muse {
    pub fn new(interface: [Tap; 4], theme: [Tap; 4]) -> Self {
        Muse {
            interface,
            theme,
            half: false,
            count3: 0,
            count3_step: 0,
            count4: 0,
            register: 0,
        }
    }

    /// Advances the generator and returns a value in `0..16`.
    pub fn clock_pulse(&mut self) -> u8 {
        let feedback = self.value(&self.theme).count_ones() % 2 == 0;

        if !self.half {
            if self.count3_step == 0 {
                self.count3 = (self.count3 + 1) % 4;
            }
            self.count3_step = (self.count3_step + 1) % 3;
            self.count4 = (self.count4 + 1) % 16;
            self.register = (self.register << 1) | feedback as u32;
        }
        self.half = !self.half;

        self.value(&self.interface)
    }

    fn value(&self, taps: &[Tap; 4]) -> u8 {
        taps.iter()
            .enumerate()
            .map(|(i, tap)| (self.bit(*tap) as u8) << i)
            .fold(0, |acc, b| acc | b)
    }

    fn bit(&self, tap: Tap) -> bool {
        match tap {
            Tap::Off => false,
            Tap::On => true,
            Tap::Half => self.half,
            Tap::Count1 => self.count4 & 1 != 0,
            Tap::Count2 => self.count4 & 2 != 0,
            Tap::Count4 => self.count4 & 4 != 0,
            Tap::Count8 => self.count4 & 8 != 0,
            Tap::Count3 => self.count3 & 1 != 0,
            Tap::Count6 => self.count3 & 2 != 0,
            Tap::Bit(n) => n < 32 && self.register & (1 << n) != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence() {
        let mut muse = Muse::default();
        let pulses = (0..16).map(|_| muse.clock_pulse()).collect::<Vec<_>>();
        assert_eq!(pulses, [0, 0, 0, 0, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5]);
    }

    #[test]
    fn values_stay_in_scale_range() {
        let mut muse = Muse::default();
        assert!((0..1000).all(|_| (muse.clock_pulse() as usize) < 16));
    }

    #[test]
    fn counter_taps() {
        let mut muse = Muse::new(
            [Tap::Count1, Tap::Count2, Tap::Off, Tap::On],
            [Tap::Off; 4],
        );
        assert_eq!(muse.clock_pulse(), 0b1001);
        assert_eq!(muse.clock_pulse(), 0b1001);
        assert_eq!(muse.clock_pulse(), 0b1010);
    }
}
