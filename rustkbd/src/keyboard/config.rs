/// Milliseconds since the keyboard started.
pub type Instant = fugit::TimerInstantU32<1_000>;
pub type Duration = fugit::MillisDurationU32;

#[derive(Debug, Clone)]
pub struct Config {
    /// A layer-tap released within this duration is a tap.
    pub tapping_term: Duration,
    pub mouse: MouseConfig,
    /// MIDI note of the bottom-left switch in music mode.
    pub music_starting_note: u8,
    pub note_volume: u8,
    pub backlight_levels: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tapping_term: Duration::from_ticks(200),
            mouse: MouseConfig::default(),
            music_starting_note: 48,
            note_volume: 0xF,
            backlight_levels: 3,
        }
    }
}

/// Distances moved per report by mouse keys.
#[derive(Debug, Clone)]
pub struct MouseConfig {
    pub move_speed: i8,
    pub wheel_speed: i8,
    /// Used instead of `move_speed` while `MouseAccel0..=2` is held.
    pub accel_move_speeds: [i8; 3],
    pub accel_wheel_speeds: [i8; 3],
}

impl Default for MouseConfig {
    fn default() -> Self {
        MouseConfig {
            move_speed: 8,
            wheel_speed: 1,
            accel_move_speeds: [2, 8, 24],
            accel_wheel_speeds: [1, 1, 2],
        }
    }
}
