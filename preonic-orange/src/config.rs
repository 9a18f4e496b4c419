use rustkbd::{
    keyboard::{Config, Duration},
    usb::DeviceInfo,
};

pub const ROWS: u8 = 5;
pub const COLS: u8 = 12;

pub const TAPPING_TERM_MS: u32 = 200;

/// Lowest note of the muse melody before the scale step is added.
pub const MUSE_OFFSET: u8 = 70;
/// Matrix scans per muse note.
pub const MUSE_TEMPO: u16 = 50;
pub const MUSE_VOLUME: u8 = 0xF;

pub const DEVICE_INFO: DeviceInfo = DeviceInfo {
    manufacturer: "OLKB",
    vendor_id: 0x03a8,
    product_id: 0xa649,
    product_name: "Preonic",
    serial_number: "orange",
};

pub fn keyboard_config() -> Config {
    Config {
        tapping_term: Duration::from_ticks(TAPPING_TERM_MS),
        ..Config::default()
    }
}
