use rustkbd::{keyboard, Error};

use crate::config::{COLS, ROWS};

/// A switch on the 5x12 grid, row 0 being the number row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeySwitchIdentifier {
    pub row: u8,
    pub col: u8,
}

impl TryFrom<[u8; 2]> for KeySwitchIdentifier {
    type Error = Error;

    fn try_from(value: [u8; 2]) -> Result<Self, Error> {
        match value {
            [row, col] if row < ROWS && col < COLS => Ok(KeySwitchIdentifier { row, col }),
            [row, col] => Err(Error::InvalidSwitch { row, col }),
        }
    }
}

impl From<KeySwitchIdentifier> for [u8; 2] {
    fn from(value: KeySwitchIdentifier) -> Self {
        [value.row, value.col]
    }
}

impl keyboard::KeySwitchIdentifier<2> for KeySwitchIdentifier {
    fn position(&self) -> (u8, u8) {
        (self.row, self.col)
    }
}
