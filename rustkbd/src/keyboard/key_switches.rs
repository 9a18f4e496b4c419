use core::hash::Hash;

use crate::{Error, Vec};

pub trait KeySwitches<const SZ: usize, const RO: usize> {
    type Identifier: KeySwitchIdentifier<SZ>;
    fn scan(&mut self) -> Vec<Self::Identifier, RO>;
}

/// Identifies a physical switch. `SZ` is the size of its byte representation.
pub trait KeySwitchIdentifier<const SZ: usize>:
    Copy + Eq + TryFrom<[u8; SZ], Error = Error> + Into<[u8; SZ]> + Hash
{
    /// Row and column of the switch on the grid.
    fn position(&self) -> (u8, u8);
}
