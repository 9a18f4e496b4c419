use crate::keyboard::{Action, KeySwitchIdentifier, Layer};

pub trait Layout<const SZ: usize> {
    type Identifier: KeySwitchIdentifier<SZ>;
    type Layer: Layer;
    type Custom: Copy;

    /// Number of rows of the switch grid.
    const ROWS: u8;

    fn action(
        &self,
        layer: Self::Layer,
        switch: &Self::Identifier,
    ) -> Action<Self::Layer, Self::Custom>;
}
