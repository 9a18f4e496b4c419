use super::{Key, Layer};

/// What a switch does on a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action<L: Layer, C: Copy> {
    Key(Key),
    /// Sends the key when tapped, activates the layer while held.
    LayerTap(L, Key),
    /// Keymap-defined keycode, handled by [`super::Behavior::process_record`].
    Custom(C),
}

impl<L: Layer, C: Copy> Action<L, C> {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Action::Key(Key::Transparent))
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::Key(key) if key.is_noop())
    }

    pub fn key(&self) -> Option<Key> {
        match self {
            Action::Key(key) => Some(*key),
            _ => None,
        }
    }
}

impl<L: Layer, C: Copy> From<Key> for Action<L, C> {
    fn from(key: Key) -> Self {
        Action::Key(key)
    }
}
