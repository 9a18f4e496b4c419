use core::{fmt::Debug, marker::PhantomData};

pub use rustkbd_macros::Layer;

use super::Action;

/// A keymap layer. Layers with a greater index take priority.
///
/// Use `#[derive(Layer)]` on a fieldless enum; variants are indexed in declaration order.
pub trait Layer: Copy + Eq + Debug + 'static {
    const LAYERS: &'static [Self];

    fn index(&self) -> u8;

    fn from_index(index: u8) -> Option<Self> {
        Self::LAYERS.get(index as usize).copied()
    }

    fn bit(&self) -> u32 {
        1 << self.index()
    }
}

/// Momentary and default layers currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState<L: Layer> {
    layers: u32,
    default_layers: u32,
    _layer: PhantomData<L>,
}

impl<L: Layer> Default for LayerState<L> {
    fn default() -> Self {
        LayerState {
            layers: 0,
            default_layers: 1,
            _layer: PhantomData,
        }
    }
}

impl<L: Layer> LayerState<L> {
    pub fn layer_on(&mut self, layer: L) {
        self.layers |= layer.bit();
    }

    pub fn layer_off(&mut self, layer: L) {
        self.layers &= !layer.bit();
    }

    pub fn layer_invert(&mut self, layer: L) {
        self.layers ^= layer.bit();
    }

    /// Disables all momentary layers. Default layers are kept.
    pub fn clear(&mut self) {
        self.layers = 0;
    }

    pub fn is_on(&self, layer: L) -> bool {
        self.layers & layer.bit() != 0
    }

    /// Turns `c` on when both `a` and `b` are on, and off otherwise.
    pub fn update_tri_layer(&mut self, a: L, b: L, c: L) {
        if self.is_on(a) && self.is_on(b) {
            self.layer_on(c);
        } else {
            self.layer_off(c);
        }
    }

    pub fn set_default(&mut self, layer: L) {
        self.default_layers = layer.bit();
    }

    pub fn default_layer(&self) -> L {
        highest_in(self.default_layers).unwrap_or(L::LAYERS[0])
    }

    /// The highest enabled layer, default layers included.
    pub fn highest(&self) -> L {
        highest_in(self.layers | self.default_layers).unwrap_or_else(|| self.default_layer())
    }

    /// Looks up an action through the enabled layers from the highest one down.
    /// When every enabled layer is transparent at that position, the lowest layer decides.
    pub fn resolve<C: Copy>(&self, lookup: impl Fn(L) -> Action<L, C>) -> Action<L, C> {
        let enabled = self.layers | self.default_layers;
        L::LAYERS
            .iter()
            .rev()
            .filter(|layer| enabled & layer.bit() != 0)
            .map(|layer| lookup(*layer))
            .find(|action| !action.is_transparent())
            .unwrap_or_else(|| lookup(L::LAYERS[0]))
    }
}

fn highest_in<L: Layer>(mask: u32) -> Option<L> {
    L::LAYERS
        .iter()
        .rev()
        .find(|layer| mask & layer.bit() != 0)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Key;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Layer)]
    enum TestLayer {
        Base,
        Lower,
        Raise,
        Adjust,
    }

    type TestAction = Action<TestLayer, ()>;

    fn lookup(layer: TestLayer) -> TestAction {
        match layer {
            TestLayer::Base => Action::Key(Key::A),
            TestLayer::Lower => Action::Key(Key::Transparent),
            TestLayer::Raise => Action::Key(Key::B),
            TestLayer::Adjust => Action::Key(Key::Transparent),
        }
    }

    #[test]
    fn derived_indices_follow_declaration_order() {
        assert_eq!(TestLayer::Base.index(), 0);
        assert_eq!(TestLayer::Adjust.index(), 3);
        assert_eq!(TestLayer::from_index(2), Some(TestLayer::Raise));
        assert_eq!(TestLayer::from_index(4), None);
    }

    #[test]
    fn resolves_from_highest_enabled_layer() {
        let mut state = LayerState::<TestLayer>::default();
        assert_eq!(state.resolve(lookup), Action::Key(Key::A));

        state.layer_on(TestLayer::Raise);
        assert_eq!(state.resolve(lookup), Action::Key(Key::B));
        assert_eq!(state.highest(), TestLayer::Raise);
    }

    #[test]
    fn transparent_falls_through() {
        let mut state = LayerState::<TestLayer>::default();
        state.layer_on(TestLayer::Lower);
        assert_eq!(state.resolve(lookup), Action::Key(Key::A));

        state.layer_on(TestLayer::Raise);
        state.layer_on(TestLayer::Adjust);
        assert_eq!(state.resolve(lookup), Action::Key(Key::B));
    }

    #[test]
    fn all_transparent_uses_lowest_layer() {
        let mut state = LayerState::<TestLayer>::default();
        state.set_default(TestLayer::Lower);
        assert_eq!(state.default_layer(), TestLayer::Lower);
        assert_eq!(state.resolve(lookup), Action::Key(Key::A));
    }

    #[test]
    fn tri_layer_follows_both_layers() {
        let mut state = LayerState::<TestLayer>::default();
        state.layer_on(TestLayer::Lower);
        state.update_tri_layer(TestLayer::Lower, TestLayer::Raise, TestLayer::Adjust);
        assert!(!state.is_on(TestLayer::Adjust));

        state.layer_on(TestLayer::Raise);
        state.update_tri_layer(TestLayer::Lower, TestLayer::Raise, TestLayer::Adjust);
        assert!(state.is_on(TestLayer::Adjust));

        state.layer_off(TestLayer::Lower);
        state.update_tri_layer(TestLayer::Lower, TestLayer::Raise, TestLayer::Adjust);
        assert!(!state.is_on(TestLayer::Adjust));
    }

    #[test]
    fn clear_keeps_default_layer() {
        let mut state = LayerState::<TestLayer>::default();
        state.set_default(TestLayer::Raise);
        state.layer_on(TestLayer::Lower);
        state.layer_invert(TestLayer::Adjust);
        state.clear();
        assert!(!state.is_on(TestLayer::Lower));
        assert!(!state.is_on(TestLayer::Adjust));
        assert_eq!(state.highest(), TestLayer::Raise);
    }
}
