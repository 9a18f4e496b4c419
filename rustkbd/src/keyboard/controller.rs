use core::mem;

use heapless::{Deque, FnvIndexMap, Vec};
use snafu::OptionExt;

use crate::{
    audio::{compute_freq_for_midi_note, Audio},
    error::InvalidLayerSnafu,
    logging::{debug, info, warn},
    storage::DefaultLayerStore,
    Error,
};

use super::{
    hooks::Effects, mouse::mouse_report, Action, Behavior, Config, Context, ExternalCommunicator,
    Instant, Key, KeySwitchIdentifier, KeySwitches, KeyboardState, Layer, LayerState, Layout,
    MouseReport,
};

const MAX_PRESSED: usize = 16;
const MAX_BUFFERED: usize = 8;

/// How a pressed switch is being handled.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hold {
    /// The action is in effect until the switch is released.
    Active,
    /// A hook or the controller already took care of the press.
    Consumed,
    /// A layer-tap that is neither a tap nor a hold yet. Other switches wait in the buffer.
    Tapping(Instant),
    /// A layer-tap whose layer is on.
    LayerHold,
    /// A note played in music mode.
    Note(f32),
}

#[derive(Debug, Clone, Copy)]
struct Pressed<L: Layer, C: Copy> {
    action: Action<L, C>,
    hold: Hold,
    /// Whether the key has made it into the key set.
    seen: bool,
}

#[derive(Debug, Clone, Copy)]
enum Event<I> {
    Press(I, Instant),
    Release(I),
}

pub struct Controller<
    const SZ: usize,
    const RO: usize,
    C: ExternalCommunicator,
    K: KeySwitches<SZ, RO>,
    L: Layout<SZ, Identifier = K::Identifier>,
    B: Behavior<L::Layer, L::Custom>,
    A: Audio,
    S: DefaultLayerStore,
> {
    pub communicator: C,
    pub key_switches: K,
    layout: L,
    behavior: B,
    audio: A,
    store: S,
    config: Config,
    layers: LayerState<L::Layer>,
    effects: Effects,
    keys: Vec<Key, RO>,
    mouse_keys: Vec<Key, RO>,
    switches: Vec<K::Identifier, RO>,
    pressed: FnvIndexMap<K::Identifier, Pressed<L::Layer, L::Custom>, MAX_PRESSED>,
    buffered: Deque<Event<K::Identifier>, MAX_BUFFERED>,
    tap_in_report: bool,
    last_mouse_report: MouseReport,
    bootloader_requested: bool,
}

macro_rules! context {
    ($self:ident) => {
        Context::new(
            &mut $self.layers,
            &mut $self.store,
            &mut $self.audio,
            &mut $self.effects,
            &$self.config,
        )
    };
}

impl<
        const SZ: usize,
        const RO: usize,
        C: ExternalCommunicator,
        K: KeySwitches<SZ, RO>,
        L: Layout<SZ, Identifier = K::Identifier>,
        B: Behavior<L::Layer, L::Custom>,
        A: Audio,
        S: DefaultLayerStore,
    > Controller<SZ, RO, C, K, L, B, A, S>
{
    pub fn new(
        communicator: C,
        key_switches: K,
        layout: L,
        behavior: B,
        audio: A,
        mut store: S,
        config: Config,
    ) -> Self {
        let mut layers = LayerState::default();
        match stored_default_layer::<L::Layer>(&mut store) {
            Ok(Some(layer)) => layers.set_default(layer),
            Ok(None) => {}
            Err(e) => warn!("Failed to load default layer: {:?}", e),
        }

        Controller {
            communicator,
            key_switches,
            layout,
            behavior,
            audio,
            store,
            config,
            layers,
            effects: Effects::default(),
            keys: Vec::new(),
            mouse_keys: Vec::new(),
            switches: Vec::new(),
            pressed: FnvIndexMap::new(),
            buffered: Deque::new(),
            tap_in_report: false,
            last_mouse_report: MouseReport::default(),
            bootloader_requested: false,
        }
    }

    pub fn get_state(&self) -> KeyboardState<L::Layer, RO> {
        KeyboardState {
            layer: self.layers.highest(),
            default_layer: self.layers.default_layer(),
            keys: self.keys.clone(),
            music: self.effects.music.enabled,
        }
    }

    pub fn layer_state(&self) -> &LayerState<L::Layer> {
        &self.layers
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn backlight_level(&self) -> u8 {
        self.effects.backlight
    }

    /// Set by the bootloader key; the board is expected to reset into its bootloader.
    pub fn bootloader_requested(&self) -> bool {
        self.bootloader_requested
    }

    pub fn main_loop(&mut self, now: Instant) {
        let switches = self.key_switches.scan();

        // 離されたスイッチ
        let released: Vec<_, RO> = self
            .switches
            .iter()
            .filter(|switch| !switches.contains(*switch))
            .copied()
            .collect();
        // 押されたスイッチ
        let pressed: Vec<_, RO> = switches
            .iter()
            .filter(|switch| !self.switches.contains(*switch))
            .copied()
            .collect();
        self.switches = switches;

        for switch in released {
            self.event(Event::Release(switch));
        }
        for switch in pressed {
            self.event(Event::Press(switch, now));
        }

        self.expire_taps(now);

        let mut ctx = context!(self);
        self.behavior.matrix_scan(&mut ctx);

        self.update_keys();
    }

    /// Reports a rotation of the encoder `index`.
    pub fn encoder_update(&mut self, index: u8, clockwise: bool) {
        debug!("Encoder {} clockwise: {}", index, clockwise);
        let mut ctx = context!(self);
        self.behavior.encoder_update(index, clockwise, &mut ctx);
    }

    /// Reports a change of the DIP switch `index`.
    pub fn dip_switch_update(&mut self, index: u8, active: bool) {
        debug!("DIP switch {} active: {}", index, active);
        let mut ctx = context!(self);
        self.behavior.dip_switch_update(index, active, &mut ctx);
    }

    /// Sends the current keys and mouse state. Queued taps go out one per report, each followed
    /// by a report without it.
    pub fn send_keys(&mut self) -> Result<(), C::Error> {
        if !self.communicator.is_ready() {
            return Ok(());
        }

        // タップは押されているキーより先に載せる
        let mut keys: Vec<Key, RO> = Vec::new();
        if self.tap_in_report {
            self.tap_in_report = false;
        } else if let Some(tap) = self.effects.taps.pop_front() {
            self.tap_in_report = keys.push(tap).is_ok();
        }
        for key in self.keys.iter() {
            if keys.push(*key).is_err() {
                break;
            }
        }
        self.communicator.send_keys(&filter_keys(keys))?;

        let report = mouse_report(&self.mouse_keys, &self.config.mouse);
        if !report.is_idle() || report != self.last_mouse_report {
            self.communicator.send_mouse(&report)?;
            self.last_mouse_report = report;
        }
        Ok(())
    }

    fn event(&mut self, event: Event<K::Identifier>) {
        let Some((tapping, _)) = self.tapping() else {
            self.process(event);
            return;
        };
        match event {
            // 保留中に離されたレイヤタップはタップ
            Event::Release(switch) if switch == tapping => {
                self.process(event);
                self.replay();
            }
            _ => {
                if let Err(event) = self.buffered.push_back(event) {
                    warn!("Event buffer is full, taking layer-tap as hold");
                    self.hold(tapping);
                    self.replay();
                    self.event(event);
                }
            }
        }
    }

    fn process(&mut self, event: Event<K::Identifier>) {
        match event {
            Event::Press(switch, at) => self.press(switch, at),
            Event::Release(switch) => {
                if let Some(pressed) = self.pressed.remove(&switch) {
                    self.release(pressed);
                }
            }
        }
    }

    /// Feeds the buffered events through again once the layer-tap is decided.
    fn replay(&mut self) {
        let mut events = mem::take(&mut self.buffered);
        while let Some(event) = events.pop_front() {
            self.event(event);
        }
    }

    fn tapping(&self) -> Option<(K::Identifier, Instant)> {
        self.pressed
            .iter()
            .find_map(|(switch, pressed)| match pressed.hold {
                Hold::Tapping(since) => Some((*switch, since)),
                _ => None,
            })
    }

    fn hold(&mut self, switch: K::Identifier) {
        if let Some(pressed) = self.pressed.get_mut(&switch) {
            if let (Hold::Tapping(_), Action::LayerTap(layer, _)) = (pressed.hold, pressed.action)
            {
                pressed.hold = Hold::LayerHold;
                self.layers.layer_on(layer);
            }
        }
    }

    fn press(&mut self, switch: K::Identifier, now: Instant) {
        let layout = &self.layout;
        let action = self.layers.resolve(|layer| layout.action(layer, &switch));

        let mut ctx = context!(self);
        let hold = if !self.behavior.process_record(&action, true, &mut ctx) {
            Hold::Consumed
        } else {
            match action {
                Action::Key(key) if key.is_framework_key() => {
                    self.framework_key(key);
                    Hold::Consumed
                }
                _ if self.effects.music.enabled && self.behavior.music_mask(&action) => {
                    let (row, col) = switch.position();
                    let note = self.effects.music.mode.note(
                        self.config.music_starting_note,
                        row,
                        col,
                        L::ROWS,
                    );
                    let freq = compute_freq_for_midi_note(note);
                    let mut ctx = context!(self);
                    ctx.play_note(freq, self.config.note_volume);
                    Hold::Note(freq)
                }
                Action::LayerTap(..) => Hold::Tapping(now),
                _ => Hold::Active,
            }
        };

        if self
            .pressed
            .insert(
                switch,
                Pressed {
                    action,
                    hold,
                    seen: false,
                },
            )
            .is_err()
        {
            warn!("Too many switches pressed");
        }
    }

    fn release(&mut self, pressed: Pressed<L::Layer, L::Custom>) {
        let mut ctx = context!(self);
        let proceed = self
            .behavior
            .process_record(&pressed.action, false, &mut ctx);

        match (pressed.hold, pressed.action) {
            (Hold::Note(freq), _) => self.audio.stop_note(freq),
            (Hold::LayerHold, Action::LayerTap(layer, _)) => self.layers.layer_off(layer),
            (Hold::Tapping(_), Action::LayerTap(_, key)) if proceed => {
                let mut ctx = context!(self);
                ctx.tap_key(key);
            }
            // 押されてから一度もレポートに載らなかったキーはタップとして送る
            (Hold::Active, Action::Key(key))
                if !pressed.seen && !key.is_noop() && !key.is_mouse_key() =>
            {
                let mut ctx = context!(self);
                ctx.tap_key(key);
            }
            _ => {}
        }
    }

    fn expire_taps(&mut self, now: Instant) {
        // 再生した中に別のレイヤタップがあれば、それも期限を確かめる
        while let Some((switch, since)) = self.tapping() {
            let held_for = now.checked_duration_since(since);
            if !held_for.map_or(false, |d| d >= self.config.tapping_term) {
                break;
            }
            self.hold(switch);
            self.replay();
        }
    }

    fn framework_key(&mut self, key: Key) {
        let effects = &mut self.effects;
        match key {
            Key::AudioOn => effects.audio.enabled = true,
            Key::AudioOff => {
                effects.audio.enabled = false;
                self.audio.stop_all_notes();
            }
            Key::MusicOn => effects.music.enabled = true,
            Key::MusicOff => {
                effects.music.enabled = false;
                self.audio.stop_all_notes();
            }
            Key::MusicModeNext => effects.music.mode = effects.music.mode.next(),
            Key::VoiceIncrement => effects.audio.voice_increment(),
            Key::VoiceDecrement => effects.audio.voice_decrement(),
            Key::Bootloader => {
                warn!("Bootloader requested");
                self.bootloader_requested = true;
            }
            _ => {}
        }
        info!("{:?}: audio {:?}, music {:?}", key, effects.audio, effects.music);
    }

    fn update_keys(&mut self) {
        let mut held: Vec<Key, MAX_PRESSED> = Vec::new();
        for pressed in self.pressed.values_mut() {
            if pressed.hold != Hold::Active {
                continue;
            }
            pressed.seen = true;
            match pressed.action.key() {
                Some(key) if !key.is_noop() && !key.is_framework_key() => {
                    // MAX_PRESSED 以上は押下を受け付けていない
                    let _ = held.push(key);
                }
                _ => {}
            }
        }

        let mut keys: Vec<Key, RO> = Vec::new();
        let mut mouse_keys: Vec<Key, RO> = Vec::new();
        for key in held.into_iter().chain(self.effects.registered.iter().copied()) {
            let target = if key.is_mouse_key() {
                &mut mouse_keys
            } else {
                &mut keys
            };
            if !target.contains(&key) && target.push(key).is_err() {
                warn!("Rollover exceeded, dropping {:?}", key);
            }
        }

        if keys != self.keys {
            debug!("{:?}", keys.as_slice());
        }
        self.keys = keys;
        self.mouse_keys = mouse_keys;
    }
}

fn stored_default_layer<L: Layer>(
    store: &mut impl DefaultLayerStore,
) -> Result<Option<L>, Error> {
    store
        .load()?
        .map(|index| L::from_index(index).context(InvalidLayerSnafu { index }))
        .transpose()
}

fn filter_keys<const RO: usize>(mut keys: Vec<Key, RO>) -> Vec<Key, RO> {
    if keys.iter().any(Key::is_keyboard_key) {
        // 通常のキーが押されているときは、修飾済みキーは無効化する（修飾キーだけなら残す）
        keys.retain(|k| !k.is_modified_key());
    }
    keys
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{
        audio::NoAudio,
        keyboard::{layout, MouseReport},
        storage::MemoryStore,
        Error,
    };

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    struct Switch {
        row: u8,
        col: u8,
    }

    impl TryFrom<[u8; 2]> for Switch {
        type Error = Error;

        fn try_from(value: [u8; 2]) -> Result<Self, Error> {
            Ok(Switch {
                row: value[0],
                col: value[1],
            })
        }
    }

    impl From<Switch> for [u8; 2] {
        fn from(value: Switch) -> Self {
            [value.row, value.col]
        }
    }

    impl KeySwitchIdentifier<2> for Switch {
        fn position(&self) -> (u8, u8) {
            (self.row, self.col)
        }
    }

    #[derive(Clone, Default)]
    struct Switches(Rc<RefCell<std::vec::Vec<Switch>>>);

    impl Switches {
        fn set(&self, switches: &[(u8, u8)]) {
            *self.0.borrow_mut() = switches
                .iter()
                .map(|&(row, col)| Switch { row, col })
                .collect();
        }
    }

    impl KeySwitches<2, 6> for Switches {
        type Identifier = Switch;

        fn scan(&mut self) -> Vec<Switch, 6> {
            self.0.borrow().iter().copied().collect()
        }
    }

    #[derive(Default)]
    struct Recorder {
        reports: RefCell<std::vec::Vec<std::vec::Vec<Key>>>,
        mouse: RefCell<std::vec::Vec<MouseReport>>,
    }

    impl ExternalCommunicator for Recorder {
        type Error = ();

        fn is_ready(&self) -> bool {
            true
        }

        fn send_keys(&self, keys: &[Key]) -> Result<(), ()> {
            self.reports.borrow_mut().push(keys.to_vec());
            Ok(())
        }

        fn send_mouse(&self, report: &MouseReport) -> Result<(), ()> {
            self.mouse.borrow_mut().push(*report);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Layer)]
    enum TestLayer {
        Base,
        Fn,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Custom {
        Shift,
    }

    type TestAction = Action<TestLayer, Custom>;

    struct TestLayout;

    impl TestLayout {
        const BASE: [[TestAction; 3]; 1] = layout! {r"
            |  A  |LT(TestLayer::Fn,Space)|@Custom::Shift|
        "};
        const FN: [[TestAction; 3]; 1] = layout! {r"
            |  1  | Trn |MsUp |
        "};
    }

    impl Layout<2> for TestLayout {
        type Identifier = Switch;
        type Layer = TestLayer;
        type Custom = Custom;

        const ROWS: u8 = 1;

        fn action(&self, layer: TestLayer, switch: &Switch) -> TestAction {
            let table = match layer {
                TestLayer::Base => &Self::BASE,
                TestLayer::Fn => &Self::FN,
            };
            table[switch.row as usize][switch.col as usize]
        }
    }

    #[derive(Default)]
    struct TestBehavior;

    impl Behavior<TestLayer, Custom> for TestBehavior {
        fn process_record(
            &mut self,
            action: &TestAction,
            pressed: bool,
            ctx: &mut Context<'_, TestLayer>,
        ) -> bool {
            match action {
                Action::Custom(Custom::Shift) => {
                    if pressed {
                        ctx.register_key(Key::LeftShift);
                    } else {
                        ctx.unregister_key(Key::LeftShift);
                    }
                    false
                }
                _ => true,
            }
        }

        fn encoder_update(
            &mut self,
            _index: u8,
            clockwise: bool,
            ctx: &mut Context<'_, TestLayer>,
        ) -> bool {
            ctx.tap_key(if clockwise { Key::PageDown } else { Key::PageUp });
            true
        }
    }

    type TestController = Controller<
        2,
        6,
        Recorder,
        Switches,
        TestLayout,
        TestBehavior,
        NoAudio,
        MemoryStore,
    >;

    fn setup(store: MemoryStore) -> (TestController, Switches) {
        let switches = Switches::default();
        let controller = Controller::new(
            Recorder::default(),
            switches.clone(),
            TestLayout,
            TestBehavior,
            NoAudio,
            store,
            Config::default(),
        );
        (controller, switches)
    }

    fn at(ms: u32) -> Instant {
        Instant::from_ticks(ms)
    }

    #[test]
    fn reports_held_keys() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 0)]);
        controller.main_loop(at(0));
        assert_eq!(controller.get_state().keys.as_slice(), &[Key::A]);

        switches.set(&[]);
        controller.main_loop(at(10));
        assert!(controller.get_state().keys.is_empty());
    }

    #[test]
    fn layer_tap_tapped_sends_key_once() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 1)]);
        controller.main_loop(at(0));
        switches.set(&[]);
        controller.main_loop(at(50));

        controller.send_keys().unwrap();
        controller.send_keys().unwrap();
        let reports = controller.communicator.reports.borrow();
        assert_eq!(reports[0], [Key::Space]);
        assert!(reports[1].is_empty());
        assert!(!controller.layer_state().is_on(TestLayer::Fn));
    }

    #[test]
    fn layer_tap_held_past_term_activates_layer() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 1)]);
        controller.main_loop(at(0));
        controller.main_loop(at(250));
        assert!(controller.layer_state().is_on(TestLayer::Fn));

        switches.set(&[(0, 1), (0, 0)]);
        controller.main_loop(at(260));
        assert_eq!(controller.get_state().keys.as_slice(), &[Key::Digit1_Exclamation]);

        switches.set(&[]);
        controller.main_loop(at(300));
        assert!(!controller.layer_state().is_on(TestLayer::Fn));
        controller.send_keys().unwrap();
        assert!(controller.communicator.reports.borrow()[0].is_empty());
    }

    #[test]
    fn layer_tap_held_with_another_key_waits_for_the_term() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 1)]);
        controller.main_loop(at(0));
        switches.set(&[(0, 1), (0, 2)]);
        controller.main_loop(at(20));
        assert!(!controller.layer_state().is_on(TestLayer::Fn));
        assert!(controller.get_state().keys.is_empty());

        controller.main_loop(at(200));
        assert!(controller.layer_state().is_on(TestLayer::Fn));
        controller.send_keys().unwrap();
        assert_eq!(controller.communicator.mouse.borrow()[0].y, -8);
    }

    #[test]
    fn layer_tap_rolled_into_another_key_is_a_tap() {
        let (mut controller, switches) = setup(MemoryStore::default());
        let mut scan = |pressed: &[(u8, u8)], ms| {
            switches.set(pressed);
            controller.main_loop(at(ms));
            controller.send_keys().unwrap();
        };
        scan(&[(0, 1)], 0);
        scan(&[(0, 1), (0, 0)], 10);
        scan(&[(0, 0)], 20);
        scan(&[], 30);

        assert!(!controller.layer_state().is_on(TestLayer::Fn));
        let reports = controller.communicator.reports.borrow();
        assert_eq!(*reports, [vec![], vec![], vec![Key::Space, Key::A], vec![]]);
    }

    #[test]
    fn keys_pressed_and_released_while_buffered_are_tapped() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 1)]);
        controller.main_loop(at(0));
        switches.set(&[(0, 1), (0, 0)]);
        controller.main_loop(at(10));
        switches.set(&[(0, 1)]);
        controller.main_loop(at(20));
        switches.set(&[]);
        controller.main_loop(at(30));

        for _ in 0..4 {
            controller.send_keys().unwrap();
        }
        let reports = controller.communicator.reports.borrow();
        assert_eq!(reports[0], [Key::Space]);
        assert!(reports[1].is_empty());
        assert_eq!(reports[2], [Key::A]);
        assert!(reports[3].is_empty());
    }

    #[test]
    fn release_uses_action_of_press() {
        let (mut controller, switches) = setup(MemoryStore::default());
        switches.set(&[(0, 2)]);
        controller.main_loop(at(0));
        assert_eq!(controller.get_state().keys.as_slice(), &[Key::LeftShift]);

        controller.layers.layer_on(TestLayer::Fn);
        switches.set(&[]);
        controller.main_loop(at(10));
        assert!(controller.get_state().keys.is_empty());
    }

    #[test]
    fn encoder_taps_go_out_one_report_each() {
        let (mut controller, _switches) = setup(MemoryStore::default());
        controller.encoder_update(0, true);
        controller.encoder_update(0, false);
        for _ in 0..4 {
            controller.send_keys().unwrap();
        }
        let reports = controller.communicator.reports.borrow();
        assert_eq!(reports[0], [Key::PageDown]);
        assert!(reports[1].is_empty());
        assert_eq!(reports[2], [Key::PageUp]);
        assert!(reports[3].is_empty());
    }

    #[test]
    fn loads_persisted_default_layer() {
        let (controller, _) = setup(MemoryStore::new(Some(1)));
        assert_eq!(controller.get_state().default_layer, TestLayer::Fn);

        let (controller, _) = setup(MemoryStore::new(Some(7)));
        assert_eq!(controller.get_state().default_layer, TestLayer::Base);
    }

    #[test]
    fn unknown_stored_layer_is_an_error() {
        assert_eq!(
            stored_default_layer::<TestLayer>(&mut MemoryStore::new(Some(7))),
            Err(Error::InvalidLayer { index: 7 })
        );
        assert_eq!(
            stored_default_layer::<TestLayer>(&mut MemoryStore::new(Some(1))),
            Ok(Some(TestLayer::Fn))
        );
        assert_eq!(
            stored_default_layer::<TestLayer>(&mut MemoryStore::default()),
            Ok(None)
        );
    }

    #[test]
    fn modified_keys_yield_to_plain_keys() {
        let keys: Vec<Key, 6> = [Key::Question, Key::A].into_iter().collect();
        assert_eq!(filter_keys(keys).as_slice(), &[Key::A]);

        let keys: Vec<Key, 6> = [Key::Question, Key::RightAlt_W].into_iter().collect();
        assert_eq!(filter_keys(keys).len(), 2);
    }

    #[test]
    fn modifiers_do_not_suppress_modified_keys() {
        let keys: Vec<Key, 6> = [Key::LeftShift, Key::RightAlt_W].into_iter().collect();
        assert_eq!(
            filter_keys(keys).as_slice(),
            &[Key::LeftShift, Key::RightAlt_W]
        );

        let keys: Vec<Key, 6> = [Key::LeftControl, Key::Exclamation, Key::MediaMute]
            .into_iter()
            .collect();
        assert_eq!(filter_keys(keys).len(), 3);
    }
}
